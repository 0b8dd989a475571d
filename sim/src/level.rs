//! Level - tile grid plus the entities that live on it.
//!
//! A level always holds exactly one player. The grid and spawn point are
//! stored as resources of the level's ECS world so systems can read them.

use crate::components::*;
use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::store::{EntitySpawn, EntityStore, EntityView};
use crate::tiles::{Tile, TileGrid};
use bevy_ecs::prelude::*;

/// Where the player enters the level and respawns after falling out.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SpawnPoint(pub Position);

pub struct Level {
    store: EntityStore,
    player: EntityId,
}

impl Level {
    /// Create a level and place the player at `spawn`.
    pub fn new(grid: TileGrid, spawn: Position, player: PlayerState) -> SimResult<Self> {
        if !spawn.is_finite() {
            return Err(SimError::invalid("player spawn point must be finite"));
        }
        let mut store = EntityStore::new();
        store.world_mut().insert_resource(grid);
        store.world_mut().insert_resource(SpawnPoint(spawn));
        let player = store.insert(EntitySpawn::player(spawn, player));
        Ok(Self { store, player })
    }

    /// Create a level whose player uses the speeds from `config`.
    pub fn with_config(grid: TileGrid, spawn: Position, config: &SimConfig) -> SimResult<Self> {
        Self::new(grid, spawn, config.player_state())
    }

    pub fn grid(&self) -> &TileGrid {
        self.store.world().resource::<TileGrid>()
    }

    pub fn set_tile(&mut self, x: i32, y: i32, tile: Tile) -> SimResult<()> {
        self.store
            .world_mut()
            .resource_mut::<TileGrid>()
            .set(x, y, tile)
    }

    /// Add a non-player entity.
    pub fn spawn(&mut self, spawn: EntitySpawn) -> SimResult<EntityId> {
        if spawn.kind.is_player() {
            return Err(SimError::invalid("a level holds exactly one player"));
        }
        if !spawn.position.is_finite() || !spawn.velocity.is_finite() {
            return Err(SimError::invalid("spawn position and velocity must be finite"));
        }
        Ok(self.store.insert(spawn))
    }

    /// Remove a non-player entity. Absent ids are a no-op returning `false`.
    pub fn remove(&mut self, id: EntityId) -> SimResult<bool> {
        if id == self.player {
            return Err(SimError::invalid("the player cannot be removed from a level"));
        }
        Ok(self.store.remove(id))
    }

    pub fn player(&self) -> EntityId {
        self.player
    }

    pub fn player_view(&self) -> Option<EntityView> {
        self.store.view(self.player)
    }

    pub fn spawn_point(&self) -> Position {
        self.store.world().resource::<SpawnPoint>().0
    }

    pub fn entity(&self, id: EntityId) -> SimResult<EntityView> {
        self.store.view(id).ok_or(SimError::NotFound(id))
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }
}
