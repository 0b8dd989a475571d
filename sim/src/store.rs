//! Entity store - owns every dynamic entity in a level.
//!
//! Entities live in a `bevy_ecs` world. The store hands out stable
//! [`EntityId`]s (monotonic, never reused) and keeps an id-ordered index so
//! systems visit entities in insertion order every tick.
//!
//! Removal during a tick goes through the [`RemovalQueue`] resource and is
//! applied by [`EntityStore::flush_removals`] once the schedule has finished.

use crate::components::*;
use crate::error::{SimError, SimResult};
use bevy_ecs::prelude::*;
use std::collections::BTreeMap;

/// Id to ECS entity index. Ordered by id, which is insertion order.
#[derive(Resource, Debug, Default)]
pub struct EntityIndex {
    entries: BTreeMap<EntityId, Entity>,
}

impl EntityIndex {
    /// Entities in insertion order.
    pub fn ordered(&self) -> impl Iterator<Item = (EntityId, Entity)> + '_ {
        self.entries.iter().map(|(id, entity)| (*id, *entity))
    }

    pub fn entity(&self, id: EntityId) -> Option<Entity> {
        self.entries.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Removals requested while a tick is in progress.
#[derive(Resource, Debug, Default)]
pub struct RemovalQueue(Vec<EntityId>);

impl RemovalQueue {
    /// Queue an id. Queuing the same id twice is a no-op.
    pub fn push(&mut self, id: EntityId) {
        if !self.0.contains(&id) {
            self.0.push(id);
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Description of an entity to insert.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntitySpawn {
    pub kind: EntityKind,
    pub position: Position,
    pub velocity: Velocity,
    pub body: Body,
}

impl EntitySpawn {
    pub fn new(kind: EntityKind, position: Position) -> Self {
        Self {
            kind,
            position,
            velocity: Velocity::default(),
            body: Body::default(),
        }
    }

    pub fn player(position: Position, state: PlayerState) -> Self {
        Self::new(EntityKind::Player(state), position)
    }

    pub fn enemy(position: Position, state: EnemyState) -> Self {
        Self::new(EntityKind::Enemy(state), position)
    }

    pub fn item(position: Position, kind: ItemKind) -> Self {
        Self::new(EntityKind::Item(kind), position)
    }

    pub fn with_velocity(mut self, velocity: Velocity) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }
}

/// Read-only copy of one entity's state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityView {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Position,
    pub velocity: Velocity,
    pub body: Body,
    pub contacts: Contacts,
}

/// Owner of all dynamic entities of a level.
pub struct EntityStore {
    world: World,
    next_id: u32,
}

impl EntityStore {
    pub fn new() -> Self {
        let mut world = World::new();
        world.init_resource::<EntityIndex>();
        world.init_resource::<RemovalQueue>();
        Self { world, next_id: 0 }
    }

    /// Insert an entity and return its fresh id.
    pub fn insert(&mut self, spawn: EntitySpawn) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;

        let capabilities = spawn.kind.capabilities();
        let mut entity = self.world.spawn(EntityBundle {
            id,
            kind: spawn.kind,
            position: spawn.position,
            velocity: spawn.velocity,
            body: spawn.body,
            intent: Intent::default(),
            contacts: Contacts::default(),
            displacement: Displacement::default(),
        });
        if capabilities.movable {
            entity.insert(Movable);
        }
        if capabilities.collidable {
            entity.insert(Collidable);
        }
        if capabilities.renderable {
            entity.insert(Renderable);
        }
        let entity = entity.id();

        self.world
            .resource_mut::<EntityIndex>()
            .entries
            .insert(id, entity);
        id
    }

    /// Remove immediately. Returns `false` if the id is not present.
    ///
    /// Must not be called while a schedule is running over this store; use
    /// [`EntityStore::queue_removal`] from inside a tick.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.world.resource_mut::<EntityIndex>().entries.remove(&id) else {
            return false;
        };
        self.world.resource_mut::<RemovalQueue>().0.retain(|queued| *queued != id);
        self.world.despawn(entity)
    }

    /// Defer removal until the next [`EntityStore::flush_removals`].
    pub fn queue_removal(&mut self, id: EntityId) {
        self.world.resource_mut::<RemovalQueue>().push(id);
    }

    /// Apply queued removals. Returns the ids actually removed, in queue order.
    pub fn flush_removals(&mut self) -> Vec<EntityId> {
        let queued = std::mem::take(&mut self.world.resource_mut::<RemovalQueue>().0);
        queued.into_iter().filter(|id| self.remove(*id)).collect()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index().entity(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.index().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index().is_empty()
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.index().ordered().map(|(id, _)| id).collect()
    }

    /// ECS entity behind an id.
    pub fn lookup(&self, id: EntityId) -> SimResult<Entity> {
        self.index().entity(id).ok_or(SimError::NotFound(id))
    }

    /// Component of an entity.
    pub fn get<T: Component>(&self, id: EntityId) -> Option<&T> {
        let entity = self.index().entity(id)?;
        self.world.get::<T>(entity)
    }

    /// Mutable component of an entity. Only valid between ticks.
    pub fn get_mut<T: Component>(&mut self, id: EntityId) -> Option<Mut<'_, T>> {
        let entity = self.index().entity(id)?;
        self.world.get_mut::<T>(entity)
    }

    pub fn view(&self, id: EntityId) -> Option<EntityView> {
        let entity = self.index().entity(id)?;
        self.view_entity(id, entity)
    }

    fn view_entity(&self, id: EntityId, entity: Entity) -> Option<EntityView> {
        Some(EntityView {
            id,
            kind: *self.world.get::<EntityKind>(entity)?,
            position: *self.world.get::<Position>(entity)?,
            velocity: *self.world.get::<Velocity>(entity)?,
            body: *self.world.get::<Body>(entity)?,
            contacts: *self.world.get::<Contacts>(entity)?,
        })
    }

    /// Every entity in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = EntityView> + '_ {
        self.index()
            .ordered()
            .filter_map(move |(id, entity)| self.view_entity(id, entity))
    }

    fn index(&self) -> &EntityIndex {
        self.world.resource::<EntityIndex>()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}
