//! Public API for the simulation.
//!
//! [`Simulation`] is the explicit context a host owns and drives: it holds the
//! level, the per-tick schedule, the clock, the latched input and the event
//! log. Renderers read snapshots between ticks; editors call the level-edit
//! methods between ticks.
//!
//! ## Fixed Timestep
//!
//! The simulation runs at a fixed tick rate (default 60 Hz). When `advance`
//! or `step` is called, elapsed wall time is accumulated and as many whole
//! ticks as are due are run, capped at `max_ticks_per_frame`.

use crate::clock::SimulationClock;
use crate::components::*;
use crate::config::SimConfig;
use crate::error::SimResult;
use crate::events::{SimEvent, TickEvents};
use crate::input::{ActionSet, InputState};
use crate::level::Level;
use crate::snapshot::Snapshot;
use crate::store::{EntitySpawn, EntityView};
use crate::systems::{build_schedule, DeltaTime};
use crate::tiles::{Tile, TileGrid, TileSnapshot};
use bevy_ecs::prelude::*;
use std::time::Duration;

/// Whether `advance` runs ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SimMode {
    #[default]
    Play,
    /// Time does not advance; the level can be edited freely.
    Edit,
}

/// The main simulation container.
pub struct Simulation {
    config: SimConfig,
    level: Level,
    schedule: Schedule,
    clock: SimulationClock,
    input: ActionSet,
    mode: SimMode,
    tick: u64,
    time: f32,
    /// Events since the last snapshot.
    events: Vec<SimEvent>,
    /// Grid changed since the last snapshot.
    grid_dirty: bool,
}

impl Simulation {
    /// Create a simulation for `level`. Fails if `config` is invalid.
    pub fn new(config: SimConfig, level: Level) -> SimResult<Self> {
        config.validate()?;
        let clock = SimulationClock::new(config.tick_duration(), config.max_ticks_per_frame)?;

        let mut sim = Self {
            config,
            level,
            schedule: build_schedule(),
            clock,
            input: ActionSet::NONE,
            mode: SimMode::Play,
            tick: 0,
            time: 0.0,
            events: Vec::new(),
            grid_dirty: true, // Initial grid needs to be sent
        };
        sim.install_resources(InputState::default());

        log::info!(
            "simulation ready: {}x{} tiles, {} entities, {:.1} Hz",
            sim.level.grid().width(),
            sim.level.grid().height(),
            sim.level.store().len(),
            1.0 / sim.config.fixed_timestep
        );
        Ok(sim)
    }

    /// Demo level: 256×15 tiles with a full ground row, a brick ledge holding
    /// a QuestionBlock at column 13 and a two-tile brick pillar at column 24.
    /// Player at (32, 32), one goomba at (48, 32) and one coin at (64, 32).
    pub fn demo() -> SimResult<Self> {
        let config = SimConfig::default();
        let mut grid = TileGrid::new(256, 15)?;
        grid.fill(0, 14, 256, 1, Tile::Ground)?;
        grid.fill(12, 10, 3, 1, Tile::Brick)?;
        grid.set(13, 10, Tile::QuestionBlock)?;
        grid.fill(24, 12, 1, 2, Tile::Brick)?;

        let level = Level::with_config(grid, Position::new(32.0, 32.0), &config)?;
        let mut sim = Self::new(config, level)?;
        sim.spawn_enemy(48.0, 32.0)?;
        sim.spawn_item(64.0, 32.0, ItemKind::Coin)?;
        Ok(sim)
    }

    fn install_resources(&mut self, input: InputState) {
        let world = self.level.store_mut().world_mut();
        world.insert_resource(self.config.clone());
        world.insert_resource(DeltaTime(self.config.fixed_timestep));
        world.insert_resource(input);
        world.insert_resource(TickEvents::default());
    }

    /// Account for elapsed wall time and run the ticks that are due.
    /// Returns the number of ticks run.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if self.mode == SimMode::Edit {
            self.clock.reset();
            return 0;
        }
        let due = self.clock.advance(elapsed);
        for _ in 0..due {
            self.run_tick();
        }
        due
    }

    /// `advance` with the elapsed time in seconds. Non-positive or non-finite
    /// values run nothing.
    pub fn step(&mut self, dt: f32) -> u32 {
        match Duration::try_from_secs_f32(dt) {
            Ok(elapsed) if dt.is_finite() => self.advance(elapsed),
            _ => 0,
        }
    }

    /// Run exactly one tick, bypassing the clock.
    pub fn tick(&mut self) {
        self.run_tick();
    }

    fn run_tick(&mut self) {
        let store = self.level.store_mut();
        {
            let world = store.world_mut();
            world.resource_mut::<InputState>().advance(self.input);
            self.schedule.run(world);
        }

        let removed = store.flush_removals();
        if !removed.is_empty() {
            log::debug!("tick {}: removed {:?}", self.tick + 1, removed);
        }
        let events = store.world_mut().resource_mut::<TickEvents>().drain();
        self.events.extend(events);

        self.tick += 1;
        self.time += self.config.fixed_timestep;
    }

    /// Latch the actions held by the player; used by every following tick.
    pub fn set_input(&mut self, actions: ActionSet) {
        self.input = actions;
    }

    pub fn input(&self) -> ActionSet {
        self.input
    }

    pub fn set_mode(&mut self, mode: SimMode) {
        if mode != self.mode {
            log::info!("simulation mode: {mode:?}");
            self.clock.reset();
        }
        self.mode = mode;
    }

    pub fn mode(&self) -> SimMode {
        self.mode
    }

    /// Replace the level. Tick count, time and held input carry on; pending
    /// events are dropped.
    pub fn load_level(&mut self, level: Level) {
        let input = self
            .level
            .store()
            .world()
            .get_resource::<InputState>()
            .copied()
            .unwrap_or_default();
        self.level = level;
        self.install_resources(input);
        self.clock.reset();
        self.events.clear();
        self.grid_dirty = true;
        log::info!(
            "level loaded: {}x{} tiles, {} entities",
            self.level.grid().width(),
            self.level.grid().height(),
            self.level.store().len()
        );
    }

    // ------------------------------------------------------------------
    // Level editing (between ticks)
    // ------------------------------------------------------------------

    pub fn set_tile(&mut self, x: i32, y: i32, tile: Tile) -> SimResult<()> {
        self.level.set_tile(x, y, tile)?;
        self.grid_dirty = true;
        Ok(())
    }

    pub fn spawn(&mut self, spawn: EntitySpawn) -> SimResult<EntityId> {
        self.level.spawn(spawn)
    }

    /// Spawn a patrolling enemy facing right.
    pub fn spawn_enemy(&mut self, x: f32, y: f32) -> SimResult<EntityId> {
        let state = self.config.enemy_state();
        self.spawn(EntitySpawn::enemy(Position::new(x, y), state))
    }

    pub fn spawn_item(&mut self, x: f32, y: f32, kind: ItemKind) -> SimResult<EntityId> {
        self.spawn(EntitySpawn::item(Position::new(x, y), kind))
    }

    /// Remove a non-player entity. Absent ids are a no-op returning `false`.
    pub fn remove_entity(&mut self, id: EntityId) -> SimResult<bool> {
        self.level.remove(id)
    }

    // ------------------------------------------------------------------
    // Read-only state
    // ------------------------------------------------------------------

    /// Snapshot of the current state. Drains the event log and clears the
    /// grid-dirty flag.
    pub fn snapshot(&mut self) -> Snapshot {
        let store = self.level.store();
        let player = self.level.player_view();
        let coins = match player.map(|view| view.kind) {
            Some(EntityKind::Player(state)) => state.coins,
            _ => 0,
        };

        let snapshot = Snapshot {
            tick: self.tick,
            time: self.time,
            player_id: self.level.player().0,
            coins,
            entities: Snapshot::entities_from_store(store),
            events: std::mem::take(&mut self.events),
            grid: self
                .grid_dirty
                .then(|| TileSnapshot::from_grid(self.level.grid())),
        };
        self.grid_dirty = false;
        snapshot
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> String {
        self.snapshot()
            .to_json()
            .unwrap_or_else(|_| "{}".to_string())
    }

    /// Full grid snapshot regardless of the dirty flag.
    pub fn tile_snapshot(&self) -> TileSnapshot {
        TileSnapshot::from_grid(self.level.grid())
    }

    /// Events raised since the last snapshot.
    pub fn pending_events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn entity(&self, id: EntityId) -> SimResult<EntityView> {
        self.level.entity(id)
    }

    pub fn player(&self) -> SimResult<EntityView> {
        self.level.entity(self.level.player())
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Get the number of ticks run.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Get the elapsed simulation time.
    pub fn current_time(&self) -> f32 {
        self.time
    }

    /// Tile size in world units.
    pub fn tile_size(&self) -> f32 {
        self.level.grid().tile_size()
    }
}
