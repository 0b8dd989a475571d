//! Tile Platformer - Simulation Core
//!
//! A deterministic, fixed-timestep simulation of a side-scrolling tile
//! platformer: a tile grid, a player, patrolling enemies and coins.
//! Uses `bevy_ecs` for the entity-component-system architecture.
//!
//! Hosts own a [`Simulation`], feed it wall time and input, and read
//! [`Snapshot`]s back for rendering.

pub mod api;
pub mod bridge;
pub mod clock;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod input;
pub mod level;
pub mod snapshot;
pub mod store;
pub mod systems;
pub mod tiles;

pub use api::{SimMode, Simulation};
pub use clock::SimulationClock;
pub use components::*;
pub use config::SimConfig;
pub use error::{SimError, SimResult};
pub use events::SimEvent;
pub use input::{ActionSet, InputState};
pub use level::{Level, SpawnPoint};
pub use snapshot::{EntitySnapshot, Snapshot};
pub use store::{EntitySpawn, EntityStore, EntityView};
pub use tiles::{Tile, TileGrid, TileSnapshot, TILE_SIZE};
