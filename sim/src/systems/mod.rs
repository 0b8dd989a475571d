//! ECS Systems for the platformer simulation.
//!
//! Systems contain the game logic that operates on components. One tick runs
//! them in a fixed chain on a single thread:
//!
//! 1. `behavior_system` - kind-specific intent from input and patrol state
//! 2. `physics_system` - gravity, integration, tile collision, jumps
//! 3. `patrol_reversal_system` - enemies turn around on wall contact
//! 4. `interaction_system` - coin pickup, stomps, player hurt
//! 5. `fall_out_system` - entities below the level are removed or respawned
//!
//! Every system walks entities through the `EntityIndex`, so the visiting
//! order is insertion order on every tick.

pub mod behavior;
pub mod interaction;
pub mod physics;

pub use behavior::*;
pub use interaction::*;
pub use physics::*;

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;

/// Resource containing the delta time for the current tick.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct DeltaTime(pub f32);

/// Build the per-tick schedule.
pub fn build_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.add_systems(
        (
            behavior_system,
            physics_system,
            patrol_reversal_system,
            interaction_system,
            fall_out_system,
        )
            .chain(),
    );
    schedule
}
