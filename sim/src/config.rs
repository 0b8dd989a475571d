//! Simulation tuning.
//!
//! Default values reproduce the prototype's per-frame constants (gravity 0.5,
//! walk speed 2, jump 10, patrol speed 1 per frame) converted to per-second
//! units at 60 Hz.

use crate::components::{EnemyState, PlayerState};
use crate::error::{SimError, SimResult};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the simulation. Inserted as a resource for systems.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed timestep in seconds (e.g., 1/60 for 60 Hz).
    pub fixed_timestep: f32,
    /// Upper bound on ticks executed by one `advance` call.
    pub max_ticks_per_frame: u32,
    /// Downward acceleration (units/sec²).
    pub gravity: f32,
    /// Terminal fall speed (units/sec).
    pub max_fall_speed: f32,
    /// Player horizontal speed (units/sec).
    pub player_speed: f32,
    /// Player jump impulse (units/sec).
    pub jump_impulse: f32,
    /// Enemy patrol speed (units/sec).
    pub enemy_speed: f32,
    /// Upward speed given to the player after stomping an enemy.
    pub stomp_bounce: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            max_ticks_per_frame: 5,
            gravity: 1800.0,
            max_fall_speed: 960.0, // one tile per tick at 60 Hz
            player_speed: 120.0,
            jump_impulse: 600.0,
            enemy_speed: 60.0,
            stomp_bounce: 300.0,
        }
    }
}

impl SimConfig {
    /// Parse from JSON; missing fields take their defaults. The result is validated.
    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SimResult<()> {
        if !self.fixed_timestep.is_finite() || self.fixed_timestep <= 0.0 {
            return Err(SimError::invalid(format!(
                "fixed_timestep must be positive and finite, got {}",
                self.fixed_timestep
            )));
        }
        if self.tick_duration().is_zero() {
            return Err(SimError::invalid("fixed_timestep rounds to zero nanoseconds"));
        }
        if self.max_ticks_per_frame == 0 {
            return Err(SimError::invalid("max_ticks_per_frame must be at least 1"));
        }
        if !self.max_fall_speed.is_finite() || self.max_fall_speed <= 0.0 {
            return Err(SimError::invalid(format!(
                "max_fall_speed must be positive and finite, got {}",
                self.max_fall_speed
            )));
        }

        let non_negative = [
            ("gravity", self.gravity),
            ("player_speed", self.player_speed),
            ("jump_impulse", self.jump_impulse),
            ("enemy_speed", self.enemy_speed),
            ("stomp_bounce", self.stomp_bounce),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::invalid(format!(
                    "{name} must be non-negative and finite, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::try_from_secs_f32(self.fixed_timestep).unwrap_or(Duration::ZERO)
    }

    pub fn player_state(&self) -> PlayerState {
        PlayerState::new(self.player_speed, self.jump_impulse)
    }

    pub fn enemy_state(&self) -> EnemyState {
        EnemyState::new(self.enemy_speed)
    }
}
