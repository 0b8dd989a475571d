//! Gameplay events raised during a tick.

use crate::components::{EntityId, ItemKind};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Something observable that happened during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    Jumped { id: EntityId },
    Landed { id: EntityId },
    EnemyReversed { id: EntityId },
    /// An entity hit a QuestionBlock from below.
    BlockBumped { x: i32, y: i32, by: EntityId },
    ItemCollected {
        player: EntityId,
        item: EntityId,
        kind: ItemKind,
    },
    EnemyStomped { player: EntityId, enemy: EntityId },
    PlayerHurt { player: EntityId, enemy: EntityId },
    PlayerRespawned { id: EntityId },
    /// A non-player entity fell below the level and was removed.
    FellOut { id: EntityId },
}

/// Events raised by systems during the current tick.
#[derive(Resource, Debug, Default)]
pub struct TickEvents(Vec<SimEvent>);

impl TickEvents {
    pub fn push(&mut self, event: SimEvent) {
        log::debug!("{event:?}");
        self.0.push(event);
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.0
    }

    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.0)
    }
}
