//! Snapshot types - the read-only view handed to renderers between ticks.
//!
//! The `Snapshot` struct is plain serializable data, so a host can copy it out
//! and hand it to another thread.

use crate::components::*;
use crate::events::SimEvent;
use crate::store::{EntityStore, EntityView};
use crate::tiles::TileSnapshot;
use serde::{Deserialize, Serialize};

/// Snapshot of a single entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: u32,
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
    pub facing: f32,
    pub grounded: bool,
    pub state: String,
}

impl EntitySnapshot {
    pub fn from_view(view: &EntityView) -> Self {
        let state = match view.kind {
            EntityKind::Player(_) => match view.contacts.motion_state() {
                MotionState::Grounded => "Grounded",
                MotionState::Airborne => "Airborne",
            },
            EntityKind::Enemy(_) => "Patrol",
            EntityKind::Item(_) => "Idle",
        };

        Self {
            id: view.id.0,
            kind: view.kind.label().to_string(),
            x: view.position.x,
            y: view.position.y,
            vx: view.velocity.vx,
            vy: view.velocity.vy,
            width: view.body.width,
            height: view.body.height,
            facing: view.kind.facing(),
            grounded: view.contacts.grounded,
            state: state.to_string(),
        }
    }
}

/// Complete simulation state snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Ticks run so far.
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub time: f32,
    /// Id of the level's player.
    pub player_id: u32,
    /// Coins the player has collected.
    pub coins: u32,
    /// Renderable entities in insertion order.
    pub entities: Vec<EntitySnapshot>,
    /// Events since the previous snapshot.
    pub events: Vec<SimEvent>,
    /// Full grid, present only when it changed since the previous snapshot.
    pub grid: Option<TileSnapshot>,
}

impl Snapshot {
    /// Collect every renderable entity from the store.
    pub fn entities_from_store(store: &EntityStore) -> Vec<EntitySnapshot> {
        store
            .iter()
            .filter(|view| store.get::<Renderable>(view.id).is_some())
            .map(|view| EntitySnapshot::from_view(&view))
            .collect()
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a snapshot from a JSON string.
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EntitySpawn;

    #[test]
    fn test_entity_snapshot_labels() {
        let mut store = EntityStore::new();
        let enemy = store.insert(EntitySpawn::enemy(
            Position::new(48.0, 32.0),
            EnemyState::new(60.0).facing_left(),
        ));
        store.insert(EntitySpawn::item(Position::new(64.0, 32.0), ItemKind::Coin));

        let entities = Snapshot::entities_from_store(&store);
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].id, enemy.0);
        assert_eq!(entities[0].kind, "Enemy");
        assert_eq!(entities[0].facing, -1.0);
        assert_eq!(entities[1].kind, "Coin");
        assert_eq!(entities[1].state, "Idle");
    }

    #[test]
    fn test_snapshot_json() {
        let snapshot = Snapshot {
            tick: 42,
            time: 0.7,
            player_id: 0,
            coins: 3,
            entities: vec![],
            events: vec![SimEvent::Jumped { id: EntityId(0) }],
            grid: None,
        };

        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"type\":\"Jumped\""));
        let restored = Snapshot::from_json(&json).unwrap();
        assert_eq!(restored.tick, 42);
        assert_eq!(restored.events, snapshot.events);
    }
}
