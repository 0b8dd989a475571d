//! ECS Components for the platformer simulation.
//!
//! Components are pure data containers attached to entities.
//! All game logic lives in systems that query these components.

use crate::tiles::TILE_SIZE;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// World position of an entity's top-left corner (y grows downward).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// 2D velocity in world units per second.
///
/// For movable entities `vx` mirrors the horizontal intent applied on the
/// last tick; only `vy` carries over between ticks.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
}

impl Velocity {
    pub fn new(vx: f32, vy: f32) -> Self {
        Self { vx, vy }
    }

    pub fn is_finite(&self) -> bool {
        self.vx.is_finite() && self.vy.is_finite()
    }
}

/// Axis-aligned extent of an entity, anchored at its `Position`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub width: f32,
    pub height: f32,
}

impl Body {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::new(TILE_SIZE, TILE_SIZE)
    }
}

/// Displacement actually applied by the last physics step.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Displacement {
    pub dx: f32,
    pub dy: f32,
}

/// Bounding box in world units. Overlap is strict: touching edges do not overlap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Aabb {
    pub fn new(position: &Position, body: &Body) -> Self {
        Self {
            min_x: position.x,
            min_y: position.y,
            max_x: position.x + body.width,
            max_y: position.y + body.height,
        }
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }

    pub fn center_y(&self) -> f32 {
        (self.min_y + self.max_y) * 0.5
    }
}

// ============================================================================
// IDENTITY COMPONENTS
// ============================================================================

/// Stable identifier assigned by the entity store. Never reused.
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// CAPABILITY MARKERS
// ============================================================================

/// Entity is integrated by the physics step.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Movable;

/// Entity takes part in entity-vs-entity interactions.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Collidable;

/// Entity is reported to renderers.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Renderable;

/// Capability set implied by an entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub movable: bool,
    pub collidable: bool,
    pub renderable: bool,
}

// ============================================================================
// KIND COMPONENTS
// ============================================================================

/// Collectible item variety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Coin,
}

/// Player-specific state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Horizontal speed while a move action is held (units/sec).
    pub speed: f32,
    /// Upward speed applied on a jump (units/sec).
    pub jump_impulse: f32,
    /// Coins collected so far.
    pub coins: u32,
}

impl PlayerState {
    pub fn new(speed: f32, jump_impulse: f32) -> Self {
        Self {
            speed,
            jump_impulse,
            coins: 0,
        }
    }
}

/// Patrolling enemy state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyState {
    /// Facing direction, +1.0 (right) or -1.0 (left).
    pub direction: f32,
    /// Patrol speed (units/sec).
    pub speed: f32,
}

impl EnemyState {
    pub fn new(speed: f32) -> Self {
        Self {
            direction: 1.0,
            speed,
        }
    }

    pub fn facing_left(mut self) -> Self {
        self.direction = -1.0;
        self
    }

    pub fn reverse(&mut self) {
        self.direction = -self.direction;
    }
}

/// Closed set of entity kinds, each carrying its own state.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Player(PlayerState),
    Enemy(EnemyState),
    Item(ItemKind),
}

impl EntityKind {
    pub fn capabilities(&self) -> Capabilities {
        match self {
            EntityKind::Player(_) | EntityKind::Enemy(_) => Capabilities {
                movable: true,
                collidable: true,
                renderable: true,
            },
            EntityKind::Item(_) => Capabilities {
                movable: false,
                collidable: true,
                renderable: true,
            },
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self, EntityKind::Player(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Player(_) => "Player",
            EntityKind::Enemy(_) => "Enemy",
            EntityKind::Item(ItemKind::Coin) => "Coin",
        }
    }

    /// Facing direction for presentation; items face right.
    pub fn facing(&self) -> f32 {
        match self {
            EntityKind::Enemy(enemy) => enemy.direction,
            _ => 1.0,
        }
    }
}

// ============================================================================
// CONTROL / PHYSICS COMPONENTS
// ============================================================================

/// What an entity's behavior wants this tick. Consumed by the physics step.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Intent {
    /// Horizontal velocity to apply directly (units/sec).
    pub vx: f32,
    /// Jump request carrying the impulse to apply.
    pub jump: Option<f32>,
}

/// Contact flags written by the physics step. Behaviors only read them.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Contacts {
    pub grounded: bool,
    pub hit_wall: bool,
    pub hit_ceiling: bool,
}

/// Player motion state, derived from `Contacts::grounded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionState {
    Grounded,
    Airborne,
}

impl Contacts {
    pub fn motion_state(&self) -> MotionState {
        if self.grounded {
            MotionState::Grounded
        } else {
            MotionState::Airborne
        }
    }
}

// ============================================================================
// BUNDLES
// ============================================================================

/// Components every stored entity carries. Capability markers are added on
/// top according to the kind.
#[derive(Bundle)]
pub struct EntityBundle {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Position,
    pub velocity: Velocity,
    pub body: Body,
    pub intent: Intent,
    pub contacts: Contacts,
    pub displacement: Displacement,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_touching_edges_do_not_overlap() {
        let body = Body::default();
        let a = Aabb::new(&Position::new(0.0, 0.0), &body);
        let b = Aabb::new(&Position::new(16.0, 0.0), &body);
        let c = Aabb::new(&Position::new(15.5, 8.0), &body);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }

    #[test]
    fn test_capabilities_by_kind() {
        let item = EntityKind::Item(ItemKind::Coin);
        assert!(!item.capabilities().movable);
        assert!(item.capabilities().collidable);

        let enemy = EntityKind::Enemy(EnemyState::new(60.0));
        assert!(enemy.capabilities().movable);
        assert_eq!(enemy.facing(), 1.0);
    }

    #[test]
    fn test_enemy_reverse() {
        let mut enemy = EnemyState::new(60.0);
        enemy.reverse();
        assert_eq!(enemy.direction, -1.0);
        enemy.reverse();
        assert_eq!(enemy.direction, 1.0);
    }

    #[test]
    fn test_motion_state_follows_grounded_flag() {
        let mut contacts = Contacts::default();
        assert_eq!(contacts.motion_state(), MotionState::Airborne);
        contacts.grounded = true;
        assert_eq!(contacts.motion_state(), MotionState::Grounded);
    }
}
