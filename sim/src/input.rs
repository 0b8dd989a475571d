//! Input actions and edge detection.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Actions the host reports as currently held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionSet {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
}

impl ActionSet {
    pub const NONE: ActionSet = ActionSet {
        move_left: false,
        move_right: false,
        jump: false,
    };

    pub fn left() -> Self {
        Self {
            move_left: true,
            ..Self::NONE
        }
    }

    pub fn right() -> Self {
        Self {
            move_right: true,
            ..Self::NONE
        }
    }

    pub fn jump() -> Self {
        Self {
            jump: true,
            ..Self::NONE
        }
    }

    /// -1, 0 or +1. Left and right together cancel.
    pub fn horizontal_axis(&self) -> f32 {
        match (self.move_left, self.move_right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// Input for the current tick alongside the previous tick's, so presses can be
/// detected as edges.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    current: ActionSet,
    previous: ActionSet,
}

impl InputState {
    /// Shift in the actions for a new tick.
    pub fn advance(&mut self, next: ActionSet) {
        self.previous = self.current;
        self.current = next;
    }

    pub fn current(&self) -> ActionSet {
        self.current
    }

    pub fn previous(&self) -> ActionSet {
        self.previous
    }

    /// Jump went from released to held on this tick.
    pub fn jump_pressed(&self) -> bool {
        self.current.jump && !self.previous.jump
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_axis() {
        assert_eq!(ActionSet::left().horizontal_axis(), -1.0);
        assert_eq!(ActionSet::right().horizontal_axis(), 1.0);
        assert_eq!(ActionSet::NONE.horizontal_axis(), 0.0);
        let both = ActionSet {
            move_left: true,
            move_right: true,
            jump: false,
        };
        assert_eq!(both.horizontal_axis(), 0.0);
    }

    #[test]
    fn test_jump_is_edge_triggered() {
        let mut input = InputState::default();
        input.advance(ActionSet::jump());
        assert!(input.jump_pressed());
        input.advance(ActionSet::jump());
        assert!(!input.jump_pressed());
        input.advance(ActionSet::NONE);
        assert!(!input.jump_pressed());
        input.advance(ActionSet::jump());
        assert!(input.jump_pressed());
    }
}
