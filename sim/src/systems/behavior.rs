//! Per-kind behavior: player control, enemy patrol, static items.

use crate::components::*;
use crate::events::{SimEvent, TickEvents};
use crate::input::InputState;
use crate::store::EntityIndex;
use bevy_ecs::prelude::*;

/// Intent for one entity this tick.
///
/// The player walks at full speed while a direction is held and requests a
/// jump only on the tick the jump action is first pressed. Whether the jump
/// happens is decided by the physics step from the grounded flag.
pub fn compute_intent(kind: &EntityKind, input: &InputState) -> Intent {
    match kind {
        EntityKind::Player(player) => Intent {
            vx: input.current().horizontal_axis() * player.speed,
            jump: input.jump_pressed().then_some(player.jump_impulse),
        },
        EntityKind::Enemy(enemy) => Intent {
            vx: enemy.direction * enemy.speed,
            jump: None,
        },
        EntityKind::Item(_) => Intent::default(),
    }
}

/// Writes every entity's intent from its kind and the tick input.
pub fn behavior_system(
    index: Res<EntityIndex>,
    input: Res<InputState>,
    mut query: Query<(&EntityKind, &mut Intent)>,
) {
    for (_, entity) in index.ordered() {
        if let Ok((kind, mut intent)) = query.get_mut(entity) {
            *intent = compute_intent(kind, &input);
        }
    }
}

/// Turns enemies around on the tick their patrol ran into a wall.
pub fn patrol_reversal_system(
    index: Res<EntityIndex>,
    mut events: ResMut<TickEvents>,
    mut query: Query<(&mut EntityKind, &Contacts)>,
) {
    for (id, entity) in index.ordered() {
        let Ok((mut kind, contacts)) = query.get_mut(entity) else {
            continue;
        };
        if !contacts.hit_wall {
            continue;
        }
        if let EntityKind::Enemy(enemy) = &mut *kind {
            enemy.reverse();
            events.push(SimEvent::EnemyReversed { id });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ActionSet;

    fn player() -> EntityKind {
        EntityKind::Player(PlayerState::new(120.0, 600.0))
    }

    #[test]
    fn test_player_intent_follows_input() {
        let mut input = InputState::default();
        input.advance(ActionSet::left());
        assert_eq!(compute_intent(&player(), &input).vx, -120.0);

        input.advance(ActionSet {
            move_left: true,
            move_right: true,
            jump: false,
        });
        assert_eq!(compute_intent(&player(), &input).vx, 0.0);
    }

    #[test]
    fn test_player_jump_request_only_on_press() {
        let mut input = InputState::default();
        input.advance(ActionSet::jump());
        assert_eq!(compute_intent(&player(), &input).jump, Some(600.0));
        input.advance(ActionSet::jump());
        assert_eq!(compute_intent(&player(), &input).jump, None);
    }

    #[test]
    fn test_enemy_and_item_intent() {
        let input = InputState::default();
        let enemy = EntityKind::Enemy(EnemyState::new(60.0).facing_left());
        assert_eq!(
            compute_intent(&enemy, &input),
            Intent {
                vx: -60.0,
                jump: None
            }
        );
        let coin = EntityKind::Item(ItemKind::Coin);
        assert_eq!(compute_intent(&coin, &input), Intent::default());
    }
}
