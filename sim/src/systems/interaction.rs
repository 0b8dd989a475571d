//! Player-vs-entity interactions and falling out of the level.
//!
//! Both systems only queue removals; the store applies them after the tick.

use crate::components::*;
use crate::config::SimConfig;
use crate::events::{SimEvent, TickEvents};
use crate::level::SpawnPoint;
use crate::store::{EntityIndex, RemovalQueue};
use crate::tiles::TileGrid;
use bevy_ecs::prelude::*;

/// Coin pickup, enemy stomp and player hurt.
pub fn interaction_system(
    config: Res<SimConfig>,
    index: Res<EntityIndex>,
    mut removals: ResMut<RemovalQueue>,
    mut events: ResMut<TickEvents>,
    mut query: Query<
        (
            &mut EntityKind,
            &Position,
            &Body,
            &Displacement,
            &mut Velocity,
            &mut Contacts,
        ),
        With<Collidable>,
    >,
) {
    let player = index.ordered().find_map(|(id, entity)| {
        let (kind, position, body, displacement, _, _) = query.get(entity).ok()?;
        kind.is_player()
            .then(|| (id, entity, Aabb::new(position, body), displacement.dy))
    });
    let Some((player_id, player_entity, player_box, player_dy)) = player else {
        return;
    };
    let falling = player_dy > 0.0;
    let feet_before = player_box.max_y - player_dy;

    let mut coins = 0;
    let mut stomped = false;
    for (id, entity) in index.ordered() {
        if id == player_id || removals.contains(id) {
            continue;
        }
        let Ok((kind, position, body, displacement, _, _)) = query.get(entity) else {
            continue;
        };
        let other = Aabb::new(position, body);
        let top_before = other.min_y - displacement.dy;
        if !player_box.overlaps(&other) {
            continue;
        }

        match kind {
            EntityKind::Item(item) => {
                removals.push(id);
                coins += 1;
                events.push(SimEvent::ItemCollected {
                    player: player_id,
                    item: id,
                    kind: *item,
                });
            }
            EntityKind::Enemy(_)
                if falling && is_stomp(&player_box, feet_before, &other, top_before) =>
            {
                removals.push(id);
                stomped = true;
                events.push(SimEvent::EnemyStomped {
                    player: player_id,
                    enemy: id,
                });
            }
            EntityKind::Enemy(_) => {
                events.push(SimEvent::PlayerHurt {
                    player: player_id,
                    enemy: id,
                });
            }
            EntityKind::Player(_) => {}
        }
    }

    if coins == 0 && !stomped {
        return;
    }
    if let Ok((mut kind, _, _, _, mut velocity, mut contacts)) = query.get_mut(player_entity) {
        if let EntityKind::Player(state) = &mut *kind {
            state.coins += coins;
        }
        if stomped {
            velocity.vy = -config.stomp_bounce;
            contacts.grounded = false;
        }
    }
}

/// Tolerance for feet that started the tick resting on an enemy's top edge.
const STOMP_EPSILON: f32 = 1.0e-3;

/// A falling player stomps when its feet came from above the enemy's top
/// this tick, or are still in the enemy's upper half.
fn is_stomp(player: &Aabb, feet_before: f32, enemy: &Aabb, top_before: f32) -> bool {
    feet_before <= top_before + STOMP_EPSILON || player.max_y <= enemy.center_y()
}

/// Movable entities whose top edge is below the grid leave the level.
/// The player is put back at the spawn point instead.
pub fn fall_out_system(
    grid: Res<TileGrid>,
    spawn: Res<SpawnPoint>,
    index: Res<EntityIndex>,
    mut removals: ResMut<RemovalQueue>,
    mut events: ResMut<TickEvents>,
    mut query: Query<
        (&EntityKind, &mut Position, &mut Velocity, &mut Contacts),
        With<Movable>,
    >,
) {
    let floor = grid.world_height();
    for (id, entity) in index.ordered() {
        let Ok((kind, mut position, mut velocity, mut contacts)) = query.get_mut(entity) else {
            continue;
        };
        if position.y < floor {
            continue;
        }
        if kind.is_player() {
            *position = spawn.0;
            *velocity = Velocity::default();
            *contacts = Contacts::default();
            events.push(SimEvent::PlayerRespawned { id });
        } else if !removals.contains(id) {
            removals.push(id);
            events.push(SimEvent::FellOut { id });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aabb(y: f32) -> Aabb {
        Aabb::new(&Position::new(0.0, y), &Body::default())
    }

    #[test]
    fn test_deep_entry_from_above_is_stomp() {
        let enemy = aabb(464.0);
        // Feet moved 16 units this tick and ended 12 units into the enemy.
        let player = aabb(460.0);
        assert!(is_stomp(&player, player.max_y - 16.0, &enemy, enemy.min_y));
    }

    #[test]
    fn test_side_entry_low_is_not_stomp() {
        let enemy = aabb(464.0);
        let player = aabb(460.0);
        // Feet were already below the enemy's top before the tick.
        assert!(!is_stomp(&player, player.max_y - 1.0, &enemy, enemy.min_y));
    }

    #[test]
    fn test_feet_resting_on_top_edge_counts() {
        let enemy = aabb(464.0);
        let player = aabb(460.0);
        assert!(is_stomp(&player, 464.0, &enemy, enemy.min_y));
    }
}
