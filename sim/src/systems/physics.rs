//! Physics step - gravity, integration and tile collision.
//!
//! Collision is resolved one axis at a time. Each axis sweeps every tile
//! column (or row) the leading edge enters during the tick and samples every
//! cell the body spans on the other axis, so wide or straddling bodies and
//! fast movers cannot slip past a single solid tile.

use crate::components::*;
use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::events::{SimEvent, TickEvents};
use crate::store::EntityIndex;
use crate::systems::DeltaTime;
use crate::tiles::{Tile, TileGrid};
use bevy_ecs::prelude::*;

/// Kinematic state carried between ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyState {
    pub position: Position,
    pub velocity: Velocity,
    pub contacts: Contacts,
}

/// Result of integrating one entity for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepOutcome {
    pub state: BodyState,
    pub displacement: Displacement,
    pub jumped: bool,
    pub landed: bool,
    /// QuestionBlock hit from below, if any.
    pub bumped: Option<(i32, i32)>,
}

enum VerticalContact {
    Floor,
    Ceiling { row: i32, bumped_column: Option<i32> },
}

/// Integrate one body for one tick of `dt` seconds.
///
/// The input state is left untouched on error.
pub fn step_body(
    id: EntityId,
    grid: &TileGrid,
    config: &SimConfig,
    dt: f32,
    body: &Body,
    intent: &Intent,
    state: BodyState,
) -> SimResult<StepOutcome> {
    if !state.position.is_finite()
        || !state.velocity.is_finite()
        || !intent.vx.is_finite()
        || !intent.jump.map_or(true, f32::is_finite)
    {
        return Err(SimError::NonFiniteState(id));
    }

    let was_grounded = state.contacts.grounded;
    let Position { x, y } = state.position;

    let mut vy = (state.velocity.vy + config.gravity * dt).min(config.max_fall_speed);
    let mut vx = intent.vx;

    let (x, hit_wall) = sweep_horizontal(grid, x, y, body, vx * dt);
    if hit_wall {
        vx = 0.0;
    }

    let dy = vy * dt;
    let (new_y, contact) = sweep_vertical(grid, x, y, body, dy);
    let mut contacts = Contacts {
        grounded: false,
        hit_wall,
        hit_ceiling: false,
    };
    let mut bumped = None;
    match contact {
        Some(VerticalContact::Floor) => {
            vy = 0.0;
            contacts.grounded = true;
        }
        Some(VerticalContact::Ceiling { row, bumped_column }) => {
            vy = 0.0;
            contacts.hit_ceiling = true;
            bumped = bumped_column.map(|column| (column, row));
        }
        None if dy == 0.0 => {
            contacts.grounded = resting_on_floor(grid, x, new_y, body);
        }
        None => {}
    }
    let landed = contacts.grounded && !was_grounded;

    let mut jumped = false;
    if let Some(impulse) = intent.jump {
        if was_grounded {
            vy = -impulse;
            contacts.grounded = false;
            jumped = true;
        }
    }

    let next = BodyState {
        position: Position::new(x, new_y),
        velocity: Velocity::new(vx, vy),
        contacts,
    };
    if !next.position.is_finite() || !next.velocity.is_finite() {
        return Err(SimError::NonFiniteState(id));
    }

    Ok(StepOutcome {
        state: next,
        displacement: Displacement {
            dx: x - state.position.x,
            dy: new_y - state.position.y,
        },
        jumped,
        landed,
        bumped,
    })
}

/// Solid columns block horizontal movement; columns outside the grid are walls.
fn column_blocked(grid: &TileGrid, column: i32, rows: (i32, i32)) -> bool {
    if !grid.contains_column(column) {
        return true;
    }
    (rows.0..=rows.1).any(|row| grid.is_solid(column, row))
}

/// Move `dx` horizontally, stopping at the first blocked column.
/// Returns the new x and whether a wall was hit.
fn sweep_horizontal(grid: &TileGrid, x: f32, y: f32, body: &Body, dx: f32) -> (f32, bool) {
    if dx == 0.0 {
        return (x, false);
    }
    let size = grid.tile_size();
    let rows = grid.cell_span(y, y + body.height);
    // Columns past the grid are all walls, so the scan never runs far beyond it.
    let limit = grid.width() as i32;

    if dx > 0.0 {
        let right = x + body.width;
        let first = (right / size).ceil() as i32;
        let last = (((right + dx) / size).ceil() as i32).saturating_sub(1).min(limit);
        for column in first..=last {
            if column_blocked(grid, column, rows) {
                return (column as f32 * size - body.width, true);
            }
        }
    } else {
        let first = ((x / size).floor() as i32).saturating_sub(1);
        let last = (((x + dx) / size).floor() as i32).max(-1);
        for column in (last..=first).rev() {
            if column_blocked(grid, column, rows) {
                return ((column + 1) as f32 * size, true);
            }
        }
    }
    (x + dx, false)
}

/// Move `dy` vertically at the already-resolved `x`.
fn sweep_vertical(
    grid: &TileGrid,
    x: f32,
    y: f32,
    body: &Body,
    dy: f32,
) -> (f32, Option<VerticalContact>) {
    if dy == 0.0 {
        return (y, None);
    }
    let size = grid.tile_size();
    let (left, right) = grid.cell_span(x, x + body.width);
    let bottom_row = grid.height() as i32 - 1;

    if dy > 0.0 {
        let feet = y + body.height;
        let first = ((feet / size).ceil() as i32).max(0);
        let last = (((feet + dy) / size).ceil() as i32)
            .saturating_sub(1)
            .min(bottom_row);
        for row in first..=last {
            if (left..=right).any(|column| grid.is_solid(column, row)) {
                return (row as f32 * size - body.height, Some(VerticalContact::Floor));
            }
        }
    } else {
        let first = ((y / size).floor() as i32)
            .saturating_sub(1)
            .min(bottom_row);
        let last = (((y + dy) / size).floor() as i32).max(0);
        for row in (last..=first).rev() {
            if (left..=right).any(|column| grid.blocks_from_below(column, row)) {
                let bumped_column = (left..=right)
                    .find(|column| matches!(grid.get(*column, row), Ok(Tile::QuestionBlock)));
                return (
                    (row + 1) as f32 * size,
                    Some(VerticalContact::Ceiling { row, bumped_column }),
                );
            }
        }
    }
    (y + dy, None)
}

/// Feet lie exactly on the top edge of a solid tile.
fn resting_on_floor(grid: &TileGrid, x: f32, y: f32, body: &Body) -> bool {
    let row = (y + body.height) / grid.tile_size();
    if row.fract() != 0.0 {
        return false;
    }
    let (left, right) = grid.cell_span(x, x + body.width);
    (left..=right).any(|column| grid.is_solid(column, row as i32))
}

/// Integrates every movable entity in insertion order.
///
/// A failure for one entity is logged and leaves that entity unchanged; the
/// remaining entities still run.
pub fn physics_system(
    dt: Res<DeltaTime>,
    config: Res<SimConfig>,
    grid: Res<TileGrid>,
    index: Res<EntityIndex>,
    mut events: ResMut<TickEvents>,
    mut query: Query<
        (
            &mut Position,
            &mut Velocity,
            &mut Contacts,
            &mut Displacement,
            &Body,
            &Intent,
        ),
        With<Movable>,
    >,
) {
    for (id, entity) in index.ordered() {
        let Ok((mut position, mut velocity, mut contacts, mut displacement, body, intent)) =
            query.get_mut(entity)
        else {
            continue;
        };

        let state = BodyState {
            position: *position,
            velocity: *velocity,
            contacts: *contacts,
        };
        let outcome = match step_body(id, &grid, &config, dt.0, body, intent, state) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::warn!("physics skipped entity {id}: {err}");
                continue;
            }
        };

        *position = outcome.state.position;
        *velocity = outcome.state.velocity;
        *contacts = outcome.state.contacts;
        *displacement = outcome.displacement;

        if outcome.jumped {
            events.push(SimEvent::Jumped { id });
        }
        if outcome.landed {
            events.push(SimEvent::Landed { id });
        }
        if let Some((x, y)) = outcome.bumped {
            events.push(SimEvent::BlockBumped { x, y, by: id });
        }
    }
}
