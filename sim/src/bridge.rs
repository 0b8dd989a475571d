//! Flat buffer export for host renderers.
//!
//! Converts a [`Snapshot`] into a contiguous `Vec<f32>` with a fixed stride,
//! for hosts that want to read entity state without parsing JSON.
//!
//! # Buffer Layout (Version 1)
//!
//! ```text
//! [0] entity_count (as f32)
//! [1] tick         (as f32, exact up to 2^24)
//! For each entity i (offset = HEADER_SIZE + i * ENTITY_STRIDE):
//!   [+0] id       - Entity id (u32 as f32)
//!   [+1] kind     - See KIND_* constants
//!   [+2] x        - Left edge (world units)
//!   [+3] y        - Top edge (world units, y down)
//!   [+4] vx       - Horizontal velocity (units/sec)
//!   [+5] vy       - Vertical velocity (units/sec)
//!   [+6] width
//!   [+7] height
//!   [+8] facing   - +1.0 right, -1.0 left
//!   [+9] grounded - 1.0 when standing on ground
//! ```
//!
//! Entities keep the snapshot's order (insertion order).

use crate::snapshot::Snapshot;

/// Number of f32 values per entity. Part of the buffer contract.
pub const ENTITY_STRIDE: usize = 10;

/// Number of f32 values in the buffer header.
pub const HEADER_SIZE: usize = 2;

/// Kind id: player.
pub const KIND_PLAYER: f32 = 0.0;
/// Kind id: enemy.
pub const KIND_ENEMY: f32 = 1.0;
/// Kind id: coin.
pub const KIND_COIN: f32 = 2.0;

/// Numeric id for a snapshot kind label. Unknown labels map to -1.0.
#[inline]
pub fn kind_to_id(kind: &str) -> f32 {
    match kind {
        "Player" => KIND_PLAYER,
        "Enemy" => KIND_ENEMY,
        "Coin" => KIND_COIN,
        _ => -1.0,
    }
}

/// Convert a snapshot to the flat buffer layout.
pub fn snapshot_to_flatbuffer(snapshot: &Snapshot) -> Vec<f32> {
    let mut buffer = Vec::with_capacity(calculate_buffer_size(snapshot.entities.len()));
    buffer.push(snapshot.entities.len() as f32);
    buffer.push(snapshot.tick as f32);

    for entity in &snapshot.entities {
        buffer.extend_from_slice(&[
            entity.id as f32,
            kind_to_id(&entity.kind),
            entity.x,
            entity.y,
            entity.vx,
            entity.vy,
            entity.width,
            entity.height,
            entity.facing,
            if entity.grounded { 1.0 } else { 0.0 },
        ]);
    }

    buffer
}

/// Total buffer length for `entity_count` entities.
#[inline]
pub const fn calculate_buffer_size(entity_count: usize) -> usize {
    HEADER_SIZE + entity_count * ENTITY_STRIDE
}

/// Read the entity count from a buffer, checking the length matches.
pub fn parse_entity_count(buffer: &[f32]) -> Option<usize> {
    let count = *buffer.first()?;
    if count < 0.0 || count.fract() != 0.0 {
        return None;
    }
    let count = count as usize;
    (buffer.len() == calculate_buffer_size(count)).then_some(count)
}

/// Offset of entity `index` in the buffer.
#[inline]
pub const fn entity_offset(index: usize) -> usize {
    HEADER_SIZE + index * ENTITY_STRIDE
}
