//! End-to-end scenarios driven through the public `Simulation` API.

use std::time::Duration;
use tile_sim::*;

/// Binary-exact timing: every per-tick delta is a power-of-two fraction.
fn exact_config() -> SimConfig {
    SimConfig {
        fixed_timestep: 1.0 / 64.0,
        gravity: 1024.0,
        max_fall_speed: 1024.0,
        enemy_speed: 0.0,
        ..Default::default()
    }
}

fn simulation(rows: &[&str], spawn: Position, config: SimConfig) -> Simulation {
    let grid = TileGrid::from_rows(rows).unwrap();
    let level = Level::with_config(grid, spawn, &config).unwrap();
    Simulation::new(config, level).unwrap()
}

fn count(events: &[SimEvent], pred: impl Fn(&SimEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

#[test]
fn player_falls_and_rests_on_ground() {
    let mut grid = TileGrid::new(10, 10).unwrap();
    grid.set(0, 9, Tile::Ground).unwrap();
    let config = SimConfig::default();
    let level = Level::with_config(grid, Position::new(0.0, 0.0), &config).unwrap();
    let mut sim = Simulation::new(config, level).unwrap();

    for _ in 0..120 {
        sim.tick();
    }
    let player = sim.player().unwrap();
    assert!(player.contacts.grounded);
    assert_eq!(player.position.y, 128.0);
    assert_eq!(player.position.y + player.body.height, 144.0);

    sim.tick();
    let rested = sim.player().unwrap();
    assert_eq!(rested.position, player.position);
    assert_eq!(rested.velocity.vy, 0.0);

    let snapshot = sim.snapshot();
    assert_eq!(count(&snapshot.events, |e| matches!(e, SimEvent::Landed { .. })), 1);
    assert_eq!(snapshot.entities[0].state, "Grounded");
}

#[test]
fn falling_player_stomps_enemy() {
    let mut sim = simulation(
        &["........", "........", "........", "########"],
        Position::new(48.0, 0.0),
        exact_config(),
    );
    let enemy = sim.spawn_enemy(48.0, 32.0).unwrap();

    let mut stomped_at = None;
    for t in 1..=20 {
        sim.tick();
        if sim.entity(enemy).is_err() {
            stomped_at = Some(t);
            break;
        }
    }
    // y after n ticks is n(n+1)/8; the boxes first overlap at n = 11.
    assert_eq!(stomped_at, Some(11));

    let player = sim.player().unwrap();
    assert_eq!(player.velocity.vy, -300.0);
    assert!(!player.contacts.grounded);

    let events = sim.snapshot().events;
    let player_id = sim.level().player();
    assert!(events.contains(&SimEvent::EnemyStomped {
        player: player_id,
        enemy,
    }));
    assert_eq!(count(&events, |e| matches!(e, SimEvent::PlayerHurt { .. })), 0);
}

#[test]
fn stomp_does_not_depend_on_drop_height() {
    for start in (0..16).map(|i| i as f32 * 3.0) {
        let config = SimConfig {
            enemy_speed: 0.0,
            ..Default::default()
        };
        let mut grid = TileGrid::new(4, 31).unwrap();
        grid.fill(0, 30, 4, 1, Tile::Ground).unwrap();
        let level = Level::with_config(grid, Position::new(16.0, start), &config).unwrap();
        let mut sim = Simulation::new(config, level).unwrap();
        let enemy = sim.spawn_enemy(16.0, 464.0).unwrap();

        for _ in 0..120 {
            sim.tick();
        }

        let events = sim.snapshot().events;
        assert!(
            events.contains(&SimEvent::EnemyStomped {
                player: sim.level().player(),
                enemy,
            }),
            "dropped from y = {start}"
        );
        assert_eq!(
            count(&events, |e| matches!(e, SimEvent::PlayerHurt { .. })),
            0,
            "dropped from y = {start}"
        );
    }
}

#[test]
fn walking_into_enemy_hurts_player() {
    let mut sim = simulation(
        &["........", "........", "........", "########"],
        Position::new(0.0, 32.0),
        exact_config(),
    );
    let enemy = sim.spawn_enemy(40.0, 32.0).unwrap();
    sim.set_input(ActionSet::right());

    for _ in 0..12 {
        sim.tick();
    }
    assert_eq!(
        count(sim.pending_events(), |e| matches!(e, SimEvent::PlayerHurt { .. })),
        0
    );

    // 13 ticks at 1.875 units per tick puts the right edge past x = 40.
    sim.tick();
    let events = sim.snapshot().events;
    assert!(events.contains(&SimEvent::PlayerHurt {
        player: sim.level().player(),
        enemy,
    }));
    assert!(sim.entity(enemy).is_ok());
}

#[test]
fn player_respawns_and_enemy_falls_out() {
    let mut sim = simulation(
        &["....", "....", "....", "...."],
        Position::new(0.0, 0.0),
        exact_config(),
    );
    let enemy = sim.spawn_enemy(32.0, 0.0).unwrap();

    for _ in 0..23 {
        sim.tick();
    }

    let events = sim.snapshot().events;
    let player = sim.level().player();
    assert!(events.contains(&SimEvent::PlayerRespawned { id: player }));
    assert!(events.contains(&SimEvent::FellOut { id: enemy }));

    let view = sim.player().unwrap();
    assert_eq!(view.position, Position::new(0.0, 0.0));
    assert_eq!(view.velocity, Velocity::default());
    assert_eq!(sim.level().store().len(), 1);
}

#[test]
fn question_block_bumped_from_below() {
    let mut sim = simulation(
        &["....", ".?..", "....", "####"],
        Position::new(16.0, 32.0),
        SimConfig {
            jump_impulse: 512.0,
            ..exact_config()
        },
    );
    sim.tick();
    sim.set_input(ActionSet::jump());
    for _ in 0..20 {
        sim.tick();
    }

    let events = sim.snapshot().events;
    assert!(events.contains(&SimEvent::BlockBumped {
        x: 1,
        y: 1,
        by: sim.level().player(),
    }));
    assert!(sim.player().unwrap().position.y >= 32.0);
}

#[test]
fn identical_inputs_give_identical_snapshots() {
    fn run() -> String {
        let mut sim = Simulation::demo().unwrap();
        let script = [
            ActionSet::right(),
            ActionSet::right(),
            ActionSet {
                move_right: true,
                jump: true,
                ..ActionSet::NONE
            },
            ActionSet::NONE,
            ActionSet::left(),
        ];
        for (i, frame) in (0..300).zip(script.iter().cycle()) {
            sim.set_input(*frame);
            sim.advance(Duration::from_millis(10 + (i % 7) as u64 * 3));
        }
        sim.snapshot().to_json().unwrap()
    }

    assert_eq!(run(), run());
}

#[test]
fn config_loaded_from_json_drives_simulation() {
    let config =
        SimConfig::from_json(r#"{ "player_speed": 64.0, "fixed_timestep": 0.015625 }"#).unwrap();
    assert_eq!(config.gravity, SimConfig::default().gravity);

    let mut sim = simulation(&["....", "....", "####"], Position::new(0.0, 16.0), config);
    sim.set_input(ActionSet::right());
    for _ in 0..8 {
        sim.tick();
    }
    assert_eq!(sim.player().unwrap().position.x, 8.0);
}

#[test]
fn invalid_json_config_is_rejected() {
    assert!(matches!(
        SimConfig::from_json("{ not json"),
        Err(SimError::Config(_))
    ));
    assert!(matches!(
        SimConfig::from_json(r#"{ "max_ticks_per_frame": 0 }"#),
        Err(SimError::InvalidConfiguration(_))
    ));
}
