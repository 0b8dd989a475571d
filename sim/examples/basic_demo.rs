//! Basic demonstration of the platformer simulation.
//!
//! Run with: RUST_LOG=debug cargo run --example basic_demo

use std::time::Duration;
use tile_sim::{ActionSet, SimEvent, Simulation};

fn main() {
    env_logger::init();
    println!("=== Tile Platformer - Simulation Demo ===\n");

    let mut sim = match Simulation::demo() {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("failed to build demo level: {err}");
            return;
        }
    };

    println!("Initial state:");
    print_snapshot(&mut sim);

    // Walk right for two seconds, hopping every half second.
    println!("\n--- Walking right ---\n");
    for frame in 0..120 {
        let hop = frame % 30 == 0;
        sim.set_input(ActionSet {
            jump: hop,
            ..ActionSet::right()
        });
        sim.advance(Duration::from_micros(16_667));

        if (frame + 1) % 30 == 0 {
            println!("--- Tick {} (t={:.2}s) ---", sim.current_tick(), sim.current_time());
            print_snapshot(&mut sim);
        }
    }

    // A long stall: the clock caps catch-up work.
    println!("\n--- Simulating a 250 ms stall ---\n");
    let ran = sim.advance(Duration::from_millis(250));
    println!(
        "ran {ran} ticks, {} dropped so far",
        sim.clock().dropped_ticks()
    );

    println!("\n=== Final State (JSON) ===\n");
    match sim.snapshot().to_json_pretty() {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("failed to serialize snapshot: {err}"),
    }
}

fn print_snapshot(sim: &mut Simulation) {
    let snapshot = sim.snapshot();

    for entity in &snapshot.entities {
        println!(
            "    {} #{}: pos=({:.1}, {:.1}) vel=({:.1}, {:.1}) [{}]",
            entity.kind, entity.id, entity.x, entity.y, entity.vx, entity.vy, entity.state
        );
    }
    println!("  Coins: {}", snapshot.coins);

    for event in &snapshot.events {
        match event {
            SimEvent::Jumped { .. } | SimEvent::Landed { .. } => {}
            other => println!("  Event: {other:?}"),
        }
    }
}
