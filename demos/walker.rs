//! Walker
//!
//! This example attaches a machine to a plain struct and walks it around.
//!
//! Key concepts:
//! - Guards and effects registered by name
//! - Host fields reachable through the machine
//! - Failures as results versus errors
//! - Verbose logging through `tracing`
//!
//! Run with: cargo run --example walker

use soteria::builder::{guarded_transition, transition, MachineBuilder};
use soteria::core::{State, TransitionDict};
use soteria::engine::TransitionOptions;
use soteria::{state_enum, stateful};

state_enum! {
    enum Gait {
        Stopped as "stopped",
        Walking as "walking",
    }
}

#[derive(Clone, Debug)]
struct Walker {
    state: Gait,
    energy: u32,
    speed: u32,
}

stateful!(Walker, state: Gait);

// Guards only read the host
fn has_energy(walker: &Walker) -> bool {
    walker.energy > 0
}

fn speed_up(walker: &mut Walker, _: &()) {
    walker.speed = 1;
    walker.energy -= 1;
}

fn slow_down(walker: &mut Walker, _: &()) {
    walker.speed = 0;
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Walker ===\n");

    let mut walk = guarded_transition(Gait::Stopped, Gait::Walking, "hasEnergy");
    walk.effects.push("speedUp".into());
    let mut stop = transition(Gait::Walking, Gait::Stopped);
    stop.effects.push("slowDown".into());

    let mut walker = MachineBuilder::new()
        .context(Walker {
            state: Gait::Stopped,
            energy: 1,
            speed: 0,
        })
        .transitions(TransitionDict::new().on("walk", walk).on("stop", stop))
        .guard("hasEnergy", has_energy)
        .effect("speedUp", speed_up)
        .effect("slowDown", slow_down)
        .verbosity(true)
        .throw_exceptions(false)
        .build()
        .expect("walker machine should build");

    println!("Triggers: {:?}", walker.triggers());
    println!("Start: {} (energy {})\n", walker.state().name(), walker.energy);

    for trigger in ["walk", "stop", "walk", "fly"] {
        let result = walker
            .trigger(trigger)
            .expect("soft failures come back as results");
        match result.failure {
            None => println!(
                "{trigger}: now {} (speed {}, energy {})",
                walker.state().name(),
                walker.speed,
                walker.energy
            ),
            Some(failure) => println!("{trigger}: failed with {}", failure.kind),
        }
    }

    println!();
    let raised = walker.trigger_with_options("walk", TransitionOptions::new().throw_exceptions(true));
    if let Err(err) = raised {
        println!("Raised: {err}");
    }

    let path: Vec<&str> = walker.history().get_path().into_iter().map(|s| s.name()).collect();
    println!("Path: {}", path.join(" -> "));
}
