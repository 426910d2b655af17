//! Hero Patrol
//!
//! This example shows ordered fallback between candidates of one trigger.
//!
//! Key concepts:
//! - A JSON transition dictionary
//! - Candidates tried in order, first passing one wins
//! - Attempt trails and available-transition reports
//! - Exporting a result as JSON
//!
//! Run with: cargo run --example hero_patrol

use serde::Serialize;
use soteria::builder::MachineBuilder;
use soteria::core::State;
use soteria::{state_enum, stateful};

state_enum! {
    enum Mode {
        Idle as "idle",
        Sleeping as "sleeping",
    }
}

#[derive(Clone, Debug, Serialize)]
struct Hero {
    state: Mode,
    energy: u32,
}

stateful!(Hero, state: Mode);

// A tired hero falls asleep instead of working
const HERO_DICT: &str = r#"{
    "patrol": [
        { "origins": "idle", "destination": "idle", "conditions": "hasEnergy", "effects": "work" },
        { "origins": "idle", "destination": "sleeping" }
    ],
    "sleep": { "origins": "idle", "destination": "sleeping" },
    "wake": { "origins": "sleeping", "destination": "idle", "effects": "rest" }
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    println!("=== Hero Patrol ===\n");

    let mut hero = MachineBuilder::new()
        .context(Hero {
            state: Mode::Idle,
            energy: 1,
        })
        .transitions_json(HERO_DICT)?
        .guard("hasEnergy", |h: &Hero| h.energy > 0)
        .effect("work", |h: &mut Hero, _: &()| h.energy -= 1)
        .effect("rest", |h: &mut Hero, _: &()| h.energy = 2)
        .build()?;

    for round in 1..=2 {
        let result = hero.trigger("patrol")?;
        println!("Patrol #{round}: {} attempt(s)", result.attempts.len());
        for attempt in &result.attempts {
            let outcome = match &attempt.failure {
                None => "taken".to_string(),
                Some(failure) => failure.kind.to_string(),
            };
            println!(
                "  -> {} : {outcome}",
                attempt.transition.destination.name()
            );
        }
        println!("  state {}, energy {}", hero.state().name(), hero.energy);
    }

    println!("\nFrom {}:", hero.state().name());
    for available in hero.available_transitions()? {
        println!(
            "  {} -> {} (satisfied: {})",
            available.trigger,
            available.destination.name(),
            available.satisfied
        );
    }

    let woken = hero.trigger("wake")?;
    println!("\nWake result:\n{}", woken.to_json()?);

    Ok(())
}
