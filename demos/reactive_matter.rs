//! Reactive Matter
//!
//! This example drives phase changes from an observed temperature.
//!
//! Key concepts:
//! - Guards that read an external `Signal`
//! - Watching guards so changes queue triggers
//! - Subscriptions that follow the current state
//!
//! Run with: cargo run --example reactive_matter

use soteria::builder::{guarded_transition, MachineBuilder};
use soteria::core::{State, TransitionDict};
use soteria::reactive::{ReactiveMachine, Signal};
use soteria::{state_enum, stateful};

state_enum! {
    enum Phase {
        Solid as "solid",
        Liquid as "liquid",
        Gas as "gas",
    }
}

#[derive(Clone, Debug)]
struct Matter {
    state: Phase,
}

stateful!(Matter, state: Phase);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Reactive Matter ===\n");

    let temperature = Signal::new(-20.0_f64);

    let dict = TransitionDict::new()
        .on("melt", guarded_transition(Phase::Solid, Phase::Liquid, "aboveMelting"))
        .on("freeze", guarded_transition(Phase::Liquid, Phase::Solid, "belowMelting"))
        .on("evaporate", guarded_transition(Phase::Liquid, Phase::Gas, "aboveBoiling"))
        .on("condense", guarded_transition(Phase::Gas, Phase::Liquid, "belowBoiling"));

    let (t1, t2, t3, t4) = (
        temperature.clone(),
        temperature.clone(),
        temperature.clone(),
        temperature.clone(),
    );
    let machine = MachineBuilder::new()
        .context(Matter {
            state: Phase::Solid,
        })
        .transitions(dict)
        .guard("aboveMelting", move |_: &Matter| t1.get() > 0.0)
        .guard("belowMelting", move |_: &Matter| t2.get() <= 0.0)
        .guard("aboveBoiling", move |_: &Matter| t3.get() > 100.0)
        .guard("belowBoiling", move |_: &Matter| t4.get() <= 100.0)
        .build()?;

    let mut matter = ["aboveMelting", "belowMelting", "aboveBoiling", "belowBoiling"]
        .into_iter()
        .fold(ReactiveMachine::new(machine), |matter, guard| {
            matter.watch(guard, temperature.clone())
        });

    for reading in [-5.0, 25.0, 60.0, 120.0, 80.0, -10.0] {
        temperature.set(reading);
        let fired = matter.process();
        let triggers: Vec<&str> = fired.iter().map(|r| r.trigger.as_str()).collect();
        println!(
            "{reading:>6.1} C -> {:<7} fired {:?} ({} subscription(s))",
            matter.state().name(),
            triggers,
            matter.subscription_count()
        );
    }

    Ok(())
}
