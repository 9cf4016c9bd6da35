//! Vehicle Lifecycle
//!
//! This example drives a vehicle through its machine: roles, a dependent
//! predicate, listeners, entity hooks and a store that can refuse a save.
//!
//! Key concepts:
//! - Guarded transitions (`ignite` needs a driver holding the key)
//! - Listeners before and after a transition, and on entering a state
//! - A failed save leaving the vehicle where it was
//!
//! Run with: RUST_LOG=debug cargo run --example vehicle_lifecycle

use machinist::accessors;
use machinist::builder::MachineBuilder;
use machinist::core::{EntityState, StatefulEntity, TransitionEvent, TransitionHistory};
use machinist::guard::{Predicate, RolePredicates, TransitionRule};
use machinist::listeners::{LifecycleHooks, Phase, Scope, StateHook};
use machinist::machine::{Machine, TransitionOptions};
use machinist::store::MemoryStore;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, Default)]
struct Vehicle {
    title: String,
    key_holder: Option<String>,
    odometer: u32,
    state: EntityState,
}

impl Vehicle {
    fn has_key(&self, role: &str) -> bool {
        self.key_holder.as_deref() == Some(role)
    }

    fn on_state_change(&mut self, state: &str) {
        if state == "first_gear" {
            self.odometer += 1;
        }
    }
}

impl StatefulEntity for Vehicle {
    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }
}

impl LifecycleHooks for Vehicle {
    fn state_change_hook() -> Option<StateHook<Self>> {
        Some(Vehicle::on_state_change)
    }
}

impl RolePredicates for Vehicle {
    fn predicate(name: &str) -> Option<Predicate<Self>> {
        match name {
            "has_key" => Some(Vehicle::has_key),
            _ => None,
        }
    }
}

accessors! {
    impl Vehicle {
        is_parked => is("parked"),
        can_ignite => can("ignite"),
        ignite => transition("ignite"),
        shift_up => transition("shift_up"),
        turn_off => transition("turn_off"),
    }
}

fn build_machine() -> Machine<Vehicle> {
    MachineBuilder::new("vehicle")
        .initial("parked")
        .transition("ignite", [("parked", "idling"), ("stalled", "stalled")])
        .transition(
            "shift_up",
            [("idling", "first_gear"), ("first_gear", "second_gear")],
        )
        .transition("crash", [("first_gear", "stalled"), ("second_gear", "stalled")])
        .transition("repair", [("stalled", "parked")])
        .transition("turn_off", [("all", "parked")])
        .rule("ignite", TransitionRule::new(["driver"]).depends_on("has_key"))
        .rule("repair", TransitionRule::new(["mechanic"]).depends_on("has_tools"))
        .on(
            Scope::AllTransitions,
            Phase::After,
            |event: &TransitionEvent| {
                println!(
                    "  [after {}] now {} (was {})",
                    event.transition,
                    event.current_state,
                    event.previous_state.as_deref().unwrap_or("-")
                );
            },
            true,
        )
        .when("stalled", |_: &str| println!("  [stalled] call a mechanic"))
        .predicate("has_tools", |role: &str| role == "mechanic")
        .build()
        .expect("vehicle machine definition is valid")
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    println!("=== Vehicle Lifecycle ===\n");

    let machine = build_machine();
    let mut store = MemoryStore::labeled("vehicle").with_validator(|vehicle: &Vehicle| {
        if vehicle.title.is_empty() {
            Err("a vehicle needs a title".to_string())
        } else {
            Ok(())
        }
    });

    let mut vehicle = Vehicle {
        title: "Toyota Yaris".to_string(),
        key_holder: Some("driver".to_string()),
        ..Vehicle::default()
    };
    machine
        .create(&mut vehicle, &mut store)
        .expect("new vehicle saves");
    println!("Created '{}' in state {}", vehicle.title, vehicle.state.current);
    println!("Parked: {}\n", vehicle.is_parked(&machine));

    println!("Who may ignite?");
    for role in ["driver", "thief"] {
        println!("  {role}: {}", vehicle.can_ignite(&machine, Some(role)));
    }
    match vehicle.ignite(&machine, &mut store, None) {
        Ok(done) => println!("  without a role: {done}"),
        Err(err) => println!("  without a role: {err}"),
    }

    println!("\nDriving:");
    let mut history = TransitionHistory::new();
    for (transition, role) in [
        ("ignite", Some("driver")),
        ("shift_up", None),
        ("crash", None),
        ("repair", Some("mechanic")),
    ] {
        let options = match role {
            Some(role) => TransitionOptions::new().as_role(role),
            None => TransitionOptions::new(),
        };
        match machine.execute(&mut vehicle, &mut store, transition, &options) {
            Ok(Some(record)) => history = history.record(record),
            Ok(None) => println!("  {transition} refused"),
            Err(err) => println!("  {transition} failed: {err}"),
        }
    }
    println!("Path: {}", history.path().join(" -> "));
    println!("Odometer: {}", vehicle.odometer);

    println!("\nA refused save keeps the vehicle where it is:");
    let ignited = vehicle.ignite(&machine, &mut store, Some("driver"));
    let shifted = vehicle.shift_up(&machine, &mut store, None);
    println!("  ignite -> {ignited:?}, shift_up -> {shifted:?}");
    vehicle.title.clear();
    let before = vehicle.state.current.clone();
    let saved = vehicle.turn_off(&machine, &mut store, None);
    println!("  turn_off -> {saved:?}, still {before}: {}", vehicle.state.current == before);

    println!("\nSaves recorded: {}", store.saves());
    println!("\n=== Example Complete ===");
}
