//! Vehicle Graphs
//!
//! This example loads a vehicle machine from YAML and renders it as
//! Graphviz: the whole table, then one view per role combination.
//!
//! Key concepts:
//! - Machines described as data
//! - Role views that only draw what the roles may do
//! - Batch rendering with one file name per view
//!
//! Run with: cargo run --example vehicle_graph [output-dir]
//!
//! With an output directory the views are written there as `.dot` files,
//! ready for `dot -Tpng`.

use std::path::PathBuf;

use machinist::builder::MachineConfig;
use machinist::core::EntityState;
use machinist::dot::batch;
use tracing_subscriber::EnvFilter;

const VEHICLE: &str = r#"
name: vehicle
initial_state: parked
transitions:
  ignite: { parked: idling, stalled: stalled }
  park: { idling: parked, first_gear: parked }
  shift_up: { idling: first_gear, first_gear: second_gear, second_gear: third_gear }
  shift_down: { first_gear: idling, second_gear: first_gear, third_gear: second_gear }
  crash: { first_gear: stalled, second_gear: stalled, third_gear: stalled }
  repair: { stalled: parked }
  turn_off: { all: parked }
  hardwire: { parked: idling, stalled: stalled }
rules:
  hardwire: { role: [thief] }
  ignite: { role: [driver], depends: has_key }
  park: { role: [driver, thief], depends: available_parking }
  repair: { role: [mechanic], depends: has_tools }
roles:
  driver: { color: blue }
  thief: { color: red }
  mechanic: { color: darkgreen }
graph:
  color: lightgrey
  active_color: green
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let config = MachineConfig::from_yaml(VEHICLE)?;
    let machine = config.build::<EntityState>()?;

    println!("=== Full table ===\n");
    println!("{}\n", machine.to_dot());

    let files = batch(&machine, &config.role_styles(), &config.graph, "vehicle.dot");

    match std::env::args().nth(1).map(PathBuf::from) {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            for file in &files {
                let path = dir.join(&file.file_name);
                std::fs::write(&path, &file.dot)?;
                println!("wrote {}", path.display());
            }
        }
        None => {
            for file in &files {
                println!("=== {} ===\n", file.file_name);
                println!("{}", file.dot);
            }
        }
    }

    Ok(())
}
