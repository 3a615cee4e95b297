use std::path::Path;
use std::time::Duration;

use vox_core::drive::{DriveFrame, DriveSimulation};
use vox_core::Stop;

use crate::workspace::Workspace;

/// `vox drive`
pub fn execute(
    home: Option<&Path>,
    step_km: f64,
    delay_ms: u64,
    arrivals_only: bool,
) -> anyhow::Result<()> {
    let ws = Workspace::open(home)?;
    let stops = ws.store.stops();
    if stops.len() < 2 {
        println!("Need at least two stops to drive.");
        return Ok(());
    }

    let sim = DriveSimulation::new(stops, step_km);
    println!(
        "Driving {} stops, {:.1} km in {:.2} km steps",
        stops.len(),
        sim.total_km(),
        sim.step_km()
    );
    let delay = Duration::from_millis(delay_ms);
    for frame in sim {
        if let Some(line) = describe(&frame, stops, arrivals_only) {
            println!("{line}");
        }
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
    Ok(())
}

fn describe(frame: &DriveFrame, stops: &[Stop], arrivals_only: bool) -> Option<String> {
    match frame.arrived {
        Some(i) => {
            let name = stops.get(i).map(|s| s.name.as_str()).unwrap_or("?");
            Some(format!("{:>8.2} km  arrived at {name}", frame.traveled_km))
        }
        None if arrivals_only => None,
        None => Some(format!(
            "{:>8.2} km  {}",
            frame.traveled_km, frame.position
        )),
    }
}
