use std::path::Path;

use crate::workspace::Workspace;

pub fn execute(home: Option<&Path>) -> anyhow::Result<()> {
    let ws = Workspace::open(home)?;
    let state = ws.store.state();

    println!("Store: {}", ws.paths.root.display());
    println!(
        "Trip: {} stops over {} days",
        state.stops.len(),
        state.itinerary.len()
    );

    let c = &state.trip_constraints;
    if c.is_empty() {
        println!("Constraints: (none)");
    } else {
        println!(
            "Constraints: destination={} duration={} vibe={}",
            c.destination.as_deref().unwrap_or("-"),
            c.duration.as_deref().unwrap_or("-"),
            c.vibe.as_deref().unwrap_or("-")
        );
    }
    println!("Theme: {}", state.theme.as_str());

    let features = ws.settings.features();
    let on_off = |b: bool| if b { "enabled" } else { "disabled (no credentials)" };
    println!("Place search: {}", on_off(features.geocoding));
    println!("Voice agent: {}", on_off(features.voice_agent));
    let trips = if ws.gateway().is_available() {
        "available"
    } else {
        "unavailable"
    };
    println!("Saved trips: {trips}");
    Ok(())
}
