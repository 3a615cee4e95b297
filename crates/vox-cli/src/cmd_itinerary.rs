use std::path::Path;

use anyhow::Context;
use vox_core::itinerary::narrative_or_default;
use vox_core::plan::{into_itinerary, plan_size, DayPlan};
use vox_core::ItineraryDay;

use crate::workspace::Workspace;

/// `vox itinerary show`
pub fn show(home: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let ws = Workspace::open(home)?;
    let days = ws.store.itinerary();
    if json {
        println!("{}", serde_json::to_string_pretty(days)?);
        return Ok(());
    }
    if days.is_empty() {
        println!("(empty itinerary)");
        return Ok(());
    }
    print!("{}", render_days(days));
    Ok(())
}

fn render_days(days: &[ItineraryDay]) -> String {
    let mut out = String::new();
    for day in days {
        out.push_str(&format!("Day {}: {}\n", day.day, narrative_or_default(day)));
        for stop in &day.stops {
            out.push_str(&format!("  - {}  ({})\n", stop.name, stop.coordinates));
            if let Some(notes) = stop.notes.as_deref().filter(|n| !n.is_empty()) {
                out.push_str(&format!("      {notes}\n"));
            }
        }
    }
    out
}

/// `vox itinerary set <file>`
pub fn set(home: Option<&Path>, file: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("reading plan {}", file.display()))?;
    let plans = parse_plan(file, &text)?;
    let (days, stops) = plan_size(&plans);
    let itinerary = into_itinerary(plans)?;

    let mut ws = Workspace::open(home)?;
    ws.store.set_itinerary(itinerary);
    println!(
        "Itinerary updated: {} days, {} stops (plan had {days} days, {stops} stops)",
        ws.store.itinerary().len(),
        ws.store.stops().len()
    );
    Ok(())
}

/// JSON for `.json` files, YAML otherwise.
fn parse_plan(file: &Path, text: &str) -> anyhow::Result<Vec<DayPlan>> {
    let is_json = file
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let plans = if is_json {
        serde_json::from_str(text).with_context(|| format!("parsing {}", file.display()))?
    } else {
        serde_yaml::from_str(text).with_context(|| format!("parsing {}", file.display()))?
    };
    Ok(plans)
}
