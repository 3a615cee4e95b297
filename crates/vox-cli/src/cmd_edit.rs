use std::path::Path;

use vox_core::{Coordinates, TripConstraints};

use crate::workspace::Workspace;

/// `vox constraints [--destination] [--duration] [--vibe]`
pub fn constraints(
    home: Option<&Path>,
    destination: Option<String>,
    duration: Option<String>,
    vibe: Option<String>,
) -> anyhow::Result<()> {
    let mut ws = Workspace::open(home)?;
    let update = TripConstraints {
        destination,
        duration,
        vibe,
    };
    if !update.is_empty() {
        ws.store.merge_trip_constraints(update);
    }
    let c = &ws.store.state().trip_constraints;
    println!("destination = {}", c.destination.as_deref().unwrap_or("(not set)"));
    println!("duration = {}", c.duration.as_deref().unwrap_or("(not set)"));
    println!("vibe = {}", c.vibe.as_deref().unwrap_or("(not set)"));
    Ok(())
}

/// `vox focus --lng --lat`
pub fn focus(home: Option<&Path>, lng: f64, lat: f64) -> anyhow::Result<()> {
    let at = Coordinates::new(lng, lat)?;
    let mut ws = Workspace::open(home)?;
    ws.store.set_focused_location(at);
    println!("Map centered on {at}");
    Ok(())
}

/// `vox theme [--toggle]`
pub fn theme(home: Option<&Path>, toggle: bool) -> anyhow::Result<()> {
    let mut ws = Workspace::open(home)?;
    if toggle {
        ws.store.toggle_theme();
    }
    println!("{}", ws.store.theme().as_str());
    Ok(())
}

/// `vox reset`
pub fn reset(home: Option<&Path>) -> anyhow::Result<()> {
    let mut ws = Workspace::open(home)?;
    ws.store.reset_trip();
    println!("Trip cleared");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vox_core::Theme;

    #[test]
    fn constraints_merge_across_invocations() {
        let tmp = tempfile::tempdir().unwrap();
        constraints(Some(tmp.path()), Some("Oaxaca".into()), None, None).unwrap();
        constraints(Some(tmp.path()), None, Some("5 days".into()), None).unwrap();
        let ws = Workspace::open(Some(tmp.path())).unwrap();
        let c = &ws.store.state().trip_constraints;
        assert_eq!(c.destination.as_deref(), Some("Oaxaca"));
        assert_eq!(c.duration.as_deref(), Some("5 days"));
    }

    #[test]
    fn reset_keeps_theme() {
        let tmp = tempfile::tempdir().unwrap();
        theme(Some(tmp.path()), true).unwrap();
        constraints(Some(tmp.path()), Some("Oslo".into()), None, None).unwrap();
        reset(Some(tmp.path())).unwrap();
        let ws = Workspace::open(Some(tmp.path())).unwrap();
        assert_eq!(ws.store.theme(), Theme::Light);
        assert!(ws.store.state().trip_constraints.is_empty());
    }

    #[test]
    fn focus_rejects_non_finite() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(focus(Some(tmp.path()), f64::INFINITY, 0.0).is_err());
    }
}
