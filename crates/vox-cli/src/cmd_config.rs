use clap::Subcommand;
use std::path::Path;

use vox_store::settings::KEYS;
use vox_store::{Settings, VoxPaths};

// ── CLI Schema ──

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Set a credential (an empty value clears it)
    Set {
        /// mapbox_token or agent_id
        key: String,
        value: String,
    },
    /// Print the effective value of a credential
    Get { key: String },
    /// List effective values (secrets are masked)
    List,
    /// Forget stored credentials; environment variables apply again
    Reset,
}

// ── Dispatch ──

pub fn run(cmd: ConfigCmd, home: Option<&Path>) -> anyhow::Result<()> {
    let paths = VoxPaths::resolve(home);
    paths.ensure_layout()?;
    match cmd {
        ConfigCmd::Set { key, value } => set(&paths, &key, &value),
        ConfigCmd::Get { key } => get(&paths, &key),
        ConfigCmd::List => list(&paths),
        ConfigCmd::Reset => reset(&paths),
    }
}

// ── Command Implementations ──

/// `vox config set <key> <value>`
fn set(paths: &VoxPaths, key: &str, value: &str) -> anyhow::Result<()> {
    let mut stored = Settings::load_stored(&paths.settings_json)?;
    stored.set(key, value)?;
    stored.save(&paths.settings_json)?;
    match stored.get(key)? {
        Some(v) => println!("{key} = {}", mask(key, v)),
        None => println!("{key} cleared"),
    }
    Ok(())
}

/// `vox config get <key>`
fn get(paths: &VoxPaths, key: &str) -> anyhow::Result<()> {
    let settings = Settings::load(&paths.settings_json)?;
    match settings.get(key)? {
        Some(v) => println!("{v}"),
        None => println!("(not set)"),
    }
    Ok(())
}

/// `vox config list`
fn list(paths: &VoxPaths) -> anyhow::Result<()> {
    let settings = Settings::load(&paths.settings_json)?;
    for key in KEYS {
        match settings.get(key)? {
            Some(v) => println!("{key} = {}", mask(key, v)),
            None => println!("{key} = (not set)"),
        }
    }
    Ok(())
}

/// `vox config reset`
fn reset(paths: &VoxPaths) -> anyhow::Result<()> {
    let mut stored = Settings::load_stored(&paths.settings_json).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "discarding unreadable settings");
        Settings::default()
    });
    stored.reset_to_defaults();
    stored.save(&paths.settings_json)?;
    println!("Stored credentials cleared");
    Ok(())
}

/// Tokens show only their last four characters.
fn mask(key: &str, value: &str) -> String {
    if key != "mapbox_token" {
        return value.to_string();
    }
    let tail: String = value
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{tail}")
}
