use std::path::Path;

use serde::{Deserialize, Serialize};

pub const MAPBOX_TOKEN_ENV: &str = "VOX_MAPBOX_TOKEN";
pub const AGENT_ID_ENV: &str = "VOX_AGENT_ID";

/// Keys accepted by `vox config set/get`.
pub const KEYS: [&str; 2] = ["mapbox_token", "agent_id"];

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("unknown settings key '{0}' (expected one of: mapbox_token, agent_id)")]
    UnknownKey(String),
    #[error("failed to read settings: {0}")]
    Read(#[from] std::io::Error),
    #[error("settings file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to write settings: {0}")]
    Write(anyhow::Error),
}

/// External-service credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapbox_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

/// Which optional features have what they need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    pub geocoding: bool,
    pub voice_agent: bool,
}

impl Settings {
    /// Defaults come from the process environment.
    pub fn defaults() -> Self {
        Self::defaults_from(|key| std::env::var(key).ok())
    }

    pub fn defaults_from(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let nonempty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            mapbox_token: nonempty(MAPBOX_TOKEN_ENV),
            agent_id: nonempty(AGENT_ID_ENV),
        }
    }

    /// Read `path`, filling any field the file lacks from the environment.
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        Self::load_with(path, Self::defaults())
    }

    /// Only what the file holds, without environment fallbacks.
    pub fn load_stored(path: &Path) -> Result<Self, SettingsError> {
        Self::load_with(path, Self::default())
    }

    fn load_with(path: &Path, defaults: Settings) -> Result<Self, SettingsError> {
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(defaults),
            Err(e) => return Err(e.into()),
        };
        let stored: Settings = serde_json::from_str(&text)?;
        Ok(Self {
            mapbox_token: stored.mapbox_token.or(defaults.mapbox_token),
            agent_id: stored.agent_id.or(defaults.agent_id),
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        crate::write_json(path, self).map_err(SettingsError::Write)
    }

    pub fn get(&self, key: &str) -> Result<Option<&str>, SettingsError> {
        match key {
            "mapbox_token" => Ok(self.mapbox_token.as_deref()),
            "agent_id" => Ok(self.agent_id.as_deref()),
            other => Err(SettingsError::UnknownKey(other.to_string())),
        }
    }

    /// Set a key. An empty value clears it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
        match key {
            "mapbox_token" => self.mapbox_token = value,
            "agent_id" => self.agent_id = value,
            other => return Err(SettingsError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// Drop every stored value. The environment fills them in again on the
    /// next [`Settings::load`].
    pub fn reset_to_defaults(&mut self) {
        *self = Self::default();
    }

    pub fn features(&self) -> Features {
        Features {
            geocoding: self.mapbox_token.is_some(),
            voice_agent: self.agent_id.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_read_environment() {
        let s = Settings::defaults_from(|k| match k {
            MAPBOX_TOKEN_ENV => Some("pk.test".into()),
            AGENT_ID_ENV => Some("  ".into()),
            _ => None,
        });
        assert_eq!(s.mapbox_token.as_deref(), Some("pk.test"));
        assert!(s.agent_id.is_none());
        assert_eq!(
            s.features(),
            Features {
                geocoding: true,
                voice_agent: false
            }
        );
    }

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let defaults = Settings {
            agent_id: Some("agent-1".into()),
            ..Default::default()
        };
        let s = Settings::load_with(&tmp.path().join("settings.json"), defaults.clone()).unwrap();
        assert_eq!(s, defaults);
    }

    #[test]
    fn save_and_load_round_trip_with_env_fill() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.json");
        let mut s = Settings::defaults_from(no_env);
        s.set("mapbox_token", "pk.abc").unwrap();
        s.save(&path).unwrap();

        let env = Settings {
            mapbox_token: Some("pk.env".into()),
            agent_id: Some("agent-env".into()),
        };
        let loaded = Settings::load_with(&path, env).unwrap();
        assert_eq!(loaded.mapbox_token.as_deref(), Some("pk.abc"));
        assert_eq!(loaded.agent_id.as_deref(), Some("agent-env"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut s = Settings::default();
        assert!(matches!(s.set("color", "red"), Err(SettingsError::UnknownKey(_))));
        assert!(matches!(s.get("color"), Err(SettingsError::UnknownKey(_))));
    }

    #[test]
    fn empty_value_clears_key() {
        let mut s = Settings::default();
        s.set("agent_id", "a1").unwrap();
        assert_eq!(s.get("agent_id").unwrap(), Some("a1"));
        s.set("agent_id", "").unwrap();
        assert_eq!(s.get("agent_id").unwrap(), None);
        assert!(!s.features().voice_agent);
    }

    #[test]
    fn reset_then_load_falls_back_to_environment() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.json");
        let mut s = Settings::default();
        s.set("agent_id", "stored").unwrap();
        s.reset_to_defaults();
        s.save(&path).unwrap();

        assert_eq!(Settings::load_stored(&path).unwrap(), Settings::default());
        let env = Settings {
            agent_id: Some("agent-env".into()),
            ..Default::default()
        };
        let loaded = Settings::load_with(&path, env).unwrap();
        assert_eq!(loaded.agent_id.as_deref(), Some("agent-env"));
    }

    #[test]
    fn corrupt_file_is_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.json");
        std::fs::write(&path, "[").unwrap();
        assert!(matches!(Settings::load(&path), Err(SettingsError::Parse(_))));
    }
}
