use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub mod paths;
pub mod session;
pub mod settings;

pub use paths::VoxPaths;
pub use session::{load_session, save_session, SessionPersister, SessionSlice};
pub use settings::{Features, Settings, SettingsError};

/// Environment variable that relocates the whole store.
pub const HOME_ENV: &str = "VOX_HOME";

/// Return the per-user store root.
/// `$VOX_HOME` wins; otherwise the platform data dir (`~/.local/share/vox`,
/// `%APPDATA%\vox`), falling back to `~/.vox`.
pub fn store_root() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        PathBuf::from(home)
    } else if let Some(data_dir) = dirs::data_dir() {
        data_dir.join("vox")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".vox")
    } else {
        PathBuf::from(".vox-store")
    }
}

/// Atomic write: write to temp file in same dir, then rename.
pub fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("no parent dir for {}", path.display()))?;
    fs::create_dir_all(parent)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}

/// Serialize `value` as pretty JSON and write it atomically.
pub fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    write_atomic(path, &bytes)
}
