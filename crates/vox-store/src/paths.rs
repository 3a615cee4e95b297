use std::path::{Path, PathBuf};

/// All well-known paths under the store root.
#[derive(Debug, Clone)]
pub struct VoxPaths {
    pub root: PathBuf,
    pub session_json: PathBuf,
    pub settings_json: PathBuf,
    pub trips_db: PathBuf,
}

impl VoxPaths {
    /// Derive all paths from a store root. Pure computation, no I/O.
    pub fn discover(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            session_json: root.join("itinerary-storage.json"),
            settings_json: root.join("settings.json"),
            trips_db: root.join("trips.db"),
            root,
        }
    }

    /// Paths under `home` if given, else under [`crate::store_root`].
    pub fn resolve(home: Option<&Path>) -> Self {
        match home {
            Some(h) => Self::discover(h),
            None => Self::discover(crate::store_root()),
        }
    }

    /// Create the root directory. Idempotent.
    pub fn ensure_layout(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.root.is_dir()
    }
}
