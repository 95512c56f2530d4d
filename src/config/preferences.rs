//! Persisted user preferences: the chosen network and wallet provider.
//!
//! The wallet connection itself is never saved; every run starts
//! disconnected.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::network::NetworkConfig;

/// Everything that survives between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub network: Option<NetworkConfig>,
    pub selected_wallet_id: Option<String>,
}

/// JSON file backing for [`Preferences`].
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load saved preferences; a missing file yields the defaults.
    pub fn load(&self) -> std::io::Result<Preferences> {
        if !self.path.exists() {
            return Ok(Preferences::default());
        }
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let prefs: Preferences = serde_json::from_reader(reader)?;
        tracing::debug!(path = ?self.path, "Loaded preferences");
        Ok(prefs)
    }

    /// Write preferences, replacing the previous file.
    pub fn save(&self, prefs: &Preferences) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(&self.path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, prefs)?;
        tracing::debug!(path = ?self.path, "Saved preferences");
        Ok(())
    }
}
