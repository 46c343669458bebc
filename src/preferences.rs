//! Small durable preferences kept between runs.
//!
//! Only the "visited studio" flag lives here. Generation history is never
//! persisted.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub visited_studio: bool,
}

/// JSON file backing [`Preferences`].
pub struct PreferenceFile {
    path: PathBuf,
}

impl PreferenceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read preferences, falling back to defaults if the file is missing or
    /// unreadable.
    pub fn load(&self) -> Preferences {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) => {
                debug!("No preferences at {}: {}", self.path.display(), e);
                return Preferences::default();
            }
        };

        serde_json::from_str(&json).unwrap_or_else(|e| {
            warn!(
                "Ignoring corrupt preferences at {}: {}",
                self.path.display(),
                e
            );
            Preferences::default()
        })
    }

    pub fn save(&self, preferences: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(preferences)?)?;
        Ok(())
    }

    /// Set the visited flag. Returns whether this was the first visit.
    pub fn mark_visited(&self) -> Result<bool> {
        let mut preferences = self.load();
        let first_visit = !preferences.visited_studio;
        if first_visit {
            preferences.visited_studio = true;
            self.save(&preferences)?;
        }
        Ok(first_visit)
    }
}
