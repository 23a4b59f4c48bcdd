//! Persisted tool configuration.
//!
//! `~/.config/tweeks-sync/config.json` remembers the optional destination
//! directory so the user is only prompted once. The field is tri-state:
//!
//! ```json
//! {}                                   // never asked
//! { "destination": null }              // asked, declined
//! { "destination": "/Users/x/bin" }    // asked, chose a path
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Persisted settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Destination choice. `None` means never asked; `Some(None)` records
    /// an explicit decline.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub destination: Option<Option<PathBuf>>,
}

/// Keeps `null` distinct from an absent field when deserializing.
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<PathBuf>>, D::Error>
where
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

impl ToolConfig {
    /// Location of the config file under the user's home.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| {
            home.join(".config")
                .join("tweeks-sync")
                .join("config.json")
        })
    }

    /// Loads the saved config, treating an absent or unreadable file as
    /// defaults.
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Loads from an explicit path.
    pub fn load_from(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring invalid config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Persists the config under the user's home.
    pub fn store(&self) -> io::Result<()> {
        let path = Self::path().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "home directory not found")
        })?;
        self.store_to(&path)
    }

    /// Persists to an explicit path, creating parent directories.
    pub fn store_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }

    /// The remembered destination choice: `None` when the question was
    /// never answered, otherwise the answer.
    pub fn destination_choice(&self) -> Option<Option<&Path>> {
        self.destination.as_ref().map(|choice| choice.as_deref())
    }

    /// Records a destination answer, including a decline.
    pub fn set_destination(&mut self, destination: Option<PathBuf>) {
        self.destination = Some(destination);
    }
}
