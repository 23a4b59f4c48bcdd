//! Chrome profile and extension store discovery.
//!
//! Chrome keeps one directory per profile under its user-data directory,
//! named `Default` or `Profile N`. Each profile stores extension data under
//! `Local Extension Settings/<extension id>`. The extension id is fixed per
//! browser install of the extension, so discovery is a directory walk, not
//! a search.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Chrome Web Store id of Tweeks by NextByte
pub const EXTENSION_ID: &str = "fmkancpjcacjodknfjcpmgkccbhedkhc";

/// One profile carrying the extension's store
#[derive(Debug, Clone)]
pub struct ProfileStore {
    /// Profile directory name, e.g. "Default" or "Profile 1"
    pub profile: String,
    /// The profile directory itself
    pub profile_dir: PathBuf,
    /// The extension's LevelDB store inside the profile
    pub store_dir: PathBuf,
}

/// Chrome's user-data directory on macOS.
pub fn chrome_support_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join("Library")
            .join("Application Support")
            .join("Google")
            .join("Chrome")
    })
}

/// Finds every profile under `support_dir` that has a store for the
/// extension. Profiles come back sorted by name, so cross-profile merging
/// visits them in the same order every run.
pub fn discover(support_dir: &Path) -> Vec<ProfileStore> {
    let mut stores = Vec::new();

    let entries = match fs::read_dir(support_dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("cannot read {}: {}", support_dir.display(), e);
            return stores;
        }
    };

    for entry in entries.flatten() {
        let profile_dir = entry.path();
        if !profile_dir.is_dir() {
            continue;
        }
        let profile = entry.file_name().to_string_lossy().into_owned();
        if profile != "Default" && !profile.starts_with("Profile") {
            continue;
        }
        let store_dir = profile_dir
            .join("Local Extension Settings")
            .join(EXTENSION_ID);
        if store_dir.is_dir() {
            stores.push(ProfileStore {
                profile,
                profile_dir,
                store_dir,
            });
        }
    }

    stores.sort_by(|a, b| a.profile.cmp(&b.profile));
    stores
}

/// Confirms the extension installed in a profile really is Tweeks.
///
/// The store directory is keyed by extension id alone; a leftover store
/// from an unrelated extension that once squatted the id would otherwise
/// be exported. The packaged manifest under `Extensions/<id>/<version>/`
/// names the extension, so check it.
pub fn verify_extension(profile_dir: &Path) -> bool {
    let versions_dir = profile_dir.join("Extensions").join(EXTENSION_ID);
    let Ok(entries) = fs::read_dir(&versions_dir) else {
        return false;
    };

    for entry in entries.flatten() {
        let version_dir = entry.path();
        if !version_dir.is_dir() {
            continue;
        }
        let manifest_path = version_dir.join("manifest.json");
        let Ok(content) = fs::read_to_string(&manifest_path) else {
            continue;
        };
        let Ok(manifest) = serde_json::from_str::<serde_json::Value>(&content) else {
            continue;
        };
        if manifest
            .get("name")
            .and_then(|name| name.as_str())
            .is_some_and(|name| name.contains("Tweeks"))
        {
            return true;
        }
    }

    false
}
