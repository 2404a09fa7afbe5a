//! On-disk declared state
//!
//! A state file holds one resource instance as `{"id": ..., "values": {...}}`.
//! A manifest holds many, each tagged with its kind.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use nodecfg::engine::Entry;
use nodecfg::statemap::DeclaredState;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Load a single resource's state; a missing file is an empty state.
pub fn load_state(path: &Path) -> Result<DeclaredState> {
    if !path.exists() {
        log::debug!("State file {} does not exist, starting empty", path.display());
        return Ok(DeclaredState::new());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file: {}", path.display()))?;
    let state = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

    log::debug!("Loaded state from {}", path.display());
    Ok(state)
}

pub fn save_state(path: &Path, state: &DeclaredState) -> Result<()> {
    write_json(path, state)
}

/// Declared resources applied together
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub resources: Vec<Entry>,

    /// Last successful apply
    #[serde(default)]
    pub last_applied: Option<DateTime<Utc>>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        let manifest: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))?;

        log::debug!(
            "Loaded {} resources from {}",
            manifest.resources.len(),
            path.display()
        );
        Ok(manifest)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    /// Record a successful apply
    pub fn touch(&mut self) {
        self.last_applied = Some(Utc::now());
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }

    let mut content = serde_json::to_string_pretty(value).context("Failed to serialize state")?;
    content.push('\n');
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    log::debug!("Saved state to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodecfg::statemap::{StateStore, Value};
    use tempfile::TempDir;

    #[test]
    fn test_missing_state_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let state = load_state(&dir.path().join("absent.json")).unwrap();
        assert_eq!(state, DeclaredState::new());
    }

    #[test]
    fn test_state_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("snmp.json");

        let mut state = DeclaredState::new().with("node_id", "abc123").with("enabled", true);
        state.set_id("snmp_abc123");
        save_state(&path, &state).unwrap();

        let loaded = load_state(&path).unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded.get("enabled"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_invalid_state_file_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_state(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.json"));
    }

    #[test]
    fn test_manifest_parse() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fleet.json");
        fs::write(
            &path,
            r#"{
                "resources": [
                    { "kind": "node", "state": { "values": { "node_id": "a", "name": "edge-a" } } },
                    { "kind": "cpu_limits", "state": { "id": "cpu_limits_a", "values": { "node_id": "a", "max_percent": 80 } } }
                ]
            }"#,
        )
        .unwrap();

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.resources.len(), 2);
        assert_eq!(manifest.resources[1].kind, "cpu_limits");
        assert_eq!(manifest.resources[1].state.id(), Some("cpu_limits_a"));
        assert_eq!(manifest.resources[1].state.get("max_percent"), Some(&Value::Int(80)));
        assert!(manifest.last_applied.is_none());
    }

    #[test]
    fn test_manifest_touch_persists_timestamp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fleet.json");

        let mut manifest = Manifest::default();
        manifest.touch();
        manifest.save(&path).unwrap();

        let loaded = Manifest::load(&path).unwrap();
        assert_eq!(loaded.last_applied, manifest.last_applied);
    }
}
