//! Connection settings
//!
//! Read from `nodecfg.toml` (`--config`, else `$NODECFG_CONFIG`, else
//! `~/.config/nodecfg/config.toml`), then overridden by `NODECFG_*`
//! environment variables.

use anyhow::{Context, Result, bail};
use nodecfg::nodeapi::ClientConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "NODECFG_CONFIG";

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("nodecfg"))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub token: Option<String>,
    pub organization_id: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Resolve the file to read
    ///
    /// An explicit path must exist; the default location may be absent.
    fn locate(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            return Ok(Some(expand(path)));
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Ok(Some(expand(Path::new(&path))));
        }

        let default = config_dir()?.join("config.toml");
        Ok(default.exists().then_some(default))
    }

    /// Load from file and apply environment overrides
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match Self::locate(explicit)? {
            Some(path) => Self::from_file(&path)?,
            None => {
                log::debug!("No config file found, using environment only");
                Self::default()
            }
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Invalid config format: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Override fields from `NODECFG_*` variables looked up through `var`
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let fields = [
            ("NODECFG_HOST", &mut self.host),
            ("NODECFG_API_KEY", &mut self.api_key),
            ("NODECFG_API_SECRET", &mut self.api_secret),
            ("NODECFG_TOKEN", &mut self.token),
            ("NODECFG_ORGANIZATION_ID", &mut self.organization_id),
        ];
        for (name, field) in fields {
            if let Some(value) = var(name).filter(|v| !v.is_empty()) {
                log::debug!("Using {name} from environment");
                *field = Some(value);
            }
        }
    }

    /// Client settings; credential validation happens in the client
    pub fn client_config(&self) -> Result<ClientConfig> {
        let Some(host) = self.host.as_deref().filter(|h| !h.is_empty()) else {
            bail!("No API host configured (set `host` in the config file or NODECFG_HOST)");
        };

        let mut client = ClientConfig::new(host);
        if let Some(token) = &self.token {
            client = client.token(token);
        }
        if self.api_key.is_some() || self.api_secret.is_some() {
            client = client.api_key(
                self.api_key.clone().unwrap_or_default(),
                self.api_secret.clone().unwrap_or_default(),
            );
        }
        if let Some(org) = &self.organization_id {
            client = client.organization(org);
        }
        if let Some(secs) = self.timeout_secs {
            client = client.timeout(Duration::from_secs(secs));
        }
        Ok(client)
    }
}

fn expand(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nodecfg.toml");
        fs::write(
            &path,
            r#"
host = "api.example.com"
api_key = "key"
api_secret = "secret"
organization_id = "org-1"
timeout_secs = 30
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.host.as_deref(), Some("api.example.com"));
        assert_eq!(config.api_secret.as_deref(), Some("secret"));
        assert_eq!(config.timeout_secs, Some(30));
        assert!(config.token.is_none());
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn test_unknown_value_type_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nodecfg.toml");
        fs::write(&path, "timeout_secs = \"soon\"\n").unwrap();
        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config {
            host: Some("file.example.com".into()),
            token: Some("file-token".into()),
            ..Config::default()
        };
        let env: HashMap<&str, &str> = [("NODECFG_HOST", "env.example.com"), ("NODECFG_TOKEN", "")]
            .into_iter()
            .collect();

        config.apply_env(|name| env.get(name).map(ToString::to_string));

        assert_eq!(config.host.as_deref(), Some("env.example.com"));
        // empty variables do not clear file values
        assert_eq!(config.token.as_deref(), Some("file-token"));
    }

    #[test]
    fn test_client_config_requires_host() {
        let err = Config::default().client_config().unwrap_err();
        assert!(err.to_string().contains("NODECFG_HOST"));
    }

    #[test]
    fn test_client_config_carries_settings() {
        let config = Config {
            host: Some("api.example.com/".into()),
            token: Some("t".into()),
            organization_id: Some("org-1".into()),
            timeout_secs: Some(5),
            ..Config::default()
        };

        let client = config.client_config().unwrap();
        assert_eq!(client.token.as_deref(), Some("t"));
        assert_eq!(client.organization_id.as_deref(), Some("org-1"));
        assert_eq!(client.timeout, Some(Duration::from_secs(5)));
        assert_eq!(client.host, "api.example.com/");
    }
}
