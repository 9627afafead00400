//! Configuration for the dev host
//!
//! Reads config from ~/.config/folderbridge/config.toml

use std::path::{Path, PathBuf};

use anyhow::Context;
use folderbridge_protocol::{Uri, WorkspaceConfig};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Directory holding the built page (index.html, pkg/)
    pub dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
            dir: PathBuf::from("."),
        }
    }
}

/// What `/workbench.json` serves
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkbenchSection {
    pub folder_uri: Option<String>,
    pub workspace_uri: Option<String>,
    pub dom_element_id: Option<String>,
    pub local_scheme: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub provider_timeout_ms: Option<u64>,
    pub workspace_trusted: Option<bool>,
}

impl WorkbenchSection {
    /// Build the descriptor the page boots from
    pub fn descriptor(&self) -> anyhow::Result<WorkspaceConfig> {
        let parse = |raw: &Option<String>| -> anyhow::Result<Option<Uri>> {
            raw.as_deref()
                .map(|s| Uri::parse(s).with_context(|| format!("invalid URI {s:?}")))
                .transpose()
        };

        let mut options = Map::new();
        if let Some(scheme) = &self.local_scheme {
            options.insert("localScheme".into(), Value::from(scheme.clone()));
        }
        if let Some(ms) = self.poll_interval_ms {
            options.insert("pollIntervalMs".into(), Value::from(ms));
        }
        if let Some(ms) = self.provider_timeout_ms {
            options.insert("providerTimeoutMs".into(), Value::from(ms));
        }
        if let Some(trusted) = self.workspace_trusted {
            options.insert("workspaceTrusted".into(), Value::from(trusted));
        }

        let config = WorkspaceConfig {
            folder_uri: parse(&self.folder_uri)?,
            workspace_uri: parse(&self.workspace_uri)?,
            dom_element_id: self.dom_element_id.clone(),
            additional_builtin_extensions: None,
            options,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Full host configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub workbench: WorkbenchSection,
}

const DEFAULT_CONFIG: &str = r#"# folderbridge host configuration

[server]
bind = "127.0.0.1"
port = 8080
dir = "."

[workbench]
dom_element_id = "workbench"
# folder_uri = "https://repo.example.com/project"
# local_scheme = "localdir"
# poll_interval_ms = 100
# provider_timeout_ms = 5000
# workspace_trusted = true
"#;

impl Config {
    /// Load configuration from the default path, falling back to defaults
    pub fn load() -> Self {
        let path = Self::default_config_path();
        match Self::load_from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "using default config");
                Self::default()
            }
        }
    }

    /// Get default config path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("folderbridge")
            .join("config.toml")
    }

    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("parsing host config")
    }

    /// Create default config file if it doesn't exist
    pub fn create_default_if_missing() {
        let path = Self::default_config_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = std::fs::write(&path, DEFAULT_CONFIG);
        }
    }
}
