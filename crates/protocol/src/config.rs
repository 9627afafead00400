//! Workbench configuration descriptor and resolved workspace targets

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ProtocolError, Uri};

/// The JSON descriptor the page boots from
///
/// Unknown keys are kept in `options` and handed to the shell untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_uri: Option<Uri>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_uri: Option<Uri>,
    /// Id of the element the shell mounts into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dom_element_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_builtin_extensions: Option<Vec<Uri>>,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl WorkspaceConfig {
    /// Parse and validate a descriptor from JSON text
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Build from an already-parsed JSON value (e.g. an injected global)
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// At most one of `folderUri`/`workspaceUri` may be set
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.folder_uri.is_some() && self.workspace_uri.is_some() {
            return Err(ProtocolError::ConflictingWorkspace);
        }
        Ok(())
    }

    /// Read a numeric passthrough option, e.g. `pollIntervalMs`
    pub fn option_u64(&self, key: &str) -> Option<u64> {
        self.options.get(key).and_then(Value::as_u64)
    }

    /// Read a string passthrough option, e.g. `localScheme`
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }
}

/// A resolved workspace: a single folder or a multi-root workspace file
///
/// The enum carries exactly one of the two fields, so a descriptor with both
/// set cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkspaceTarget {
    Folder {
        #[serde(rename = "folderUri")]
        folder_uri: Uri,
    },
    Workspace {
        #[serde(rename = "workspaceUri")]
        workspace_uri: Uri,
    },
}

impl WorkspaceTarget {
    pub fn folder(uri: Uri) -> Self {
        Self::Folder { folder_uri: uri }
    }

    pub fn workspace(uri: Uri) -> Self {
        Self::Workspace { workspace_uri: uri }
    }

    pub fn uri(&self) -> &Uri {
        match self {
            Self::Folder { folder_uri } => folder_uri,
            Self::Workspace { workspace_uri } => workspace_uri,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder { .. })
    }

    /// Whether this target points into the given local-access scheme
    pub fn is_local(&self, scheme: &str) -> bool {
        self.is_folder() && self.uri().has_scheme(scheme)
    }

    /// Workspace named directly by a config, `folderUri` first
    pub fn from_config(config: &WorkspaceConfig) -> Option<Self> {
        config
            .folder_uri
            .clone()
            .map(Self::folder)
            .or_else(|| config.workspace_uri.clone().map(Self::workspace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_descriptor_round_trips_unchanged() {
        let config = WorkspaceConfig::from_json("{}").unwrap();
        assert_eq!(config, WorkspaceConfig::default());
        assert_eq!(serde_json::to_value(&config).unwrap(), json!({}));
    }

    #[test]
    fn keeps_passthrough_options() {
        let config = WorkspaceConfig::from_json(
            r#"{"domElementId":"shell","productConfiguration":{"nameShort":"Edit"},"pollIntervalMs":50}"#,
        )
        .unwrap();
        assert_eq!(config.dom_element_id.as_deref(), Some("shell"));
        assert_eq!(config.option_u64("pollIntervalMs"), Some(50));
        assert_eq!(
            config.options["productConfiguration"],
            json!({"nameShort": "Edit"})
        );
    }

    #[test]
    fn revives_extension_uris() {
        let config = WorkspaceConfig::from_json(
            r#"{"additionalBuiltinExtensions":["https://ext.example.com/theme",{"scheme":"https","authority":"ext.example.com","path":"/icons"}]}"#,
        )
        .unwrap();
        let exts = config.additional_builtin_extensions.unwrap();
        assert_eq!(exts.len(), 2);
        assert_eq!(exts[0].path, "/theme");
        assert_eq!(exts[1].authority, "ext.example.com");
    }

    #[test]
    fn rejects_folder_and_workspace_together() {
        let err = WorkspaceConfig::from_value(json!({
            "folderUri": "file:///a",
            "workspaceUri": "file:///a.code-workspace"
        }))
        .unwrap_err();
        assert!(matches!(err, ProtocolError::ConflictingWorkspace));
    }

    #[test]
    fn target_serializes_exactly_one_field() {
        let target = WorkspaceTarget::folder(Uri::scheme_folder("localdir", "demo"));
        assert_eq!(
            serde_json::to_value(&target).unwrap(),
            json!({"folderUri": {"scheme": "localdir", "path": "/demo"}})
        );
        assert!(target.is_local("localdir"));
        assert!(!target.is_local("file"));
    }

    #[test]
    fn config_target_prefers_folder() {
        let config = WorkspaceConfig {
            workspace_uri: Some(Uri::parse("file:///w.code-workspace").unwrap()),
            ..Default::default()
        };
        let target = WorkspaceTarget::from_config(&config).unwrap();
        assert!(!target.is_folder());
    }
}
