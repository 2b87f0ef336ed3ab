//! Project file: device groups the working directory is bound to
//!
//! `.impt.project` maps device-group ids to the source files deployed to
//! them. Build variables may also come from `.impt.project.secrets`, which is
//! meant to stay out of version control.

use crate::error::{CliError, ConfigKind, Result};
use crate::storage;
use impt_common::{PROJECT_CONFIG_FILE_NAME, PROJECT_SECRETS_FILE_NAME};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Builder variables: name → value
pub type BuilderVariables = Map<String, Value>;

/// One device group bound to the project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceGroupBinding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_file: Option<String>,
    /// Account the device group was bound with
    #[serde(
        rename = "accountID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builder: Option<BuilderVariables>,
    /// Left out of operations over all bindings
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skip: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Contents of `.impt.project`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    #[serde(default)]
    pub device_groups: IndexMap<String, DeviceGroupBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builder: Option<BuilderVariables>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Project file with a single binding at the top level
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyProjectFile {
    device_group_id: String,
    #[serde(flatten)]
    binding: DeviceGroupBinding,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredProjectFile {
    Legacy(LegacyProjectFile),
    Current(ProjectFile),
}

impl From<StoredProjectFile> for ProjectFile {
    fn from(stored: StoredProjectFile) -> Self {
        match stored {
            StoredProjectFile::Current(file) => file,
            StoredProjectFile::Legacy(legacy) => {
                debug!("Converting single-binding project file");
                let mut binding = legacy.binding;
                binding.is_default = true;
                let builder = binding.builder.take();
                let mut device_groups = IndexMap::new();
                device_groups.insert(legacy.device_group_id, binding);
                ProjectFile {
                    device_groups,
                    builder,
                    extra: Map::new(),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretsEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builder: Option<BuilderVariables>,
}

/// Contents of `.impt.project.secrets`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSecrets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builder: Option<BuilderVariables>,
    #[serde(default)]
    pub device_groups: IndexMap<String, SecretsEntry>,
}

/// The project bound to a directory
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    dir: PathBuf,
    exists: bool,
    file: ProjectFile,
    secrets: Option<ProjectSecrets>,
    device_group_id: Option<String>,
}

impl ProjectConfig {
    /// Load the project of `dir`; the selected binding is the override, else
    /// the default one
    pub async fn load(dir: &Path, device_group_override: Option<&str>) -> Result<Self> {
        let path = dir.join(PROJECT_CONFIG_FILE_NAME);
        let stored: Option<StoredProjectFile> =
            storage::read_json_file(&path, ConfigKind::Project).await?;
        let exists = stored.is_some();
        let file: ProjectFile = stored.map(Into::into).unwrap_or_default();

        let secrets = load_secrets(&dir.join(PROJECT_SECRETS_FILE_NAME)).await;

        let device_group_id = device_group_override
            .map(str::to_string)
            .or_else(|| default_id(&file).map(str::to_string));

        Ok(Self {
            dir: dir.to_path_buf(),
            exists,
            file,
            secrets,
            device_group_id,
        })
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(PROJECT_CONFIG_FILE_NAME)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn is_empty(&self) -> bool {
        self.file.device_groups.is_empty()
    }

    pub fn device_group_id(&self) -> Option<&str> {
        self.device_group_id.as_deref()
    }

    /// Act on `id` without changing the default
    pub fn select(&mut self, id: impl Into<String>) {
        self.device_group_id = Some(id.into());
    }

    pub fn default_id(&self) -> Option<&str> {
        default_id(&self.file)
    }

    pub fn bindings(&self) -> impl Iterator<Item = (&String, &DeviceGroupBinding)> {
        self.file.device_groups.iter()
    }

    pub fn get(&self, id: &str) -> Option<&DeviceGroupBinding> {
        self.file.device_groups.get(id)
    }

    /// Selected binding, if it is recorded
    pub fn binding(&self) -> Option<&DeviceGroupBinding> {
        self.device_group_id
            .as_deref()
            .and_then(|id| self.file.device_groups.get(id))
    }

    /// Selected binding; an id that is not recorded yet gets an empty binding
    pub fn binding_mut(&mut self) -> Result<&mut DeviceGroupBinding> {
        let id = self.device_group_id.clone().ok_or_else(|| self.no_config())?;
        Ok(self.file.device_groups.entry(id).or_default())
    }

    /// Make `id` the only default binding
    pub fn select_default(&mut self, id: &str) -> Result<()> {
        if !self.file.device_groups.contains_key(id) {
            return Err(CliError::not_found("Device group", id));
        }
        for (key, binding) in self.file.device_groups.iter_mut() {
            binding.is_default = key == id;
        }
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<DeviceGroupBinding> {
        let removed = self.file.device_groups.shift_remove(id);
        if self.device_group_id.as_deref() == Some(id) {
            self.device_group_id = default_id(&self.file).map(str::to_string);
        }
        removed
    }

    pub fn secrets(&self) -> Option<&ProjectSecrets> {
        self.secrets.as_ref()
    }

    /// Builder variables for the selected binding.
    ///
    /// Later sources override earlier ones: project, binding, secrets,
    /// per-binding secrets.
    pub fn builder_variables(&self) -> BuilderVariables {
        let binding = self.binding().and_then(|b| b.builder.as_ref());
        let secrets = self.secrets.as_ref().and_then(|s| s.builder.as_ref());
        let binding_secrets = self.secrets.as_ref().and_then(|s| {
            self.device_group_id
                .as_deref()
                .and_then(|id| s.device_groups.get(id))
                .and_then(|entry| entry.builder.as_ref())
        });

        let mut merged = Map::new();
        for layer in [self.file.builder.as_ref(), binding, secrets, binding_secrets]
            .into_iter()
            .flatten()
        {
            for (key, value) in layer {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }

    /// Check that a source file exists relative to the project directory
    pub fn validate_source_file(&self, file: &str, kind: &'static str) -> Result<()> {
        if self.dir.join(file).is_file() {
            Ok(())
        } else {
            Err(CliError::not_found(kind, file))
        }
    }

    pub fn no_config(&self) -> CliError {
        let location = if self.exists {
            format!("no device group selected in {}", PROJECT_CONFIG_FILE_NAME)
        } else {
            format!("{} in {}", PROJECT_CONFIG_FILE_NAME, self.dir.display())
        };
        CliError::NoConfig {
            kind: ConfigKind::Project,
            location,
        }
    }

    pub async fn save(&mut self) -> Result<()> {
        let path = self.path();
        storage::write_json_file(&path, &self.file).await?;
        self.exists = true;
        info!("Saved project config to {}", path.display());
        Ok(())
    }

    pub async fn delete(&mut self) -> Result<()> {
        if !self.exists {
            return Err(self.no_config());
        }
        storage::remove_file(&self.path()).await?;
        info!("Removed project config {}", self.path().display());
        self.exists = false;
        self.file = ProjectFile::default();
        self.device_group_id = None;
        Ok(())
    }
}

fn default_id(file: &ProjectFile) -> Option<&str> {
    file.device_groups
        .iter()
        .find(|(_, binding)| binding.is_default)
        .map(|(id, _)| id.as_str())
}

/// Secrets are optional; a broken secrets file is reported and ignored
async fn load_secrets(path: &Path) -> Option<ProjectSecrets> {
    match storage::read_json_file(path, ConfigKind::Project).await {
        Ok(secrets) => secrets,
        Err(e) => {
            warn!("Ignoring project secrets: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    async fn write(dir: &Path, name: &str, value: Value) {
        tokio::fs::write(dir.join(name), value.to_string())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unseen_device_group_gets_empty_binding() {
        let dir = TempDir::new().unwrap();
        let mut project = ProjectConfig::load(dir.path(), Some("dg-new")).await.unwrap();

        let binding = project.binding_mut().unwrap();

        assert_eq!(*binding, DeviceGroupBinding::default());
        assert!(project.get("dg-new").is_some());
    }

    #[tokio::test]
    async fn test_binding_mut_without_selection_is_no_config() {
        let dir = TempDir::new().unwrap();
        let mut project = ProjectConfig::load(dir.path(), None).await.unwrap();

        assert!(matches!(
            project.binding_mut(),
            Err(CliError::NoConfig {
                kind: ConfigKind::Project,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_missing_source_file_names_path() {
        let dir = TempDir::new().unwrap();
        let project = ProjectConfig::load(dir.path(), None).await.unwrap();

        let err = project
            .validate_source_file("src/device.nut", "Device file")
            .unwrap_err();

        match err {
            CliError::EntityNotFound { kind, name } => {
                assert_eq!(kind, "Device file");
                assert_eq!(name, "src/device.nut");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_legacy_file_is_normalised() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            PROJECT_CONFIG_FILE_NAME,
            json!({
                "deviceGroupId": "dg-1",
                "deviceFile": "device.nut",
                "agentFile": "agent.nut",
                "builder": { "A": 1 }
            }),
        )
        .await;

        let project = ProjectConfig::load(dir.path(), None).await.unwrap();

        assert_eq!(project.device_group_id(), Some("dg-1"));
        let binding = project.binding().unwrap();
        assert!(binding.is_default);
        assert_eq!(binding.device_file.as_deref(), Some("device.nut"));
        assert_eq!(project.builder_variables()["A"], json!(1));
    }

    #[tokio::test]
    async fn test_builder_variable_precedence() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            PROJECT_CONFIG_FILE_NAME,
            json!({
                "builder": { "A": "project", "B": "project", "C": "project", "D": "project" },
                "deviceGroups": {
                    "dg-1": {
                        "isDefault": true,
                        "builder": { "B": "binding", "C": "binding", "D": "binding" }
                    }
                }
            }),
        )
        .await;
        write(
            dir.path(),
            PROJECT_SECRETS_FILE_NAME,
            json!({
                "builder": { "C": "secrets", "D": "secrets" },
                "deviceGroups": { "dg-1": { "builder": { "D": "binding-secrets" } } }
            }),
        )
        .await;

        let project = ProjectConfig::load(dir.path(), None).await.unwrap();
        let vars = project.builder_variables();

        assert_eq!(vars["A"], json!("project"));
        assert_eq!(vars["B"], json!("binding"));
        assert_eq!(vars["C"], json!("secrets"));
        assert_eq!(vars["D"], json!("binding-secrets"));
    }

    #[tokio::test]
    async fn test_broken_secrets_are_ignored() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(dir.path().join(PROJECT_SECRETS_FILE_NAME), "{ nope")
            .await
            .unwrap();

        let project = ProjectConfig::load(dir.path(), None).await.unwrap();

        assert!(project.secrets().is_none());
    }

    #[tokio::test]
    async fn test_round_trip_keeps_unknown_keys() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            PROJECT_CONFIG_FILE_NAME,
            json!({
                "deviceGroups": {
                    "dg-1": { "deviceFile": "d.nut", "isDefault": true, "tests": ["t1"] },
                    "dg-2": { "skip": true }
                },
                "version": 2
            }),
        )
        .await;

        let mut project = ProjectConfig::load(dir.path(), None).await.unwrap();
        project.save().await.unwrap();

        let raw: Value =
            serde_json::from_str(&std::fs::read_to_string(project.path()).unwrap()).unwrap();
        assert_eq!(raw["version"], json!(2));
        assert_eq!(raw["deviceGroups"]["dg-1"]["tests"], json!(["t1"]));
        assert_eq!(raw["deviceGroups"]["dg-2"]["skip"], json!(true));
        assert!(raw["deviceGroups"]["dg-2"].get("isDefault").is_none());
    }

    #[tokio::test]
    async fn test_select_default_leaves_one_default() {
        let dir = TempDir::new().unwrap();
        let mut project = ProjectConfig::load(dir.path(), Some("dg-1")).await.unwrap();
        project.binding_mut().unwrap().is_default = true;
        project.select("dg-2");
        project.binding_mut().unwrap();

        project.select_default("dg-2").unwrap();

        assert_eq!(project.default_id(), Some("dg-2"));
        assert!(!project.get("dg-1").unwrap().is_default);
        assert!(project.select_default("dg-3").is_err());
    }
}
