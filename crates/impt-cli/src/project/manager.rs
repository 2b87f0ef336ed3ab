//! Project commands: create, update, info, select, list and delete

use super::config::{DeviceGroupBinding, ProjectConfig};
use crate::auth::{AuthConfig, AuthLocation, Session};
use crate::context::Context;
use crate::error::{CliError, Result};
use impt_sdk::ApiError;
use serde::Serialize;
use tracing::{debug, info, warn};

const DEVICE_FILE: &str = "Device file";
const AGENT_FILE: &str = "Agent file";
const DEVICE_GROUP: &str = "Device group";

/// Inputs of `impt project create`
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub device_group: String,
    pub device_file: Option<String>,
    pub agent_file: Option<String>,
    pub make_default: bool,
    /// Account to bind with instead of the default one
    pub account: Option<String>,
}

/// Inputs of `impt project update`
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub device_group: Option<String>,
    pub device_file: Option<String>,
    pub agent_file: Option<String>,
    pub make_default: bool,
}

/// A binding as shown by `list` and returned by `create`/`update`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingSummary {
    pub device_group_id: String,
    pub device_file: Option<String>,
    pub agent_file: Option<String>,
    pub account_id: Option<String>,
    pub endpoint: Option<String>,
    pub is_default: bool,
    pub skip: bool,
}

impl BindingSummary {
    fn new(id: &str, binding: &DeviceGroupBinding) -> Self {
        Self {
            device_group_id: id.to_string(),
            device_file: binding.device_file.clone(),
            agent_file: binding.agent_file.clone(),
            account_id: binding.account_id.clone(),
            endpoint: binding.endpoint.clone(),
            is_default: binding.is_default,
            skip: binding.skip,
        }
    }
}

/// What `impt project info` reports about one binding
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    #[serde(flatten)]
    pub binding: BindingSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    /// Builder variable names; values may be secret
    pub builder_variables: Vec<String>,
    /// Set when the device group no longer exists upstream
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outdated: Option<String>,
}

pub struct ProjectManager<'a> {
    ctx: &'a Context,
}

impl<'a> ProjectManager<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    async fn load(&self, device_group: Option<&str>) -> Result<ProjectConfig> {
        ProjectConfig::load(&self.ctx.paths.local_dir, device_group).await
    }

    async fn load_existing(&self, device_group: Option<&str>) -> Result<ProjectConfig> {
        let project = self.load(device_group).await?;
        if !project.exists() {
            return Err(project.no_config());
        }
        Ok(project)
    }

    /// Bind a device group to the project
    pub async fn create(&self, options: CreateOptions) -> Result<BindingSummary> {
        let mut auth = AuthConfig::resolve(
            &self.ctx.paths,
            &self.ctx.env,
            options.account.as_deref(),
        )
        .await?;
        let session = self.ctx.sessions().session(&mut auth).await?;

        session
            .api
            .get_device_group(&session.access_token, &options.device_group)
            .await
            .map_err(|e| match e {
                ApiError::NotFound { .. } => {
                    CliError::not_found(DEVICE_GROUP, &options.device_group)
                }
                other => other.into(),
            })?;

        let mut project = self.load(Some(&options.device_group)).await?;
        validate_files(
            &project,
            options.device_file.as_deref(),
            options.agent_file.as_deref(),
        )?;

        let first = project.is_empty();
        let binding = project.binding_mut()?;
        if options.device_file.is_some() {
            binding.device_file = options.device_file;
        }
        if options.agent_file.is_some() {
            binding.agent_file = options.agent_file;
        }
        binding.account_id = session.account_id.clone();
        binding.endpoint = Some(session.endpoint.clone());

        if options.make_default || first || project.default_id().is_none() {
            project.select_default(&options.device_group)?;
        }
        project.save().await?;

        info!("Bound device group {} to the project", options.device_group);
        self.summary(&project, &options.device_group)
    }

    /// Change files or the default flag of a binding without contacting the
    /// platform
    pub async fn update(&self, options: UpdateOptions) -> Result<BindingSummary> {
        let mut project = self.load_existing(options.device_group.as_deref()).await?;
        let id = selected_id(&project)?;
        if project.get(&id).is_none() {
            return Err(CliError::not_found(DEVICE_GROUP, id));
        }

        validate_files(
            &project,
            options.device_file.as_deref(),
            options.agent_file.as_deref(),
        )?;

        let binding = project.binding_mut()?;
        if options.device_file.is_some() {
            binding.device_file = options.device_file;
        }
        if options.agent_file.is_some() {
            binding.agent_file = options.agent_file;
        }
        if options.make_default {
            project.select_default(&id)?;
        }
        project.save().await?;

        self.summary(&project, &id)
    }

    /// Info about the selected binding
    pub async fn info(&self, device_group: Option<&str>) -> Result<ProjectInfo> {
        let project = self.load_existing(device_group).await?;
        let id = selected_id(&project)?;
        let mut auth = AuthConfig::resolve(&self.ctx.paths, &self.ctx.env, None).await?;
        self.info_for(&project, &mut auth, &id).await
    }

    /// Info about every binding not marked `skip`, one after another
    pub async fn info_all<F>(&self, mut on_info: F) -> Result<()>
    where
        F: FnMut(&str, &Result<ProjectInfo>),
    {
        let mut project = self.load_existing(None).await?;
        let mut auth = AuthConfig::resolve(&self.ctx.paths, &self.ctx.env, None).await?;
        let default_account = auth.account_id().map(str::to_string);

        let ids: Vec<String> = project
            .bindings()
            .filter(|(_, binding)| !binding.skip)
            .map(|(id, _)| id.clone())
            .collect();

        let mut failed = 0;
        for id in &ids {
            project.select(id.clone());
            auth.set_account(default_account.clone());
            let result = self.info_for(&project, &mut auth, id).await;
            if let Err(e) = &result {
                warn!("Info for device group {} failed: {}", id, e);
                failed += 1;
            }
            on_info(id.as_str(), &result);
        }

        if failed > 0 {
            return Err(CliError::PartialFailure {
                succeeded: ids.len() - failed,
                failed,
            });
        }
        Ok(())
    }

    async fn info_for(
        &self,
        project: &ProjectConfig,
        auth: &mut AuthConfig,
        id: &str,
    ) -> Result<ProjectInfo> {
        let binding = project
            .get(id)
            .ok_or_else(|| CliError::not_found(DEVICE_GROUP, id))?;

        if let Some(recorded) = &binding.account_id {
            if auth.location() != AuthLocation::EnvVars {
                match auth.registry().resolve_shared(recorded).map(str::to_string) {
                    Some(account) => {
                        debug!("Using account {} for device group {}", account, id);
                        auth.select_account(account);
                    }
                    None => debug!(
                        "Account {} of device group {} is not logged in, using the current one",
                        recorded, id
                    ),
                }
            }
        }

        let session: Session = self.ctx.sessions().session(auth).await?;

        let mut info = ProjectInfo {
            binding: BindingSummary::new(id, binding),
            name: None,
            kind: None,
            product_id: None,
            builder_variables: project.builder_variables().keys().cloned().collect(),
            outdated: None,
        };

        match session
            .api
            .get_device_group(&session.access_token, id)
            .await
        {
            Ok(group) => {
                info.name = Some(group.name);
                info.kind = Some(group.kind);
                info.product_id = group.product_id;
            }
            Err(ApiError::NotFound { .. }) => {
                let outdated = CliError::OutdatedConfigEntity {
                    kind: DEVICE_GROUP,
                    id: id.to_string(),
                };
                warn!("{}", outdated);
                info.outdated = Some(outdated.to_string());
            }
            Err(e) => return Err(e.into()),
        }

        Ok(info)
    }

    /// Make a recorded binding the default
    pub async fn select(&self, device_group: &str) -> Result<BindingSummary> {
        let mut project = self.load_existing(Some(device_group)).await?;
        project.select_default(device_group)?;
        project.save().await?;
        info!("Default device group is now {}", device_group);
        self.summary(&project, device_group)
    }

    pub async fn list(&self) -> Result<Vec<BindingSummary>> {
        let project = self.load_existing(None).await?;
        Ok(project
            .bindings()
            .map(|(id, binding)| BindingSummary::new(id, binding))
            .collect())
    }

    /// Remove one binding, or all of them with `all`.
    ///
    /// Asks for confirmation unless `confirmed`. Returns the removed ids.
    pub async fn delete(
        &self,
        device_group: Option<&str>,
        all: bool,
        confirmed: bool,
    ) -> Result<Vec<String>> {
        let mut project = self.load_existing(device_group).await?;

        let ids: Vec<String> = if all {
            project.bindings().map(|(id, _)| id.clone()).collect()
        } else {
            let id = selected_id(&project)?;
            if project.get(&id).is_none() {
                return Err(CliError::not_found(DEVICE_GROUP, id));
            }
            vec![id]
        };

        if !confirmed {
            let prompt = format!(
                "Remove device group binding(s) {} from the project?",
                ids.join(", ")
            );
            if !self.ctx.prompter().confirm(&prompt, false)? {
                return Err(CliError::Cancelled);
            }
        }

        for id in &ids {
            project.remove(id);
        }

        if project.is_empty() {
            project.delete().await?;
        } else {
            if project.default_id().is_none() {
                let first = project.bindings().next().map(|(id, _)| id.clone());
                if let Some(first) = first {
                    project.select_default(&first)?;
                }
            }
            project.save().await?;
        }

        info!("Removed device group binding(s) {}", ids.join(", "));
        Ok(ids)
    }

    fn summary(&self, project: &ProjectConfig, id: &str) -> Result<BindingSummary> {
        project
            .get(id)
            .map(|binding| BindingSummary::new(id, binding))
            .ok_or_else(|| CliError::not_found(DEVICE_GROUP, id))
    }
}

fn selected_id(project: &ProjectConfig) -> Result<String> {
    project
        .device_group_id()
        .map(str::to_string)
        .ok_or_else(|| project.no_config())
}

fn validate_files(
    project: &ProjectConfig,
    device_file: Option<&str>,
    agent_file: Option<&str>,
) -> Result<()> {
    if let Some(file) = device_file {
        project.validate_source_file(file, DEVICE_FILE)?;
    }
    if let Some(file) = agent_file {
        project.validate_source_file(file, AGENT_FILE)?;
    }
    Ok(())
}
