//! Project command handlers

use crate::cli::commands::ProjectAction;
use crate::context::Context;
use crate::error::Result;
use crate::output::{
    json_output, print_error, print_heading, print_success, print_warning,
    table_output::{display_bindings, display_project_info},
};
use crate::progress::{complete_spinner_and_clear, complete_spinner_error, create_spinner};
use crate::project::{CreateOptions, ProjectInfo, ProjectManager, UpdateOptions};
use serde::Serialize;

pub async fn handle_project(ctx: &Context, action: ProjectAction, json: bool) -> Result<()> {
    let manager = ProjectManager::new(ctx);

    match action {
        ProjectAction::Create {
            device_group,
            files,
            make_default,
            account,
        } => {
            let spinner = create_spinner("Checking device group...");
            let created = manager
                .create(CreateOptions {
                    device_group,
                    device_file: files.device_file,
                    agent_file: files.agent_file,
                    make_default,
                    account,
                })
                .await;
            let summary = match created {
                Ok(summary) => {
                    complete_spinner_and_clear(spinner);
                    summary
                }
                Err(e) => {
                    complete_spinner_error(spinner, "Project was not created");
                    return Err(e);
                }
            };

            if json {
                return json_output(&summary);
            }
            print_success(&format!(
                "Device group {} bound to the project",
                summary.device_group_id
            ));
            Ok(())
        }
        ProjectAction::Update {
            device_group,
            files,
            make_default,
        } => {
            let summary = manager
                .update(UpdateOptions {
                    device_group,
                    device_file: files.device_file,
                    agent_file: files.agent_file,
                    make_default,
                })
                .await?;
            if json {
                return json_output(&summary);
            }
            print_success(&format!("Device group {} updated", summary.device_group_id));
            Ok(())
        }
        ProjectAction::Info { device_group, all } => {
            if all {
                handle_info_all(&manager, json).await
            } else {
                let spinner = create_spinner("Fetching device group...");
                let info = manager.info(device_group.as_deref()).await;
                complete_spinner_and_clear(spinner);
                let info = info?;
                if json {
                    return json_output(&info);
                }
                show_info(&info);
                Ok(())
            }
        }
        ProjectAction::Select { device_group } => {
            let summary = manager.select(&device_group).await?;
            if json {
                return json_output(&summary);
            }
            print_success(&format!(
                "Device group {} is now the project default",
                summary.device_group_id
            ));
            Ok(())
        }
        ProjectAction::List => {
            let bindings = manager.list().await?;
            if json {
                return json_output(&bindings);
            }
            display_bindings(&bindings);
            Ok(())
        }
        ProjectAction::Delete {
            device_group,
            all,
            confirmed,
        } => {
            let removed = manager
                .delete(device_group.as_deref(), all, confirmed)
                .await?;
            if json {
                return json_output(&serde_json::json!({ "removed": removed }));
            }
            print_success(&format!(
                "Removed device group binding(s) {}",
                removed.join(", ")
            ));
            Ok(())
        }
    }
}

fn show_info(info: &ProjectInfo) {
    display_project_info(info);
    if let Some(outdated) = &info.outdated {
        print_warning(outdated);
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InfoEntry {
    device_group_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    info: Option<ProjectInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn handle_info_all(manager: &ProjectManager<'_>, json: bool) -> Result<()> {
    let mut entries = Vec::new();
    let result = manager
        .info_all(|id, result| {
            if json {
                entries.push(InfoEntry {
                    device_group_id: id.to_string(),
                    info: result.as_ref().ok().cloned(),
                    error: result.as_ref().err().map(|e| e.to_string()),
                });
                return;
            }
            print_heading(&format!("Device group {id}"));
            match result {
                Ok(info) => show_info(info),
                Err(e) => print_error(&e.to_string()),
            }
            println!();
        })
        .await;

    if json {
        json_output(&entries)?;
    }
    result
}
