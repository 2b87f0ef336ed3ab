//! Authentication command handlers

use crate::auth::{AuthInfo, AuthManager, InfoReport, LoginOptions};
use crate::cli::commands::{AuthAction, LoginArgs};
use crate::context::Context;
use crate::error::Result;
use crate::output::{
    json_output, print_error, print_heading, print_info, print_success,
    table_output::{display_account_groups, display_auth_info},
};
use crate::progress::{complete_spinner_and_clear, create_spinner};
use serde::Serialize;
use tracing::debug;

pub async fn handle_auth(ctx: &Context, action: AuthAction, json: bool) -> Result<()> {
    match action {
        AuthAction::Login(args) => handle_login(ctx, args, json).await,
        AuthAction::Logout { local } => handle_logout(ctx, local, json).await,
        AuthAction::Info { all, account } => handle_info(ctx, all, account, json).await,
        AuthAction::Select { local, account } => handle_select(ctx, local, account, json).await,
        AuthAction::List { local } => handle_list(ctx, local, json).await,
    }
}

impl From<LoginArgs> for LoginOptions {
    fn from(args: LoginArgs) -> Self {
        Self {
            local: args.local,
            endpoint: args.endpoint,
            user: args.user,
            password: args.password,
            login_key: args.login_key,
            temp: args.temp,
            make_default: args.make_default,
            confirmed: args.confirmed,
        }
    }
}

async fn handle_login(ctx: &Context, args: LoginArgs, json: bool) -> Result<()> {
    debug!("Starting login, local: {}", args.local);
    let outcome = AuthManager::new(ctx).login(args.into()).await?;

    if json {
        return json_output(&outcome);
    }
    print_success(&format!(
        "Logged in as {} ({}) in the {} auth file",
        outcome.user_name,
        outcome.account_id,
        outcome.location.to_string().to_lowercase()
    ));
    if outcome.is_default {
        print_info("This is the default account");
    }
    Ok(())
}

async fn handle_logout(ctx: &Context, local: bool, json: bool) -> Result<()> {
    let location = AuthManager::new(ctx).logout(local).await?;
    if json {
        return json_output(&serde_json::json!({ "removed": location }));
    }
    print_success(&format!("{location} auth file removed"));
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InfoEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    account: Option<String>,
    #[serde(flatten)]
    info: AuthInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn print_report(report: &InfoReport) {
    if report.error.is_none() || report.show_partial {
        display_auth_info(&report.info);
    }
    if let Some(e) = &report.error {
        print_error(&e.to_string());
    }
}

async fn handle_info(ctx: &Context, all: bool, account: Option<String>, json: bool) -> Result<()> {
    let manager = AuthManager::new(ctx);

    if !all {
        let spinner = create_spinner("Fetching account info...");
        let report = manager.info(account.as_deref()).await;
        complete_spinner_and_clear(spinner);
        let report = report?;

        if json {
            if report.error.is_none() || report.show_partial {
                json_output(&report.info)?;
            }
        } else if report.show_partial {
            display_auth_info(&report.info);
        }
        return report.into_result().map(|_| ());
    }

    let mut entries = Vec::new();
    let result = manager
        .info_all(|id, report| {
            if json {
                entries.push(InfoEntry {
                    account: id.map(str::to_string),
                    info: report.info.clone(),
                    error: report.error.as_ref().map(|e| e.to_string()),
                });
            } else {
                if let Some(id) = id {
                    print_heading(&format!("Account {id}"));
                }
                print_report(report);
                println!();
            }
        })
        .await;

    if json {
        json_output(&entries)?;
    }
    result
}

async fn handle_select(
    ctx: &Context,
    local: bool,
    account: Option<String>,
    json: bool,
) -> Result<()> {
    let id = AuthManager::new(ctx).select(local, account.as_deref()).await?;
    if json {
        return json_output(&serde_json::json!({ "default": id }));
    }
    print_success(&format!("Account {id} is now the default"));
    Ok(())
}

async fn handle_list(ctx: &Context, local: bool, json: bool) -> Result<()> {
    let groups = AuthManager::new(ctx).list(local).await?;
    if json {
        return json_output(&groups);
    }
    display_account_groups(&groups);
    Ok(())
}
