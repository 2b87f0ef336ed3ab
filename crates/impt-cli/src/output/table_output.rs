//! Table formatting for CLI output

use crate::auth::{AccountGroup, AuthInfo};
use crate::project::{BindingSummary, ProjectInfo};
use tabled::{builder::Builder, settings::Style, Table, Tabled};

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

fn key_value_table(rows: Vec<(&str, String)>) -> String {
    let mut builder = Builder::default();
    for (key, value) in rows {
        builder.push_record([key.to_string(), value]);
    }
    let mut table = builder.build();
    table.with(Style::modern());
    table.to_string()
}

/// Display auth info as a two-column table
pub fn display_auth_info(info: &AuthInfo) {
    println!("{}", key_value_table(auth_info_rows(info)));
}

fn auth_info_rows(info: &AuthInfo) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Auth type", info.auth_type.clone()),
        ("Endpoint", info.endpoint.clone()),
        ("Access token auto refresh", info.refreshable.to_string()),
    ];
    if let Some(method) = &info.login_method {
        rows.push(("Login method", method.clone()));
    }
    if let Some(status) = &info.access_token {
        rows.push(("Access Token", status.to_string()));
    }
    if let Some(username) = &info.username {
        rows.push(("Username", username.clone()));
    }
    if let Some(email) = &info.email {
        rows.push(("Email", email.clone()));
    }
    if let Some(id) = &info.account_id {
        rows.push(("Account id", id.clone()));
    }
    rows
}

/// Display accounts grouped by endpoint
pub fn display_account_groups(groups: &[AccountGroup]) {
    #[derive(Tabled)]
    struct AccountRow {
        #[tabled(rename = "#")]
        position: usize,
        #[tabled(rename = "Account")]
        id: String,
        #[tabled(rename = "Username")]
        user_name: String,
        #[tabled(rename = "Default")]
        is_default: String,
    }

    for group in groups {
        println!("{}", console::style(&group.endpoint).bold());
        let rows: Vec<AccountRow> = group
            .accounts
            .iter()
            .map(|account| AccountRow {
                position: account.position,
                id: account.id.clone(),
                user_name: or_dash(account.user_name.as_deref()),
                is_default: if account.is_default { "*" } else { "" }.to_string(),
            })
            .collect();

        let mut table = Table::new(rows);
        table.with(Style::modern());
        println!("{table}");
    }
}

/// Display project bindings
pub fn display_bindings(bindings: &[BindingSummary]) {
    #[derive(Tabled)]
    struct BindingRow {
        #[tabled(rename = "Device Group")]
        id: String,
        #[tabled(rename = "Device File")]
        device_file: String,
        #[tabled(rename = "Agent File")]
        agent_file: String,
        #[tabled(rename = "Account")]
        account: String,
        #[tabled(rename = "Default")]
        is_default: String,
    }

    let rows: Vec<BindingRow> = bindings
        .iter()
        .map(|binding| BindingRow {
            id: binding.device_group_id.clone(),
            device_file: or_dash(binding.device_file.as_deref()),
            agent_file: or_dash(binding.agent_file.as_deref()),
            account: or_dash(binding.account_id.as_deref()),
            is_default: if binding.is_default { "*" } else { "" }.to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("{table}");
}

/// Display one binding with its upstream device group
pub fn display_project_info(info: &ProjectInfo) {
    let binding = &info.binding;
    let mut rows = vec![("Device group id", binding.device_group_id.clone())];
    if let Some(name) = &info.name {
        rows.push(("Name", name.clone()));
    }
    if let Some(kind) = &info.kind {
        rows.push(("Type", kind.clone()));
    }
    if let Some(product) = &info.product_id {
        rows.push(("Product id", product.clone()));
    }
    rows.push(("Device file", or_dash(binding.device_file.as_deref())));
    rows.push(("Agent file", or_dash(binding.agent_file.as_deref())));
    rows.push(("Account", or_dash(binding.account_id.as_deref())));
    rows.push(("Endpoint", or_dash(binding.endpoint.as_deref())));
    rows.push(("Default", binding.is_default.to_string()));
    if !info.builder_variables.is_empty() {
        rows.push(("Builder variables", info.builder_variables.join(", ")));
    }
    if let Some(outdated) = &info.outdated {
        rows.push(("Warning", outdated.clone()));
    }
    println!("{}", key_value_table(rows));
}
