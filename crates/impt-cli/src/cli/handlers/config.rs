//! Settings command handlers

use crate::cli::commands::ConfigAction;
use crate::config::CliConfig;
use crate::error::Result;
use crate::output::{compress_path, json_output};
use std::path::Path;
use tabled::{builder::Builder, settings::Style};

pub fn handle_config(
    action: ConfigAction,
    settings: &CliConfig,
    path: &Path,
    json: bool,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            if json {
                return json_output(settings);
            }
            let mut builder = Builder::default();
            builder.push_record(["Key".to_string(), "Value".to_string()]);
            for (key, value) in settings.to_map() {
                builder.push_record([key, value]);
            }
            let mut table = builder.build();
            table.with(Style::modern());
            println!("{table}");
            Ok(())
        }
        ConfigAction::Path => {
            if json {
                return json_output(&serde_json::json!({ "path": path }));
            }
            println!("{}", compress_path(path));
            Ok(())
        }
    }
}
