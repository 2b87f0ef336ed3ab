use crate::cli::{commands::Commands, handlers};
use crate::config::CliConfig;
use crate::context::Context;
use crate::error::Result;
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::path::PathBuf;

/// impt - impCentral command-line tool
#[derive(Parser, Debug)]
#[command(
    name = "impt",
    version,
    about = "impt - command-line tool for impCentral device management",
    long_about = "Command-line tool for impCentral device management.

AUTHENTICATION:
  impt auth login                   # Log in and store the account globally
  impt auth login --local           # Store the account in ./.impt.auth
  impt auth info --all              # Show every stored account
  impt auth select                  # Choose the default account
  impt auth logout                  # Delete the global auth file

PROJECT:
  impt project create --dg <id> -x device.nut -y agent.nut
  impt project info --all           # Show every bound device group
  impt project select --dg <id>     # Choose the default device group

ENVIRONMENT:
  IMPT_AUTH_FILE_PATH               # Directory holding the auth file to use
  IMPT_LOGINKEY / IMPT_USER / IMPT_PASSWORD / IMPT_ENDPOINT"
)]
pub struct Args {
    /// Settings file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Args {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        let settings = CliConfig::load(self.config.as_deref())?;
        let json = self.json || settings.output.json;

        match self.command {
            Commands::Config { action } => {
                let path = match self.config {
                    Some(path) => path,
                    None => CliConfig::default_path()?,
                };
                handlers::config::handle_config(action, &settings, &path, json)
            }
            Commands::Auth { action } => {
                let ctx = Context::from_system(settings)?;
                handlers::auth::handle_auth(&ctx, action, json).await
            }
            Commands::Project { action } => {
                let ctx = Context::from_system(settings)?;
                handlers::project::handle_project(&ctx, action, json).await
            }
        }
    }
}
