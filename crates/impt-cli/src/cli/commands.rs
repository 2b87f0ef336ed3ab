use clap::{Args as ClapArgs, Subcommand};

/// Main CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in, log out and manage stored accounts
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Manage device groups bound to the current directory
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Show CLI settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Log in to impCentral and store the account
    Login(LoginArgs),

    /// Delete the global or local auth file
    Logout {
        /// Delete the local auth file instead of the global one
        #[arg(short, long)]
        local: bool,
    },

    /// Show the account the CLI acts as
    Info {
        /// Show every account of the auth file
        #[arg(short, long)]
        all: bool,

        /// Account id to show instead of the default one
        #[arg(long, conflicts_with = "all")]
        account: Option<String>,
    },

    /// Make an account the default
    Select {
        /// Use the local auth file instead of the global one
        #[arg(short, long)]
        local: bool,

        /// Account id; asks when omitted
        #[arg(long)]
        account: Option<String>,
    },

    /// List stored accounts grouped by endpoint
    List {
        /// Use the local auth file instead of the global one
        #[arg(short, long)]
        local: bool,
    },
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct LoginArgs {
    /// Store credentials in ./.impt.auth instead of the home directory
    #[arg(short, long)]
    pub local: bool,

    /// impCentral API endpoint
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Username or email address
    #[arg(short, long)]
    pub user: Option<String>,

    /// Password; asked for when omitted
    #[arg(short, long = "pwd", requires = "user")]
    pub password: Option<String>,

    /// Login key
    #[arg(short = 'k', long = "lk", conflicts_with = "user")]
    pub login_key: Option<String>,

    /// Do not store the login key or refresh token
    #[arg(short, long)]
    pub temp: bool,

    /// Make the account the default one
    #[arg(long = "default")]
    pub make_default: bool,

    /// Add the account without asking when the auth file exists
    #[arg(long)]
    pub confirmed: bool,
}

#[derive(Subcommand, Debug)]
pub enum ProjectAction {
    /// Bind a device group to the project
    Create {
        /// Device group id
        #[arg(short = 'g', long = "dg")]
        device_group: String,

        #[command(flatten)]
        files: SourceFiles,

        /// Make the device group the project default
        #[arg(long = "default")]
        make_default: bool,

        /// Account to bind with instead of the default one
        #[arg(long)]
        account: Option<String>,
    },

    /// Change files or the default of a bound device group
    Update {
        /// Device group id; the default one when omitted
        #[arg(short = 'g', long = "dg")]
        device_group: Option<String>,

        #[command(flatten)]
        files: SourceFiles,

        /// Make the device group the project default
        #[arg(long = "default")]
        make_default: bool,
    },

    /// Show bound device groups
    Info {
        /// Device group id; the default one when omitted
        #[arg(short = 'g', long = "dg", conflicts_with = "all")]
        device_group: Option<String>,

        /// Show every bound device group
        #[arg(short, long)]
        all: bool,
    },

    /// Make a bound device group the default
    Select {
        /// Device group id
        #[arg(short = 'g', long = "dg")]
        device_group: String,
    },

    /// List bound device groups
    List,

    /// Remove bound device groups
    Delete {
        /// Device group id; the default one when omitted
        #[arg(short = 'g', long = "dg", conflicts_with = "all")]
        device_group: Option<String>,

        /// Remove every binding and the project file
        #[arg(short, long)]
        all: bool,

        /// Do not ask for confirmation
        #[arg(long)]
        confirmed: bool,
    },
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct SourceFiles {
    /// Device source file
    #[arg(short = 'x', long)]
    pub device_file: Option<String>,

    /// Agent source file
    #[arg(short = 'y', long)]
    pub agent_file: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show effective settings
    Show,

    /// Print the settings file location
    Path,
}
