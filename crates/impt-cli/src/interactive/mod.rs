//! Interactive prompts
//!
//! Commands ask questions through the [`Prompter`] trait and get typed
//! answers back from the choice enums below, so the flows can be driven by a
//! scripted prompter in tests.

pub mod selector;

pub use selector::InteractiveSelector;

use crate::auth::{AccountGroup, AuthLocation};
use crate::error::{CliError, Result};

/// Terminal questions a command may ask
pub trait Prompter: Send + Sync {
    /// Free-text answer
    fn input(&self, prompt: &str) -> Result<String>;

    /// Hidden answer
    fn password(&self, prompt: &str) -> Result<String>;

    /// Yes/no answer
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;

    /// Index of the chosen item; [`CliError::Cancelled`] if the user backs out
    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize>;
}

/// How to authenticate when no credentials were given
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMethod {
    UserPassword,
    LoginKey,
}

impl LoginMethod {
    const ALL: [LoginMethod; 2] = [LoginMethod::UserPassword, LoginMethod::LoginKey];

    pub fn label(&self) -> &'static str {
        match self {
            LoginMethod::UserPassword => "Username/email and password",
            LoginMethod::LoginKey => "Login key",
        }
    }

    pub fn prompt(prompter: &dyn Prompter) -> Result<Self> {
        let items: Vec<String> = Self::ALL.iter().map(|m| m.label().to_string()).collect();
        let index = prompter.select("Choose a login method", &items, 0)?;
        pick(&Self::ALL, index)
    }
}

/// What to do when logging in over an existing auth file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingConfigChoice {
    Cancel,
    AddAccount,
    AddAccountAsDefault,
}

impl ExistingConfigChoice {
    const ALL: [ExistingConfigChoice; 3] = [
        ExistingConfigChoice::Cancel,
        ExistingConfigChoice::AddAccount,
        ExistingConfigChoice::AddAccountAsDefault,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ExistingConfigChoice::Cancel => "Cancel",
            ExistingConfigChoice::AddAccount => "Add the account",
            ExistingConfigChoice::AddAccountAsDefault => "Add the account and make it the default",
        }
    }

    pub fn prompt(prompter: &dyn Prompter, location: AuthLocation) -> Result<Self> {
        let items: Vec<String> = Self::ALL.iter().map(|c| c.label().to_string()).collect();
        let prompt = format!("{location} auth file already exists. What do you want to do?");
        let index = prompter.select(&prompt, &items, 1)?;
        pick(&Self::ALL, index)
    }
}

/// Pick an account from a grouped listing; returns its id
pub fn choose_account(prompter: &dyn Prompter, groups: &[AccountGroup]) -> Result<String> {
    let entries: Vec<_> = groups
        .iter()
        .flat_map(|g| g.accounts.iter().map(move |a| (g, a)))
        .collect();
    if entries.is_empty() {
        return Err(CliError::not_found("Account", "any"));
    }

    let items: Vec<String> = entries
        .iter()
        .map(|(group, account)| format!("{account}  [{}]", group.endpoint))
        .collect();
    let default = entries.iter().position(|(_, a)| a.is_default).unwrap_or(0);

    let index = prompter.select("Select the default account", &items, default)?;
    entries
        .get(index)
        .map(|(_, account)| account.id.clone())
        .ok_or_else(|| CliError::interactive(format!("No choice at position {index}")))
}

fn pick<T: Copy>(choices: &[T], index: usize) -> Result<T> {
    choices
        .get(index)
        .copied()
        .ok_or_else(|| CliError::interactive(format!("No choice at position {index}")))
}
