//! Terminal implementation of [`Prompter`]

use super::Prompter;
use crate::error::{CliError, Result};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password, Select};

/// Prompts rendered with dialoguer
pub struct InteractiveSelector {
    theme: ColorfulTheme,
}

impl InteractiveSelector {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for InteractiveSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for InteractiveSelector {
    fn input(&self, prompt: &str) -> Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .interact_text()
            .map_err(|e| CliError::interactive(format!("Input failed: {e}")))
    }

    fn password(&self, prompt: &str) -> Result<String> {
        Password::with_theme(&self.theme)
            .with_prompt(prompt)
            .interact()
            .map_err(|e| CliError::interactive(format!("Password input failed: {e}")))
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact_opt()
            .map_err(|e| CliError::interactive(format!("Confirmation failed: {e}")))?;
        answer.ok_or(CliError::Cancelled)
    }

    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize> {
        let selection = Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact_opt()
            .map_err(|e| CliError::interactive(format!("Selection failed: {e}")))?;
        selection.ok_or(CliError::Cancelled)
    }
}
