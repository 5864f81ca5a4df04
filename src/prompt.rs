use anyhow::{Context, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

use crate::environment::Environment;
use crate::profile::DEFAULT_PROFILE;

pub fn profile() -> Result<String> {
    Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt("AWS profile")
        .default(DEFAULT_PROFILE.to_string())
        .interact_text()
        .context("failed to read profile")
}

/// Closed menu over the known environments. The select widget keeps
/// re-reading until one of the listed rows is picked, so an invalid
/// selection can never come out of here.
pub fn environment() -> Result<Environment> {
    let labels: Vec<&str> = Environment::ALL.iter().map(|env| env.label()).collect();

    let selected = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Deployment environment")
        .items(&labels)
        .default(0)
        .interact()
        .context("failed to read environment selection")?;

    Ok(Environment::ALL[selected])
}

pub fn bucket() -> Result<String> {
    Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt("Artifact bucket")
        .allow_empty(true)
        .interact_text()
        .context("failed to read bucket name")
}
