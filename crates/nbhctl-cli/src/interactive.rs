//! Interactive prompts for the operator workflows.
//!
//! All prompting lives here in the binary; nbhctl-core only ever sees the
//! resulting values and callbacks.

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, Password, Select, theme::ColorfulTheme};

use nbhctl_core::types::ResourcePath;

pub fn prompt_password(username: &str) -> Result<String> {
    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Password for {username}"))
        .interact()?;
    Ok(password)
}

/// Numbered selection over the sorted neighborhood names of a scan.
pub fn select_neighborhood(names: &[String], prompt: &str) -> Result<String> {
    anyhow::ensure!(!names.is_empty(), "no neighborhoods to select from");
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(names)
        .default(0)
        .interact()?;
    Ok(names[selection].clone())
}

pub fn prompt_new_name() -> Result<String> {
    let name: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("New neighborhood name")
        .interact_text()?;
    Ok(name)
}

/// Show the filtered fan-out targets and ask for the go-ahead.
///
/// `assume_yes` skips the prompt (for scripted runs); an empty target set is
/// shown as such and still confirmable, since an empty fan-out is a no-op.
pub fn confirm_fanout(name: &str, targets: &[ResourcePath], assume_yes: bool) -> bool {
    println!(
        "{}",
        style(format!(
            "About to add '{name}' to {} interface(s):",
            targets.len()
        ))
        .bold()
    );
    for target in targets {
        println!("  {target}");
    }
    if assume_yes {
        return true;
    }
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Proceed?")
        .default(false)
        .interact()
        .unwrap_or(false)
}
