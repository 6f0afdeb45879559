//! Shell completions command implementation.

use crate::cli::{Cli, Shell};
use crate::error::Result;
use clap::CommandFactory;
use clap_complete::{generate, shells};
use std::io;

/// Generate shell completions for the specified shell.
///
/// # Errors
///
/// Never fails; returns `Result` to match the other commands.
pub fn execute(shell: &Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let out = &mut io::stdout();

    match shell {
        Shell::Bash => generate(shells::Bash, &mut cmd, "envtamer", out),
        Shell::Zsh => generate(shells::Zsh, &mut cmd, "envtamer", out),
        Shell::Fish => generate(shells::Fish, &mut cmd, "envtamer", out),
        Shell::PowerShell => generate(shells::PowerShell, &mut cmd, "envtamer", out),
        Shell::Elvish => generate(shells::Elvish, &mut cmd, "envtamer", out),
    }

    Ok(())
}
