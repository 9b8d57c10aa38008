//! Shell completion generation for search-snapshot
//!
//! Generates completion scripts for bash, zsh, fish, and PowerShell from the
//! clap command definition.

use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io::Write;

use crate::cli::CliArgs;

/// Binary name the scripts complete for
const BIN_NAME: &str = "search-snapshot";

/// Generate a shell completion script
///
/// # Arguments
/// * `shell` - Shell type
/// * `writer` - Destination of the script
pub fn generate_completion(shell: Shell, writer: &mut dyn Write) {
    let mut cmd = CliArgs::command();
    generate(shell, &mut cmd, BIN_NAME, writer);
}
