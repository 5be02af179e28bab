//! # Shell Completion Module
//!
//! Thin wrapper over `clap_complete`.
//!
//! ```bash
//! music-comment completion bash > ~/.local/share/bash-completion/completions/music-comment
//! music-comment completion zsh > ~/.config/zsh/completions/_music-comment
//! ```

use clap::Command;
use clap_complete::{generate, Generator, Shell as CompletionShell};
use std::io::Write;

use crate::cli::Shell;

/// Write the completion script for `cmd` to `out`
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command, out: &mut dyn Write) {
    let name = cmd.get_name().to_string();
    generate(gen, cmd, name, out);
}

/// Convert our Shell enum to clap_complete's Shell enum
pub fn shell_to_completion_shell(shell: Shell) -> CompletionShell {
    match shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    }
}
