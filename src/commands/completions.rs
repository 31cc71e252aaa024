//! Command: print a shell completion script.
use clap::CommandFactory;
use clap_complete::Shell;
use std::io::Write;

use crate::cli::Cli;

/// Write the completion script for `shell` to `out`.
pub fn generate(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, out);
}

/// Print the completion script for `shell` to stdout.
pub fn run(shell: Shell) {
    generate(shell, &mut std::io::stdout());
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn zsh_completions_mention_subcommands() {
        let mut out = Vec::new();
        generate(Shell::Zsh, &mut out);
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("#compdef envsetup"));
        assert!(script.contains("uninstall"));
        assert!(script.contains("--dry-run"));
    }

    #[test]
    fn bash_completions_generate() {
        let mut out = Vec::new();
        generate(Shell::Bash, &mut out);
        assert!(!out.is_empty());
    }
}
