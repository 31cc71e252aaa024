//! Command-line interface definitions.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI entry point for the environment provisioner.
#[derive(Parser, Debug)]
#[command(
    name = "envsetup",
    about = "Provision a development environment: system packages, tools and dotfile packages",
    version
)]
pub struct Cli {
    /// Subcommand to run (defaults to `install`)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[allow(missing_docs)]
    #[command(flatten)]
    pub global: GlobalOpts,
}

impl Cli {
    /// The subcommand to run, with `install` as the default.
    #[must_use]
    pub fn command_or_default(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Install(InstallOpts::default()))
    }
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Profile to use (interactive, headless, or one from conf/profiles.toml)
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Directory holding the packages and conf/ (default: $ENVSETUP_ROOT or the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Home directory receiving the links (default: $HOME)
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Treat this as a constrained context (no terminal packages, no chsh)
    #[arg(long, global = true)]
    pub constrained: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Install packages and tools, then link the dotfile packages
    Install(InstallOpts),
    /// Remove the links and restore backed-up files
    Uninstall,
    /// Show the link state of every package file
    Status,
    /// Print a shell completion script
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file of this command.
    #[must_use]
    pub const fn log_name(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Uninstall => "uninstall",
            Self::Status => "status",
            Self::Completions { .. } => "completions",
            Self::Version => "version",
        }
    }
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallOpts {
    /// Skip tasks whose name contains any of these (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run only tasks whose name contains any of these (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn install_is_the_default() {
        let cli = Cli::parse_from(["envsetup"]);
        assert!(cli.command.is_none());
        assert!(matches!(cli.command_or_default(), Command::Install(_)));
    }

    #[test]
    fn parse_install_with_profile() {
        let cli = Cli::parse_from(["envsetup", "--profile", "headless", "install"]);
        assert_eq!(cli.global.profile, Some("headless".to_string()));
        assert!(matches!(cli.command, Some(Command::Install(_))));
    }

    #[test]
    fn parse_install_with_profile_short() {
        let cli = Cli::parse_from(["envsetup", "-p", "headless", "install"]);
        assert_eq!(cli.global.profile, Some("headless".to_string()));
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "envsetup",
            "install",
            "--dry-run",
            "--constrained",
            "--home",
            "/tmp/home",
            "--root",
            "/tmp/root",
        ]);
        assert!(cli.global.dry_run);
        assert!(cli.global.constrained);
        assert_eq!(cli.global.home, Some(PathBuf::from("/tmp/home")));
        assert_eq!(cli.global.root, Some(PathBuf::from("/tmp/root")));
    }

    #[test]
    fn parse_skip_list() {
        let cli = Cli::parse_from(["envsetup", "install", "--skip", "tools,shell"]);
        let Some(Command::Install(opts)) = cli.command else {
            panic!("expected install");
        };
        assert_eq!(opts.skip, vec!["tools", "shell"]);
        assert!(opts.only.is_empty());
    }

    #[test]
    fn parse_only_list() {
        let cli = Cli::parse_from(["envsetup", "install", "--only", "link"]);
        let Some(Command::Install(opts)) = cli.command else {
            panic!("expected install");
        };
        assert_eq!(opts.only, vec!["link"]);
    }

    #[test]
    fn parse_verbose_short() {
        let cli = Cli::parse_from(["envsetup", "-v", "status"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Command::Status)));
    }

    #[test]
    fn parse_completions() {
        let cli = Cli::parse_from(["envsetup", "completions", "zsh"]);
        assert!(matches!(
            cli.command,
            Some(Command::Completions {
                shell: clap_complete::Shell::Zsh
            })
        ));
    }

    #[test]
    fn uninstall_has_its_own_log() {
        let cli = Cli::parse_from(["envsetup", "uninstall"]);
        assert_eq!(cli.command_or_default().log_name(), "uninstall");
    }

    #[test]
    fn unknown_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["envsetup", "frobnicate"]).is_err());
    }
}
