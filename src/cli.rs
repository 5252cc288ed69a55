use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the state archiver.
#[derive(Parser, Debug)]
#[command(
    name = "remake",
    about = "Two-phase personal-system state archiver",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Override the root directory holding remake.toml and sections.toml
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Snapshot the configured sections into the archive (run as the
    /// configured user)
    Create,
    /// Replay the archive onto this system (run as root)
    Apply,
    /// Delete the archive and download directories
    Clean,
    /// Print version information
    Version,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_create() {
        let cli = Cli::parse_from(["remake", "create"]);
        assert!(matches!(cli.command, Command::Create));
    }

    #[test]
    fn parse_apply() {
        let cli = Cli::parse_from(["remake", "apply"]);
        assert!(matches!(cli.command, Command::Apply));
    }

    #[test]
    fn parse_clean() {
        let cli = Cli::parse_from(["remake", "clean"]);
        assert!(matches!(cli.command, Command::Clean));
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["remake", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::parse_from(["remake", "-v", "create"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_root_override() {
        let cli = Cli::parse_from(["remake", "--root", "/srv/remake", "apply"]);
        assert_eq!(
            cli.global.root,
            Some(std::path::PathBuf::from("/srv/remake"))
        );
    }

    #[test]
    fn root_defaults_to_none() {
        let cli = Cli::parse_from(["remake", "create"]);
        assert!(cli.global.root.is_none());
    }
}
