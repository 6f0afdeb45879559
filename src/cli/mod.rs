//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_ENV_FILENAME;

pub mod commands;

const LOGO: &str = r"
   ___   _ __   __   __ | |_    __ _   _ __ ___     ___   _ __
  / _ \ | '_ \  \ \ / / | __|  / _' | | '_ ' _ \   / _ \ | '__|
 |  __/ | | | |  \ V /  | |_  | (_| | | | | | | | |  __/ | |
  \___| |_| |_|   \_/    \__|  \__,_| |_| |_| |_|  \___| |_|
";

/// envtamer - Taming digital environment files chaos with elegant simplicity.
#[derive(Parser, Debug)]
#[command(
    name = "envtamer",
    author,
    version,
    about,
    long_about = format!(
        "{LOGO}\nA command-line tool for managing environment variables across \
         different projects and directories."
    )
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.envtamer/envtamer.db)
    #[arg(long, global = true, env = "ENVTAMER_DB")]
    pub db: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress log output (command results and errors are still printed)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize an empty database in the user's home folder
    ///
    /// Creates ~/.envtamer/envtamer.db (or the --db path). An existing
    /// database is left untouched.
    Init,

    /// Push the contents of a local .env file to the database
    Push(PushArgs),

    /// Pull environment variables from the database to a local .env file
    ///
    /// The file is written to the current directory. If it already
    /// exists you are asked before it is overwritten.
    Pull(PullArgs),

    /// List stored directories or environment variables
    ///
    /// Without a directory, lists every directory stored in the database.
    /// With one, lists the variables stored for it.
    List {
        /// Directory whose variables to show
        directory: Option<String>,
    },

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Args, Debug)]
pub struct PushArgs {
    /// Directory the variables belong to (default: current directory)
    pub directory: Option<String>,

    /// Name of the env file inside the directory
    #[arg(short, long, default_value = DEFAULT_ENV_FILENAME)]
    pub filename: String,
}

#[derive(Args, Debug)]
pub struct PullArgs {
    /// Directory whose variables to restore
    pub directory: String,

    /// Name of the env file to create or overwrite
    #[arg(short, long, default_value = DEFAULT_ENV_FILENAME)]
    pub filename: String,

    /// Overwrite an existing file without asking
    #[arg(short, long)]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_push_defaults() {
        let cli = Cli::try_parse_from(["envtamer", "push"]).unwrap();
        match cli.command {
            Commands::Push(args) => {
                assert!(args.directory.is_none());
                assert_eq!(args.filename, ".env");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_pull_requires_directory() {
        assert!(Cli::try_parse_from(["envtamer", "pull"]).is_err());

        let cli =
            Cli::try_parse_from(["envtamer", "pull", "/proj", "-f", ".env.local", "-y"]).unwrap();
        match cli.command {
            Commands::Pull(args) => {
                assert_eq!(args.directory, "/proj");
                assert_eq!(args.filename, ".env.local");
                assert!(args.yes);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_list_accepts_at_most_one_directory() {
        assert!(Cli::try_parse_from(["envtamer", "list"]).is_ok());
        assert!(Cli::try_parse_from(["envtamer", "list", "/a"]).is_ok());
        assert!(Cli::try_parse_from(["envtamer", "list", "/a", "/b"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["envtamer", "list", "--db", "/tmp/x.db", "--json", "-vv"]).unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_quiet_help_describes_log_suppression() {
        let cmd = Cli::command();
        let quiet = cmd
            .get_arguments()
            .find(|arg| arg.get_id() == "quiet")
            .unwrap();
        let help = quiet.get_help().unwrap().to_string();
        assert!(help.contains("log output"));
        assert!(!help.contains("no output"));
    }
}
