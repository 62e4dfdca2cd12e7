//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// APU - Unit-price analysis costing and reconciliation
#[derive(Parser, Debug)]
#[command(name = "apu")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Engine configuration file (TOML)
    #[arg(short, long, global = true, env = "APU_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by commands that read a draft
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct DraftArgs {
    /// Draft file describing the line item, parameters and resource lines
    pub draft: PathBuf,

    /// Output as JSON for scripting
    #[arg(long)]
    pub json: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Recompute a draft and print its lines and totals
    ///
    /// Nothing is read from or written to a store.
    Compute {
        #[command(flatten)]
        draft: DraftArgs,
    },

    /// Show the operations saving a draft would perform
    ///
    /// Examples:
    ///   apu plan draft.toml --store budget.json
    ///   apu plan draft.toml --store budget.json --json
    Plan {
        #[command(flatten)]
        draft: DraftArgs,

        /// Store file (JSON)
        #[arg(short, long)]
        store: PathBuf,
    },

    /// Validate a draft and save it to the store
    Apply {
        #[command(flatten)]
        draft: DraftArgs,

        /// Store file (JSON)
        #[arg(short, long)]
        store: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_plan_with_store() {
        let cli = Cli::parse_from(["apu", "plan", "d.toml", "--store", "s.json", "--json"]);
        assert_eq!(
            cli.command,
            Some(Commands::Plan {
                draft: DraftArgs {
                    draft: PathBuf::from("d.toml"),
                    json: true,
                },
                store: PathBuf::from("s.json"),
            })
        );
    }

    #[test]
    fn apply_requires_store() {
        assert!(Cli::try_parse_from(["apu", "apply", "d.toml"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["apu", "compute", "d.toml", "-v", "--config", "engine.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("engine.toml")));
    }
}
