//! Command-line interface definition.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::foundation::RunId;

/// Deck Planner - turn proposal documents into reviewed presentation plans
#[derive(Debug, Parser)]
#[command(
    name = "deck-planner",
    version,
    about = "Turns proposal documents into reviewed presentation plans",
    after_help = "Configuration is read from DECK_PLANNER__* environment variables and .env"
)]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start a run on a document and print the plan for review
    Start {
        /// Document to plan a presentation for
        file: PathBuf,

        /// Use this run id instead of a generated one
        #[arg(long)]
        run_id: Option<RunId>,
    },

    /// Answer a run that awaits review
    Review {
        run_id: RunId,

        /// "approve", "reject" (or aprobar / rechazar), or free-text feedback
        #[arg(required = true, num_args = 1..)]
        response: Vec<String>,
    },

    /// Retry the step a failed run stopped at
    Retry { run_id: RunId },

    /// Show the state of a run
    Show {
        run_id: RunId,

        /// Print the run as JSON
        #[arg(long)]
        json: bool,
    },

    /// List stored runs
    List,

    /// Start a run and review it from stdin until it is approved or rejected
    Interactive { file: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn review_joins_words() {
        let run_id = RunId::new().to_string();
        let cli = Cli::parse_from(["deck-planner", "review", &run_id, "add", "a", "risks", "slide"]);
        match cli.command {
            Command::Review { response, .. } => assert_eq!(response.join(" "), "add a risks slide"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn bad_run_id_is_rejected() {
        assert!(Cli::try_parse_from(["deck-planner", "show", "not-a-uuid"]).is_err());
    }

    #[test]
    fn log_json_is_global() {
        let cli = Cli::parse_from(["deck-planner", "list", "--log-json"]);
        assert!(cli.log_json);
        assert!(matches!(cli.command, Command::List));
    }
}
