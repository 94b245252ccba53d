//! Deck Planner CLI entry point.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use deck_planner::adapters::{provider_from_config, FileRunStore, InMemoryRunStore};
use deck_planner::application::{
    GetRunHandler, GetRunQuery, ListRunsHandler, RetryRunCommand, RetryRunHandler, RunOutcome,
    StartRunCommand, StartRunHandler, SubmitReviewCommand, SubmitReviewHandler, WorkflowDriver,
};
use deck_planner::cli::{Cli, Command};
use deck_planner::config::{AppConfig, ConfigError, StorageBackend};
use deck_planner::domain::foundation::{RunId, ValidationError};
use deck_planner::domain::workflow::{ReviewDecision, WorkflowError};
use deck_planner::ports::{AIProvider, RunStore};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("invalid response: {0}")]
    Response(#[from] ValidationError),

    #[error("cannot read {path}: {source}")]
    ReadDocument {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("stdin: {0}")]
    Stdin(#[from] std::io::Error),
}

fn setup_logging(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("deck_planner=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// The handlers, wired to the configured provider and store.
struct App {
    start: StartRunHandler,
    review: SubmitReviewHandler,
    retry: RetryRunHandler,
    get: GetRunHandler,
    list: ListRunsHandler,
}

impl App {
    fn from_config(config: &AppConfig) -> Result<Self, CliError> {
        config.validate().map_err(ConfigError::from)?;

        let provider = provider_from_config(&config.ai)?;
        let store: Arc<dyn RunStore> = match config.storage.backend {
            StorageBackend::File => Arc::new(FileRunStore::new(&config.storage.data_dir)),
            StorageBackend::Memory => Arc::new(InMemoryRunStore::new()),
        };

        tracing::info!(
            provider = %provider.provider_info().name,
            model = %provider.provider_info().model,
            storage = ?config.storage.backend,
            "Deck planner configured"
        );

        let driver = Arc::new(
            WorkflowDriver::new(provider, store.clone())
                .with_config(&config.workflow)
                .with_temperature(config.ai.temperature),
        );

        Ok(Self {
            start: StartRunHandler::new(driver.clone()),
            review: SubmitReviewHandler::new(driver.clone()),
            retry: RetryRunHandler::new(driver),
            get: GetRunHandler::new(store.clone()),
            list: ListRunsHandler::new(store),
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.log_json);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match &err {
                CliError::Workflow(workflow) => {
                    eprintln!("error [{}]: {}", workflow.code(), workflow);
                    if workflow.is_resumable() {
                        eprintln!("the run was saved; use `deck-planner retry <run-id>` to continue");
                    }
                }
                other => eprintln!("error: {}", other),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<(), CliError> {
    let config = AppConfig::load()?;
    let app = App::from_config(&config)?;

    match command {
        Command::Start { file, run_id } => {
            let outcome = start(&app, &file, run_id).await?;
            print_outcome(&outcome);
        }
        Command::Review { run_id, response } => {
            let decision = ReviewDecision::parse(&response.join(" "))?;
            let outcome = app
                .review
                .handle(SubmitReviewCommand { run_id, decision })
                .await?;
            print_outcome(&outcome);
        }
        Command::Retry { run_id } => {
            let outcome = app.retry.handle(RetryRunCommand { run_id }).await?;
            print_outcome(&outcome);
        }
        Command::Show { run_id, json } => {
            let view = app.get.handle(GetRunQuery { run_id }).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                println!("Run:      {}", view.run_id);
                println!("Status:   {}", view.status);
                println!("Revision: {}", view.revision);
                if let Some(error) = &view.last_error {
                    println!("Error:    {}", error);
                }
                if view.finalized.is_some() && !view.final_plan_saved {
                    println!("Plan file missing; run `deck-planner retry {}` to write it", view.run_id);
                }
                if let Some(message) = &view.review_message {
                    println!("\n{}", message);
                } else if let Some(plan) = &view.current_plan {
                    println!("\n{}", plan.summary());
                }
            }
        }
        Command::List => {
            let runs = app.list.handle().await?;
            if runs.is_empty() {
                println!("No runs stored.");
            }
            for run in runs {
                println!(
                    "{}  {:15}  rev {:<3} {}",
                    run.run_id,
                    run.status.to_string(),
                    run.revision,
                    run.plan_title
                        .or(run.document_name)
                        .unwrap_or_default()
                );
            }
        }
        Command::Interactive { file } => interactive(&app, &file).await?,
    }

    Ok(())
}

async fn start(app: &App, file: &Path, run_id: Option<RunId>) -> Result<RunOutcome, CliError> {
    let document = tokio::fs::read_to_string(file)
        .await
        .map_err(|source| CliError::ReadDocument {
            path: file.display().to_string(),
            source,
        })?;

    let mut cmd = StartRunCommand::new(document);
    if let Some(name) = file.file_name().and_then(|n| n.to_str()) {
        cmd = cmd.with_document_name(name);
    }
    if let Some(run_id) = run_id {
        cmd = cmd.with_run_id(run_id);
    }

    Ok(app.start.handle(cmd).await?)
}

/// Starts a run, then answers the review gate from stdin until the run ends.
async fn interactive(app: &App, file: &Path) -> Result<(), CliError> {
    let mut outcome = start(app, file, None).await?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut changed = true;

    loop {
        if changed {
            print_outcome(&outcome);
            changed = false;
        }
        let RunOutcome::AwaitingReview(handle) = &outcome else {
            return Ok(());
        };
        let run_id = handle.run_id;

        println!("\nYour response (approve / reject / feedback):");
        let Some(line) = lines.next_line().await? else {
            println!("Input closed; run {} stays suspended.", run_id);
            return Ok(());
        };

        let decision = match ReviewDecision::parse(&line) {
            Ok(decision) => decision,
            Err(_) => {
                println!("Please type approve, reject, or your feedback.");
                continue;
            }
        };

        match app
            .review
            .handle(SubmitReviewCommand { run_id, decision })
            .await
        {
            Ok(next) => {
                outcome = next;
                changed = true;
            }
            Err(WorkflowError::RevisionLimitReached { limit }) => {
                println!("The revision limit of {} is reached; approve or reject this plan.", limit);
            }
            Err(err) => return Err(err.into()),
        }
    }
}

fn print_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::AwaitingReview(handle) => {
            println!("Run {} awaits review.\n", handle.run_id);
            println!("{}", handle.review_message);
        }
        RunOutcome::Approved(finalized) => {
            println!(
                "Run {} approved at revision {}.\n",
                finalized.run_id, finalized.revision
            );
            println!("{}", finalized.plan.summary());
        }
        RunOutcome::Rejected { run_id, revision } => {
            println!("Run {} rejected at revision {}.", run_id, revision);
        }
    }
}
