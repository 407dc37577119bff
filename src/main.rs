mod cli;

use crate::cli::Cli;
use clap::Parser;
use futures::{StreamExt, pin_mut};
use repix_pipeline::{ConvertEvent, Revision, convert};
use repix_tools::Toolchain;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// What happened across the whole run, for the closing log line.
#[derive(Debug, Default)]
struct Tally {
    rewritten: usize,
    relabelled: usize,
    kept: usize,
    already_target: usize,
    failed: usize,
    inputs_skipped: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let tools = match Toolchain::discover(cli.tools_dir.as_deref()) {
        Ok(tools) => Arc::new(tools),
        Err(error) => {
            tracing::error!(%error, "cannot start without the external tools");
            return ExitCode::FAILURE;
        },
    };

    let mut tally = Tally::default();
    let events = convert(tools, cli.inputs);
    pin_mut!(events);
    while let Some(event) = events.next().await {
        match event {
            ConvertEvent::Argument { path } => {
                tracing::info!(input = %path.display(), "processing");
            },
            ConvertEvent::ArgumentSkipped { path, error } => {
                tally.inputs_skipped += 1;
                tracing::warn!(input = %path.display(), %error, "input skipped");
            },
            ConvertEvent::TaskStarted { path } => {
                tracing::info!(file = %path.display(), "converting");
            },
            ConvertEvent::TaskSettled { path, outcome } => match outcome {
                Ok(Revision::Rewritten { target, original_size, converted_size }) => {
                    tally.rewritten += 1;
                    tracing::info!(
                        file = %path.display(),
                        target = %target.display(),
                        original_size,
                        converted_size,
                        "rewritten"
                    );
                },
                Ok(Revision::Relabelled { target }) => {
                    tally.relabelled += 1;
                    tracing::info!(
                        file = %path.display(),
                        target = %target.display(),
                        "extension corrected"
                    );
                },
                Ok(Revision::Kept) => {
                    tally.kept += 1;
                    tracing::info!(file = %path.display(), "kept; re-encoding would not shrink it");
                },
                Ok(Revision::Skipped) => {
                    tally.already_target += 1;
                    tracing::debug!(file = %path.display(), "already in the target format");
                },
                Err(error) => {
                    tally.failed += 1;
                    tracing::error!(file = %path.display(), %error, "conversion failed");
                },
            },
            ConvertEvent::Repacked { archive } => {
                tracing::info!(archive = %archive.display(), "archive repacked");
            },
        }
    }

    tracing::info!(
        rewritten = tally.rewritten,
        relabelled = tally.relabelled,
        kept = tally.kept,
        already_target = tally.already_target,
        failed = tally.failed,
        inputs_skipped = tally.inputs_skipped,
        "Complete."
    );
    ExitCode::SUCCESS
}
