//! CLI driver for the collator pipelines.
//!
//! `collator_app compute` enumerates random ordinals, computes their
//! Fibonacci values across a thread pool, then aggregates the artifacts
//! into one CSV. `collator_app fetch` downloads image media for a date
//! range. Exit codes: 0 all items succeeded, 1 partial failure, 2 setup
//! error.

mod config;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use collator_core::random_ordinals;
use collator_engine::{
    Aggregator, ArtifactStore, ComputeStage, FetchStage, HttpSettings, MetadataClient,
    MetadataQuery, ReqwestDownloader,
};
use stage_logging::{stage_error, stage_info, LogDestination};

use crate::config::Config;

const DEFAULT_CONFIG_PATH: &str = "collator.ron";

enum Command {
    Compute,
    Fetch,
}

struct CliArgs {
    command: Command,
    config_path: PathBuf,
    log_destination: LogDestination,
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("Usage: collator_app <compute|fetch> [--config PATH] [--log terminal|file|both]");
            return ExitCode::from(2);
        }
    };

    stage_logging::initialize(args.log_destination);
    stage_logging::set_run_id(Utc::now().timestamp() as u64);

    let config = match Config::load(&args.config_path) {
        Ok(config) => config,
        Err(err) => {
            stage_error!("{err}");
            return ExitCode::from(2);
        }
    };

    stage_info!(
        "run {} writing artifacts to {:?}",
        stage_logging::get_run_id(),
        config.output_dir
    );

    match args.command {
        Command::Compute => run_compute(&config),
        Command::Fetch => run_fetch(&config),
    }
}

fn parse_args() -> Result<CliArgs, String> {
    let mut command = None;
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut log_destination = LogDestination::Terminal;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "compute" => command = Some(Command::Compute),
            "fetch" => command = Some(Command::Fetch),
            "--config" => {
                let value = args.next().ok_or("--config requires a path")?;
                config_path = PathBuf::from(value);
            }
            "--log" => {
                log_destination = match args.next().as_deref() {
                    Some("terminal") => LogDestination::Terminal,
                    Some("file") => LogDestination::File,
                    Some("both") => LogDestination::Both,
                    other => return Err(format!("unknown log destination: {other:?}")),
                };
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }

    Ok(CliArgs {
        command: command.ok_or("missing command")?,
        config_path,
        log_destination,
    })
}

/// Compute pipeline: enumerate, fan out over the thread pool, aggregate.
fn run_compute(config: &Config) -> ExitCode {
    let store = ArtifactStore::new(PathBuf::from(&config.output_dir));

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let items = random_ordinals(&mut rng, config.ordinal_range, config.ordinal_count);

    let outcome = match ComputeStage::new(config.compute_workers).run(&store, items) {
        Ok(outcome) => outcome,
        Err(err) => {
            stage_error!("compute stage aborted: {err}");
            return ExitCode::from(2);
        }
    };

    // The compute pool has fully drained at this point; aggregation may now
    // read the store.
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            stage_error!("failed to start async runtime: {err}");
            return ExitCode::from(2);
        }
    };

    let aggregator = Aggregator::new(config.reader_width, config.result_filename.clone());
    let summary = match runtime.block_on(aggregator.run(&store)) {
        Ok(summary) => summary,
        Err(err) => {
            stage_error!("aggregation failed: {err}");
            return ExitCode::from(2);
        }
    };

    stage_info!(
        "compute pipeline finished: {}/{} items computed, {} rows aggregated",
        outcome.succeeded(),
        outcome.submitted(),
        summary.row_count
    );

    if outcome.all_succeeded() && summary.failures.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

/// Fetch pipeline: query metadata, fan out the downloads.
fn run_fetch(config: &Config) -> ExitCode {
    let query = match parse_date_range(config) {
        Ok(query) => query,
        Err(message) => {
            stage_error!("{message}");
            return ExitCode::from(2);
        }
    };

    let store = ArtifactStore::new(PathBuf::from(&config.output_dir));
    let settings = HttpSettings::default();
    let client = MetadataClient::new(
        config.metadata_endpoint.clone(),
        config.api_key.clone(),
        settings.clone(),
    );
    let stage = FetchStage::new(ReqwestDownloader::new(settings), config.fetch_width);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            stage_error!("failed to start async runtime: {err}");
            return ExitCode::from(2);
        }
    };

    let outcome = runtime.block_on(async {
        let items = client.query(&query).await;
        stage.run(&store, items).await
    });

    stage_info!(
        "fetch pipeline finished: {}/{} images downloaded",
        outcome.succeeded(),
        outcome.submitted()
    );

    if outcome.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn parse_date_range(config: &Config) -> Result<MetadataQuery, String> {
    let start_date = NaiveDate::parse_from_str(&config.start_date, "%Y-%m-%d")
        .map_err(|err| format!("invalid start_date {:?}: {err}", config.start_date))?;
    let end_date = NaiveDate::parse_from_str(&config.end_date, "%Y-%m-%d")
        .map_err(|err| format!("invalid end_date {:?}: {err}", config.end_date))?;
    if end_date < start_date {
        return Err(format!(
            "end_date {end_date} precedes start_date {start_date}"
        ));
    }
    Ok(MetadataQuery {
        start_date,
        end_date,
    })
}
