//! CLI entrypoint for udc
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use udc_application::{
    BatchDocument, BatchItem, NoProgress, ProgressNotifier, RunBatchInput, RunBatchUseCase,
    RunConversionUseCase, RunRecorder, validate_configuration,
};
use udc_infrastructure::{
    ConfigLoader, HttpAgentGateway, JsonlRunRecorder, PromptSetLoader, discover_documents,
    read_input_document, save_output, save_run_log,
};
use udc_presentation::{Cli, ConsoleFormatter, OutputFormat, ProgressReporter, SimpleProgress};

/// Install the tracing subscriber; the returned guard must live until exit
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "udc.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling in-flight runs");
            token.cancel();
        }
    });
}

fn load_documents(paths: &[PathBuf]) -> Vec<BatchDocument> {
    paths
        .iter()
        .filter_map(|path| match read_input_document(path) {
            Ok(content) => Some(BatchDocument::new(path.display().to_string(), content)),
            Err(e) => {
                error!("Skipping document: {}", e);
                None
            }
        })
        .collect()
}

fn persist(items: &[BatchItem], output_folder: &Path, output_ext: &str, log_folder: &Path, log_ext: &str) {
    for item in items {
        let source = Path::new(&item.name);
        match &item.outcome {
            Ok(run) => {
                if run.result.succeeded
                    && let Err(e) = save_output(output_folder, output_ext, source, &run.result.output)
                {
                    error!(document = %item.name, "Could not save output: {}", e);
                }
                if let Err(e) = save_run_log(log_folder, log_ext, source, &run.log) {
                    error!(document = %item.name, "Could not save run log: {}", e);
                }
            }
            Err(e) if e.is_cancelled() => {
                warn!(document = %item.name, "Run cancelled, nothing saved");
            }
            Err(e) => {
                error!(document = %item.name, "Run failed: {}", e);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref());

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    info!("Starting udc");

    // === Configuration ===
    let Some(prompts_path) = cli.prompts.as_deref() else {
        bail!("--prompts is required");
    };
    let file_config =
        ConfigLoader::load(cli.config.as_deref()).context("Error loading configuration")?;
    let mut run_config = file_config
        .to_run_config()
        .context("Invalid agent configuration")?;
    if cli.parallel_agents {
        run_config.settings = run_config.settings.with_parallel_agents(true);
        info!("Parallel agent execution enabled via --parallel-agents flag");
    }

    let prompts = PromptSetLoader::load(prompts_path).context("Error loading prompt set")?;
    validate_configuration(&prompts, &run_config.roster).context("Invalid configuration")?;

    // === Inputs ===
    let paths = match (&cli.file, &cli.folder, &cli.pattern) {
        (Some(file), _, _) => vec![file.clone()],
        (None, Some(folder), Some(pattern)) => {
            discover_documents(folder, pattern).context("Error searching for documents")?
        }
        _ => {
            warn!("No file or folder/pattern specified. Nothing to process.");
            return Ok(());
        }
    };
    let documents = load_documents(&paths);
    if documents.is_empty() {
        warn!("No readable documents found. Nothing to process.");
        return Ok(());
    }

    // === Dependency Injection ===
    // Credentials are resolved here, before any agent is dispatched
    let gateway = Arc::new(
        HttpAgentGateway::new(
            run_config.providers.clone(),
            &run_config.roster,
            &run_config.settings.call,
        )
        .context("Error configuring providers")?,
    );

    let output_folder = cli
        .output_folder
        .clone()
        .unwrap_or_else(|| file_config.output.folder.clone());
    let log_folder = cli
        .log_folder
        .clone()
        .unwrap_or_else(|| file_config.run_log.folder.clone());

    let token = CancellationToken::new();
    cancel_on_ctrl_c(token.clone());

    let mut conversion = RunConversionUseCase::new(gateway).with_cancellation(token);
    if file_config.run_log.jsonl {
        let stream_path = log_folder.join(format!(
            "{}_batch.jsonl",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ));
        if let Some(recorder) = JsonlRunRecorder::new(&stream_path) {
            info!(path = %recorder.path().display(), "Streaming run log entries");
            let recorder: Arc<dyn RunRecorder> = Arc::new(recorder);
            conversion = conversion.with_recorder(recorder);
        }
    }
    let use_case = RunBatchUseCase::new(conversion);

    let progress: Box<dyn ProgressNotifier> = if cli.quiet || cli.output == OutputFormat::Json {
        Box::new(NoProgress)
    } else if run_config.settings.max_concurrent_documents > 1 {
        Box::new(SimpleProgress)
    } else {
        Box::new(ProgressReporter::new())
    };

    // === Run ===
    let items = use_case
        .execute_with_progress(
            RunBatchInput {
                documents: &documents,
                prompts: &prompts,
                roster: &run_config.roster,
                settings: &run_config.settings,
            },
            progress.as_ref(),
        )
        .await
        .context("Invalid configuration")?;

    persist(
        &items,
        &output_folder,
        &file_config.output.extension,
        &log_folder,
        &file_config.run_log.extension,
    );

    let report = match cli.output {
        OutputFormat::Full => ConsoleFormatter::format(&items),
        OutputFormat::Summary => ConsoleFormatter::format_summary(&items),
        OutputFormat::Json => ConsoleFormatter::format_json(&items),
    };
    println!("{}", report);

    info!(
        documents = items.len(),
        converted = ConsoleFormatter::succeeded_count(&items),
        "Batch finished"
    );
    Ok(())
}
