//! The `stagehand run` command: submit a batch, wait for every outcome, summarize.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use stagehand_core::{
    BatchReport, Config, ExecutionMode, FileDiscovery, ImageTransforms, OutputNaming, Pipeline,
    ReportFormat, ReportWriter,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Which executor(s) to run.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModeArg {
    /// One worker per stage connected by queues
    Concurrent,
    /// One image at a time through every stage
    Sequential,
    /// Concurrent, then sequential, and compare the outcomes
    Both,
}

impl ModeArg {
    fn modes(self) -> Vec<ExecutionMode> {
        match self {
            ModeArg::Concurrent => vec![ExecutionMode::Concurrent],
            ModeArg::Sequential => vec![ExecutionMode::Sequential],
            ModeArg::Both => vec![ExecutionMode::Concurrent, ExecutionMode::Sequential],
        }
    }
}

impl From<ExecutionMode> for ModeArg {
    fn from(mode: ExecutionMode) -> Self {
        match mode {
            ExecutionMode::Concurrent => ModeArg::Concurrent,
            ExecutionMode::Sequential => ModeArg::Sequential,
        }
    }
}

/// Machine-readable report formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ReportArg {
    /// One summary object per run
    Json,
    /// One outcome per line
    Jsonl,
}

impl From<ReportArg> for ReportFormat {
    fn from(arg: ReportArg) -> Self {
        match arg {
            ReportArg::Json => ReportFormat::Json,
            ReportArg::Jsonl => ReportFormat::JsonLines,
        }
    }
}

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Image files or directories to process
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Executor mode (defaults to `pipeline.mode` from config)
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Bound the queues between stages (unbounded when omitted)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub buffer_size: Option<u32>,

    /// Resize target width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Resize target height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Write a machine-readable report
    #[arg(short, long, value_enum)]
    pub report: Option<ReportArg>,

    /// Report file (defaults to stdout)
    #[arg(short, long, requires = "report")]
    pub output: Option<PathBuf>,
}

/// Execute the run command.
pub async fn execute(args: RunArgs, mut config: Config) -> anyhow::Result<()> {
    apply_overrides(&args, &mut config)?;

    let naming = OutputNaming::new(&config.output);
    let batch = FileDiscovery::new(config.processing.clone(), naming).discover_all(&args.inputs);
    if batch.is_empty() {
        tracing::warn!("No images found in {:?}", args.inputs);
    }

    let pipeline = Pipeline::new(ImageTransforms::from_config(&config), &config);

    // Per-job lines would interleave with a report written to stdout
    let print_lines = args.report.is_none() || args.output.is_some();
    let mode = args.mode.unwrap_or_else(|| pipeline.default_mode().into());

    let mut reports = Vec::new();
    for mode in mode.modes() {
        if print_lines {
            println!("Running pipeline in {} mode:", mode);
        }
        let cancel = CancellationToken::new();
        let ctrl_c = spawn_interrupt_handler(cancel.clone());
        let report = pipeline
            .run_with_cancel(batch.clone(), mode, cancel.clone())
            .await;
        ctrl_c.abort();
        let report = report?;

        if print_lines {
            print_report(&report);
        }
        reports.push(report);

        if cancel.is_cancelled() {
            tracing::warn!("Interrupted during {} mode, skipping remaining modes", mode);
            break;
        }
    }

    if let [concurrent, sequential] = reports.as_slice() {
        if concurrent.same_outcomes(sequential) {
            tracing::info!(
                "Modes agree; concurrent {:?} vs sequential {:?}",
                concurrent.elapsed,
                sequential.elapsed
            );
        } else {
            tracing::warn!("Concurrent and sequential runs produced different outcomes");
        }
    }

    if let Some(format) = args.report {
        write_reports(&reports, format.into(), args.output.as_ref())?;
    }

    Ok(())
}

/// Cancel the current run on Ctrl-C.
fn spawn_interrupt_handler(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling remaining jobs");
            cancel.cancel();
        }
    })
}

fn apply_overrides(args: &RunArgs, config: &mut Config) -> anyhow::Result<()> {
    if let Some(size) = args.buffer_size {
        config.pipeline.buffer_size = Some(size as usize);
    }
    if let Some(width) = args.width {
        config.transform.width = width;
    }
    if let Some(height) = args.height {
        config.transform.height = height;
    }
    config.validate()?;
    Ok(())
}

fn print_report(report: &BatchReport) {
    for outcome in &report.outcomes {
        if outcome.outcome.is_success() {
            println!("Success!");
        } else {
            println!("Failed!");
        }
    }
    println!(
        "{} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    );
    println!("Pipeline completed in: {:?}", report.elapsed);
}

fn write_reports(
    reports: &[BatchReport],
    format: ReportFormat,
    output: Option<&PathBuf>,
) -> anyhow::Result<()> {
    let sink: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = ReportWriter::new(sink, format, true);
    for report in reports {
        writer.write_report(report)?;
    }
    writer.flush()?;

    if let Some(path) = output {
        tracing::info!(
            "Report with {} record(s) written to {:?}",
            writer.records_written(),
            path
        );
    }
    Ok(())
}
