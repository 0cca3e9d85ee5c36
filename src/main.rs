use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod chart;
mod config;
mod error;
mod ingest;
mod models;
mod pipeline;
mod report;
mod summary;

use config::PipelineConfig;
use error::InputError;
use pipeline::{OutputPaths, PipelineInputs};

#[derive(Parser)]
#[command(name = "training-compliance")]
#[command(about = "Quarterly training completion summary by executive", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Roster spreadsheet (or csv) with Department and Executive Head columns
    #[arg(long)]
    roster: Option<PathBuf>,
    /// Quarterly extract, repeat once per quarter in order
    #[arg(long = "quarter")]
    quarters: Option<Vec<PathBuf>>,
    /// JSON pipeline configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Executive to include, replaces the configured allow-list when given
    #[arg(long = "include")]
    include: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default pipeline configuration
    InitConfig {
        #[arg(long, default_value = "training-compliance.json")]
        out: PathBuf,
    },
    /// Print the executive summary without writing files
    Summarize {
        #[command(flatten)]
        inputs: InputArgs,
    },
    /// Generate the summary spreadsheet and chart
    Report {
        #[command(flatten)]
        inputs: InputArgs,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        #[arg(long, default_value = config::DEFAULT_SPREADSHEET)]
        spreadsheet: PathBuf,
        #[arg(long, default_value = config::DEFAULT_CHART)]
        chart: PathBuf,
    },
    /// Print a previously generated summary spreadsheet
    Show {
        #[arg(long)]
        file: PathBuf,
    },
}

impl InputArgs {
    fn resolve(self) -> anyhow::Result<(PipelineInputs, PipelineConfig)> {
        error::check_inputs(self.roster.as_deref(), self.quarters.as_deref())?;

        let config = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        }
        .with_included(self.include);

        let inputs = PipelineInputs {
            roster: self.roster.unwrap_or_default(),
            quarters: self.quarters.unwrap_or_default(),
        };
        Ok((inputs, config))
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

const INPUT_ERROR_STATUS: u8 = 2;

fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    let status = exit_status(execute(cli.command))?;
    Ok(ExitCode::from(status))
}

/// Maps a command result to a process status. User-facing input errors are
/// printed as plain text; anything else propagates.
fn exit_status(result: anyhow::Result<()>) -> anyhow::Result<u8> {
    match result {
        Ok(()) => Ok(0),
        Err(err) => match err.downcast_ref::<InputError>() {
            Some(input) if input.is_user_facing() => {
                println!("{input}");
                Ok(INPUT_ERROR_STATUS)
            }
            _ => Err(err),
        },
    }
}

fn execute(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::InitConfig { out } => {
            PipelineConfig::default().write(&out)?;
            println!("Default configuration written to {}.", out.display());
        }
        Commands::Summarize { inputs } => {
            let (inputs, config) = inputs.resolve()?;
            let table = pipeline::summarize(&inputs, &config)?;
            print!("{}", report::render_table(&table.quarters, &table.to_rows()));
        }
        Commands::Report {
            inputs,
            out_dir,
            spreadsheet,
            chart,
        } => {
            let (inputs, config) = inputs.resolve()?;
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("failed to create {}", out_dir.display()))?;
            let outputs = OutputPaths::in_dir(&out_dir, &spreadsheet, &chart);

            let table = pipeline::run(&inputs, &config, &outputs)?;
            println!(
                "Summary generated {} for {} executives ({} members).",
                chrono::Local::now().format("%Y-%m-%d %H:%M"),
                table.rows.len(),
                table.grand_total.total_members
            );
            println!("Spreadsheet: {}", outputs.spreadsheet.display());
            println!("Chart: {}", outputs.chart.display());
        }
        Commands::Show { file } => {
            show(&file)?;
        }
    }

    Ok(())
}

fn show(file: &Path) -> anyhow::Result<()> {
    let (quarters, rows) = report::read_summary(file)?;
    print!("{}", report::render_table(&quarters, &rows));
    Ok(())
}
