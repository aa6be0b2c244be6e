mod db;
mod output;
mod plan;
mod runner;
mod settings;
mod steps;

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{info, warn};

use plan::RunPlan;
use runner::{ProcessRunner, StepRunner};
use settings::Settings;
use steps::Launcher;

const EXAMPLES: &str = "\
Examples:
  annual_report_pipeline                      # all years, all files
  annual_report_pipeline 2020 2021 2022       # only these years
  annual_report_pipeline --limit 10 2023      # quick test: 10 files for 2023
  annual_report_pipeline --db /data/q.db      # custom database";

#[derive(Parser, Debug)]
#[command(
    name = "annual_report_pipeline",
    about = "Annual report quantitative analysis: corpus -> keywords -> TF-IDF -> scores -> Excel report",
    after_help = EXAMPLES
)]
struct Cli {
    /// Year filters forwarded to the steps (default: all years)
    #[arg(value_name = "YEAR")]
    years: Vec<String>,

    /// Max source files per year for corpus construction
    #[arg(short, long)]
    limit: Option<NonZeroUsize>,

    /// Database file (default: <output_dir>/annual_reports_quantitative.db)
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Excel report file written by the last step
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Settings file (default: ./pipeline.toml if present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Reject year filters that are not four-digit years
    #[arg(long)]
    strict_years: bool,

    /// Print the step commands without running them
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli, &mut ProcessRunner) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// One full driver run; the returned value is the process exit status.
fn run<R: StepRunner>(cli: Cli, executor: &mut R) -> anyhow::Result<u8> {
    let settings = Settings::load(cli.config.as_deref())?;
    plan::screen_years(&cli.years, cli.strict_years)?;

    let plan = RunPlan {
        db_path: cli.db.unwrap_or_else(|| settings.db_path()),
        report_path: cli.output.unwrap_or_else(|| settings.report_path()),
        limit: cli.limit,
        years: cli.years,
    };
    let invocations = steps::plan_invocations(&Launcher::from(&settings), &plan);

    output::banner(&plan);
    info!(
        db = %plan.db_path.display(),
        limit = ?plan.limit,
        years = ?plan.years,
        "pipeline starting"
    );

    if cli.dry_run {
        println!();
        for inv in &invocations {
            println!("{}", inv.command_line());
        }
        return Ok(0);
    }

    let elapsed = match runner::run_pipeline(executor, &invocations) {
        Ok(elapsed) => elapsed,
        Err(e) => {
            output::failure(&e);
            return Ok(e.exit_code());
        }
    };
    output::success(elapsed, &plan.report_path);

    match db::summarize(&plan.db_path) {
        Ok(counts) => output::summary(&counts),
        Err(e) => warn!(error = %format!("{:#}", e), "per-year summary unavailable"),
    }

    Ok(0)
}
