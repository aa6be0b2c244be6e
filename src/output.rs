use std::path::Path;
use std::time::Duration;

use console::style;

use crate::db::YearCount;
use crate::plan::RunPlan;
use crate::runner::PipelineError;
use crate::steps::Step;

const RULE_WIDTH: usize = 80;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

pub fn banner(plan: &RunPlan) {
    println!("{}", style(rule()).blue());
    println!("{}", style("Annual report quantitative analysis").blue().bold());
    println!("{}", style(rule()).blue());
    println!("Database: {}", plan.db_path.display());
    println!("Report:   {}", plan.report_path.display());
    match plan.limit {
        Some(n) => println!("Limit:    {} files per year", n),
        None => println!("Limit:    all files"),
    }
    if plan.years.is_empty() {
        println!("Years:    all years");
    } else {
        println!("Years:    {}", plan.years.join(" "));
    }
    println!("Started:  {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
}

pub fn step_header(step: Step, total: usize) {
    println!();
    println!(
        "{} {}",
        style(format!("[{}/{}]", step.number(), total)).cyan().bold(),
        style(step.label()).cyan()
    );
}

pub fn step_done(step: Step, elapsed: Duration) {
    println!(
        "{} Step {} complete ({})",
        style("✓").green(),
        step.number(),
        format_duration(elapsed)
    );
}

pub fn failure(err: &PipelineError) {
    eprintln!();
    eprintln!(
        "{} {} failed, remaining steps skipped",
        style("✗").red().bold(),
        style(err.step().label()).red().bold()
    );
    eprintln!("  {}", style(err).red());
}

pub fn error(msg: &str) {
    eprintln!("{} {}", style("error:").red().bold(), msg);
}

pub fn success(elapsed: Duration, report: &Path) {
    println!();
    println!("{}", style(rule()).green());
    println!("{}", style("✓ Pipeline complete").green().bold());
    println!("{}", style(rule()).green());
    println!("Elapsed: {}", format_elapsed(elapsed));
    println!("Report:  {}", report.display());
}

pub fn summary(counts: &[YearCount]) {
    println!();
    println!("Companies per year:");
    if counts.is_empty() {
        println!("  {}", style(NO_DATA).yellow());
        return;
    }
    for line in summary_lines(counts) {
        println!("  {}", line);
    }
}

const NO_DATA: &str = "no data";

fn summary_lines(counts: &[YearCount]) -> Vec<String> {
    if counts.is_empty() {
        return vec![NO_DATA.to_string()];
    }
    counts
        .iter()
        .map(|c| format!("{}: {}", c.year, c.companies))
        .collect()
}

/// Whole minutes and remaining seconds, e.g. `2m 5s`.
pub fn format_elapsed(d: Duration) -> String {
    minutes_seconds(d.as_secs())
}

fn minutes_seconds(secs: u64) -> String {
    format!("{}m {}s", secs / 60, secs % 60)
}

/// Per-step timing: sub-minute steps keep a decimal, long ones gain hours.
fn format_duration(d: Duration) -> String {
    match d.as_secs() {
        s if s < 60 => format!("{:.1}s", d.as_secs_f64()),
        s if s < 3600 => minutes_seconds(s),
        s => format!("{}h {}", s / 3600, minutes_seconds(s % 3600)),
    }
}
