use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::{bail, Result};
use regex::Regex;
use tracing::warn;

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").unwrap());

/// Resolved inputs for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub db_path: PathBuf,
    pub report_path: PathBuf,
    pub limit: Option<NonZeroUsize>,
    /// Year filter tokens in the order given; empty means all years.
    pub years: Vec<String>,
}

/// Year tokens are forwarded verbatim. Anything that isn't a four-digit year
/// is warned about, or rejected outright when `strict` is set.
pub fn screen_years(years: &[String], strict: bool) -> Result<()> {
    let odd: Vec<&str> = years
        .iter()
        .map(String::as_str)
        .filter(|y| !YEAR_RE.is_match(y))
        .collect();
    if odd.is_empty() {
        return Ok(());
    }
    if strict {
        bail!("Not a four-digit year: {}", odd.join(", "));
    }
    for token in odd {
        warn!(token, "year filter does not look like a year, forwarding unchanged");
    }
    Ok(())
}
