use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Layered driver settings: defaults, then `pipeline.*` (or `--config`), then `ARQ_*` env vars.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub python: String,
    pub scripts_dir: PathBuf,
    pub output_dir: PathBuf,
    pub db_name: String,
    pub report_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            python: "python3".to_string(),
            scripts_dir: PathBuf::from("run_script"),
            output_dir: PathBuf::from("output"),
            db_name: "annual_reports_quantitative.db".to_string(),
            report_name: "annual_reports_quantitative_analysis.xlsx".to_string(),
        }
    }
}

impl Settings {
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let file = match explicit {
            Some(p) => File::from(p).required(true),
            None => File::with_name("pipeline").required(false),
        };
        let settings = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("ARQ"))
            .build()
            .context("Failed to load pipeline settings")?;
        settings
            .try_deserialize()
            .context("Invalid pipeline settings")
    }

    pub fn db_path(&self) -> PathBuf {
        self.output_dir.join(&self.db_name)
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_paths_live_under_output_dir() {
        let s = Settings::default();
        assert_eq!(s.db_path(), PathBuf::from("output/annual_reports_quantitative.db"));
        assert_eq!(
            s.report_path(),
            PathBuf::from("output/annual_reports_quantitative_analysis.xlsx")
        );
        assert_eq!(s.python, "python3");
    }

    #[test]
    fn explicit_file_overrides_some_fields() {
        let mut f = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(f, "python = \"/usr/bin/python3.11\"\noutput_dir = \"/data/nianbao\"").unwrap();

        let s = Settings::load(Some(f.path())).unwrap();
        assert_eq!(s.python, "/usr/bin/python3.11");
        assert_eq!(s.db_path(), PathBuf::from("/data/nianbao/annual_reports_quantitative.db"));
        // untouched fields keep their defaults
        assert_eq!(s.scripts_dir, PathBuf::from("run_script"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Settings::load(Some(&missing)).is_err());
    }
}
