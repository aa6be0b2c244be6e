use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use crate::plan::RunPlan;
use crate::settings::Settings;

/// The five pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    BuildCorpus,
    ExtractKeywords,
    CalculateTfidf,
    CalculateScores,
    GenerateReport,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::BuildCorpus,
        Step::ExtractKeywords,
        Step::CalculateTfidf,
        Step::CalculateScores,
        Step::GenerateReport,
    ];

    pub fn number(self) -> usize {
        match self {
            Step::BuildCorpus => 1,
            Step::ExtractKeywords => 2,
            Step::CalculateTfidf => 3,
            Step::CalculateScores => 4,
            Step::GenerateReport => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Step::BuildCorpus => "Build corpus",
            Step::ExtractKeywords => "Extract keywords",
            Step::CalculateTfidf => "Calculate TF-IDF",
            Step::CalculateScores => "Calculate scores",
            Step::GenerateReport => "Generate Excel report",
        }
    }

    pub fn script(self) -> &'static str {
        match self {
            Step::BuildCorpus => "step1_build_corpus.py",
            Step::ExtractKeywords => "step2_extract_keywords.py",
            Step::CalculateTfidf => "step3_calculate_tfidf.py",
            Step::CalculateScores => "step4_calculate_scores.py",
            Step::GenerateReport => "step5_generate_report.py",
        }
    }

    /// Arguments this step's program accepts, drawn from the run plan.
    /// Only the corpus step takes `--limit`; the report step takes `--output`
    /// instead of a year filter.
    pub fn args(self, plan: &RunPlan) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["--db".into(), plan.db_path.clone().into()];
        match self {
            Step::GenerateReport => {
                args.push("--output".into());
                args.push(plan.report_path.clone().into());
                return args;
            }
            Step::BuildCorpus => {
                if let Some(n) = plan.limit {
                    args.push("--limit".into());
                    args.push(n.to_string().into());
                }
            }
            _ => {}
        }
        if !plan.years.is_empty() {
            args.push("--years".into());
            args.extend(plan.years.iter().map(OsString::from));
        }
        args
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} ({})", self.number(), self.label())
    }
}

/// How step scripts get launched: `<python> <scripts_dir>/<script> ...`.
#[derive(Debug, Clone)]
pub struct Launcher {
    pub python: OsString,
    pub scripts_dir: PathBuf,
}

impl From<&Settings> for Launcher {
    fn from(s: &Settings) -> Self {
        Launcher {
            python: s.python.clone().into(),
            scripts_dir: s.scripts_dir.clone(),
        }
    }
}

/// One fully resolved external call.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub step: Step,
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.program.to_string_lossy().into_owned()];
        parts.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }
}

pub fn plan_invocations(launcher: &Launcher, plan: &RunPlan) -> Vec<Invocation> {
    Step::ALL
        .iter()
        .map(|&step| {
            let mut args: Vec<OsString> = vec![launcher.scripts_dir.join(step.script()).into()];
            args.extend(step.args(plan));
            Invocation {
                step,
                program: launcher.python.clone(),
                args,
            }
        })
        .collect()
}
