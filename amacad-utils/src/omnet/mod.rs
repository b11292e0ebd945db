//! Reader for OMNeT++ scalar result files (`.sca`).
//!
//! A results directory contains one file per simulated run, named `<config>-<run>...`. Each file
//! is either a plain `.sca` file, a gzip-compressed `.sca.gz` file, or (when the campaign packs its
//! runs) a tar archive containing the scalar file. Use [`enumerate_configs`] to discover all
//! configurations of a directory, and [`DataContainer::select_run`] to load a single run.

use std::collections::BTreeMap;

use serde::Serialize;

mod container;
mod parser;

pub use container::{enumerate_configs, DataContainer};
pub use parser::{parse_runs, tokenize};

#[derive(Debug, thiserror::Error)]
pub enum OmnetError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("Parse error in line {line}: {msg}")]
    Parse { line: usize, msg: String },
    #[error("Run #{run} of {config} does not exist.")]
    RunNotFound { config: String, run: u32 },
    #[error("{0} does not contain any run.")]
    NoRuns(String),
    #[error("Archive {0} does not contain a scalar file.")]
    NoScalarFile(String),
    #[error("tar failed on {path}: {stderr}")]
    Tar { path: String, stderr: String },
}

/// A single scalar recorded by a module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scalar {
    pub module: String,
    pub name: String,
    pub value: f64,
}

/// A statistic (or histogram) recorded by a module, with its summary fields such as `count`,
/// `sum`, and `mean`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistic {
    pub module: String,
    pub name: String,
    pub fields: BTreeMap<String, f64>,
    pub attributes: BTreeMap<String, String>,
    /// Histogram bins as `(lower bound, count)`.
    pub bins: Vec<(f64, f64)>,
}

impl Statistic {
    pub fn field(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }
}

/// All results of one simulation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunResults {
    pub run_id: String,
    /// Run attributes, including iteration variables and configuration entries.
    pub attributes: BTreeMap<String, String>,
    /// Parameter assignments as `(pattern, value)`, in file order.
    pub params: Vec<(String, String)>,
    pub scalars: Vec<Scalar>,
    pub statistics: Vec<Statistic>,
}

impl RunResults {
    /// The run number as stored in the `runnumber` attribute.
    pub fn run_number(&self) -> Option<u32> {
        self.attributes.get("runnumber")?.parse().ok()
    }

    pub fn run_attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// List all scalars as `(module, name)`.
    pub fn scalar_list(&self) -> Vec<(&str, &str)> {
        self.scalars
            .iter()
            .map(|s| (s.module.as_str(), s.name.as_str()))
            .collect()
    }

    /// List all statistics as `(module, name)`.
    pub fn statistics_list(&self) -> Vec<(&str, &str)> {
        self.statistics
            .iter()
            .map(|s| (s.module.as_str(), s.name.as_str()))
            .collect()
    }
}
