// AMACAD cluster analysis: Aggregation and exploration of clustering simulation results
// Copyright (C) 2024-2025 The AMACAD analysis authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Compile all runs of a results directory into a [`ResultTree`].

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use amacad_utils::omnet::{enumerate_configs, OmnetError};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::{
    collect::{collect_results, observed_metrics},
    params::Process,
    tree::{ResultTree, TreeBuilder, TreeError},
    util::fmt_elapsed,
};

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Cannot read the results directory: {0}")]
    Omnet(#[from] OmnetError),
    #[error("{0}")]
    Tree(#[from] TreeError),
    #[error("Invalid progress bar template: {0}")]
    Template(#[from] indicatif::style::TemplateError),
}

/// What to compile, and where to store the result.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub directory: PathBuf,
    /// Runs are packed into tar archives.
    pub archived: bool,
    pub process: Process,
    pub output: PathBuf,
}

/// Summary of a compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileReport {
    /// Configurations that match the process mode.
    pub configs: Vec<String>,
    /// Configurations of a different process mode.
    pub ignored_configs: Vec<String>,
    /// Number of runs found for every configuration, including the ignored ones.
    pub found_runs: BTreeMap<String, usize>,
    pub runs: usize,
    /// Runs that could not be read, or whose attributes are incomplete.
    pub skipped_runs: usize,
    pub leaves: usize,
    pub elapsed: Duration,
}

/// Read every run in `directory` belonging to `process`, and aggregate the per-run values of all
/// runs with the same parameters.
pub fn compile_tree(
    directory: impl AsRef<Path>,
    archived: bool,
    process: Process,
    multi: &MultiProgress,
) -> Result<(ResultTree, CompileReport), CompileError> {
    let start = Instant::now();
    let mut report = CompileReport::default();
    let mut builder = TreeBuilder::new(process);

    let mut containers = enumerate_configs(directory, archived)?;
    containers.retain(|config, container| {
        let found = container.run_list().len();
        log::info!("Found {found} runs for {config}.");
        report.found_runs.insert(config.clone(), found);
        if process.accepts(config) {
            report.configs.push(config.clone());
            true
        } else {
            log::info!("Skipping {config}, it is not a {process} configuration.");
            report.ignored_configs.push(config.clone());
            false
        }
    });

    let total: usize = containers.values().map(|c| c.run_list().len()).sum();
    let bar = multi.add(ProgressBar::new(total as u64));
    bar.set_style(ProgressStyle::with_template(
        "{wide_bar} runs: {pos}/{len}, time: {elapsed}, eta: {eta}",
    )?);

    for (config, container) in containers.iter_mut() {
        for run in container.run_list() {
            bar.inc(1);
            report.runs += 1;
            let results = match container.select_run(run) {
                Ok(results) => results,
                Err(e) => {
                    log::warn!("Skipping run #{run} of {config}: {e}");
                    report.skipped_runs += 1;
                    continue;
                }
            };
            let path = match process.key_path(results.run_attributes()) {
                Ok(path) => path,
                Err(e) => {
                    log::warn!("Skipping run #{run} of {config}: {e}");
                    report.skipped_runs += 1;
                    continue;
                }
            };

            let collected = collect_results(results);
            log::debug!(
                "Run #{run} of {config} recorded {:?}",
                observed_metrics(&collected)
            );
            builder.push(path, collected.collate())?;
        }
    }
    bar.finish_and_clear();
    multi.remove(&bar);

    let tree = builder.finish();
    report.leaves = tree.len();
    report.elapsed = start.elapsed();
    Ok((tree, report))
}

/// Compile the results and store them at `options.output`.
pub fn compile(
    options: &CompileOptions,
    multi: &MultiProgress,
) -> Result<CompileReport, CompileError> {
    let (tree, report) = compile_tree(
        &options.directory,
        options.archived,
        options.process,
        multi,
    )?;
    if report.configs.is_empty() {
        log::warn!(
            "No {} configurations found in {:?}",
            options.process,
            options.directory
        );
    }
    tree.save(&options.output)?;
    log::info!(
        "Stored {} parameter combinations from {} runs ({} skipped) in {:?}",
        report.leaves,
        report.runs,
        report.skipped_runs,
        options.output
    );
    log::info!("Analysis time: {}", fmt_elapsed(report.elapsed));
    Ok(report)
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::*;
    use crate::{
        metrics::{Metric, MetricKey, Reduction, Summary},
        params::ParamValue,
    };

    fn sca(config: &str, run: u32, launch: &str, overhead: f64) -> String {
        format!(
            r#"version 2
run {config}-{run}-20240101
attr configname {config}
attr runnumber {run}
attr networkType Amacad
attr launchCfg "xmldoc(\"maps/{launch}.launchd.xml\")"
attr beacon 1
attr initFreshness 5
attr freshThresh 0.5
scalar {config}.node[0].net overhead:sum {overhead}
"#
        )
    }

    #[test]
    fn compile_locations() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("zurich-0.sca"), sca("zurich", 0, "zurich", 10.0)).unwrap();
        fs::write(dir.path().join("zurich-1.sca"), sca("zurich", 1, "zurich", 30.0)).unwrap();
        fs::write(dir.path().join("zurich-2.sca"), "run broken\nscalar x").unwrap();
        fs::write(dir.path().join("grid4-0.sca"), sca("grid4", 0, "grid", 1.0)).unwrap();

        let (tree, report) = compile_tree(
            dir.path(),
            false,
            Process::Location,
            &MultiProgress::new(),
        )
        .unwrap();

        assert_eq!(report.configs, vec!["zurich"]);
        assert_eq!(report.ignored_configs, vec!["grid4"]);
        assert_eq!(
            report.found_runs,
            BTreeMap::from_iter([("grid4".to_string(), 1), ("zurich".to_string(), 3)])
        );
        assert_eq!(report.runs, 3);
        assert_eq!(report.skipped_runs, 1);
        assert_eq!(tree.len(), 1);

        let path: Vec<ParamValue> = vec![
            "zurich".into(),
            "Amacad".into(),
            1.0.into(),
            5.0.into(),
            0.5.into(),
        ];
        assert_eq!(
            tree.get(&path, &MetricKey::new(Metric::Overhead, Reduction::Mean)),
            Some(&Summary::from((20.0, 10.0, 30.0, 10.0)))
        );
    }

    #[test]
    fn compile_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results");
        fs::create_dir(&results).unwrap();
        fs::write(results.join("bern-0.sca"), sca("bern", 0, "bern", 4.0)).unwrap();

        let options = CompileOptions {
            directory: results,
            archived: false,
            process: Process::Location,
            output: dir.path().join("bern.json"),
        };
        let report = compile(&options, &MultiProgress::new()).unwrap();
        assert_eq!(report.leaves, 1);
        let tree = ResultTree::load(&options.output).unwrap();
        assert_eq!(tree.settings().process, Process::Location);
        assert_eq!(tree.keys_at(&[]), vec![ParamValue::from("bern")]);
    }
}
