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

//! Collection of the raw metric observations of a single run.

use std::collections::BTreeMap;

use amacad_utils::omnet::RunResults;
use strum::IntoEnumIterator;

use crate::metrics::{Metric, MetricKey, Reduction};

/// Only records of modules whose name contains this are considered.
const NETWORK_MODULE: &str = "net";

/// Raw observations of every metric in a run, in record order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedResults {
    samples: BTreeMap<Metric, Vec<f64>>,
}

impl CollectedResults {
    pub fn samples(&self, metric: Metric) -> &[f64] {
        self.samples.get(&metric).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.samples.values().all(Vec::is_empty)
    }

    fn push(&mut self, metric: Metric, value: f64) {
        self.samples.entry(metric).or_default().push(value);
    }

    /// Reduce the observations of each metric into its mean, maximum, and minimum. Metrics without
    /// any observation produce no entry.
    pub fn collate(&self) -> BTreeMap<MetricKey, f64> {
        self.samples
            .iter()
            .filter(|(_, samples)| !samples.is_empty())
            .flat_map(|(metric, samples)| {
                Reduction::iter()
                    .map(move |r| (MetricKey::new(*metric, r), r.apply(samples)))
            })
            .collect()
    }
}

/// Gather all observations of the network layer in `run`.
///
/// Scalars contribute their value unless it is NaN or infinite. Statistics contribute their `sum`
/// (for cumulative metrics) or their `mean`, and are skipped if they lack any of `count`, `sum`,
/// and `mean`, if they have no samples, or if the value is not finite.
pub fn collect_results(run: &RunResults) -> CollectedResults {
    let mut results = CollectedResults::default();

    for scalar in run
        .scalars
        .iter()
        .filter(|s| s.module.contains(NETWORK_MODULE))
    {
        let Some(metric) = Metric::from_record(&scalar.name) else {
            continue;
        };
        if scalar.value.is_finite() {
            results.push(metric, scalar.value);
        }
    }

    for stat in run
        .statistics
        .iter()
        .filter(|s| s.module.contains(NETWORK_MODULE))
    {
        let Some(metric) = Metric::from_record(&stat.name) else {
            continue;
        };
        let (Some(count), Some(sum), Some(mean)) =
            (stat.field("count"), stat.field("sum"), stat.field("mean"))
        else {
            log::trace!("Skipping statistic {} of {}", stat.name, stat.module);
            continue;
        };
        if count == 0.0 {
            continue;
        }
        let value = if metric.is_cumulative() { sum } else { mean };
        if value.is_finite() {
            results.push(metric, value);
        }
    }

    results
}

/// All metrics with at least one observation.
pub fn observed_metrics(results: &CollectedResults) -> Vec<Metric> {
    Metric::iter()
        .filter(|m| !results.samples(*m).is_empty())
        .collect()
}
