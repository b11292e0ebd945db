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

use itertools::Itertools;

use crate::{
    metrics::MetricKey,
    params::{ParamValue, Parameter},
    plot::Series,
    tree::ResultTree,
};

/// The values chosen for every dimension of a [`ResultTree`], with one dimension plotted on the
/// horizontal axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Sorted, chosen values per dimension. None of them is empty.
    pub values: Vec<Vec<ParamValue>>,
    pub axis: usize,
}

impl Selection {
    pub fn new(values: Vec<Vec<ParamValue>>, axis: usize) -> Self {
        Self { values, axis }
    }

    /// Dimensions, other than the axis, for which more than one value was chosen. Each
    /// combination of their values is drawn as its own series.
    pub fn series_dimensions(&self) -> Vec<usize> {
        (0..self.values.len())
            .filter(|d| *d != self.axis && self.values[*d].len() > 1)
            .collect()
    }

    /// Parameters that are the same for all series.
    pub fn fixed(&self, precedence: &[Parameter]) -> Vec<(Parameter, ParamValue)> {
        precedence
            .iter()
            .zip(self.values.iter())
            .enumerate()
            .filter(|(d, (_, values))| *d != self.axis && values.len() == 1)
            .map(|(_, (p, values))| (*p, values[0].clone()))
            .collect()
    }

    /// The key reached by following the first chosen value of every dimension.
    pub fn first_path(&self) -> Vec<ParamValue> {
        self.values.iter().filter_map(|v| v.first().cloned()).collect()
    }

    /// All combinations of the chosen values of every dimension except the axis.
    pub fn combinations(&self) -> Vec<Vec<ParamValue>> {
        let others = self
            .values
            .iter()
            .enumerate()
            .filter(|(d, _)| *d != self.axis)
            .map(|(_, v)| v.clone())
            .collect_vec();
        if others.is_empty() {
            // the cartesian product of nothing is a single empty combination
            return vec![Vec::new()];
        }
        others.into_iter().multi_cartesian_product().collect()
    }

    /// Full key of the point at `x` on the series `combination`.
    fn path(&self, combination: &[ParamValue], x: &ParamValue) -> Vec<ParamValue> {
        let mut path = combination.to_vec();
        path.insert(self.axis, x.clone());
        path
    }

    /// One series per combination, plotting the mean and standard deviation of `metric` against
    /// every axis value found below the combination in `tree`, in sorted order. Points without
    /// results are skipped, and series without any point are dropped.
    pub fn series(
        &self,
        tree: &ResultTree,
        precedence: &[Parameter],
        metric: &MetricKey,
    ) -> Vec<Series> {
        let named = self.series_dimensions();
        let mut result = Vec::new();

        for combination in self.combinations() {
            let name = named
                .iter()
                .map(|d| {
                    // `combination` does not contain the axis
                    let idx = if *d > self.axis { d - 1 } else { *d };
                    format!("{}={}", precedence[*d], combination[idx])
                })
                .join("; ");

            let mut series = Series {
                name,
                x: Vec::new(),
                y: Vec::new(),
                err: Vec::new(),
            };
            // each series has its own axis values, e.g. algorithms simulated at different beacons
            for x in tree.keys_at(&combination[..self.axis]) {
                if let Some(summary) = tree.get(&self.path(&combination, &x), metric) {
                    series.x.push(x);
                    series.y.push(summary.mean);
                    series.err.push(summary.std);
                }
            }

            if series.is_empty() {
                log::info!("No results for {metric} at {}", series.name);
            } else {
                result.push(series);
            }
        }

        result
    }
}
