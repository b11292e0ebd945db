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

//! Metrics recorded by the clustering network layer, and their aggregated summaries.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use strum::IntoEnumIterator;

/// A metric recorded by the network layer of each node.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum_macros::EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Metric {
    Overhead,
    HelloOverhead,
    ClusterLifetime,
    ClusterSize,
    HeadChange,
}

impl Metric {
    /// Find the metric recorded under `name`, which may carry a suffix after the first `:` (e.g.
    /// `overhead:sum`).
    pub fn from_record(name: &str) -> Option<Self> {
        name.split(':').next()?.parse().ok()
    }

    pub fn presentation(&self) -> &'static str {
        match self {
            Self::Overhead => "Overhead",
            Self::HelloOverhead => "Hello Overhead",
            Self::ClusterLifetime => "Cluster Lifetime",
            Self::ClusterSize => "Cluster Size",
            Self::HeadChange => "Head Change",
        }
    }

    pub fn unit(&self) -> Option<&'static str> {
        match self {
            Self::Overhead | Self::HelloOverhead => Some("B"),
            Self::ClusterLifetime => Some("s"),
            Self::ClusterSize | Self::HeadChange => None,
        }
    }

    /// Cumulative metrics are taken from the `sum` field of a statistic, all others from its
    /// `mean` field.
    pub fn is_cumulative(&self) -> bool {
        matches!(self, Self::Overhead | Self::HelloOverhead)
    }
}

/// How the samples of a single run are reduced into one value.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum_macros::EnumString,
)]
pub enum Reduction {
    Mean,
    Max,
    Min,
}

impl Reduction {
    pub fn apply(&self, samples: &[f64]) -> f64 {
        match self {
            Self::Mean => Statistics::mean(samples),
            Self::Max => Statistics::max(samples),
            Self::Min => Statistics::min(samples),
        }
    }
}

/// Key of an aggregated value, serialized as `<metric> <reduction>`, e.g. `overhead Mean`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MetricKey {
    pub metric: Metric,
    pub reduction: Reduction,
}

impl MetricKey {
    pub fn new(metric: Metric, reduction: Reduction) -> Self {
        Self { metric, reduction }
    }

    /// All metric keys, ordered by metric, then by reduction.
    pub fn all() -> impl Iterator<Item = Self> {
        Metric::iter().flat_map(|m| Reduction::iter().map(move |r| Self::new(m, r)))
    }

    /// Human readable name, e.g. `Mean Overhead`.
    pub fn label(&self) -> String {
        format!("{} {}", self.reduction, self.metric.presentation())
    }

    /// Label including the unit, e.g. `Mean Overhead (B)`.
    pub fn axis_label(&self) -> String {
        match self.metric.unit() {
            Some(unit) => format!("{} ({unit})", self.label()),
            None => self.label(),
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.metric, self.reduction)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid metric key `{0}`")]
pub struct InvalidMetricKey(pub String);

impl FromStr for MetricKey {
    type Err = InvalidMetricKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidMetricKey(s.to_string());
        let (metric, reduction) = s.split_once(' ').ok_or_else(invalid)?;
        Ok(Self {
            metric: metric.parse().map_err(|_| invalid())?,
            reduction: reduction.parse().map_err(|_| invalid())?,
        })
    }
}

impl From<MetricKey> for String {
    fn from(key: MetricKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for MetricKey {
    type Error = InvalidMetricKey;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Aggregate of all samples of a metric key in one leaf. Serialized as `[mean, std, max, min]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64, f64, f64)", into = "(f64, f64, f64, f64)")]
pub struct Summary {
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub max: f64,
    pub min: f64,
}

impl Summary {
    /// Summarize a sample list. Returns `None` if `samples` is empty.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let std = if samples.len() == 1 {
            0.0
        } else {
            Statistics::population_std_dev(samples)
        };
        Some(Self {
            mean: Statistics::mean(samples),
            std,
            max: Statistics::max(samples),
            min: Statistics::min(samples),
        })
    }
}

impl From<(f64, f64, f64, f64)> for Summary {
    fn from((mean, std, max, min): (f64, f64, f64, f64)) -> Self {
        Self {
            mean,
            std,
            max,
            min,
        }
    }
}

impl From<Summary> for (f64, f64, f64, f64) {
    fn from(s: Summary) -> Self {
        (s.mean, s.std, s.max, s.min)
    }
}
