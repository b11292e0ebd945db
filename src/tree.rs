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

//! The compiled results: an N-dimensional table keyed by one parameter value per dimension of
//! the precedence, with summarized metrics at each leaf.

use std::{collections::BTreeMap, io::Write, path::Path};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    metrics::{MetricKey, Summary},
    params::{ParamValue, Parameter, Process},
};

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Key {key} has {found} values, but the precedence has {expected} dimensions")]
    DepthMismatch {
        key: String,
        expected: usize,
        found: usize,
    },
    #[error("Key {0} has no results")]
    EmptyLeaf(String),
}

/// Settings stored alongside the compiled results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub process: Process,
    /// The dimensions of the results, in key order.
    #[serde(rename = "precidence", alias = "precedence")]
    pub precedence: Vec<Parameter>,
}

impl Settings {
    pub fn new(process: Process) -> Self {
        Self {
            process,
            precedence: process.precedence().to_vec(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(Process::default())
    }
}

/// Summarized metrics of a single parameter combination.
pub type Leaf = BTreeMap<MetricKey, Summary>;

fn fmt_key(key: &[ParamValue]) -> String {
    format!("[{}]", key.iter().join(", "))
}

#[derive(Deserialize)]
struct RawTree {
    #[serde(default)]
    settings: Settings,
    #[serde(with = "amacad_utils::serde::ordered_map")]
    results: BTreeMap<Vec<ParamValue>, Leaf>,
}

impl TryFrom<RawTree> for ResultTree {
    type Error = TreeError;

    fn try_from(raw: RawTree) -> Result<Self, Self::Error> {
        let depth = raw.settings.precedence.len();
        for (key, leaf) in raw.results.iter() {
            if key.len() != depth {
                return Err(TreeError::DepthMismatch {
                    key: fmt_key(key),
                    expected: depth,
                    found: key.len(),
                });
            }
            if leaf.is_empty() {
                return Err(TreeError::EmptyLeaf(fmt_key(key)));
            }
        }
        Ok(Self {
            settings: raw.settings,
            leaves: raw.results,
        })
    }
}

/// Compiled results. Every key has exactly one value per dimension of the precedence, and every
/// leaf contains at least one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTree")]
pub struct ResultTree {
    settings: Settings,
    #[serde(rename = "results", with = "amacad_utils::serde::ordered_map")]
    leaves: BTreeMap<Vec<ParamValue>, Leaf>,
}

impl ResultTree {
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn precedence(&self) -> &[Parameter] {
        &self.settings.precedence
    }

    /// Number of dimensions.
    pub fn depth(&self) -> usize {
        self.settings.precedence.len()
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Sorted, distinct values of the dimension following `prefix`, among all keys starting with
    /// `prefix`.
    pub fn keys_at(&self, prefix: &[ParamValue]) -> Vec<ParamValue> {
        let level = prefix.len();
        if level >= self.depth() {
            return Vec::new();
        }
        self.leaves
            .range(prefix.to_vec()..)
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(prefix))
            .map(|key| key[level].clone())
            .dedup()
            .collect()
    }

    pub fn leaf(&self, path: &[ParamValue]) -> Option<&Leaf> {
        self.leaves.get(path)
    }

    pub fn get(&self, path: &[ParamValue], metric: &MetricKey) -> Option<&Summary> {
        self.leaf(path)?.get(metric)
    }

    /// Sorted metric keys of the leaf at `path`.
    pub fn metrics_at(&self, path: &[ParamValue]) -> Vec<MetricKey> {
        self.leaf(path)
            .map(|leaf| leaf.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Iterate over all leaves in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&Vec<ParamValue>, &Leaf)> {
        self.leaves.iter()
    }

    /// Store the tree at the given file location, overwriting any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TreeError> {
        let serialized = serde_json::to_string(self)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(path)?;
        file.write_all(serialized.as_bytes())?;
        Ok(())
    }

    /// Read a tree from the given file location.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TreeError> {
        let serialized = std::fs::read_to_string(path)?;
        match serde_json::from_str(&serialized) {
            Ok(tree) => Ok(tree),
            Err(e) => {
                log::debug!("{e:?}");
                Err(e.into())
            }
        }
    }
}

/// Buckets the per-run values of all runs, and collapses them into a [`ResultTree`].
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    settings: Settings,
    buckets: BTreeMap<Vec<ParamValue>, BTreeMap<MetricKey, Vec<f64>>>,
}

impl TreeBuilder {
    pub fn new(process: Process) -> Self {
        Self {
            settings: Settings::new(process),
            buckets: BTreeMap::new(),
        }
    }

    /// Append the values of one run to the bucket at `path`. Empty value sets are ignored.
    pub fn push(
        &mut self,
        path: Vec<ParamValue>,
        values: BTreeMap<MetricKey, f64>,
    ) -> Result<(), TreeError> {
        if path.len() != self.settings.precedence.len() {
            return Err(TreeError::DepthMismatch {
                key: fmt_key(&path),
                expected: self.settings.precedence.len(),
                found: path.len(),
            });
        }
        if values.is_empty() {
            log::debug!("Ignoring empty results for {}", fmt_key(&path));
            return Ok(());
        }
        let bucket = self.buckets.entry(path).or_default();
        for (key, value) in values {
            bucket.entry(key).or_default().push(value);
        }
        Ok(())
    }

    /// Collapse every sample list into its [`Summary`].
    pub fn finish(self) -> ResultTree {
        let leaves = self
            .buckets
            .into_iter()
            .map(|(path, bucket)| {
                let leaf: Leaf = bucket
                    .into_iter()
                    .filter_map(|(key, samples)| Some((key, Summary::from_samples(&samples)?)))
                    .collect();
                (path, leaf)
            })
            .filter(|(_, leaf)| !leaf.is_empty())
            .collect();
        ResultTree {
            settings: self.settings,
            leaves,
        }
    }
}
