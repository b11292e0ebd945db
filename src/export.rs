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

//! Flatten compiled results into a CSV table.

use std::{io::Write, path::Path};

use crate::tree::{ResultTree, TreeError};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    Tree(#[from] TreeError),
}

/// Write one row per leaf and metric key: the parameter values in precedence order, followed by
/// the metric key and its mean, standard deviation, maximum, and minimum. Returns the number of
/// rows.
pub fn write_csv<W: Write>(tree: &ResultTree, writer: W) -> Result<usize, ExportError> {
    let mut csv = csv::WriterBuilder::new().has_headers(false).from_writer(writer);

    let header = tree
        .precedence()
        .iter()
        .map(ToString::to_string)
        .chain(["metric", "mean", "std", "max", "min"].map(String::from));
    csv.write_record(header)?;

    let mut rows = 0;
    for (key, leaf) in tree.iter() {
        for (metric, summary) in leaf.iter() {
            let record = key
                .iter()
                .map(ToString::to_string)
                .chain([
                    metric.to_string(),
                    summary.mean.to_string(),
                    summary.std.to_string(),
                    summary.max.to_string(),
                    summary.min.to_string(),
                ]);
            csv.write_record(record)?;
            rows += 1;
        }
    }
    csv.flush()?;
    Ok(rows)
}

/// Export the compiled results at `input` into the CSV file `output`.
pub fn export(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<usize, ExportError> {
    let tree = ResultTree::load(input)?;
    let file = std::fs::File::create(output.as_ref())?;
    let rows = write_csv(&tree, file)?;
    log::info!("Wrote {rows} rows to {:?}", output.as_ref());
    Ok(rows)
}
