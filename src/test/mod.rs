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

//! End-to-end tests, from scalar files on disk to compiled results and interactive sessions.

use std::{fs, path::Path};

use indicatif::{MultiProgress, ProgressDrawTarget};

use crate::{compile::compile_tree, params::Process, tree::ResultTree};

/// Write a scalar file for run `run` of `config`, with the given run attributes and records.
pub fn write_run(dir: &Path, config: &str, run: u32, attributes: &[(&str, String)], records: &str) {
    let mut content = format!("version 2\nrun {config}-{run}-20240101\nattr runnumber {run}\n");
    for (key, value) in attributes {
        let value = value.replace('\\', "\\\\").replace('"', "\\\"");
        content.push_str(&format!("attr {key} \"{value}\"\n"));
    }
    content.push_str(records);
    fs::write(dir.join(format!("{config}-{run}.sca")), content).unwrap();
}

/// Attributes of a grid run.
pub fn grid_attributes(algorithm: &str, beacon: f64) -> Vec<(&'static str, String)> {
    vec![
        ("networkType", algorithm.to_string()),
        ("laneCount", "2".to_string()),
        ("roadLength", "1000".to_string()),
        ("beacon", beacon.to_string()),
        ("initFreshness", "5".to_string()),
        ("freshThresh", "0.5".to_string()),
    ]
}

/// A single scalar record of the network layer.
pub fn scalar(name: &str, value: f64) -> String {
    format!("scalar Net.node[0].net {name} {value}\n")
}

/// Compile `dir` without drawing progress bars.
pub fn compile_dir(dir: &Path, process: Process) -> ResultTree {
    let multi = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
    compile_tree(dir, false, process, &multi).unwrap().0
}
