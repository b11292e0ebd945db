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

//! Library for aggregating and exploring the results of AMACAD clustering simulations.
//!
//! Simulation runs are compiled into a [`tree::ResultTree`], indexed by the configuration
//! parameters of a process mode, and then explored interactively with an [`analyse::Session`].

pub mod analyse;
pub mod collect;
pub mod compile;
pub mod export;
pub mod metrics;
pub mod params;
pub mod plot;
pub mod tree;
pub mod util;

#[cfg(test)]
mod test;

pub mod prelude {
    pub use super::{
        analyse::Session,
        metrics::{Metric, MetricKey, Reduction, Summary},
        params::{ParamValue, Parameter, Process},
        tree::{ResultTree, TreeBuilder},
    };
}
