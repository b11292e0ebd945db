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

//! Utility module collection of functions

use std::{path::Path, time::Duration};

use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;

/// Configuration file for `log4rs`, looked up in the working directory.
pub const LOG_CONFIG: &str = "log4rs.yml";

/// Initialize logging. If `log4rs.yml` exists, it configures the loggers. Otherwise, log lines
/// are printed to stderr at the level given by `RUST_LOG` (`info` by default), without tearing
/// progress bars drawn on the returned [`MultiProgress`].
pub fn init_logging() -> anyhow::Result<MultiProgress> {
    let multi = MultiProgress::new();

    if Path::new(LOG_CONFIG).exists() {
        log4rs::init_file(LOG_CONFIG, Default::default())?;
        return Ok(multi);
    }

    let mut builder = pretty_env_logger::formatted_builder();
    match std::env::var("RUST_LOG") {
        Ok(filters) => builder.parse_filters(&filters),
        Err(_) => builder.filter_level(log::LevelFilter::Info),
    };
    let logger = builder.build();
    let level = logger.filter();
    LogWrapper::new(multi.clone(), logger).try_init()?;
    log::set_max_level(level);

    Ok(multi)
}

/// Format a duration as `h:mm:ss`.
pub fn fmt_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
