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

//! Charts of a metric against one parameter, and the renderers drawing them.

use std::path::{Path, PathBuf};

use itertools::Itertools;
use plotly::{
    common::{ErrorData, ErrorType, Marker, MarkerSymbol, Mode},
    layout::Axis,
    Plot, Scatter,
};

use crate::{
    metrics::MetricKey,
    params::{ParamValue, Parameter},
};

#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Chart {0} has no data")]
    Empty(String),
}

/// How the series of a chart are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartStyle {
    /// Lines with error bars of one standard deviation.
    ErrorBars,
    /// Lines whose markers cycle through a fixed palette.
    Markers,
}

/// One line of a chart. `err` holds the standard deviation of each point.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub x: Vec<ParamValue>,
    pub y: Vec<f64>,
    pub err: Vec<f64>,
}

impl Series {
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    /// Parameters that are fixed for all series, e.g. `(Algorithm: A; Beacon Interval: 1.0)`.
    pub subtitle: Option<String>,
    pub x_label: String,
    pub y_label: String,
    pub style: ChartStyle,
    pub series: Vec<Series>,
    pub x_range: Option<(f64, f64)>,
    name: String,
}

impl Chart {
    /// Chart of `metric` against `axis`, where `fixed` lists the parameters shared by all series.
    pub fn new(
        metric: MetricKey,
        axis: Parameter,
        fixed: &[(Parameter, ParamValue)],
        style: ChartStyle,
        series: Vec<Series>,
    ) -> Self {
        let subtitle = (!fixed.is_empty()).then(|| {
            format!(
                "({})",
                fixed.iter().map(|(p, v)| format!("{p}: {v}")).join("; ")
            )
        });
        let x_range = match style {
            ChartStyle::ErrorBars => series
                .iter()
                .flat_map(|s| s.x.iter())
                .map(ParamValue::as_f64)
                .collect::<Option<Vec<f64>>>()
                .and_then(|xs| xs.into_iter().reduce(f64::max))
                .map(|max| (0.0, max + 0.1)),
            ChartStyle::Markers => None,
        };
        Self {
            title: format!("{} vs. {}", metric.label(), axis),
            subtitle,
            x_label: axis.label(),
            y_label: metric.axis_label(),
            style,
            series,
            x_range,
            name: format!("{} vs {}", metric.label(), axis),
        }
    }

    /// File name used when the chart is saved, e.g. `Mean_Overhead_vs_Beacon_Interval.html`.
    pub fn file_name(&self) -> String {
        format!("{}.html", self.name.replace(|c: char| c == ' ' || c == '/', "_"))
    }

    /// Location of this chart inside `directory`.
    pub fn file_in(&self, directory: impl AsRef<Path>) -> PathBuf {
        directory.as_ref().join(self.file_name())
    }
}

/// Where a chart is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Display the chart interactively.
    Show,
    File(PathBuf),
}

pub trait Renderer {
    fn render(&mut self, chart: &Chart, target: &Target) -> Result<(), PlotError>;
}

const MARKERS: [MarkerSymbol; 10] = [
    MarkerSymbol::Circle,
    MarkerSymbol::Square,
    MarkerSymbol::Diamond,
    MarkerSymbol::Cross,
    MarkerSymbol::X,
    MarkerSymbol::TriangleUp,
    MarkerSymbol::TriangleDown,
    MarkerSymbol::Pentagon,
    MarkerSymbol::Hexagon,
    MarkerSymbol::Star,
];

/// Renders charts with plotly, either in the browser or into an HTML file.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlotlyRenderer;

impl PlotlyRenderer {
    fn plot(chart: &Chart) -> Plot {
        let mut plot = Plot::new();

        let title = match &chart.subtitle {
            Some(subtitle) => format!("<b>{}</b><br>{subtitle}", chart.title),
            None => format!("<b>{}</b>", chart.title),
        };
        let mut x_axis = Axis::new().title(chart.x_label.clone());
        if let Some((lo, hi)) = chart.x_range {
            x_axis = x_axis.range(vec![lo, hi]);
        }
        plot.set_layout(
            plot.layout()
                .clone()
                .title(title)
                .x_axis(x_axis)
                .y_axis(Axis::new().title(chart.y_label.clone())),
        );

        for (i, series) in chart.series.iter().enumerate() {
            let trace = Scatter::new(series.x.clone(), series.y.clone())
                .name(&series.name)
                .mode(Mode::LinesMarkers);
            let trace = match chart.style {
                ChartStyle::ErrorBars => {
                    trace.error_y(ErrorData::new(ErrorType::Data).array(series.err.clone()))
                }
                ChartStyle::Markers => {
                    trace.marker(Marker::new().symbol(MARKERS[i % MARKERS.len()].clone()))
                }
            };
            plot.add_trace(trace);
        }

        plot
    }
}

impl Renderer for PlotlyRenderer {
    fn render(&mut self, chart: &Chart, target: &Target) -> Result<(), PlotError> {
        if chart.series.iter().all(Series::is_empty) {
            return Err(PlotError::Empty(chart.title.clone()));
        }
        let plot = Self::plot(chart);
        match target {
            Target::Show => plot.show(),
            Target::File(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                plot.write_html(path);
                log::info!("Stored {} at {path:?}", chart.title);
            }
        }
        Ok(())
    }
}

/// Remembers every rendered chart without drawing it.
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    pub charts: Vec<(Chart, Target)>,
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, chart: &Chart, target: &Target) -> Result<(), PlotError> {
        self.charts.push((chart.clone(), target.clone()));
        Ok(())
    }
}
