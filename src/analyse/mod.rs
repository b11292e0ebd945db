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

//! Interactive exploration of compiled results.
//!
//! A [`Session`] walks the user through the dimensions of a [`ResultTree`] in precedence order.
//! At every level, the user picks one or more values, or marks the level as the horizontal axis
//! of the plot. Afterwards, the user picks the metrics to plot, and the session draws one chart
//! per metric with one series per combination of the values chosen for the remaining
//! dimensions. Input, output, and drawing are all injected, so a session can run without a
//! terminal.

use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use itertools::Itertools;

use crate::{
    metrics::MetricKey,
    params::{ParamValue, Process},
    plot::{Chart, ChartStyle, Renderer, Target},
    tree::ResultTree,
};

mod console;
mod selection;

pub use console::{parse_selection, Choice, Console, PROMPT};
pub use selection::Selection;

#[derive(Debug, thiserror::Error)]
pub enum AnalyseError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

/// How the horizontal axis is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisPolicy {
    /// The user must mark one level with `Use as axis`.
    Explicit,
    /// Without an explicit choice, the axis is the only dimension with several chosen values,
    /// or the user is asked if there are more of them.
    Implicit,
}

/// Presentation of a process mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub style: ChartStyle,
    pub axis: AxisPolicy,
}

impl From<Process> for Profile {
    fn from(process: Process) -> Self {
        match process {
            Process::Location => Self {
                style: ChartStyle::ErrorBars,
                axis: AxisPolicy::Explicit,
            },
            Process::Grid | Process::Highway => Self {
                style: ChartStyle::Markers,
                axis: AxisPolicy::Implicit,
            },
        }
    }
}

const USE_AS_AXIS: &str = "Use as axis";
const TRY_AGAIN: &str = "Do you want to try a different metric? (Y/n)";

/// Partial selection, built while descending through the levels.
#[derive(Debug, Clone, Default)]
struct Draft {
    values: Vec<Vec<ParamValue>>,
    axis: Option<usize>,
}

impl Draft {
    fn prefix(&self) -> Vec<ParamValue> {
        self.values.iter().filter_map(|v| v.first().cloned()).collect()
    }
}

#[derive(Debug)]
enum State {
    SelectDimension(Draft),
    SelectAxis(Draft),
    SelectMetric(Selection),
    Render(Selection, Vec<MetricKey>),
    Done,
}

impl State {
    fn restart() -> Self {
        Self::SelectDimension(Draft::default())
    }
}

/// An interactive exploration of a [`ResultTree`].
pub struct Session<'a, R, W, P> {
    tree: &'a ResultTree,
    console: Console<R, W>,
    renderer: P,
    profile: Profile,
    plot_dir: PathBuf,
    rendered: usize,
}

impl<'a, R: BufRead, W: Write, P: Renderer> Session<'a, R, W, P> {
    pub fn new(
        tree: &'a ResultTree,
        input: R,
        output: W,
        renderer: P,
        plot_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            tree,
            console: Console::new(input, output),
            renderer,
            profile: tree.settings().process.into(),
            plot_dir: plot_dir.into(),
            rendered: 0,
        }
    }

    pub fn renderer(&self) -> &P {
        &self.renderer
    }

    pub fn output(&self) -> &W {
        self.console.output()
    }

    /// Run the session until the user quits or the input ends. Returns the number of charts
    /// drawn.
    pub fn run(&mut self) -> Result<usize, AnalyseError> {
        if self.tree.is_empty() {
            self.console.say("There are no results to analyse.")?;
            return Ok(0);
        }

        let mut state = State::restart();
        loop {
            log::trace!("{state:?}");
            state = match state {
                State::SelectDimension(draft) => self.select_dimension(draft)?,
                State::SelectAxis(draft) => self.select_axis(draft)?,
                State::SelectMetric(selection) => self.select_metric(selection)?,
                State::Render(selection, metrics) => self.render(selection, metrics)?,
                State::Done => break,
            }
        }
        Ok(self.rendered)
    }

    fn select_dimension(&mut self, mut draft: Draft) -> Result<State, AnalyseError> {
        let level = draft.values.len();
        if level == self.tree.depth() {
            return Ok(State::SelectAxis(draft));
        }

        let param = self.tree.precedence()[level];
        let keys = self.tree.keys_at(&draft.prefix());
        if keys.is_empty() {
            return Ok(State::restart());
        }
        let options = keys
            .iter()
            .map(ToString::to_string)
            .chain(std::iter::once(USE_AS_AXIS.to_string()))
            .collect_vec();

        match self.console.menu(&param.label(), &options)? {
            Choice::Quit => Ok(State::Done),
            Choice::Nothing => Ok(State::restart()),
            Choice::Picked(picked) if picked.contains(&keys.len()) => {
                if let Some(axis) = draft.axis {
                    self.console.say(format!(
                        "{} already chosen as axis.",
                        self.tree.precedence()[axis]
                    ))?;
                } else {
                    draft.axis = Some(level);
                    draft.values.push(keys);
                }
                Ok(State::SelectDimension(draft))
            }
            Choice::Picked(picked) => {
                draft
                    .values
                    .push(picked.into_iter().sorted().map(|i| keys[i].clone()).collect());
                Ok(State::SelectDimension(draft))
            }
        }
    }

    fn select_axis(&mut self, draft: Draft) -> Result<State, AnalyseError> {
        if let Some(axis) = draft.axis {
            return Ok(State::SelectMetric(Selection::new(draft.values, axis)));
        }
        if self.profile.axis == AxisPolicy::Explicit {
            self.console
                .say("No dimension was chosen as axis, start again.")?;
            return Ok(State::restart());
        }

        let candidates = (0..draft.values.len())
            .filter(|d| draft.values[*d].len() > 1)
            .collect_vec();
        let axis = match candidates.as_slice() {
            [] => {
                self.console
                    .say("Choose several values of one dimension to plot them, start again.")?;
                return Ok(State::restart());
            }
            [axis] => *axis,
            _ => {
                let options = candidates
                    .iter()
                    .map(|d| self.tree.precedence()[*d].to_string())
                    .collect_vec();
                match self.console.menu("Use as horizontal axis:", &options)? {
                    Choice::Quit => return Ok(State::Done),
                    Choice::Nothing => return Ok(State::restart()),
                    Choice::Picked(picked) => candidates[picked[0]],
                }
            }
        };
        Ok(State::SelectMetric(Selection::new(draft.values, axis)))
    }

    fn select_metric(&mut self, selection: Selection) -> Result<State, AnalyseError> {
        let metrics = self.tree.metrics_at(&selection.first_path());
        if metrics.is_empty() {
            self.console
                .say("There are no results for this selection, start again.")?;
            return Ok(State::restart());
        }
        let options = metrics.iter().map(MetricKey::label).collect_vec();
        match self.console.menu("Metric:", &options)? {
            Choice::Quit | Choice::Nothing => Ok(State::restart()),
            Choice::Picked(picked) => {
                let chosen = picked.into_iter().map(|i| metrics[i]).collect();
                Ok(State::Render(selection, chosen))
            }
        }
    }

    fn render(
        &mut self,
        selection: Selection,
        metrics: Vec<MetricKey>,
    ) -> Result<State, AnalyseError> {
        let precedence = self.tree.precedence();
        let axis = precedence[selection.axis];
        let fixed = selection.fixed(precedence);
        // several charts at once are stored instead of shown
        let store = metrics.len() > 1;

        for metric in metrics.iter() {
            let series = selection.series(self.tree, precedence, metric);
            if series.is_empty() {
                self.console
                    .say(format!("There are no results for {}.", metric.label()))?;
                continue;
            }
            let chart = Chart::new(*metric, axis, &fixed, self.profile.style, series);
            let target = if store {
                Target::File(chart.file_in(&self.plot_dir))
            } else {
                Target::Show
            };
            match self.renderer.render(&chart, &target) {
                Ok(()) => {
                    self.rendered += 1;
                    if let Target::File(path) = &target {
                        self.console.say(format!("Stored {}", path.display()))?;
                    }
                }
                Err(e) => log::warn!("Cannot draw {}: {e}", chart.title),
            }
        }

        if !store && self.console.confirm(TRY_AGAIN)? {
            return Ok(State::SelectMetric(selection));
        }
        Ok(State::restart())
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{
        metrics::{Metric, Reduction},
        plot::RecordingRenderer,
        tree::TreeBuilder,
    };

    fn key(metric: Metric) -> MetricKey {
        MetricKey::new(metric, Reduction::Mean)
    }

    /// Location tree with two algorithms and two beacon intervals at a single location.
    fn tree() -> ResultTree {
        let mut builder = TreeBuilder::new(Process::Location);
        for (algorithm, beacon, value) in [("A", 1.0, 1.0), ("A", 2.0, 2.0), ("B", 1.0, 3.0)] {
            builder
                .push(
                    vec![
                        "zurich".into(),
                        algorithm.into(),
                        beacon.into(),
                        5.0.into(),
                        0.5.into(),
                    ],
                    BTreeMap::from_iter([
                        (key(Metric::Overhead), value),
                        (key(Metric::ClusterSize), value),
                    ]),
                )
                .unwrap();
        }
        builder.finish()
    }

    fn run(tree: &ResultTree, input: &str) -> (usize, Vec<(Chart, Target)>, String) {
        let mut session = Session::new(
            tree,
            input.as_bytes(),
            Vec::new(),
            RecordingRenderer::default(),
            "plots",
        );
        let n = session.run().unwrap();
        let output = String::from_utf8(session.output().clone()).unwrap();
        (n, session.renderer().charts.clone(), output)
    }

    #[test]
    fn quit_immediately() {
        let (n, charts, output) = run(&tree(), "2\n");
        assert_eq!(n, 0);
        assert!(charts.is_empty());
        assert!(output.contains("0.) zurich\n1.) Use as axis\n2.) Quit\n"));
    }

    #[test]
    fn end_of_input() {
        let (n, _, _) = run(&tree(), "");
        assert_eq!(n, 0);
    }

    #[test]
    fn show_single_metric() {
        // location, algorithms A and B, beacon as axis, freshness values, then the first metric
        let input = "0\n0,1\n2\n0\n0\n0\nn\n2\n";
        let (n, charts, output) = run(&tree(), input);
        assert_eq!(n, 1);
        let (chart, target) = &charts[0];
        assert_eq!(target, &Target::Show);
        assert_eq!(chart.title, "Mean Overhead vs. Beacon Interval");
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].name, "Algorithm=A");
        assert_eq!(chart.series[0].y, vec![1.0, 2.0]);
        assert_eq!(chart.series[1].name, "Algorithm=B");
        assert_eq!(chart.series[1].y, vec![3.0]);
        assert_eq!(chart.x_range, Some((0.0, 2.1)));
        assert!(output.contains(TRY_AGAIN));
    }

    #[test]
    fn series_with_own_axis_values() {
        let mut builder = TreeBuilder::new(Process::Location);
        for (algorithm, beacon, value) in [
            ("A", 1.0, 1.0),
            ("A", 2.0, 2.0),
            ("B", 1.0, 3.0),
            ("B", 2.0, 4.0),
            ("B", 3.0, 5.0),
        ] {
            builder
                .push(
                    vec![
                        "zurich".into(),
                        algorithm.into(),
                        beacon.into(),
                        5.0.into(),
                        0.5.into(),
                    ],
                    BTreeMap::from_iter([(key(Metric::Overhead), value)]),
                )
                .unwrap();
        }
        let tree = builder.finish();

        // the axis menu only lists the beacon intervals of algorithm A
        let input = "0\n0,1\n2\n0\n0\n0\nn\n2\n";
        let (n, charts, _) = run(&tree, input);
        assert_eq!(n, 1);
        let series = &charts[0].0.series;
        assert_eq!(series[0].y, vec![1.0, 2.0]);
        assert_eq!(
            series[1].x,
            vec![ParamValue::from(1.0), 2.0.into(), 3.0.into()]
        );
        assert_eq!(series[1].y, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn try_another_metric() {
        let input = "0\n0\n2\n0\n0\n0\n\n1\nn\n2\n";
        let (n, charts, _) = run(&tree(), input);
        assert_eq!(n, 2);
        assert_eq!(charts[0].0.title, "Mean Overhead vs. Beacon Interval");
        assert_eq!(charts[1].0.title, "Mean Cluster Size vs. Beacon Interval");
    }

    #[test]
    fn store_several_metrics() {
        let input = "0\n0\n2\n0\n0\n0,1\n2\n";
        let (n, charts, output) = run(&tree(), input);
        assert_eq!(n, 2);
        assert_eq!(
            charts[0].1,
            Target::File(PathBuf::from("plots/Mean_Overhead_vs_Beacon_Interval.html"))
        );
        assert!(matches!(charts[1].1, Target::File(_)));
        assert!(output.contains("Stored plots/Mean_Cluster_Size_vs_Beacon_Interval.html"));
        // no question after storing
        assert!(!output.contains(TRY_AGAIN));
    }

    #[test]
    fn axis_chosen_twice() {
        // location as axis, then algorithm as axis again (refused), then a valid answer
        let input = "1\n2\n0\n0\n0\n0\n0\nn\n2\n";
        let (n, charts, output) = run(&tree(), input);
        assert!(output.contains("Location already chosen as axis."));
        assert_eq!(n, 1);
        assert_eq!(charts[0].0.title, "Mean Overhead vs. Location");
        assert_eq!(charts[0].0.x_range, None);
    }

    #[test]
    fn explicit_axis_required() {
        let input = "0\n0\n0\n0\n0\n2\n";
        let (n, _, output) = run(&tree(), input);
        assert_eq!(n, 0);
        assert!(output.contains("No dimension was chosen as axis, start again."));
    }

    #[test]
    fn invalid_answer_restarts() {
        let input = "0\nfoo\n2\n";
        let (n, _, output) = run(&tree(), input);
        assert_eq!(n, 0);
        assert_eq!(output.matches("Location\n0.) zurich").count(), 2);
    }
}
