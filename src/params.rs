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

//! Configuration parameters of a simulation run, and the process modes defining which of them
//! span the dimensions of the compiled results.

use std::{cmp::Ordering, collections::BTreeMap, fmt};

use clap::ValueEnum;
use lazy_static::lazy_static;
use ordered_float::OrderedFloat;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    #[error("Run attribute `{0}` is missing")]
    Missing(&'static str),
    #[error("Run attribute `{attribute}` has the invalid value `{value}`")]
    Invalid {
        attribute: &'static str,
        value: String,
    },
}

/// A configuration parameter that can be used as a dimension of the compiled results.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumIter,
    strum_macros::EnumString,
)]
pub enum Parameter {
    Location,
    #[serde(rename = "Lane Count")]
    #[strum(serialize = "Lane Count")]
    LaneCount,
    #[serde(rename = "Road Length")]
    #[strum(serialize = "Road Length")]
    RoadLength,
    Speed,
    #[serde(rename = "Node Density")]
    #[strum(serialize = "Node Density")]
    NodeDensity,
    Algorithm,
    #[serde(rename = "Beacon Interval")]
    #[strum(serialize = "Beacon Interval")]
    BeaconInterval,
    #[serde(rename = "Initial Freshness")]
    #[strum(serialize = "Initial Freshness")]
    InitialFreshness,
    #[serde(rename = "Freshness Threshold")]
    #[strum(serialize = "Freshness Threshold")]
    FreshnessThreshold,
}

enum Kind {
    Int,
    Float,
    Text,
}

impl Parameter {
    /// Name of the run attribute storing this parameter.
    pub fn attribute(&self) -> &'static str {
        match self {
            Self::Location => "launchCfg",
            Self::LaneCount => "laneCount",
            Self::RoadLength => "roadLength",
            Self::Speed => "speed",
            Self::NodeDensity => "cpd",
            Self::Algorithm => "networkType",
            Self::BeaconInterval => "beacon",
            Self::InitialFreshness => "initFreshness",
            Self::FreshnessThreshold => "freshThresh",
        }
    }

    pub fn unit(&self) -> Option<&'static str> {
        match self {
            Self::RoadLength => Some("m"),
            Self::Speed => Some("m/s"),
            Self::BeaconInterval | Self::InitialFreshness | Self::FreshnessThreshold => Some("s"),
            Self::Location | Self::LaneCount | Self::NodeDensity | Self::Algorithm => None,
        }
    }

    /// Axis label, e.g. `Beacon Interval (s)`.
    pub fn label(&self) -> String {
        match self.unit() {
            Some(unit) => format!("{self} ({unit})"),
            None => self.to_string(),
        }
    }

    fn kind(&self) -> Kind {
        match self {
            Self::LaneCount | Self::RoadLength => Kind::Int,
            Self::Speed
            | Self::NodeDensity
            | Self::BeaconInterval
            | Self::InitialFreshness
            | Self::FreshnessThreshold => Kind::Float,
            Self::Location | Self::Algorithm => Kind::Text,
        }
    }

    /// Read this parameter from the attributes of a run and coerce it to its type.
    pub fn extract(&self, attributes: &BTreeMap<String, String>) -> Result<ParamValue, ParamError> {
        let attribute = self.attribute();
        let raw = attributes
            .get(attribute)
            .ok_or(ParamError::Missing(attribute))?
            .trim();
        let invalid = || ParamError::Invalid {
            attribute,
            value: raw.to_string(),
        };

        match self.kind() {
            Kind::Int => match raw.parse::<i64>() {
                Ok(x) => Ok(ParamValue::Int(x)),
                Err(_) => {
                    let x: f64 = raw.parse().map_err(|_| invalid())?;
                    if x.is_finite() && x.fract() == 0.0 {
                        Ok(ParamValue::Int(x as i64))
                    } else {
                        Err(invalid())
                    }
                }
            },
            Kind::Float => match raw.parse::<f64>() {
                Ok(x) if x.is_finite() => Ok(ParamValue::from(x)),
                _ => Err(invalid()),
            },
            Kind::Text if *self == Self::Location => Ok(ParamValue::Text(location_name(raw))),
            Kind::Text => Ok(ParamValue::Text(raw.to_string())),
        }
    }
}

lazy_static! {
    static ref LAUNCH_CFG: Regex =
        Regex::new(r#"(?P<name>[^/"\\()]+?)(?:\.launchd)?\.xml"#).unwrap();
}

/// Extract the map name from a launch configuration such as `xmldoc("maps/zurich.launchd.xml")`.
/// Values that do not reference an XML file are returned unchanged.
pub fn location_name(launch_cfg: impl AsRef<str>) -> String {
    let launch_cfg = launch_cfg.as_ref();
    LAUNCH_CFG
        .captures(launch_cfg)
        .and_then(|c| c.name("name"))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| launch_cfg.to_string())
}

/// Value of a parameter, used as key of the compiled results.
///
/// Floats are compared by their exact value, so `0.1 + 0.2` and `0.3` are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(OrderedFloat<f64>),
    Text(String),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(x) => Some(*x as f64),
            Self::Float(x) => Some(x.0),
            Self::Text(_) => None,
        }
    }
}

impl From<i64> for ParamValue {
    fn from(x: i64) -> Self {
        Self::Int(x)
    }
}

impl From<f64> for ParamValue {
    fn from(x: f64) -> Self {
        Self::Float(OrderedFloat(x))
    }
}

impl From<&str> for ParamValue {
    fn from(x: &str) -> Self {
        Self::Text(x.to_string())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(x) => write!(f, "{x}"),
            // `Debug` keeps the fractional part of whole numbers (`1.0` instead of `1`)
            Self::Float(x) => write!(f, "{:?}", x.0),
            Self::Text(x) => write!(f, "{x}"),
        }
    }
}

impl Ord for ParamValue {
    /// Numbers are ordered numerically, text in natural order (`map2` < `map10`), and numbers
    /// before text.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.cmp(b),
            (Self::Int(a), Self::Float(b)) => OrderedFloat(*a as f64).cmp(b).then(Ordering::Less),
            (Self::Float(a), Self::Int(b)) => {
                a.cmp(&OrderedFloat(*b as f64)).then(Ordering::Greater)
            }
            (Self::Text(a), Self::Text(b)) => human_sort::compare(a, b).then_with(|| a.cmp(b)),
            (Self::Text(_), _) => Ordering::Greater,
            (_, Self::Text(_)) => Ordering::Less,
        }
    }
}

impl PartialOrd for ParamValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Kind of simulations to process, deciding which parameters span the compiled results.
#[derive(
    ValueEnum,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Process {
    /// Simulations on real maps, identified by their location.
    #[default]
    Location,
    /// Simulations on a Manhattan grid.
    Grid,
    /// Simulations on a straight highway.
    Highway,
}

impl Process {
    /// The ordered dimensions of the compiled results.
    pub fn precedence(&self) -> &'static [Parameter] {
        use Parameter::*;
        match self {
            Self::Grid => &[
                LaneCount,
                RoadLength,
                Algorithm,
                BeaconInterval,
                InitialFreshness,
                FreshnessThreshold,
            ],
            Self::Highway => &[
                LaneCount,
                RoadLength,
                Speed,
                NodeDensity,
                Algorithm,
                BeaconInterval,
                InitialFreshness,
                FreshnessThreshold,
            ],
            Self::Location => &[
                Location,
                Algorithm,
                BeaconInterval,
                InitialFreshness,
                FreshnessThreshold,
            ],
        }
    }

    /// Check whether the configuration `config` simulates this kind of scenario. Grid and highway
    /// configurations carry `grid` and `highway` in their name, everything else is a location.
    pub fn accepts(&self, config: &str) -> bool {
        config.contains("grid") == (*self == Self::Grid)
            && config.contains("highway") == (*self == Self::Highway)
    }

    /// Key path of a run in precedence order.
    pub fn key_path(
        &self,
        attributes: &BTreeMap<String, String>,
    ) -> Result<Vec<ParamValue>, ParamError> {
        self.precedence()
            .iter()
            .map(|p| p.extract(attributes))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn attributes(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_location_name() {
        assert_eq!(location_name(r#"xmldoc("maps/zurich.launchd.xml")"#), "zurich");
        assert_eq!(location_name(r#"xmldoc(\"maps/new.york.launchd.xml\")"#), "new.york");
        assert_eq!(location_name("xmldoc(\"erlangen.xml\")"), "erlangen");
        assert_eq!(location_name("somewhere"), "somewhere");
    }

    #[test]
    fn test_accepts() {
        assert!(Process::Grid.accepts("grid4"));
        assert!(!Process::Grid.accepts("highway2"));
        assert!(!Process::Grid.accepts("zurich"));
        assert!(Process::Highway.accepts("highway2"));
        assert!(!Process::Highway.accepts("grid4"));
        assert!(Process::Location.accepts("zurich"));
        assert!(!Process::Location.accepts("grid4"));
        assert!(!Process::Location.accepts("highway"));
        // names are matched case-sensitively
        assert!(Process::Location.accepts("Grid4"));
    }

    #[test]
    fn test_key_path() {
        let attrs = attributes(&[
            ("networkType", "Amacad"),
            ("laneCount", "2"),
            ("roadLength", "1000.0"),
            ("beacon", "1"),
            ("initFreshness", "5"),
            ("freshThresh", "0.5"),
            ("launchCfg", r#"xmldoc("maps/zurich.launchd.xml")"#),
        ]);

        assert_eq!(
            Process::Grid.key_path(&attrs).unwrap(),
            vec![
                ParamValue::Int(2),
                ParamValue::Int(1000),
                ParamValue::from("Amacad"),
                ParamValue::from(1.0),
                ParamValue::from(5.0),
                ParamValue::from(0.5),
            ]
        );
        assert_eq!(
            Process::Location.key_path(&attrs).unwrap()[0],
            ParamValue::from("zurich")
        );
        assert!(matches!(
            Process::Highway.key_path(&attrs),
            Err(ParamError::Missing("speed"))
        ));

        let bad = attributes(&[("laneCount", "2.5")]);
        assert!(matches!(
            Parameter::LaneCount.extract(&bad),
            Err(ParamError::Invalid { attribute: "laneCount", .. })
        ));
        for value in ["inf", "-inf", "nan"] {
            let bad = attributes(&[("freshThresh", value), ("laneCount", value)]);
            assert!(matches!(
                Parameter::FreshnessThreshold.extract(&bad),
                Err(ParamError::Invalid { attribute: "freshThresh", .. })
            ));
            assert!(Parameter::LaneCount.extract(&bad).is_err());
        }
    }

    #[test]
    fn test_ordering() {
        let mut values = vec![
            ParamValue::from("map10"),
            ParamValue::from(2.5),
            ParamValue::from("map2"),
            ParamValue::Int(1),
            ParamValue::from(0.5),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                ParamValue::from(0.5),
                ParamValue::Int(1),
                ParamValue::from(2.5),
                ParamValue::from("map2"),
                ParamValue::from("map10"),
            ]
        );
        assert_ne!(ParamValue::Int(1), ParamValue::from(1.0));
        assert_ne!(ParamValue::Int(1).cmp(&ParamValue::from(1.0)), Ordering::Equal);
    }

    #[test]
    fn test_display() {
        assert_eq!(ParamValue::from(1.0).to_string(), "1.0");
        assert_eq!(ParamValue::from(0.25).to_string(), "0.25");
        assert_eq!(ParamValue::Int(4).to_string(), "4");
        assert_eq!(Parameter::BeaconInterval.label(), "Beacon Interval (s)");
        assert_eq!(Parameter::LaneCount.to_string(), "Lane Count");
        assert_eq!(
            serde_json::to_string(&Parameter::FreshnessThreshold).unwrap(),
            "\"Freshness Threshold\""
        );
        assert_eq!(Process::Highway.to_string(), "highway");
    }
}
