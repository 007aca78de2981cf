//! Channel keys and the per-channel display switches.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A named data stream within a sample.
///
/// On the wire numbered channels are their index as a string (`"0"`, `"1"`),
/// the fixed channels are `"timestamp_diffs"` and `"latencies"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelKey {
    Data(u32),
    TimestampDiffs,
    Latencies,
}

impl ChannelKey {
    pub fn is_data(&self) -> bool {
        matches!(self, ChannelKey::Data(_))
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKey::Data(i) => write!(f, "{i}"),
            ChannelKey::TimestampDiffs => f.write_str("timestamp_diffs"),
            ChannelKey::Latencies => f.write_str("latencies"),
        }
    }
}

impl FromStr for ChannelKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "timestamp_diffs" | "ts_diffs" => Ok(ChannelKey::TimestampDiffs),
            "latencies" => Ok(ChannelKey::Latencies),
            other => other
                .parse::<u32>()
                .map(ChannelKey::Data)
                .map_err(|_| format!("invalid channel key '{other}'")),
        }
    }
}

impl Serialize for ChannelKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChannelKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// What a UI toggle refers to for a given channel: the raw data itself or
/// one of its derived traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Switch {
    Show,
    Avg,
    Stdev,
    Histogram,
}

impl Switch {
    /// Avg and Stdev come from the statistics request.
    pub fn is_stat(&self) -> bool {
        matches!(self, Switch::Avg | Switch::Stdev)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Switch::Show => "show",
            Switch::Avg => "avg",
            Switch::Stdev => "stdev",
            Switch::Histogram => "histogram",
        }
    }
}

/// Key of one trace owned by a dataset: channel plus which of its traces.
///
/// Displays as `0`, `avg0`, `stdev0`, `histogram0`, `timestamp_diffs`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraceKey {
    pub channel: ChannelKey,
    pub switch: Switch,
}

impl TraceKey {
    pub fn primary(channel: ChannelKey) -> Self {
        Self { channel, switch: Switch::Show }
    }

    pub fn new(channel: ChannelKey, switch: Switch) -> Self {
        Self { channel, switch }
    }
}

impl fmt::Display for TraceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.switch {
            Switch::Show => write!(f, "{}", self.channel),
            other => write!(f, "{}{}", other.label(), self.channel),
        }
    }
}

/// Which of a channel's traces are currently shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShownState {
    pub show: bool,
    pub avg: bool,
    pub stdev: bool,
    pub histogram: bool,
}

impl ShownState {
    pub fn with_show(show: bool) -> Self {
        Self { show, ..Default::default() }
    }

    pub fn get(&self, switch: Switch) -> bool {
        match switch {
            Switch::Show => self.show,
            Switch::Avg => self.avg,
            Switch::Stdev => self.stdev,
            Switch::Histogram => self.histogram,
        }
    }

    pub fn set(&mut self, switch: Switch, on: bool) {
        match switch {
            Switch::Show => self.show = on,
            Switch::Avg => self.avg = on,
            Switch::Stdev => self.stdev = on,
            Switch::Histogram => self.histogram = on,
        }
    }

    pub fn flip(&mut self, switch: Switch) -> bool {
        let on = !self.get(switch);
        self.set(switch, on);
        on
    }
}
