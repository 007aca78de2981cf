//! Parsed sensor samples as delivered by the backend parser.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::data::channel::ChannelKey;
use crate::error::{DashError, DashResult};

/// One channel's raw values plus their cached range.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelData {
    pub data: Vec<f64>,
    pub min: f64,
    pub max: f64,
}

impl ChannelData {
    /// Wrap raw values and compute min/max over the finite ones.
    ///
    /// A channel without finite values gets the range `[0, 0]`.
    pub fn new(data: Vec<f64>) -> Self {
        let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
        for v in data.iter().copied().filter(|v| v.is_finite()) {
            min = min.min(v);
            max = max.max(v);
        }
        if min > max {
            min = 0.0;
            max = 0.0;
        }
        Self { data, min, max }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A sensor sample after parsing: shared timestamps and one array per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub sensor_name: String,
    pub sensor_id: Option<String>,
    pub timestamps: Vec<f64>,
    /// Numbered data channels only; the fixed channels have their own fields.
    pub data: BTreeMap<ChannelKey, ChannelData>,
    pub timestamp_diffs: ChannelData,
    pub latencies: Option<ChannelData>,
}

impl Sample {
    /// Number of recorded points.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn channel(&self, key: ChannelKey) -> Option<&ChannelData> {
        match key {
            ChannelKey::Data(_) => self.data.get(&key),
            ChannelKey::TimestampDiffs => Some(&self.timestamp_diffs),
            ChannelKey::Latencies => self.latencies.as_ref(),
        }
    }

    /// Every channel of the sample: data channels first, then the fixed ones.
    pub fn channel_keys(&self) -> Vec<ChannelKey> {
        let mut keys: Vec<ChannelKey> = self.data.keys().copied().collect();
        keys.push(ChannelKey::TimestampDiffs);
        if self.latencies.is_some() {
            keys.push(ChannelKey::Latencies);
        }
        keys
    }

    /// Parse one sample from its JSON text.
    pub fn from_json(text: &str) -> DashResult<Self> {
        let raw: RawSample = serde_json::from_str(text)
            .map_err(|e| DashError::MalformedResponse(format!("sample: {e}")))?;
        raw.into_sample()
    }

    /// Parse one sample from an already decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> DashResult<Self> {
        let raw: RawSample = serde_json::from_value(value)
            .map_err(|e| DashError::MalformedResponse(format!("sample: {e}")))?;
        raw.into_sample()
    }
}

/// A channel array either plain or in the parser's `[-1, [values...]]` form,
/// where the first element is a placeholder for a frontend-assigned id.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSeries {
    Plain(Vec<f64>),
    WithPlaceholder(i64, Vec<f64>),
}

impl RawSeries {
    fn into_values(self) -> Vec<f64> {
        match self {
            RawSeries::Plain(v) | RawSeries::WithPlaceholder(_, v) => v,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSample {
    sensor_name: String,
    #[serde(default)]
    sensor_id: Option<serde_json::Value>,
    timestamps: Vec<f64>,
    data: BTreeMap<String, RawSeries>,
    timestamp_diffs: RawSeries,
    #[serde(default)]
    latencies: Option<RawSeries>,
}

impl RawSample {
    fn into_sample(self) -> DashResult<Sample> {
        let n = self.timestamps.len();
        let check = |name: &str, values: Vec<f64>| -> DashResult<ChannelData> {
            if values.len() != n {
                return Err(DashError::MalformedResponse(format!(
                    "channel {name} has {} values for {n} timestamps",
                    values.len()
                )));
            }
            Ok(ChannelData::new(values))
        };

        let mut data = BTreeMap::new();
        for (name, series) in self.data {
            let key = match name.parse::<ChannelKey>() {
                Ok(key @ ChannelKey::Data(_)) => key,
                _ => {
                    return Err(DashError::MalformedResponse(format!(
                        "'{name}' is not a data channel index"
                    )))
                }
            };
            data.insert(key, check(&name, series.into_values())?);
        }
        let timestamp_diffs = check("timestamp_diffs", self.timestamp_diffs.into_values())?;
        // The parser sends an empty list when the file had no latency column.
        let latencies = match self.latencies.map(RawSeries::into_values) {
            Some(v) if !v.is_empty() => Some(check("latencies", v)?),
            _ => None,
        };
        let sensor_id = self.sensor_id.map(|v| match v {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });

        Ok(Sample {
            sensor_name: self.sensor_name,
            sensor_id,
            timestamps: self.timestamps,
            data,
            timestamp_diffs,
            latencies,
        })
    }
}
