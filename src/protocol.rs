//! Wire messages exchanged with the parsing/statistics backend.
//!
//! Responses carry a `type` tag; it is decoded into the closed
//! [`BackendMessage`] sum type so every consumer matches exhaustively.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::channel::ChannelKey;
use crate::data::sample::Sample;
use crate::error::{DashError, DashResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendMessage {
    Upload(UploadPayload),
    Stats(StatsPayload),
}

impl BackendMessage {
    pub fn from_json(text: &str) -> DashResult<Self> {
        serde_json::from_str(text).map_err(|e| DashError::MalformedResponse(e.to_string()))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BackendMessage::Upload(_) => "upload",
            BackendMessage::Stats(_) => "stats",
        }
    }
}

/// `data` is normally a JSON-encoded list of JSON-encoded samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadPayload {
    pub data: UploadData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadData {
    Encoded(String),
    Inline(serde_json::Value),
}

impl UploadPayload {
    /// Decode every sample in the payload. A single bad sample rejects the
    /// whole upload so nothing is half-registered.
    pub fn samples(&self) -> DashResult<Vec<Sample>> {
        let outer = match &self.data {
            UploadData::Encoded(text) => serde_json::from_str::<serde_json::Value>(text)
                .map_err(|e| DashError::MalformedResponse(format!("upload data: {e}")))?,
            UploadData::Inline(value) => value.clone(),
        };
        let entries: Vec<serde_json::Value> = match outer {
            serde_json::Value::Array(items) => items,
            // The parser may key samples by position: {"0": ..., "1": ...}.
            serde_json::Value::Object(map) => {
                let mut keyed: Vec<(String, serde_json::Value)> = map.into_iter().collect();
                keyed.sort_by_key(|(k, _)| k.parse::<u64>().unwrap_or(u64::MAX));
                keyed.into_iter().map(|(_, v)| v).collect()
            }
            other => {
                return Err(DashError::MalformedResponse(format!(
                    "upload data is neither a list nor a map: {other}"
                )))
            }
        };
        entries
            .into_iter()
            .map(|entry| match entry {
                serde_json::Value::String(text) => Sample::from_json(&text),
                value => Sample::from_value(value),
            })
            .collect()
    }
}

/// Body of `POST /stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRequest {
    pub avg_period: usize,
    pub stdev_period: usize,
    pub channels: BTreeMap<ChannelKey, Vec<f64>>,
}

/// Running averages and standard deviations, one series per channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsPayload {
    pub avgs: BTreeMap<ChannelKey, Vec<f64>>,
    pub stdevs: BTreeMap<ChannelKey, Vec<f64>>,
}

impl StatsPayload {
    /// Every channel in `expected` must be present in both maps with `len`
    /// values.
    pub fn validate(&self, expected: &[ChannelKey], len: usize) -> DashResult<()> {
        for key in expected {
            for (what, map) in [("avgs", &self.avgs), ("stdevs", &self.stdevs)] {
                match map.get(key) {
                    None => {
                        return Err(DashError::MalformedResponse(format!(
                            "{what} is missing channel {key}"
                        )))
                    }
                    Some(v) if v.len() != len => {
                        return Err(DashError::MalformedResponse(format!(
                            "{what}[{key}] has {} values, expected {len}",
                            v.len()
                        )))
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }
}
