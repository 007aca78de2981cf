//! Error taxonomy for the dashboard state manager.
//!
//! Nothing here is fatal to the process: every variant means "the requested
//! visual change did not happen". Callers log the error and keep going.

use crate::data::channel::ChannelKey;
use crate::data::ids::TraceId;
use crate::data::workspace::TabId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DashError {
    #[error("trace {id}: x has {x_len} points but y has {y_len}")]
    ShapeMismatch { id: TraceId, x_len: usize, y_len: usize },

    #[error("unknown trace id {0}")]
    UnknownTrace(TraceId),

    #[error("trace id {0} is already registered")]
    DuplicateTrace(TraceId),

    #[error("period input was cancelled")]
    DialogCancelled,

    #[error("malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("unknown dataset {0}")]
    UnknownDataset(u64),

    #[error("unknown tab {0:?}")]
    UnknownTab(TabId),

    #[error("no tab at position {index} (workspace has {len})")]
    TabIndexOutOfRange { index: usize, len: usize },

    #[error("unknown channel {0} for this dataset")]
    UnknownChannel(ChannelKey),

    #[error("period {value} out of range, expected 2..={max}")]
    InvalidPeriod { value: usize, max: usize },

    #[error("statistics for dataset {0} are still pending")]
    StatsPending(u64),

    #[error("no period dialog is open")]
    NoDialog,

    #[error("backend transport error: {0}")]
    Transport(String),
}

pub type DashResult<T> = Result<T, DashError>;
