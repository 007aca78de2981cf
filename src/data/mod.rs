pub mod channel;
pub mod dataset;
pub mod ids;
pub mod normalize;
pub mod sample;
pub mod stats;
pub mod trace_look;
pub mod traces;
pub mod workspace;
