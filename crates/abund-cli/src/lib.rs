//! Driver library for the abundance table cleaning pipeline.

pub mod logging;
pub mod pipeline;
pub mod types;
