//! CLI library components for the lab-result merge pipeline.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod types;
