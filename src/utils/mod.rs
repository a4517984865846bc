//! Utility Module Implementation
//! Author: kartik4091
//!
//! Logging setup, the metrics store and char/byte offset helpers.

pub mod logger;
pub mod metrics;
pub mod text;

pub use self::{
    logger::init_logging,
    metrics::{Metrics, MetricsSnapshot},
};
