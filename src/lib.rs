//! Production-readiness analysis for material requirement extracts.
//!
//! Rows of a material study (one line per material per order) are normalized,
//! classified line by line, grouped into projects and suppliers, and
//! summarised. [`analysis::analyze`] runs the whole pass; everything it returns
//! is plain serializable data.

pub mod actions;
pub mod analysis;
pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod inquiry;
pub mod loader;
pub mod logging;
pub mod metrics;
pub mod normalize;
pub mod output;
pub mod projects;
pub mod reports;
pub mod suppliers;
pub mod types;
pub mod util;
pub mod warnings;

pub use analysis::{analyze, Analysis, AnalysisOptions};
pub use error::{AnalysisError, NormalizeError, Result};
