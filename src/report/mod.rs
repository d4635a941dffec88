//! Report module - console rendering of search and sweep results

pub mod seed_report;
pub mod threshold_report;

pub use seed_report::*;
pub use threshold_report::*;
