//! Report module - summarizing training results

pub mod selection_report;
pub mod summary;

pub use selection_report::*;
pub use summary::*;
