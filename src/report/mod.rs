//! Reporting utilities: currency formatting and terminal summaries.

pub mod format;

pub use format::*;
