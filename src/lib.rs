//! `resale-flat-price` library crate.
//!
//! The binary (`rfp`) is a thin wrapper around this library so that:
//!
//! - the encode-and-predict pipeline is testable without a terminal
//! - the CLI and the TUI share one code path for predictions

pub mod app;
pub mod cli;
pub mod config;
pub mod debug;
pub mod domain;
pub mod error;
pub mod form;
pub mod io;
pub mod logging;
pub mod models;
pub mod report;
pub mod tui;
