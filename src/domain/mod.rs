//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the form record and its field domains (`FormRecord`, `IntField`)
//! - the storey-range ordinal encoding (`storey`)
//! - the model input and output (`FeatureVector`, `PredictionResult`)

pub mod storey;
pub mod types;

pub use storey::*;
pub use types::*;
