//! Regression models consumed by the predictor.
//!
//! The predictor only sees the [`Regressor`] trait, so artifacts loaded from
//! disk and test stubs are interchangeable.

pub mod model;

pub use model::*;

use crate::error::PredictError;

/// A trained regression function: one feature vector in, one scalar out.
pub trait Regressor {
    fn predict(&self, features: &[f64]) -> Result<f64, PredictError>;
}

impl<R: Regressor + ?Sized> Regressor for Box<R> {
    fn predict(&self, features: &[f64]) -> Result<f64, PredictError> {
        (**self).predict(features)
    }
}
