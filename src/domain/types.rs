//! Shared domain types.
//!
//! - `IntField`: the bounded integer fields of the form and their domains
//! - `FormRecord`: one submitted form
//! - `FeatureVector`: the fixed-order numeric input of the regression model
//! - `PredictionResult`: the model output for one request

use serde::Serialize;

use crate::domain::storey::encode_storey_range;
use crate::error::PredictError;

/// Integer-valued form fields with closed, contiguous domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntField {
    Month,
    Town,
    FlatType,
    Block,
    StreetName,
    FloorAreaSqm,
    FlatModel,
    LeaseCommenceDate,
    RegYear,
}

impl IntField {
    pub const ALL: [IntField; 9] = [
        IntField::Month,
        IntField::Town,
        IntField::FlatType,
        IntField::Block,
        IntField::StreetName,
        IntField::FloorAreaSqm,
        IntField::FlatModel,
        IntField::LeaseCommenceDate,
        IntField::RegYear,
    ];

    /// Label shown next to the field in the form.
    pub fn label(self) -> &'static str {
        match self {
            IntField::Month => "Month",
            IntField::Town => "Town",
            IntField::FlatType => "Flat_type",
            IntField::Block => "Block",
            IntField::StreetName => "Street_name",
            IntField::FloorAreaSqm => "Floor_area_sqm",
            IntField::FlatModel => "Flat_model",
            IntField::LeaseCommenceDate => "Lease_commence_date",
            IntField::RegYear => "Reg_year",
        }
    }

    /// Inclusive `(min, max)` bounds of the field.
    pub fn bounds(self) -> (u32, u32) {
        match self {
            IntField::Month => (1, 12),
            IntField::Town => (0, 26),
            IntField::FlatType => (0, 6),
            IntField::Block => (1, 999),
            IntField::StreetName => (0, 583),
            IntField::FloorAreaSqm => (28, 306),
            IntField::FlatModel => (1, 12),
            IntField::LeaseCommenceDate => (1966, 2022),
            IntField::RegYear => (1990, 2022),
        }
    }

    pub fn option_count(self) -> usize {
        let (min, max) = self.bounds();
        (max - min) as usize + 1
    }

    pub fn contains(self, value: u32) -> bool {
        let (min, max) = self.bounds();
        (min..=max).contains(&value)
    }

    /// Parse a value and check it against the field's domain.
    pub fn parse_value(self, raw: &str) -> Result<u32, String> {
        let value: u32 = raw
            .trim()
            .parse()
            .map_err(|e| format!("{} must be an integer: {e}", self.label()))?;
        if !self.contains(value) {
            let (min, max) = self.bounds();
            return Err(format!("{} must be in {min}..={max} (got {value})", self.label()));
        }
        Ok(value)
    }
}

/// One submitted form. Field domains are enforced where the record is built
/// (form widget or CLI parser); the predictor does not re-check them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormRecord {
    pub month: u32,
    pub town: u32,
    pub flat_type: u32,
    pub block: u32,
    pub street_name: u32,
    pub storey_range: String,
    pub floor_area_sqm: u32,
    pub flat_model: u32,
    pub lease_commence_date: u32,
    pub reg_year: u32,
}

/// Number of model input features.
pub const FEATURE_COUNT: usize = 10;

/// Feature names in the order the model was trained on.
///
/// `flat_model` comes before `floor_area_sqm` here even though the form shows
/// them the other way round.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "month",
    "town",
    "flat_type",
    "block",
    "street_name",
    "storey_range",
    "flat_model",
    "floor_area_sqm",
    "lease_commence_date",
    "reg_year",
];

/// Position of the encoded storey range in the vector.
pub const STOREY_FEATURE_INDEX: usize = 5;

/// Fixed-order numeric representation of a `FormRecord`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Encode the storey range and assemble the vector.
    pub fn from_record(record: &FormRecord) -> Result<Self, PredictError> {
        let rank = encode_storey_range(&record.storey_range)?;
        Ok(Self::assemble(record, rank))
    }

    /// Assemble the vector from a record and an already-encoded storey rank.
    pub fn assemble(record: &FormRecord, storey_rank: usize) -> Self {
        Self([
            f64::from(record.month),
            f64::from(record.town),
            f64::from(record.flat_type),
            f64::from(record.block),
            f64::from(record.street_name),
            storey_rank as f64,
            f64::from(record.flat_model),
            f64::from(record.floor_area_sqm),
            f64::from(record.lease_commence_date),
            f64::from(record.reg_year),
        ])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn storey_rank(&self) -> usize {
        self.0[STOREY_FEATURE_INDEX] as usize
    }

    /// `name=value` pairs, for logs and debug bundles.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }
}

impl std::fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|v| format!("{v}")).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Predicted resale price (non-negative, finite).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    price: f64,
}

impl PredictionResult {
    pub fn new(price: f64) -> Result<Self, PredictError> {
        if !price.is_finite() {
            return Err(PredictError::inference(format!(
                "model returned a non-finite price ({price})"
            )));
        }
        if price < 0.0 {
            return Err(PredictError::inference(format!(
                "model returned a negative price ({price})"
            )));
        }
        Ok(Self { price })
    }

    pub fn price(&self) -> f64 {
        self.price
    }
}

impl std::fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&crate::report::format_currency(self.price))
    }
}

/// Record used across unit tests.
#[cfg(test)]
pub(crate) fn sample_record() -> FormRecord {
    FormRecord {
        month: 3,
        town: 5,
        flat_type: 2,
        block: 123,
        street_name: 45,
        storey_range: "04 TO 06".to_string(),
        floor_area_sqm: 90,
        flat_model: 3,
        lease_commence_date: 1990,
        reg_year: 2020,
    }
}
