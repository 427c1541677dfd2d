//! Ordinal encoding for the storey-range field.
//!
//! The rank of a label is its position in [`STOREY_RANGE_LABELS`]. That list
//! order is what the trained model saw; it is neither numeric nor lexical and
//! must not be re-sorted.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::PredictError;

/// Number of canonical storey-range labels.
pub const STOREY_RANGE_COUNT: usize = 25;

/// Canonical storey-range labels in encoding order (index == rank).
pub const STOREY_RANGE_LABELS: [&str; STOREY_RANGE_COUNT] = [
    "10 TO 12", "04 TO 06", "07 TO 09", "01 TO 03", "13 TO 15",
    "19 TO 21", "16 TO 18", "25 TO 27", "22 TO 24", "28 TO 30",
    "31 TO 33", "40 TO 42", "37 TO 39", "34 TO 36", "06 TO 10",
    "01 TO 05", "11 TO 15", "16 TO 20", "21 TO 25", "26 TO 30",
    "36 TO 40", "31 TO 35", "46 TO 48", "43 TO 45", "49 TO 51",
];

const FIELD: &str = "storey range";

static RANKS: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    STOREY_RANGE_LABELS
        .iter()
        .enumerate()
        .map(|(rank, label)| (*label, rank))
        .collect()
});

/// Rank of `label` in the fixed ordering.
pub fn encode_storey_range(label: &str) -> Result<usize, PredictError> {
    RANKS
        .get(label)
        .copied()
        .ok_or_else(|| PredictError::UnknownCategory {
            field: FIELD,
            label: label.to_string(),
        })
}

/// Label at `rank` in the fixed ordering.
pub fn decode_storey_range(rank: usize) -> Result<&'static str, PredictError> {
    STOREY_RANGE_LABELS
        .get(rank)
        .copied()
        .ok_or_else(|| PredictError::UnknownCategory {
            field: FIELD,
            label: format!("rank {rank}"),
        })
}
