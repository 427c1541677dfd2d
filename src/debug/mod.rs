//! Debug bundle writer for inspecting one prediction request.
//!
//! A bundle is a markdown file with the submitted record, the encoded
//! storey range, the assembled feature vector and the outcome.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::app::pipeline::PredictionOutput;
use crate::domain::{FeatureVector, FormRecord, encode_storey_range};
use crate::error::{AppError, PredictError};

/// What happened for one request, kept around for the `d` key / `--debug-bundle`.
#[derive(Debug, Clone)]
pub struct DebugEntry {
    pub model_path: PathBuf,
    pub record: FormRecord,
    pub outcome: Result<PredictionOutput, PredictError>,
}

pub fn write_debug_bundle(dir: &Path, entry: &DebugEntry) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    let now = Local::now();
    let path = dir.join(format!(
        "rfp_debug_{}_{}.md",
        now.format("%Y%m%d_%H%M%S"),
        now.timestamp_subsec_millis()
    ));

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(4, format!("Failed to create debug file: {e}")))?;
    file.write_all(render_bundle(entry, &now.to_rfc3339()).as_bytes())
        .map_err(|e| AppError::new(4, format!("Failed to write debug bundle: {e}")))?;

    Ok(path)
}

fn render_bundle(entry: &DebugEntry, generated: &str) -> String {
    let mut out = String::new();
    out.push_str("# rfp debug bundle\n");
    out.push_str(&format!("- generated: {generated}\n"));
    out.push_str(&format!("- model_path: {}\n", entry.model_path.display()));

    out.push_str("\n## Record\n");
    match serde_json::to_string_pretty(&entry.record) {
        Ok(json) => out.push_str(&format!("```json\n{json}\n```\n")),
        Err(e) => out.push_str(&format!("(record not serializable: {e})\n")),
    }

    out.push_str("\n## Encoding\n");
    match encode_storey_range(&entry.record.storey_range) {
        Ok(rank) => {
            out.push_str(&format!(
                "- storey_range: \"{}\" -> {rank}\n",
                entry.record.storey_range
            ));
            let features = FeatureVector::assemble(&entry.record, rank);
            out.push_str("\n| feature | value |\n| - | - |\n");
            for (name, value) in features.named() {
                out.push_str(&format!("| {name} | {value} |\n"));
            }
        }
        Err(err) => out.push_str(&format!("- storey_range: {err}\n")),
    }

    out.push_str("\n## Outcome\n");
    match &entry.outcome {
        Ok(output) => {
            out.push_str(&format!("- raw prediction: {}\n", output.result.price()));
            out.push_str(&format!("- displayed: {}\n", output.result));
            out.push_str(&format!(
                "- decoded storey_range: {}\n",
                output.decoded_storey_range
            ));
        }
        Err(err) => {
            out.push_str(&format!("- error kind: {}\n", err.kind()));
            out.push_str(&format!("- message: {err}\n"));
        }
    }

    out
}
