//! Terminal formatting for prediction results and artifact summaries.
//!
//! Formatting lives here so the pipeline stays free of presentation details
//! and the CLI and TUI print prices the same way.

use crate::app::pipeline::PredictionOutput;
use crate::domain::FEATURE_NAMES;
use crate::io::ModelArtifact;

/// Format a price as whole dollars with thousands separators (`$350,000`).
///
/// Rounds half away from zero. Negative inputs keep their sign (`-$12`);
/// the pipeline never produces them but the formatter stays total.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());
    format!("{sign}${}", group_thousands(&digits))
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format the full result of one `rfp predict` run.
pub fn format_prediction(output: &PredictionOutput) -> String {
    let mut out = String::new();

    out.push_str("=== rfp - Resale Flat Price Prediction ===\n");
    out.push_str(&format!(
        "Storey range: {} (rank {})\n",
        output.decoded_storey_range,
        output.features.storey_rank()
    ));
    out.push_str("\nFeatures:\n");
    for (name, value) in output.features.named() {
        out.push_str(&format!("  {name:<20} {value:>8}\n"));
    }
    out.push_str(&format!("\nThe Selling Price is {}\n", output.result));

    out
}

/// One-screen summary of a loaded artifact for `rfp inspect`.
pub fn format_artifact_summary(artifact: &ModelArtifact) -> String {
    let mut out = String::new();

    out.push_str(&format!("Model: {}\n", artifact.model.display_name()));
    if let Some(desc) = &artifact.description {
        out.push_str(&format!("Description: {desc}\n"));
    }
    match artifact.model.n_features() {
        Some(n) => out.push_str(&format!("Features read: {n} (expected {})\n", FEATURE_NAMES.len())),
        None => out.push_str("Features read: none (constant model)\n"),
    }
    let names = match &artifact.feature_names {
        Some(names) => names.join(", "),
        None => "(not recorded)".to_string(),
    };
    out.push_str(&format!("Feature order: {names}\n"));

    out
}
