//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves configuration and starts logging
//! - dispatches to the TUI, a one-shot prediction, or artifact inspection

use clap::Parser;
use log::{info, warn};

use crate::cli::{Command, PredictArgs};
use crate::config::AppConfig;
use crate::debug::{DebugEntry, write_debug_bundle};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `rfp` binary.
pub fn run() -> Result<(), AppError> {
    // `rfp` and `rfp --model x.json` behave like `rfp tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let config = AppConfig::from_env(cli.model.as_deref())?;
    crate::logging::init_logging(&config.log_level, &config.log_dir)?;
    info!(
        "event=config model_path={} debug_dir={}",
        config.model_path.display(),
        config.debug_dir.display()
    );

    match cli.command {
        Command::Tui => crate::tui::run(&config),
        Command::Predict(args) => handle_predict(&config, &args),
        Command::Inspect => handle_inspect(&config),
    }
}

fn handle_predict(config: &AppConfig, args: &PredictArgs) -> Result<(), AppError> {
    let predictor = pipeline::Predictor::from_path(&config.model_path);
    let record = args.to_record();
    let outcome = predictor.predict(&record);

    if args.debug_bundle {
        let entry = DebugEntry {
            model_path: config.model_path.clone(),
            record,
            outcome: outcome.clone(),
        };
        match write_debug_bundle(&config.debug_dir, &entry) {
            Ok(path) => eprintln!("Wrote debug bundle: {}", path.display()),
            Err(err) => {
                warn!("event=debug_bundle status=error detail=\"{}\"", err.message());
                eprintln!("Debug bundle not written: {}", err.message());
            }
        }
    }

    let output = outcome?;
    println!("{}", crate::report::format_prediction(&output));
    Ok(())
}

fn handle_inspect(config: &AppConfig) -> Result<(), AppError> {
    let artifact = crate::io::read_model_json(&config.model_path)?;
    println!("Path: {}", config.model_path.display());
    print!("{}", crate::report::format_artifact_summary(&artifact));
    Ok(())
}

/// Subcommand names, including clap's generated `help`.
const SUBCOMMANDS: [&str; 4] = ["tui", "predict", "inspect", "help"];

/// Rewrite argv so `rfp` defaults to `rfp tui`.
///
/// Rules:
/// - `rfp`                             -> `rfp tui`
/// - `rfp --model m.json`              -> `rfp tui --model m.json`
/// - `rfp --model m.json inspect`      -> unchanged (global flag before a subcommand)
/// - `rfp --help/--version/-h`         -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version");
    if is_top_level_help_or_version {
        return argv;
    }

    if names_subcommand(&argv[1..]) {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

/// Whether a subcommand appears among `args`, skipping the `--model` value.
fn names_subcommand(args: &[String]) -> bool {
    let mut tokens = args.iter();
    while let Some(token) = tokens.next() {
        if token == "--model" {
            tokens.next();
            continue;
        }
        if SUBCOMMANDS.contains(&token.as_str()) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::cli::Cli;
    use crate::domain::sample_record;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_tui() {
        assert_eq!(rewrite_args(args(&["rfp"])), args(&["rfp", "tui"]));
    }

    #[test]
    fn leading_flag_runs_tui() {
        assert_eq!(
            rewrite_args(args(&["rfp", "--model", "m.json"])),
            args(&["rfp", "tui", "--model", "m.json"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(
            rewrite_args(args(&["rfp", "inspect"])),
            args(&["rfp", "inspect"])
        );
        assert_eq!(rewrite_args(args(&["rfp", "--help"])), args(&["rfp", "--help"]));
    }

    #[test]
    fn global_model_flag_before_subcommand_is_untouched() {
        let argv = args(&["rfp", "--model", "m.json", "inspect"]);
        assert_eq!(rewrite_args(argv.clone()), argv);

        let cli = Cli::try_parse_from(rewrite_args(argv)).unwrap();
        assert_eq!(cli.model, Some(PathBuf::from("m.json")));
        assert!(matches!(cli.command, Command::Inspect));
    }

    #[test]
    fn global_model_flag_before_predict_parses() {
        let argv = args(&[
            "rfp", "--model", "m.json", "predict",
            "--month", "3",
            "--town", "5",
            "--flat-type", "2",
            "--block", "123",
            "--street-name", "45",
            "--storey-range", "04 TO 06",
            "--floor-area-sqm", "90",
            "--flat-model", "3",
            "--lease-commence-date", "1990",
            "--reg-year", "2020",
        ]);
        let cli = Cli::try_parse_from(rewrite_args(argv)).unwrap();
        assert_eq!(cli.model, Some(PathBuf::from("m.json")));
        let Command::Predict(predict) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(predict.to_record(), sample_record());
    }

    #[test]
    fn model_file_named_like_a_subcommand_still_runs_tui() {
        let cli = Cli::try_parse_from(rewrite_args(args(&["rfp", "--model", "inspect"]))).unwrap();
        assert_eq!(cli.model, Some(PathBuf::from("inspect")));
        assert!(matches!(cli.command, Command::Tui));
    }

    #[test]
    fn failed_debug_bundle_does_not_hide_prediction() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the debug directory should be.
        let blocked = dir.path().join("not-a-dir");
        std::fs::write(&blocked, b"").unwrap();
        let config = AppConfig {
            model_path: Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/model.json"),
            log_dir: dir.path().join("logs"),
            log_level: "info".to_string(),
            debug_dir: blocked.join("debug"),
        };
        let mut argv = args(&[
            "rfp", "predict",
            "--month", "3",
            "--town", "5",
            "--flat-type", "2",
            "--block", "123",
            "--street-name", "45",
            "--storey-range", "04 TO 06",
            "--floor-area-sqm", "90",
            "--flat-model", "3",
            "--lease-commence-date", "1990",
            "--reg-year", "2020",
        ]);
        argv.push("--debug-bundle".to_string());
        let Command::Predict(predict) = Cli::try_parse_from(argv).unwrap().command else {
            panic!("expected predict");
        };

        assert!(handle_predict(&config, &predict).is_ok());

        // The prediction's own error still wins over the bundle failure.
        let missing = AppConfig {
            model_path: dir.path().join("missing.json"),
            ..config
        };
        let err = handle_predict(&missing, &predict).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("Model unavailable"));
    }
}
