//! Runtime configuration.
//!
//! Sources, highest precedence first:
//! - CLI flags (`--model`)
//! - environment variables (a `.env` file in the working directory is loaded first)
//! - built-in defaults
//!
//! Relative paths are resolved against the working directory.

use std::path::{Path, PathBuf};

use crate::error::AppError;

pub const MODEL_PATH_ENV: &str = "RFP_MODEL_PATH";
pub const LOG_DIR_ENV: &str = "RFP_LOG_DIR";
pub const LOG_LEVEL_ENV: &str = "RFP_LOG_LEVEL";
pub const DEBUG_DIR_ENV: &str = "RFP_DEBUG_DIR";

const DEFAULT_MODEL_PATH: &str = "model.json";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_DEBUG_DIR: &str = "debug";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub debug_dir: PathBuf,
}

impl AppConfig {
    /// Resolve configuration from `.env`, the process environment and the CLI.
    pub fn from_env(cli_model: Option<&Path>) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let cwd = std::env::current_dir()
            .map_err(|e| AppError::new(2, format!("Failed to read working directory: {e}")))?;
        Ok(Self::resolve(cli_model, &cwd, |key| std::env::var(key).ok()))
    }

    /// Pure resolution step, with the environment supplied by `lookup`.
    pub fn resolve(
        cli_model: Option<&Path>,
        cwd: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let env_or = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let model_path = match cli_model {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(env_or(MODEL_PATH_ENV, DEFAULT_MODEL_PATH)),
        };

        Self {
            model_path: absolutize(cwd, model_path),
            log_dir: absolutize(cwd, PathBuf::from(env_or(LOG_DIR_ENV, DEFAULT_LOG_DIR))),
            log_level: env_or(LOG_LEVEL_ENV, DEFAULT_LOG_LEVEL).to_ascii_lowercase(),
            debug_dir: absolutize(cwd, PathBuf::from(env_or(DEBUG_DIR_ENV, DEFAULT_DEBUG_DIR))),
        }
    }
}

fn absolutize(cwd: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_resolve_against_cwd() {
        let cwd = Path::new("/srv/rfp");
        let config = AppConfig::resolve(None, cwd, env(&[]));
        assert_eq!(config.model_path, PathBuf::from("/srv/rfp/model.json"));
        assert_eq!(config.log_dir, PathBuf::from("/srv/rfp/logs"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.debug_dir, PathBuf::from("/srv/rfp/debug"));
    }

    #[test]
    fn environment_overrides_defaults() {
        let cwd = Path::new("/srv/rfp");
        let config = AppConfig::resolve(
            None,
            cwd,
            env(&[
                (MODEL_PATH_ENV, "/models/dt.json"),
                (LOG_LEVEL_ENV, "DEBUG"),
                (LOG_DIR_ENV, "var/log"),
            ]),
        );
        assert_eq!(config.model_path, PathBuf::from("/models/dt.json"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_dir, PathBuf::from("/srv/rfp/var/log"));
    }

    #[test]
    fn cli_flag_wins_over_environment() {
        let cwd = Path::new("/srv/rfp");
        let config = AppConfig::resolve(
            Some(Path::new("local.json")),
            cwd,
            env(&[(MODEL_PATH_ENV, "/models/dt.json")]),
        );
        assert_eq!(config.model_path, PathBuf::from("/srv/rfp/local.json"));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let cwd = Path::new("/srv/rfp");
        let config = AppConfig::resolve(None, cwd, env(&[(MODEL_PATH_ENV, "  ")]));
        assert_eq!(config.model_path, PathBuf::from("/srv/rfp/model.json"));
    }
}
