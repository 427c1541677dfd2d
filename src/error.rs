use std::path::PathBuf;

/// Process-boundary error: an exit code plus a message meant for the user.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures of a single encode-and-predict request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictError {
    /// A categorical label outside its fixed domain.
    #[error("Unknown {field} '{label}'")]
    UnknownCategory { field: &'static str, label: String },

    /// The model artifact could not be read, parsed, or validated.
    #[error("Model unavailable ({}): {reason}", .path.display())]
    ModelUnavailable { path: PathBuf, reason: String },

    /// The model rejected the feature vector or produced an unusable value.
    #[error("Inference failed: {0}")]
    InferenceError(String),
}

impl PredictError {
    pub fn unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn inference(reason: impl Into<String>) -> Self {
        Self::InferenceError(reason.into())
    }

    /// Short, stable tag used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownCategory { .. } => "unknown_category",
            Self::ModelUnavailable { .. } => "model_unavailable",
            Self::InferenceError(_) => "inference_error",
        }
    }

    /// Message shown in the result area of the form.
    pub fn user_message(&self) -> String {
        format!("An error occurred: {self}")
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        let code = match err {
            PredictError::UnknownCategory { .. } | PredictError::ModelUnavailable { .. } => 2,
            PredictError::InferenceError(_) => 4,
        };
        AppError::new(code, err.user_message())
    }
}
