/// Small error vocabulary shared by every layer.
///
/// Public surfaces never propagate these to the page: they are logged and
/// turned into fallbacks (empty series, dropped message, skipped tick).
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    NetworkError(String),
    DecodeError(String),
    RenderingError(String),
    ValidationError(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NetworkError(msg) => write!(f, "Network Error: {}", msg),
            AppError::DecodeError(msg) => write!(f, "Decode Error: {}", msg),
            AppError::RenderingError(msg) => write!(f, "Rendering Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::DecodeError(err.to_string())
    }
}

pub type NetworkResult<T> = Result<T, AppError>;
pub type DecodeResult<T> = Result<T, AppError>;
pub type RenderingResult<T> = Result<T, AppError>;
