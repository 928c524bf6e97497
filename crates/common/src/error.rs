//! Error types shared across Screenlog crates.

/// Top-level error type for Screenlog operations.
#[derive(Debug, thiserror::Error)]
pub enum ScreenlogError {
    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Frame store error: {message}")]
    Store { message: String },

    #[error("Compile error: {message}")]
    Compile { message: String },

    #[error("Encode error: {message}")]
    Encode { message: String },

    #[error("Platform error: {message}")]
    Platform { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ScreenlogError.
pub type ScreenlogResult<T> = Result<T, ScreenlogError>;

impl ScreenlogError {
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store {
            message: msg.into(),
        }
    }

    pub fn compile(msg: impl Into<String>) -> Self {
        Self::Compile {
            message: msg.into(),
        }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode {
            message: msg.into(),
        }
    }

    pub fn platform(msg: impl Into<String>) -> Self {
        Self::Platform {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error represents a cooperative cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_pick_component_variant() {
        assert_eq!(
            ScreenlogError::store("disk full").to_string(),
            "Frame store error: disk full"
        );
        assert!(matches!(
            ScreenlogError::encode("x"),
            ScreenlogError::Encode { .. }
        ));
    }

    #[test]
    fn test_missing_file_surfaces_as_io() {
        let err: ScreenlogError = std::fs::read("/nonexistent/screenlog/frame.jpg")
            .map_err(ScreenlogError::from)
            .unwrap_err();
        assert!(matches!(err, ScreenlogError::Io(_)));
        assert!(!err.is_cancelled());
        assert!(ScreenlogError::Cancelled.is_cancelled());
    }
}
