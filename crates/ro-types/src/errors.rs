use thiserror::Error;

/// Which instrument setting a design search varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DesignAxis {
    /// Measurement angle (degrees).
    Angle,
    /// Contrast SLD of the bulk medium.
    Contrast,
    /// Underlayer thickness and SLD.
    Underlayer,
}

impl std::fmt::Display for DesignAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Angle => write!(f, "angle"),
            Self::Contrast => write!(f, "contrast"),
            Self::Underlayer => write!(f, "underlayer"),
        }
    }
}

/// Main error type for the refopt system.
#[derive(Error, Debug)]
pub enum DesignError {
    #[error("sample '{sample}' does not support varying the {axis} axis")]
    UnsupportedDesignAxis { sample: String, axis: DesignAxis },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Matrix shape mismatch: expected {expected}x{expected}, got {actual}x{actual}")]
    MatrixShape { expected: usize, actual: usize },

    #[error("Unknown parameter id: {0}")]
    UnknownParameter(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for refopt operations.
pub type DesignResult<T> = Result<T, DesignError>;

/// Macro for creating configuration errors.
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::DesignError::Config(format!($($arg)*))
    };
}
