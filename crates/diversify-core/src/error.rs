use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiversifyError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Missing allocation target for {object_type} '{object_name}'")]
    MissingTarget {
        object_type: String,
        object_name: String,
    },

    #[error("Constraint references unknown asset '{asset_name}'")]
    UnknownConstraintAsset { asset_name: String },

    #[error("Degenerate denominator: {context} has zero total value")]
    DegenerateDenominator { context: String },

    #[error("Optimization failed after {iterations} iterations: {reason}")]
    OptimizationFailed { reason: String, iterations: u32 },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for DiversifyError {
    fn from(e: serde_json::Error) -> Self {
        DiversifyError::SerializationError(e.to_string())
    }
}
