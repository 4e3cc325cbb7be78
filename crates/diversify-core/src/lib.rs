pub mod config;
pub mod error;
pub mod optimization;
pub mod portfolio;
pub mod types;

pub use error::DiversifyError;
pub use types::*;

/// Standard result type for all diversify operations
pub type DiversifyResult<T> = Result<T, DiversifyError>;
