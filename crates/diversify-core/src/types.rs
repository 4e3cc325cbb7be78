use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Asset values and transfer amounts. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Allocation rates expressed as fractions (0.25 = 25%). Never as percentages.
pub type Rate = Decimal;

/// Reporting currency
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    GBP,
    USD,
    #[default]
    EUR,
    CHF,
    JPY,
    CAD,
    AUD,
    Other(String),
}

impl Currency {
    pub fn code(&self) -> &str {
        match self {
            Currency::GBP => "GBP",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::CHF => "CHF",
            Currency::JPY => "JPY",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::Other(code) => code,
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
