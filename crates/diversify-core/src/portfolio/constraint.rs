use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DiversifyError;
use crate::DiversifyResult;

/// One term of a linear constraint: `coef × transfer[asset_name]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstrainedAsset {
    pub asset_name: String,
    pub coef: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Leq,
    Geq,
    Eq,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Leq => write!(f, "≤"),
            Operator::Geq => write!(f, "≥"),
            Operator::Eq => write!(f, "="),
        }
    }
}

/// `Σ coef_i · transfer_i <operator> value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub assets: Vec<ConstrainedAsset>,
    pub operator: Operator,
    pub value: Decimal,
}

impl Constraint {
    pub fn new(terms: &[(&str, Decimal)], operator: Operator, value: Decimal) -> Self {
        Self {
            assets: terms
                .iter()
                .map(|(name, coef)| ConstrainedAsset {
                    asset_name: name.to_string(),
                    coef: *coef,
                })
                .collect(),
            operator,
            value,
        }
    }

    pub fn validate(&self) -> DiversifyResult<()> {
        if self.assets.is_empty() {
            return Err(DiversifyError::InvalidInput {
                field: "constraint.assets".into(),
                reason: format!("Constraint '{}' has no terms", self),
            });
        }
        if let Some(term) = self.assets.iter().find(|t| t.coef.is_zero()) {
            return Err(DiversifyError::InvalidInput {
                field: format!("constraint.{}.coef", term.asset_name),
                reason: "Coefficient cannot be 0".into(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.assets.iter().enumerate() {
            let coef = term.coef.normalize();
            let magnitude = coef.abs();
            if i == 0 {
                if coef.is_sign_negative() {
                    write!(f, "-")?;
                }
            } else if coef.is_sign_negative() {
                write!(f, " - ")?;
            } else {
                write!(f, " + ")?;
            }
            if magnitude == Decimal::ONE {
                write!(f, "{}", term.asset_name)?;
            } else {
                write!(f, "{} × {}", magnitude, term.asset_name)?;
            }
        }
        write!(f, " {} {}", self.operator, self.value.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_display() {
        let c = Constraint::new(
            &[("ETF World", dec!(2)), ("Bond Fund", dec!(1)), ("Cash", dec!(-0.5))],
            Operator::Leq,
            dec!(500.00),
        );
        assert_eq!(c.to_string(), "2 × ETF World + Bond Fund - 0.5 × Cash ≤ 500");
    }

    #[test]
    fn test_display_leading_negative() {
        let c = Constraint::new(&[("Cash", dec!(-1))], Operator::Geq, dec!(-100));
        assert_eq!(c.to_string(), "-Cash ≥ -100");
    }

    #[test]
    fn test_zero_coefficient_rejected() {
        let c = Constraint::new(&[("Cash", dec!(0))], Operator::Eq, dec!(0));
        match c.validate() {
            Err(DiversifyError::InvalidInput { reason, .. }) => {
                assert_eq!(reason, "Coefficient cannot be 0")
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_terms_rejected() {
        let c = Constraint::new(&[], Operator::Eq, dec!(0));
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_wire_format() {
        let c: Constraint = serde_json::from_str(
            r#"{"assets": [{"asset_name": "Cash", "coef": 1}], "operator": "geq", "value": 10}"#,
        )
        .unwrap();
        assert_eq!(c.operator, Operator::Geq);
        assert_eq!(c.assets[0].coef, dec!(1));
        assert!(c.validate().is_ok());
    }
}
