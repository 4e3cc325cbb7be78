use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::DiversifyError;
use crate::portfolio::Asset;
use crate::types::Rate;
use crate::DiversifyResult;

/// What an allocation statement targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Asset,
    AssetClass,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectType::Asset => write!(f, "asset"),
            ObjectType::AssetClass => write!(f, "asset_class"),
        }
    }
}

/// A target fraction for one asset (within its class) or one class (within
/// the portfolio).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationStatement {
    pub object_type: ObjectType,
    pub object_name: String,
    #[serde(default)]
    pub rate: Option<Rate>,
}

impl AllocationStatement {
    pub fn asset(name: impl Into<String>, rate: Rate) -> Self {
        Self {
            object_type: ObjectType::Asset,
            object_name: name.into(),
            rate: Some(rate),
        }
    }

    pub fn asset_class(name: impl Into<String>, rate: Rate) -> Self {
        Self {
            object_type: ObjectType::AssetClass,
            object_name: name.into(),
            rate: Some(rate),
        }
    }
}

/// Target rates indexed by name, built once per optimization call.
#[derive(Debug, Clone, Default)]
pub struct AllocationTargets {
    assets: HashMap<String, Rate>,
    classes: HashMap<String, Rate>,
}

/// Tolerance used when checking that targets add up to one.
const SUM_TOLERANCE: Decimal = dec!(0.000001);

impl AllocationTargets {
    /// Index statements by (type, name). Later statements override earlier
    /// ones; statements without a rate are left out and fail on lookup.
    pub fn from_statements(statements: &[AllocationStatement]) -> Self {
        let mut targets = Self::default();
        for statement in statements {
            let map = match statement.object_type {
                ObjectType::Asset => &mut targets.assets,
                ObjectType::AssetClass => &mut targets.classes,
            };
            match statement.rate {
                Some(rate) => {
                    map.insert(statement.object_name.clone(), rate);
                }
                None => {
                    map.remove(&statement.object_name);
                }
            }
        }
        targets
    }

    pub fn asset_target(&self, asset_name: &str) -> DiversifyResult<Rate> {
        self.assets
            .get(asset_name)
            .copied()
            .ok_or_else(|| DiversifyError::MissingTarget {
                object_type: ObjectType::Asset.to_string(),
                object_name: asset_name.to_string(),
            })
    }

    pub fn class_target(&self, class_name: &str) -> DiversifyResult<Rate> {
        self.classes
            .get(class_name)
            .copied()
            .ok_or_else(|| DiversifyError::MissingTarget {
                object_type: ObjectType::AssetClass.to_string(),
                object_name: class_name.to_string(),
            })
    }

    /// Report target sets that do not add up to one. Sums are a caller
    /// contract, so these are warnings rather than errors.
    pub fn sum_warnings(&self, assets: &[Asset]) -> Vec<String> {
        let mut warnings = Vec::new();

        let mut class_order: Vec<&str> = Vec::new();
        let mut class_sums: HashMap<&str, Decimal> = HashMap::new();
        for asset in assets {
            if !class_sums.contains_key(asset.class_name.as_str()) {
                class_order.push(&asset.class_name);
            }
            let entry = class_sums.entry(asset.class_name.as_str()).or_insert(Decimal::ZERO);
            if let Some(rate) = self.assets.get(&asset.name) {
                *entry += *rate;
            }
        }
        for class in class_order {
            let sum = class_sums[class];
            if (sum - Decimal::ONE).abs() > SUM_TOLERANCE {
                warnings.push(format!(
                    "Asset targets in class {} sum to {}, not 1",
                    class,
                    sum.normalize()
                ));
            }
        }

        if !self.classes.is_empty() {
            let total: Decimal = self.classes.values().copied().sum();
            if (total - Decimal::ONE).abs() > SUM_TOLERANCE {
                warnings.push(format!(
                    "Asset class targets sum to {}, not 1",
                    total.normalize()
                ));
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statements() -> Vec<AllocationStatement> {
        vec![
            AllocationStatement::asset("ETF World", dec!(0.6)),
            AllocationStatement::asset("ETF EM", dec!(0.4)),
            AllocationStatement::asset("Bond Fund", dec!(1)),
            AllocationStatement::asset_class("stocks", dec!(0.7)),
            AllocationStatement::asset_class("bonds", dec!(0.3)),
        ]
    }

    fn assets() -> Vec<Asset> {
        vec![
            Asset::new("ETF World", "stocks", dec!(1000)),
            Asset::new("ETF EM", "stocks", dec!(200)),
            Asset::new("Bond Fund", "bonds", dec!(500)),
        ]
    }

    #[test]
    fn test_lookup_by_type_and_name() {
        let targets = AllocationTargets::from_statements(&statements());
        assert_eq!(targets.asset_target("ETF EM").unwrap(), dec!(0.4));
        assert_eq!(targets.class_target("bonds").unwrap(), dec!(0.3));
    }

    #[test]
    fn test_asset_and_class_namespaces_are_separate() {
        let targets = AllocationTargets::from_statements(&[AllocationStatement::asset_class(
            "stocks",
            dec!(1),
        )]);
        match targets.asset_target("stocks") {
            Err(DiversifyError::MissingTarget { object_type, .. }) => {
                assert_eq!(object_type, "asset")
            }
            other => panic!("expected MissingTarget, got {:?}", other),
        }
    }

    #[test]
    fn test_statement_without_rate_is_missing() {
        let stmts = vec![AllocationStatement {
            object_type: ObjectType::Asset,
            object_name: "Cash".into(),
            rate: None,
        }];
        let targets = AllocationTargets::from_statements(&stmts);
        assert!(targets.asset_target("Cash").is_err());
    }

    #[test]
    fn test_later_statement_wins() {
        let mut stmts = statements();
        stmts.push(AllocationStatement::asset("ETF EM", dec!(0.25)));
        let targets = AllocationTargets::from_statements(&stmts);
        assert_eq!(targets.asset_target("ETF EM").unwrap(), dec!(0.25));
    }

    #[test]
    fn test_wire_format() {
        let stmt: AllocationStatement = serde_json::from_str(
            r#"{"object_type": "asset_class", "object_name": "bonds", "rate": 0.3}"#,
        )
        .unwrap();
        assert_eq!(stmt.object_type, ObjectType::AssetClass);
        assert_eq!(stmt.rate, Some(dec!(0.3)));
    }

    #[test]
    fn test_consistent_targets_have_no_warnings() {
        let targets = AllocationTargets::from_statements(&statements());
        assert!(targets.sum_warnings(&assets()).is_empty());
    }

    #[test]
    fn test_sum_warnings() {
        let stmts = vec![
            AllocationStatement::asset("ETF World", dec!(0.5)),
            AllocationStatement::asset("ETF EM", dec!(0.4)),
            AllocationStatement::asset("Bond Fund", dec!(1)),
            AllocationStatement::asset_class("stocks", dec!(0.7)),
            AllocationStatement::asset_class("bonds", dec!(0.4)),
        ];
        let warnings = AllocationTargets::from_statements(&stmts).sum_warnings(&assets());
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("class stocks sum to 0.9"));
        assert!(warnings[1].contains("sum to 1.1"));
    }
}
