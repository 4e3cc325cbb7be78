pub mod allocation;
pub mod asset;
pub mod constraint;
pub mod snapshot;

pub use allocation::{AllocationStatement, AllocationTargets, ObjectType};
pub use asset::Asset;
pub use constraint::{ConstrainedAsset, Constraint, Operator};
pub use snapshot::PortfolioSnapshot;
