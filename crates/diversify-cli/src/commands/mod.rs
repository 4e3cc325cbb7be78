pub mod optimize;
pub mod validate;

use diversify_core::portfolio::PortfolioSnapshot;

use crate::input;

/// Snapshot from `--input`, or from piped stdin when no path is given.
pub fn load_snapshot(path: &Option<String>) -> Result<PortfolioSnapshot, Box<dyn std::error::Error>> {
    if let Some(ref path) = path {
        input::file::read_json(path)
    } else if let Some(snapshot) = input::stdin::read_snapshot()? {
        Ok(snapshot)
    } else {
        Err("Provide --input file or pipe a snapshot via stdin".into())
    }
}
