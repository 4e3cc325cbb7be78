use diversify_core::portfolio::PortfolioSnapshot;
use std::io::{self, Read};

/// Snapshot piped on stdin. `None` when stdin is a terminal or carries
/// nothing but whitespace.
pub fn read_snapshot() -> Result<Option<PortfolioSnapshot>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(parse_snapshot(&buffer)?)
}

fn parse_snapshot(text: &str) -> Result<Option<PortfolioSnapshot>, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| format!("stdin is not a portfolio snapshot: {}", e))
}
