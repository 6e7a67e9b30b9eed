//! # Version Command Implementation

use anyhow::Result;

/// Execute the version command
pub fn execute() -> Result<()> {
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
