// src/cli/handlers/version.rs

use anyhow::Result;
use std::path::Path;

pub fn handle(_args: Vec<String>, _root: &Path) -> Result<()> {
    println!("plaintest {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
