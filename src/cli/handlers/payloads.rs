// src/cli/handlers/payloads.rs

use anyhow::Result;
use std::path::Path;

use super::commons::{self, SyncTarget};

/// `payloads pull|push <collection>`: raw JSON request bodies as `.json` files.
pub fn handle(args: Vec<String>, root: &Path) -> Result<()> {
    commons::handle_sync(args, root, SyncTarget::Payloads)
}
