// src/cli/handlers/scripts.rs

use anyhow::Result;
use std::path::Path;

use super::commons::{self, SyncTarget};

/// `scripts pull|push <collection>`: event scripts as `.js` files.
pub fn handle(args: Vec<String>, root: &Path) -> Result<()> {
    commons::handle_sync(args, root, SyncTarget::Scripts)
}
