//! # System Interaction Layer
//!
//! The boundary between the orchestration logic and external processes.
//!
//! ## Modules
//!
//! - **`runner`**: The [`runner::Runner`] abstraction over the collection runner and
//!   its Newman implementation, which spawns `newman run`, waits for it, and
//!   captures its combined output.

pub mod runner;
