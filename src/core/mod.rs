// src/core/mod.rs

pub mod classifier;
pub mod collection;
pub mod discovery;
pub mod env_chain;
pub mod flags;
pub mod link_spec;
pub mod orchestrator;
pub mod phases;
pub mod project;
pub mod rows;
pub mod scaffold;
pub mod sync;
