// src/cli/handlers/mod.rs

pub mod commons;
pub mod init;
pub mod list;
pub mod payloads;
pub mod run;
pub mod scripts;
pub mod version;
