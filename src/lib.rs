//! SDK Harness - build harness for a native multi-platform SDK
//!
//! This crate provides functionality for:
//! - Cleaning build outputs, idl compiler artifacts and preparation changes
//! - Running native unit test executables and summarizing their failures

pub mod cleanup;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod template;
pub mod unittest;
pub mod workdir;

// Re-export commonly used types
pub use config::Config;
pub use error::{HarnessError, Result};
