//! Removal of build outputs, idl compiler artifacts and preparation changes.
//!
//! Every action runs from the configured root folder and stops at its first
//! failing step.

mod action;
mod cleaner;
pub mod remove;

pub use action::CleanupAction;
pub use cleaner::{CleanStats, Cleaner};
