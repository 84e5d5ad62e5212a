//! Cross-cutting infrastructure concerns.

pub mod config;
pub mod logging;
