//! CLI command implementations.

pub mod appointment;
pub mod init;
pub mod sequence;
pub mod worker;
