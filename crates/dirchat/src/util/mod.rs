//! Shared helpers for CLI commands

pub mod session;
pub mod time;
