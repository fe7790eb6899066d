//! Schedule module for printing a network's epoch table.

mod cmd;

pub use cmd::*;

// Re-export from common module
pub use crate::common::Result;
