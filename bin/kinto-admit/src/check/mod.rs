//! Check module for evaluating a single transaction against a network's admission policy.

mod cmd;

pub use cmd::*;

// Re-export from common module
pub use crate::common::{load_hex, AdmitError as CheckError, PreStateArgs, Result};
