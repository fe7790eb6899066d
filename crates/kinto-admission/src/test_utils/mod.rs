//! Test utilities for the Kinto admission policy.

mod bytecode;
mod database;
mod fixtures;
mod oracle;

pub use bytecode::*;
pub use database::*;
pub use fixtures::*;
pub use oracle::*;
