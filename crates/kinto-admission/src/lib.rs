//! Versioned transaction-admission policy for the Kinto rollup.
//!
//! Before a transaction runs its top-level call or create, [`AdmissionEngine`] picks the epoch
//! active at the block height and decides whether the transaction may execute at all. Early
//! epochs apply static allow-lists and call-data checks; later ones ask an on-chain policy oracle
//! through the [`PolicyOracle`] port. [`transact_bytecode_migration`] implements the one-shot code
//! replacement that runs in the block pipeline next to admission.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod calldata;
pub mod constants;

mod admission;
pub use admission::*;

mod config;
pub use config::*;

mod epoch;
pub use epoch::*;

mod error;
pub use error::*;

mod migration;
pub use migration::*;

mod oracle;
pub use oracle::*;

mod rules;
pub use rules::*;

mod spec;
pub use spec::*;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
