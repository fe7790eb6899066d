//! Per-epoch admission rules.
//!
//! An epoch either evaluates a static rule table (an allow-list plus selector-specific checks on
//! the entry points and the paymaster) or delegates to the on-chain policy oracle. The rule table
//! of every admission version is derived from an [`crate::AddressBook`] by [`rules_for`].

mod allow_list;
mod field;
mod history;
mod rule_set;
mod static_rules;

pub use allow_list::*;
pub use field::*;
pub use history::*;
pub use rule_set::*;
pub use static_rules::*;
