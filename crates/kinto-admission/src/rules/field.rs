use alloy_primitives::Address;

use crate::calldata::{OperandLocation, Selector};

/// Compares an address embedded in call data against the sender.
///
/// The check applies only when the call data starts with one of `selectors`. If the operand cannot
/// be extracted because the data is too short, the check passes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldCheck {
    /// Selectors the check applies to.
    pub selectors: Vec<Selector>,
    /// Where the address operand lives.
    pub operand: OperandLocation,
}

impl FieldCheck {
    /// Creates a check for `selectors` reading the operand from `operand`.
    pub fn new(selectors: impl IntoIterator<Item = Selector>, operand: OperandLocation) -> Self {
        Self { selectors: selectors.into_iter().collect(), operand }
    }

    /// Returns a copy reading the operand from `operand` instead.
    pub fn with_operand(mut self, operand: OperandLocation) -> Self {
        self.operand = operand;
        self
    }

    /// Returns `true` if the check applies to call data starting with `selector`.
    pub fn applies_to(&self, selector: Option<Selector>) -> bool {
        selector.is_some_and(|selector| self.selectors.contains(&selector))
    }

    /// Returns the embedded address if it is present and differs from `sender`.
    pub fn mismatch(&self, data: &[u8], sender: Address) -> Option<Address> {
        self.operand.extract(data).filter(|operand| *operand != sender)
    }
}

/// A set of selectors, optionally including the empty selector of the fallback function.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectorSet {
    /// Whether call data shorter than a selector is in the set.
    pub fallback: bool,
    /// The concrete selectors in the set.
    pub selectors: Vec<Selector>,
}

impl SelectorSet {
    /// Creates a set of concrete selectors without the fallback.
    pub fn new(selectors: impl IntoIterator<Item = Selector>) -> Self {
        Self { fallback: false, selectors: selectors.into_iter().collect() }
    }

    /// Adds the empty selector to the set.
    pub fn with_fallback(mut self) -> Self {
        self.fallback = true;
        self
    }

    /// Adds `selector` to the set.
    pub fn with(mut self, selector: Selector) -> Self {
        self.selectors.push(selector);
        self
    }

    /// Returns `true` if the set is empty, i.e. matches nothing.
    pub fn is_empty(&self) -> bool {
        !self.fallback && self.selectors.is_empty()
    }

    /// Returns `true` if `selector` is in the set.
    pub fn contains(&self, selector: Option<Selector>) -> bool {
        match selector {
            Some(selector) => self.selectors.contains(&selector),
            None => self.fallback,
        }
    }
}
