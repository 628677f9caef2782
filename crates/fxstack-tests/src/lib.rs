//! Integration test crate for FxStack.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on the core, edit and editor crates to verify they work together.

#[cfg(test)]
mod effect_values;

#[cfg(test)]
mod polling;

#[cfg(test)]
mod stack_editing;
