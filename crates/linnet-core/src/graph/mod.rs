//! Graph encoding: payload expansion and root reduction.
//!
//! [`ItemGenerator`] turns a nested create payload into flat rows and
//! [`RootNodeReducer`] turns rows back into a root node with its edge
//! fields resolved.

mod generator;
mod reducer;

#[cfg(test)]
mod generator_tests;

pub use generator::{Generated, ItemGenerator};
pub use reducer::{EdgeItem, RootNodeReducer};
