//! Store-facing building blocks: batch writes, edge queries, hydration and
//! soft deletion.

mod batch_writer;
mod chunk;
mod deletion;
mod edge_query;
mod hydrator;

#[cfg(test)]
mod deletion_tests;
#[cfg(test)]
mod hydrator_tests;

pub use batch_writer::{BatchWriter, RetryPolicy, WriteOutcome};
pub use chunk::chunk;
pub use deletion::{effective_ttl, Deleted, DeletionScanner};
pub use edge_query::{EdgePage, EdgeQuery};
pub use hydrator::{Hydrated, Hydrator};
