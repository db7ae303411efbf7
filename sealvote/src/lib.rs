#[macro_use]
extern crate serde;

mod commitment;
mod context;
mod election;
mod error;
mod event;
mod indexer;
mod ledger;
mod primitives;
mod registry;
mod rights;
mod serde_entries;
mod store;
mod transaction;

pub use commitment::*;
pub use context::*;
pub use election::*;
pub use error::*;
pub use event::*;
pub use indexer::*;
pub use ledger::*;
pub use primitives::*;
pub use registry::*;
pub use rights::*;
pub use serde_entries::*;
pub use store::*;
pub use transaction::*;

#[cfg(test)]
mod tests;
