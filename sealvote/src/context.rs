use crate::*;

/// Execution context of a single transaction
///
/// The ledger fills this in once per transaction. Operations read the clock
/// from here and nowhere else, so every phase check within one operation
/// sees the same instant.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CallContext {
    /// Authenticated sender of the transaction
    pub sender: Address,

    /// Timestamp of the enclosing block
    pub now: Timestamp,

    pub block_height: u64,
    pub tx_hash: Hash32,
}

impl CallContext {
    pub fn new(sender: Address, now: Timestamp) -> Self {
        CallContext {
            sender,
            now,
            block_height: 0,
            tx_hash: Hash32::ZERO,
        }
    }
}
