//! Deliberate in-place corruption of stored blocks.
//!
//! This is the only way to change a block after it has been appended, and
//! everything done through it leaves the chain invalid on purpose. It exists
//! to demonstrate that [`Chain::validate`] localizes tampering.

use crate::chain::Chain;
use crate::error::{LedgerError, Result};
use tracing::warn;

/// Mutable access to already-appended blocks, obtained with [`Chain::tamper`].
pub struct Tamper<'a> {
    chain: &'a mut Chain,
}

impl Chain {
    /// Open the tamper path. Nothing written through the returned handle is
    /// recomputed, so hashes, work and merkle roots go stale.
    pub fn tamper(&mut self) -> Tamper<'_> {
        Tamper { chain: self }
    }
}

impl Tamper<'_> {
    /// Overwrite the proof and transactions of the block at 0-based
    /// `position` (genesis is position 0). The stored merkle root and every
    /// later `previous_hash` are left as they were.
    ///
    /// Returns whether a block was changed; an out-of-range position is
    /// ignored.
    pub fn corrupt(
        &mut self,
        position: usize,
        new_proof: u64,
        new_transactions: Vec<String>,
    ) -> bool {
        self.try_corrupt(position, new_proof, new_transactions).is_ok()
    }

    /// [`Tamper::corrupt`], reporting an out-of-range position as
    /// [`LedgerError::IndexOutOfRange`]. Nothing is changed in that case.
    pub fn try_corrupt(
        &mut self,
        position: usize,
        new_proof: u64,
        new_transactions: Vec<String>,
    ) -> Result<()> {
        let len = self.chain.blocks.len();
        let Some(block) = self.chain.blocks.get_mut(position) else {
            warn!(position, len, "corruption target out of range, ignored");
            return Err(LedgerError::IndexOutOfRange {
                index: position,
                len,
            });
        };
        warn!(
            index = block.index,
            old_proof = block.proof,
            new_proof,
            "corrupting block in place"
        );
        block.proof = new_proof;
        block.transactions = new_transactions;
        Ok(())
    }
}
