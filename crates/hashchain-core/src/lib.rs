pub mod chain;
pub mod constants;
pub mod error;
pub mod hasher;
pub mod pow;
pub mod tamper;
pub mod validate;

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

pub use chain::{BlockView, Chain, ChainConfig};
pub use error::{LedgerError, Result};
pub use hasher::{hash_record, hash_str};
pub use tamper::Tamper;
pub use validate::{Check, CheckFailure, ValidationReport};

/// One link of the chain. Every field takes part in the block hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: u64,
    pub proof: u64,
    pub previous_hash: String,
    pub miner: String,
    pub transactions: Vec<String>,
    pub merkle_root: String,
}

impl Block {
    /// Build a block stamped with the current time. The merkle root is
    /// computed here and stored.
    pub fn new(
        index: u64,
        proof: u64,
        previous_hash: String,
        miner: String,
        transactions: Vec<String>,
    ) -> Self {
        let merkle_root = merkle_root(&transactions);
        Self {
            index,
            timestamp: now_secs(),
            proof,
            previous_hash,
            miner,
            transactions,
            merkle_root,
        }
    }

    /// Hex SHA-256 over the canonical JSON of all fields.
    pub fn hash(&self) -> String {
        hash_record(self)
    }
}

fn now_secs() -> u64 {
    // a clock before 1970 only affects the advisory timestamp
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Merkle commitment over an ordered list of transactions.
///
/// Leaves are the hashes of each transaction string; each level hashes the
/// concatenated hex of adjacent pairs, duplicating the last hash when the
/// level is odd. An empty list commits to the empty string.
pub fn merkle_root<T: AsRef<str>>(txs: &[T]) -> String {
    if txs.is_empty() {
        return String::new();
    }
    let mut level: Vec<String> = txs.iter().map(|t| hash_str(t.as_ref())).collect();

    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for pair in level.chunks(2) {
            let (a, b) = if pair.len() == 2 {
                (&pair[0], &pair[1])
            } else {
                (&pair[0], &pair[0])
            };
            let mut joined = String::with_capacity(a.len() + b.len());
            joined.push_str(a);
            joined.push_str(b);
            next.push(hash_str(&joined));
        }
        level = next;
    }
    level.swap_remove(0)
}
