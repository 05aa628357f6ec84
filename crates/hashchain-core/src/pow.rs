//! Proof-of-work over the squared-difference puzzle.
//!
//! A proof `p` extends a block whose proof is `q` when the SHA-256 hex of the
//! decimal string `p² − q²` starts with `difficulty` zero characters.

use crate::error::{LedgerError, Result};
use crate::hasher::hash_str;
use rayon::prelude::*;
use tracing::debug;

/// Decimal text of `proof² − previous_proof²`, exact over the whole `u64`
/// range. Negative values carry a leading `-`.
pub fn work_operand(proof: u64, previous_proof: u64) -> String {
    let p = u128::from(proof) * u128::from(proof);
    let q = u128::from(previous_proof) * u128::from(previous_proof);
    if p >= q {
        (p - q).to_string()
    } else {
        format!("-{}", q - p)
    }
}

/// First `difficulty` hex characters of the hash of `value`. The whole
/// digest is returned when `difficulty` exceeds its length.
pub fn hash_prefix(value: &str, difficulty: u32) -> String {
    let mut digest = hash_str(value);
    digest.truncate(difficulty as usize);
    digest
}

/// Whether `proof` satisfies the work predicate relative to `previous_proof`.
pub fn is_valid_proof(proof: u64, previous_proof: u64, difficulty: u32) -> bool {
    let prefix = hash_prefix(&work_operand(proof, previous_proof), difficulty);
    prefix.len() == difficulty as usize && prefix.bytes().all(|b| b == b'0')
}

/// Linear search from 1 upward. The first hit is the canonical proof.
///
/// The search has no upper bound; use [`find_proof_bounded`] when the caller
/// needs to give up.
pub fn find_proof(previous_proof: u64, difficulty: u32) -> u64 {
    let mut proof = 1u64;
    while !is_valid_proof(proof, previous_proof, difficulty) {
        proof = proof.wrapping_add(1);
    }
    debug!(previous_proof, difficulty, proof, "proof found");
    proof
}

/// Like [`find_proof`] but stops after `max_attempts` candidates.
pub fn find_proof_bounded(previous_proof: u64, difficulty: u32, max_attempts: u64) -> Result<u64> {
    match (1..=max_attempts).find(|&p| is_valid_proof(p, previous_proof, difficulty)) {
        Some(proof) => {
            debug!(previous_proof, difficulty, proof, "proof found");
            Ok(proof)
        }
        None => Err(LedgerError::SearchAborted {
            previous_proof,
            difficulty,
            attempts: max_attempts,
        }),
    }
}

/// Candidates handed to the pool per round of the parallel search.
pub const PARALLEL_BATCH: u64 = 1 << 16;
/// Upper bound on candidates a single rayon job scans.
pub const PARALLEL_CHUNK: usize = 256;

/// Searches candidate proofs across the rayon pool.
///
/// Candidates are scanned in ascending batches of [`PARALLEL_BATCH`], split
/// into jobs of at most [`PARALLEL_CHUNK`], so every worker takes part in
/// the low range. `find_first` keeps the result identical to [`find_proof`].
pub fn find_proof_parallel(previous_proof: u64, difficulty: u32) -> Result<u64> {
    match search_batches(|p| is_valid_proof(p, previous_proof, difficulty)) {
        Some(proof) => {
            debug!(previous_proof, difficulty, proof, "proof found (parallel)");
            Ok(proof)
        }
        None => Err(LedgerError::SearchAborted {
            previous_proof,
            difficulty,
            attempts: u64::MAX - 1,
        }),
    }
}

/// Lowest candidate in `1..u64::MAX` accepted by `accept`.
fn search_batches<F>(accept: F) -> Option<u64>
where
    F: Fn(u64) -> bool + Sync,
{
    let mut start = 1u64;
    while start < u64::MAX {
        let len = (u64::MAX - start).min(PARALLEL_BATCH);
        let found = (0..len as usize)
            .into_par_iter()
            .with_max_len(PARALLEL_CHUNK)
            .map(|offset| start + offset as u64)
            .find_first(|&p| accept(p));
        if found.is_some() {
            return found;
        }
        start += len;
    }
    None
}

/// Search strategy used when mining a block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Solver {
    #[default]
    Sequential,
    Parallel,
    /// Sequential, giving up after this many candidates.
    Bounded(u64),
}

impl Solver {
    pub fn solve(self, previous_proof: u64, difficulty: u32) -> Result<u64> {
        match self {
            Solver::Sequential => Ok(find_proof(previous_proof, difficulty)),
            Solver::Parallel => find_proof_parallel(previous_proof, difficulty),
            Solver::Bounded(max_attempts) => {
                find_proof_bounded(previous_proof, difficulty, max_attempts)
            }
        }
    }
}
