//! Full re-derivation of linkage, work and merkle commitments.

use crate::chain::Chain;
use crate::merkle_root;
use crate::pow::is_valid_proof;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// The independent checks run against each block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    /// `previous_hash` equals the recomputed hash of the predecessor.
    Linkage,
    /// The proof satisfies the work predicate against the predecessor's proof.
    Work,
    /// The stored merkle root matches the block's transactions.
    MerkleRoot,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Check::Linkage => "linkage",
            Check::Work => "work",
            Check::MerkleRoot => "merkle_root",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CheckFailure {
    pub index: u64,
    pub check: Check,
}

/// Outcome of a validation pass. Failures are listed in block order, and
/// within a block in the order linkage, work, merkle root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub failures: Vec<CheckFailure>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// Offending block indices, ascending, each listed once.
    pub fn invalid_indices(&self) -> Vec<u64> {
        let mut indices: Vec<u64> = self.failures.iter().map(|f| f.index).collect();
        indices.dedup();
        indices
    }

    pub fn failed_checks(&self, index: u64) -> Vec<Check> {
        self.failures
            .iter()
            .filter(|f| f.index == index)
            .map(|f| f.check)
            .collect()
    }
}

impl Chain {
    /// Re-derive every commitment in the chain.
    ///
    /// No check short-circuits another; a single pass reports every block
    /// that fails anything. Genesis only has its merkle root checked.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        let mut fail = |index: u64, check: Check| {
            debug!(index, %check, "validation check failed");
            report.failures.push(CheckFailure { index, check });
        };

        if let Some(genesis) = self.blocks.first() {
            if genesis.merkle_root != merkle_root(&genesis.transactions) {
                fail(genesis.index, Check::MerkleRoot);
            }
        }

        for pair in self.blocks.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            if current.previous_hash != previous.hash() {
                fail(current.index, Check::Linkage);
            }
            if !is_valid_proof(current.proof, previous.proof, self.difficulty()) {
                fail(current.index, Check::Work);
            }
            if current.merkle_root != merkle_root(&current.transactions) {
                fail(current.index, Check::MerkleRoot);
            }
        }
        report
    }

    /// `(valid, offending indices)`; indices are ascending and deduplicated.
    pub fn is_valid(&self) -> (bool, Vec<u64>) {
        let report = self.validate();
        (report.is_valid(), report.invalid_indices())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mined_chain(difficulty: u32, blocks: usize) -> Chain {
        let mut chain = Chain::new(difficulty);
        for n in 1..=blocks {
            chain.mine_block(format!("peer-{n}"), vec![format!("tx{n}")]).unwrap();
        }
        chain
    }

    #[test]
    fn fresh_chain_is_valid() {
        let chain = mined_chain(2, 4);
        assert_eq!(chain.is_valid(), (true, vec![]));
        assert!(chain.validate().is_valid());
        assert_eq!(Chain::new(3).is_valid(), (true, vec![]));
    }

    #[test]
    fn bad_link_is_reported() {
        let mut chain = mined_chain(1, 1);
        let proof = crate::pow::find_proof(chain.tip().unwrap().proof, 1);
        chain.append(proof, "deadbeef".into(), "Mallory", vec!["tx".into()]);
        let report = chain.validate();
        assert_eq!(report.failed_checks(3), vec![Check::Linkage]);
        assert_eq!(report.invalid_indices(), vec![3]);
    }

    #[test]
    fn bad_work_is_reported() {
        let mut chain = mined_chain(2, 1);
        let tip = chain.tip().unwrap();
        let (prev_proof, prev_hash) = (tip.proof, tip.hash());
        let bad = (1..)
            .find(|&p| !is_valid_proof(p, prev_proof, 2))
            .unwrap();
        chain.append(bad, prev_hash, "Mallory", vec![]);
        let report = chain.validate();
        assert_eq!(report.failed_checks(3), vec![Check::Work]);
    }

    #[test]
    fn stale_merkle_root_is_reported() {
        let mut chain = mined_chain(1, 2);
        chain.blocks[1].merkle_root = "00".into();
        let report = chain.validate();
        // the changed root also alters block 2's hash, breaking block 3's link
        assert_eq!(report.failed_checks(2), vec![Check::MerkleRoot]);
        assert_eq!(report.failed_checks(3), vec![Check::Linkage]);
        assert_eq!(chain.is_valid(), (false, vec![2, 3]));
    }

    #[test]
    fn tampered_genesis_is_reported() {
        let mut chain = mined_chain(1, 1);
        chain.blocks[0].transactions = vec!["rewritten".into()];
        let report = chain.validate();
        assert_eq!(report.failed_checks(1), vec![Check::MerkleRoot]);
        assert_eq!(report.failed_checks(2), vec![Check::Linkage]);
    }

    #[test]
    fn validation_is_idempotent() {
        let mut chain = mined_chain(1, 3);
        chain.blocks[2].proof = 0;
        assert_eq!(chain.validate(), chain.validate());
        assert_eq!(chain.is_valid(), chain.is_valid());
    }

    #[test]
    fn report_serializes_check_names() {
        let report = ValidationReport {
            failures: vec![CheckFailure {
                index: 4,
                check: Check::MerkleRoot,
            }],
        };
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"{"failures":[{"index":4,"check":"merkle_root"}]}"#);
        assert_eq!(Check::Linkage.to_string(), "linkage");
    }
}
