use hashchain_core::pow::Solver;
use hashchain_core::{Chain, Result};
use tracing::info;

/// Proof written into a block by the `--corrupt` flag.
pub const CORRUPT_PROOF: u64 = 12345;
pub const CORRUPT_TRANSACTION: &str = "tampered";

/// Round-robin mining schedule: every round, each peer mines one block on
/// top of the current tip.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub peers: Vec<String>,
    pub rounds: usize,
    pub txs_per_block: usize,
    pub solver: Solver,
}

impl Simulation {
    pub fn run(&self, chain: &mut Chain) -> Result<()> {
        let mut serial = 0usize;
        for round in 1..=self.rounds {
            info!(round, peers = self.peers.len(), "mining round");
            for peer in &self.peers {
                let txs = (0..self.txs_per_block)
                    .map(|_| {
                        serial += 1;
                        format!("tx{serial}")
                    })
                    .collect();
                chain.mine_block_with(self.solver, peer.as_str(), txs)?;
            }
        }
        Ok(())
    }

    /// Peer name for a user-supplied index, `None` when out of range.
    pub fn peer(&self, index: i64) -> Option<&str> {
        let index = usize::try_from(index).ok()?;
        self.peers.get(index).map(String::as_str)
    }
}

/// Apply the demo corruption to the block at 0-based chain `position`.
/// Negative or out-of-range positions leave the chain untouched.
pub fn corrupt_block(chain: &mut Chain, position: i64) -> bool {
    let Ok(position) = usize::try_from(position) else {
        return false;
    };
    chain.tamper().corrupt(
        position,
        CORRUPT_PROOF,
        vec![CORRUPT_TRANSACTION.to_string()],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim(peers: &[&str], rounds: usize, txs_per_block: usize) -> Simulation {
        Simulation {
            peers: peers.iter().map(|p| p.to_string()).collect(),
            rounds,
            txs_per_block,
            solver: Solver::Sequential,
        }
    }

    #[test]
    fn every_peer_mines_once_per_round() {
        let mut chain = Chain::new(1);
        sim(&["A", "B", "C"], 2, 1).run(&mut chain).unwrap();
        assert_eq!(chain.len(), 7);
        let miners: Vec<&str> = chain.blocks()[1..].iter().map(|b| b.miner.as_str()).collect();
        assert_eq!(miners, ["A", "B", "C", "A", "B", "C"]);
        assert_eq!(chain.is_valid(), (true, vec![]));
    }

    #[test]
    fn transactions_are_numbered_across_blocks() {
        let mut chain = Chain::new(0);
        sim(&["A", "B"], 1, 2).run(&mut chain).unwrap();
        assert_eq!(chain.get(2).unwrap().transactions, ["tx1", "tx2"]);
        assert_eq!(chain.get(3).unwrap().transactions, ["tx3", "tx4"]);
    }

    #[test]
    fn peer_lookup_rejects_bad_indices() {
        let s = sim(&["A", "B"], 1, 1);
        assert_eq!(s.peer(1), Some("B"));
        assert_eq!(s.peer(2), None);
        assert_eq!(s.peer(-1), None);
    }

    #[test]
    fn corrupt_block_flags_target_and_successor() {
        let mut chain = Chain::new(1);
        sim(&["A", "B", "C"], 1, 1).run(&mut chain).unwrap();
        assert!(corrupt_block(&mut chain, 2));
        assert_eq!(chain.get(3).unwrap().proof, CORRUPT_PROOF);
        let (valid, indices) = chain.is_valid();
        assert!(!valid);
        assert!(indices.contains(&3) && indices.contains(&4));
    }

    #[test]
    fn corrupt_block_ignores_out_of_range() {
        let mut chain = Chain::new(1);
        sim(&["A"], 2, 1).run(&mut chain).unwrap();
        assert!(!corrupt_block(&mut chain, -1));
        assert!(!corrupt_block(&mut chain, 1000));
        assert_eq!(chain.is_valid(), (true, vec![]));
    }
}
