//! In-memory, append-only chain of blocks.

use crate::constants::{
    DEFAULT_DIFFICULTY, GENESIS_MINER, GENESIS_PREVIOUS_HASH, GENESIS_PROOF, GENESIS_TRANSACTION,
};
use crate::error::{LedgerError, Result};
use crate::pow::Solver;
use crate::Block;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Settings fixed for the lifetime of a chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Leading zero hex characters every proof must produce.
    pub difficulty: u32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
        }
    }
}

/// A block as presented to readers, with its hash computed on demand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockView {
    #[serde(flatten)]
    pub block: Block,
    pub current_hash: String,
}

/// Owns the block sequence. Blocks are 1-indexed; block 1 is genesis.
///
/// Appends are not validated. Integrity is established after the fact by
/// [`Chain::validate`].
#[derive(Clone, Debug)]
pub struct Chain {
    pub(crate) blocks: Vec<Block>,
    difficulty: u32,
}

impl Chain {
    /// Create a chain holding only the genesis block.
    pub fn new(difficulty: u32) -> Self {
        let mut chain = Self {
            blocks: Vec::new(),
            difficulty,
        };
        chain.append(
            GENESIS_PROOF,
            GENESIS_PREVIOUS_HASH.to_string(),
            GENESIS_MINER,
            vec![GENESIS_TRANSACTION.to_string()],
        );
        chain
    }

    pub fn with_config(config: ChainConfig) -> Self {
        Self::new(config.difficulty)
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Look up a block by its 1-based index.
    pub fn get(&self, index: u64) -> Option<&Block> {
        let position = usize::try_from(index.checked_sub(1)?).ok()?;
        self.blocks.get(position)
    }

    /// The most recently appended block.
    pub fn tip(&self) -> Result<&Block> {
        self.blocks.last().ok_or(LedgerError::EmptyChain)
    }

    /// Append a block at index `len + 1`. The merkle root is derived from
    /// `transactions`; `proof` and `previous_hash` are stored as given.
    pub fn append(
        &mut self,
        proof: u64,
        previous_hash: String,
        miner: impl Into<String>,
        transactions: Vec<String>,
    ) -> &Block {
        let position = self.blocks.len();
        let block = Block::new(
            position as u64 + 1,
            proof,
            previous_hash,
            miner.into(),
            transactions,
        );
        info!(
            index = block.index,
            miner = %block.miner,
            proof = block.proof,
            txs = block.transactions.len(),
            "block appended"
        );
        self.blocks.push(block);
        &self.blocks[position]
    }

    /// Content hash of `block` over its canonical fields.
    pub fn hash(block: &Block) -> String {
        block.hash()
    }

    /// Solve proof-of-work against the tip and append the result.
    pub fn mine_block(
        &mut self,
        miner: impl Into<String>,
        transactions: Vec<String>,
    ) -> Result<&Block> {
        self.mine_block_with(Solver::Sequential, miner, transactions)
    }

    pub fn mine_block_with(
        &mut self,
        solver: Solver,
        miner: impl Into<String>,
        transactions: Vec<String>,
    ) -> Result<&Block> {
        let (previous_proof, previous_hash) = {
            let tip = self.tip()?;
            (tip.proof, tip.hash())
        };
        let proof = solver.solve(previous_proof, self.difficulty)?;
        Ok(self.append(proof, previous_hash, miner, transactions))
    }

    /// Every block with its hash attached. Nothing is stored.
    pub fn snapshot_with_current_hash(&self) -> Vec<BlockView> {
        self.blocks
            .iter()
            .map(|block| BlockView {
                current_hash: block.hash(),
                block: block.clone(),
            })
            .collect()
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::with_config(ChainConfig::default())
    }
}
