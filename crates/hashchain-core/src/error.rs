use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The chain holds no genesis block. Construction always creates one,
    /// so seeing this means an invariant was broken.
    #[error("chain has no blocks")]
    EmptyChain,

    #[error("block position {index} out of range for chain of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(
        "proof search aborted after {attempts} attempts (previous proof {previous_proof}, difficulty {difficulty})"
    )]
    SearchAborted {
        previous_proof: u64,
        difficulty: u32,
        attempts: u64,
    },
}
