pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
/// Leading zero hex characters required when no difficulty is configured.
pub const DEFAULT_DIFFICULTY: u32 = 5;
pub const GENESIS_PROOF: u64 = 1;
pub const GENESIS_PREVIOUS_HASH: &str = "0";
pub const GENESIS_MINER: &str = "Genesis";
pub const GENESIS_TRANSACTION: &str = "Genesis Block";
