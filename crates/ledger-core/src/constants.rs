pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const POW_DIFFICULTY: usize = 1;
pub const GENESIS_PREVIOUS_HASH: &str = "1";
