use alloy::primitives::{address, uint, Address, U256};

/// 100% expressed in basis points.
pub const BASIS_POINTS_DIVISOR: U256 = uint!(10_000_U256);

/// Fixed-point scale of vault prices (30 decimals).
pub const PRICE_PRECISION: U256 = uint!(1_000_000_000_000_000_000_000_000_000_000_U256);

/// Decimals of the USDG accounting token.
pub const USDG_DECIMALS: u8 = 18;

/// Oracle quotes carry 8 decimals; this lifts them to `PRICE_PRECISION`.
pub const ORACLE_TO_PRICE_PRECISION: U256 = uint!(10_000_000_000_000_000_000_000_U256);

/// Length of a serialized secp256k1 signature (r, s, v).
pub const SIGNATURE_LENGTH: usize = 65;

pub const ORACLE_URL: &str = "https://oracle.handle.fi";

/// Multicall3 is deployed at the same address on every supported chain.
pub const MULTICALL_ADDRESS: Address = address!("cA11bde05977b3631167028862bE2a173976CA11");

/// Time-to-live of cached `getMaxAmountIn` reader results, in seconds.
pub const MAX_AMOUNT_IN_CACHE_TTL_SECS: u64 = 5 * 60;

/// Number of block heights retained by the state mirror cache.
pub const DEFAULT_STATE_CACHE_CAPACITY: usize = 64;
