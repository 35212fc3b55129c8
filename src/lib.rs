#![deny(unreachable_pub)]

// Core modules
mod consts;
mod errors;
mod helpers;
mod prelude;
mod req;

// Contract bindings and chain access
pub mod abi;
pub mod multicall;
pub mod types;

// Feature modules
pub mod bootstrap;
pub mod kv_cache;
pub mod logging;
pub mod mirror;
pub mod oracle;
pub mod pool;
pub mod pricing;

#[cfg(test)]
mod testing;

// Re-exports
pub use consts::{
    BASIS_POINTS_DIVISOR, DEFAULT_STATE_CACHE_CAPACITY, MAX_AMOUNT_IN_CACHE_TTL_SECS,
    MULTICALL_ADDRESS, ORACLE_TO_PRICE_PRECISION, ORACLE_URL, PRICE_PRECISION, SIGNATURE_LENGTH,
    USDG_DECIMALS,
};
pub use errors::{Error, HttpErrorKind};
pub use helpers::{mul_div, pow10};
pub use kv_cache::{InMemoryCache, KvCache};
pub use mirror::{MirrorPhase, Replica, StateMirror, SubscriptionFilter, VaultReplica};
pub use multicall::{BatchCaller, BlockTag, Call, ProviderMulticall};
pub use oracle::{OracleClient, QuoteAssembler, SignedQuote, SignedQuoteSource};
pub use pool::{HandleFiPool, PoolServices};
pub use pricing::{PriceSource, SwapQuoter};
pub use types::*;
