use alloy::primitives::{Address, U256};
use thiserror::Error;

/// HTTP error classification
#[derive(Error, Debug, Clone)]
pub enum HttpErrorKind {
    #[error("Client error: {message}")]
    Client { message: String },
    #[error("Server error: {message}")]
    Server { message: String },
}

/// Main SDK error type
#[derive(Error, Debug, Clone)]
pub enum Error {
    // === Bootstrap ===
    /// A configuration read returned data that could not be decoded.
    #[error("Config decode error: {0}")]
    ConfigDecode(String),

    /// A batch read returned a different number of results than calls issued.
    #[error("Batch size mismatch ({context}): expected {expected} results, got {actual}")]
    BatchSizeMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    // === State mirror ===
    /// A chain log matched a tracked event but its payload was malformed.
    #[error("Event parse error: {0}")]
    EventParse(String),

    /// Blocks were delivered out of order; incremental state is untrusted.
    #[error("Rollover inconsistency: head at block {head}, received block {received}")]
    RolloverInconsistency { head: u64, received: u64 },

    /// A decrease event would drive a tracked balance below zero.
    #[error("Negative usdg balance for {token}: balance {balance}, decrease {amount}")]
    NegativeBalance {
        token: Address,
        balance: U256,
        amount: U256,
    },

    /// A burn would drive the USDG total supply below zero.
    #[error("Negative usdg supply: supply {supply}, burn {amount}")]
    NegativeSupply { supply: U256, amount: U256 },

    /// The mirror was asked to apply events before it was seeded.
    #[error("State mirror has not been seeded")]
    NotSeeded,

    // === Pricing ===
    /// An intermediate product exceeded 256 bits, or a divisor was zero.
    #[error("Arithmetic overflow or division by zero in {0}")]
    Overflow(&'static str),

    // === Oracle ===
    /// A required price or signed quote could not be obtained.
    #[error("Oracle fetch error for {symbol}: {message}")]
    OracleFetch { symbol: String, message: String },

    /// No oracle currency is known for the token.
    #[error("No oracle currency for token {0}")]
    UnknownCurrency(Address),

    /// Signed quote payload could not be encoded.
    #[error("Encoding error: {0}")]
    Encoding(String),

    // === Transport ===
    /// JSON-RPC transport failure.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// HTTP error with status code and classification
    #[error("HTTP error (status {status}): {kind}")]
    Http { status: u16, kind: HttpErrorKind },

    /// Generic request error
    #[error("Generic request error: {0}")]
    GenericRequest(String),

    /// JSON parse error
    #[error("Json parse error: {0}")]
    JsonParse(String),
}

impl Error {
    /// Create an HTTP client error
    pub fn client_error(status: u16, message: String) -> Self {
        Error::Http {
            status,
            kind: HttpErrorKind::Client { message },
        }
    }

    /// Create an HTTP server error
    pub fn server_error(status: u16, message: String) -> Self {
        Error::Http {
            status,
            kind: HttpErrorKind::Server { message },
        }
    }

    /// Create an oracle fetch error for a symbol.
    pub fn oracle(symbol: impl Into<String>, message: impl Into<String>) -> Self {
        Error::OracleFetch {
            symbol: symbol.into(),
            message: message.into(),
        }
    }

    /// Whether this error means the mirrored state can no longer be trusted
    /// and must be rebuilt from a fresh read.
    pub fn requires_regeneration(&self) -> bool {
        matches!(
            self,
            Error::NegativeBalance { .. }
                | Error::NegativeSupply { .. }
                | Error::RolloverInconsistency { .. }
        )
    }
}
