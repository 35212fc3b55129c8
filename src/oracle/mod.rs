//! handle.fi price oracle: raw prices for quoting and signed quotes for
//! on-chain settlement.

mod client;
mod currency;
mod signed_quote;

pub use client::OracleClient;
pub use currency::{currency_for, token_for, ADDRESS_TO_CURRENCY};
pub use signed_quote::{encode_quotes, QuoteAssembler, SignedQuote, SignedQuoteSource};
