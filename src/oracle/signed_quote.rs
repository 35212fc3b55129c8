//! Signed oracle quotes and their on-chain payload encoding.

use std::sync::Arc;

use alloy::{
    primitives::{Address, Bytes, U256},
    sol_types::SolValue,
};
use async_trait::async_trait;
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::currency_for;
use crate::{consts::SIGNATURE_LENGTH, prelude::*, Error};

/// An oracle attestation of one `{symbol}/USD` price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedQuote {
    pub symbol: String,
    /// Price with 8 decimals.
    pub value: U256,
    pub signed_timestamp: U256,
    pub chain_id: u64,
    pub valid_from_timestamp: U256,
    pub duration_seconds: U256,
    pub signature: Bytes,
}

#[async_trait]
pub trait SignedQuoteSource: Send + Sync {
    async fn signed_quote(&self, symbol: &str) -> Result<SignedQuote>;
}

/// Fetches signed quotes for a token set and packs them for the price feed.
#[derive(Clone)]
pub struct QuoteAssembler {
    source: Arc<dyn SignedQuoteSource>,
}

impl QuoteAssembler {
    pub fn new(source: Arc<dyn SignedQuoteSource>) -> Self {
        Self { source }
    }

    /// Fetch one quote per token concurrently and encode them in token order.
    ///
    /// Fails if any token has no currency or any fetch fails.
    pub async fn fetch_and_encode(&self, tokens: &[Address]) -> Result<Bytes> {
        let symbols = tokens
            .iter()
            .map(|&token| currency_for(token).ok_or(Error::UnknownCurrency(token)))
            .collect::<Result<Vec<_>>>()?;

        let quotes = try_join_all(symbols.iter().map(|symbol| self.source.signed_quote(symbol))).await?;

        debug!(
            target: "handlefi::oracle",
            symbols = ?symbols,
            "Fetched signed quotes"
        );
        encode_quotes(tokens, &quotes)
    }
}

/// ABI-encode `(count, tokens, values, signedTimestamps, validFromTimestamps,
/// durations, signatures)`, with every signature exactly 65 bytes.
pub fn encode_quotes(tokens: &[Address], quotes: &[SignedQuote]) -> Result<Bytes> {
    if tokens.len() != quotes.len() {
        return Err(Error::Encoding(format!(
            "{} tokens but {} quotes",
            tokens.len(),
            quotes.len()
        )));
    }

    let mut signatures = Vec::with_capacity(quotes.len() * SIGNATURE_LENGTH);
    for quote in quotes {
        if quote.signature.len() != SIGNATURE_LENGTH {
            return Err(Error::Encoding(format!(
                "signature for {} is {} bytes, expected {SIGNATURE_LENGTH}",
                quote.symbol,
                quote.signature.len()
            )));
        }
        signatures.extend_from_slice(&quote.signature);
    }

    let payload = (
        U256::from(tokens.len()),
        tokens.to_vec(),
        quotes.iter().map(|q| q.value).collect::<Vec<_>>(),
        quotes.iter().map(|q| q.signed_timestamp).collect::<Vec<_>>(),
        quotes.iter().map(|q| q.valid_from_timestamp).collect::<Vec<_>>(),
        quotes.iter().map(|q| q.duration_seconds).collect::<Vec<_>>(),
        Bytes::from(signatures),
    );
    Ok(payload.abi_encode_params().into())
}
