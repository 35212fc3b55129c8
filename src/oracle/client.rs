use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Number;
use tracing::debug;

use super::{currency_for, SignedQuote, SignedQuoteSource};
use crate::{
    consts::{ORACLE_TO_PRICE_PRECISION, ORACLE_URL},
    pricing::PriceSource,
    prelude::*,
    req::HttpClient,
    Error,
};

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    data: QuoteData,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    result: Number,
    #[serde(default)]
    signed: Option<SignedPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignedPayload {
    signature_params: SignatureParams,
    signature: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureParams {
    signed_timestamp: Number,
    chain_id: u64,
    valid_from_timestamp: Number,
    duration_seconds: Number,
}

/// Oracle numbers are non-negative integers but may arrive in float form.
fn number_to_u256(number: &Number, field: &str) -> Result<U256> {
    if let Some(n) = number.as_u64() {
        return Ok(U256::from(n));
    }
    match number.as_f64() {
        Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u128::MAX as f64 => {
            Ok(U256::from(f as u128))
        }
        _ => Err(Error::JsonParse(format!(
            "{field}: {number} is not a non-negative integer"
        ))),
    }
}

fn parse_response(symbol: &str, body: &str) -> Result<QuoteData> {
    serde_json::from_str::<QuoteResponse>(body)
        .map(|r| r.data)
        .map_err(|e| Error::JsonParse(format!("{symbol}: {e}")))
}

/// Raw `{symbol}/USD` price lifted to 10^30 precision.
pub(crate) fn parse_price(symbol: &str, body: &str) -> Result<U256> {
    let data = parse_response(symbol, body)?;
    let value = number_to_u256(&data.result, "result")?;
    value
        .checked_mul(ORACLE_TO_PRICE_PRECISION)
        .ok_or(Error::Overflow("oracle price"))
}

pub(crate) fn parse_signed_quote(symbol: &str, body: &str) -> Result<SignedQuote> {
    let data = parse_response(symbol, body)?;
    let signed = data
        .signed
        .ok_or_else(|| Error::oracle(symbol, "no signature returned"))?;
    let params = signed.signature_params;
    let signature = alloy::hex::decode(&signed.signature)
        .map_err(|e| Error::oracle(symbol, format!("invalid signature hex: {e}")))?;

    Ok(SignedQuote {
        symbol: symbol.to_string(),
        value: number_to_u256(&data.result, "result")?,
        signed_timestamp: number_to_u256(&params.signed_timestamp, "signedTimestamp")?,
        chain_id: params.chain_id,
        valid_from_timestamp: number_to_u256(&params.valid_from_timestamp, "validFromTimestamp")?,
        duration_seconds: number_to_u256(&params.duration_seconds, "durationSeconds")?,
        signature: Bytes::from(signature),
    })
}

/// HTTP client for the handle.fi price oracle.
#[derive(Debug, Clone)]
pub struct OracleClient {
    http: HttpClient,
}

impl Default for OracleClient {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl OracleClient {
    pub fn new(client: Option<Client>, base_url: Option<&str>) -> Self {
        Self {
            http: HttpClient::new(client, base_url.unwrap_or(ORACLE_URL)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.http.base_url
    }

    async fn get(&self, symbol: &str, path: &str) -> Result<String> {
        self.http.get(path).await.map_err(|e| match e {
            Error::Http { .. } | Error::GenericRequest(_) => Error::oracle(symbol, e.to_string()),
            other => other,
        })
    }

    /// Unsigned `{symbol}/USD` price at 10^30 precision.
    pub async fn fetch_price(&self, symbol: &str) -> Result<U256> {
        let body = self.get(symbol, &format!("/{symbol}/USD")).await?;
        let price = parse_price(symbol, &body)?;
        debug!(
            target: "handlefi::oracle",
            symbol = symbol,
            price = %price,
            "Oracle price"
        );
        Ok(price)
    }

    pub async fn fetch_signed_quote(&self, symbol: &str) -> Result<SignedQuote> {
        let body = self.get(symbol, &format!("/{symbol}/USD?sign=true")).await?;
        parse_signed_quote(symbol, &body)
    }
}

#[async_trait]
impl PriceSource for OracleClient {
    async fn price(&self, token: Address) -> Result<U256> {
        let symbol = currency_for(token).ok_or(Error::UnknownCurrency(token))?;
        self.fetch_price(symbol).await
    }
}

#[async_trait]
impl SignedQuoteSource for OracleClient {
    async fn signed_quote(&self, symbol: &str) -> Result<SignedQuote> {
        self.fetch_signed_quote(symbol).await
    }
}
