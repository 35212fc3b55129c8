//! In-memory chain and oracle doubles shared by unit tests.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use alloy::{
    primitives::{Address, Bytes, U256},
    sol_types::{SolCall, SolValue},
};
use async_trait::async_trait;

use crate::{
    multicall::{BatchCaller, BlockTag, Call},
    oracle::{SignedQuote, SignedQuoteSource},
    pricing::PriceSource,
    prelude::*,
    Error,
};

type StubKey = (Option<u64>, Address, Bytes);

/// Answers batched calls from stubs keyed by block, target and calldata.
///
/// A stub registered without a block answers at every height unless a
/// block-specific stub exists.
#[derive(Default)]
pub(crate) struct MockChain {
    stubs: Mutex<HashMap<StubKey, Bytes>>,
    batches: AtomicUsize,
}

impl MockChain {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn stub<C: SolCall, V: SolValue>(
        &self,
        block: Option<u64>,
        target: Address,
        call: C,
        value: V,
    ) {
        let key = (block, target, Call::new(target, call).call_data);
        self.stubs
            .lock()
            .unwrap()
            .insert(key, value.abi_encode().into());
    }

    /// Number of batches answered so far.
    pub(crate) fn batches(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BatchCaller for MockChain {
    async fn aggregate(&self, calls: &[Call], block: BlockTag) -> Result<Vec<Bytes>> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        let height = match block {
            BlockTag::Number(n) => Some(n),
            BlockTag::Latest => None,
        };
        let stubs = self.stubs.lock().unwrap();
        calls
            .iter()
            .map(|call| {
                let exact = (height, call.target, call.call_data.clone());
                let any = (None, call.target, call.call_data.clone());
                stubs
                    .get(&exact)
                    .or_else(|| stubs.get(&any))
                    .cloned()
                    .ok_or_else(|| {
                        Error::Rpc(format!(
                            "no stub for {} at {block:?}: {}",
                            call.target, call.call_data
                        ))
                    })
            })
            .collect()
    }
}

/// Fixed per-token prices; unknown tokens fail like an unreachable oracle.
#[derive(Default)]
pub(crate) struct StaticPrices {
    prices: HashMap<Address, U256>,
}

impl StaticPrices {
    pub(crate) fn new(prices: impl IntoIterator<Item = (Address, U256)>) -> Self {
        Self {
            prices: prices.into_iter().collect(),
        }
    }
}

#[async_trait]
impl PriceSource for StaticPrices {
    async fn price(&self, token: Address) -> Result<U256> {
        self.prices
            .get(&token)
            .copied()
            .ok_or_else(|| Error::oracle(token.to_string(), "no price"))
    }
}

/// Canned signed quotes by symbol.
#[derive(Default)]
pub(crate) struct StaticQuotes {
    quotes: HashMap<String, SignedQuote>,
}

impl StaticQuotes {
    pub(crate) fn new(quotes: impl IntoIterator<Item = SignedQuote>) -> Self {
        Self {
            quotes: quotes.into_iter().map(|q| (q.symbol.clone(), q)).collect(),
        }
    }
}

#[async_trait]
impl SignedQuoteSource for StaticQuotes {
    async fn signed_quote(&self, symbol: &str) -> Result<SignedQuote> {
        self.quotes
            .get(symbol)
            .cloned()
            .ok_or_else(|| Error::oracle(symbol, "quote unavailable"))
    }
}
