//! A handle.fi vault as seen by a routing host.
//!
//! [`HandleFiPool`] wires the bootstrapped config, the state mirror, the
//! quoter and the signed-quote assembler behind one handle. The mirror sits
//! behind an async mutex so block application and regeneration for one pool
//! never interleave; pricing only holds the lock while resolving a snapshot.

use std::{sync::Arc, time::Duration};

use alloy::{
    primitives::{Address, Bytes, Log, U256},
    sol_types::SolCall,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    abi::IReader,
    bootstrap::bootstrap,
    consts::MAX_AMOUNT_IN_CACHE_TTL_SECS,
    kv_cache::KvCache,
    mirror::{MirrorPhase, Replica, StateMirror, SubscriptionFilter, VaultReplica},
    multicall::{ensure_batch_len, BatchCaller, BlockTag, Call},
    oracle::{QuoteAssembler, SignedQuoteSource},
    pricing::{PriceSource, SwapQuoter},
    prelude::*,
    types::{DexParams, MirrorState, PoolConfig},
    Error,
};

/// External collaborators a pool is built from.
#[derive(Clone)]
pub struct PoolServices {
    pub caller: Arc<dyn BatchCaller>,
    pub prices: Arc<dyn PriceSource>,
    pub quotes: Arc<dyn SignedQuoteSource>,
    pub cache: Arc<dyn KvCache>,
}

pub struct HandleFiPool {
    name: String,
    config: Arc<PoolConfig>,
    filter: SubscriptionFilter,
    caller: Arc<dyn BatchCaller>,
    cache: Arc<dyn KvCache>,
    mirror: Mutex<StateMirror<VaultReplica>>,
    quoter: SwapQuoter,
    assembler: QuoteAssembler,
}

impl HandleFiPool {
    pub fn new(name: impl Into<String>, config: PoolConfig, services: PoolServices) -> Self {
        let config = Arc::new(config);
        let replica = VaultReplica::new(config.clone());
        let filter = replica.subscription_filter();
        Self {
            name: name.into(),
            filter,
            mirror: Mutex::new(StateMirror::new(replica, services.caller.clone())),
            quoter: SwapQuoter::new(config.clone(), services.prices),
            assembler: QuoteAssembler::new(services.quotes),
            caller: services.caller,
            cache: services.cache,
            config,
        }
    }

    /// Read the vault configuration at `block` and build a pool from it.
    pub async fn bootstrap(
        name: impl Into<String>,
        params: &DexParams,
        services: PoolServices,
        block: BlockTag,
    ) -> Result<Self> {
        let config = bootstrap(params, services.caller.as_ref(), block).await?;
        Ok(Self::new(name, config, services))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Addresses and topics the host should deliver to [`Self::handle_block`].
    pub fn subscription_filter(&self) -> &SubscriptionFilter {
        &self.filter
    }

    pub async fn phase(&self) -> MirrorPhase {
        self.mirror.lock().await.phase()
    }

    /// Seed the mirror at `block`.
    pub async fn initialize(&self, block: u64) -> Result<()> {
        self.mirror.lock().await.seed(block).await?;
        info!(
            target: "handlefi::pool",
            pool = %self.name,
            block = block,
            tokens = self.config.tokens.len(),
            "Pool initialized"
        );
        Ok(())
    }

    pub async fn handle_block(&self, block: u64, logs: &[Log]) -> Result<Arc<MirrorState>> {
        self.mirror.lock().await.handle_block(block, logs).await
    }

    pub async fn rollback(&self, block: u64) -> Result<Arc<MirrorState>> {
        self.mirror.lock().await.rollback(block).await
    }

    pub async fn get_state_or_generate(&self, block: u64) -> Result<Arc<MirrorState>> {
        self.mirror.lock().await.get_or_generate(block).await
    }

    /// Output amounts for swapping each of `amounts_in` at `block`.
    ///
    /// `None` when the pair cannot be priced by this pool.
    pub async fn get_amount_out(
        &self,
        token_in: Address,
        token_out: Address,
        amounts_in: &[U256],
        block: u64,
    ) -> Result<Option<Vec<U256>>> {
        let state = self.get_state_or_generate(block).await?;
        self.quoter
            .quote(&state, token_in, token_out, amounts_in)
            .await
    }

    /// Largest input the reader contract allows for the pair, cached for
    /// five minutes.
    pub async fn get_max_amount_in(&self, token_in: Address, token_out: Address) -> Result<U256> {
        let key = format!("maxAmountIn_{token_in:#x}_{token_out:#x}");
        if let Some(cached) = self.cache.get(&key).await {
            match cached.parse::<U256>() {
                Ok(amount) => return Ok(amount),
                Err(e) => warn!(
                    target: "handlefi::pool",
                    key = %key,
                    error = %e,
                    "Discarding unparseable cache entry"
                ),
            }
        }

        let call = Call::new(
            self.config.reader,
            IReader::getMaxAmountInCall {
                vault: self.config.vault,
                tokenIn: token_in,
                tokenOut: token_out,
            },
        );
        let outputs = self.caller.aggregate(&[call], BlockTag::Latest).await?;
        ensure_batch_len("max amount in", 1, &outputs)?;
        let amount = IReader::getMaxAmountInCall::abi_decode_returns(&outputs[0])
            .map_err(|e| Error::Rpc(format!("getMaxAmountIn decode: {e}")))?;

        self.cache
            .setex(
                &key,
                Duration::from_secs(MAX_AMOUNT_IN_CACHE_TTL_SECS),
                amount.to_string(),
            )
            .await;
        debug!(
            target: "handlefi::pool",
            token_in = %token_in,
            token_out = %token_out,
            amount = %amount,
            "Max amount in refreshed"
        );
        Ok(amount)
    }

    /// Signed oracle quotes for `tokens`, encoded for the price feed.
    pub async fn fetch_encoded_signed_quotes(&self, tokens: &[Address]) -> Result<Bytes> {
        self.assembler.fetch_and_encode(tokens).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abi::{IUsdg, IVault},
        bootstrap::fixtures::{stub_vault, TOKEN_A, TOKEN_B},
        consts::PRICE_PRECISION,
        helpers::pow10,
        kv_cache::InMemoryCache,
        oracle::SignedQuote,
        testing::{MockChain, StaticPrices, StaticQuotes},
    };
    use alloy::sol_types::SolEvent;

    fn stub_state(chain: &MockChain, params: &DexParams, block: u64, a: U256, b: U256) {
        chain.stub(Some(block), params.vault, IVault::usdgAmountsCall { token: TOKEN_A }, a);
        chain.stub(Some(block), params.vault, IVault::usdgAmountsCall { token: TOKEN_B }, b);
        chain.stub(Some(block), params.usdg, IUsdg::totalSupplyCall {}, a + b);
    }

    async fn pool(chain: Arc<MockChain>) -> HandleFiPool {
        let params = DexParams::arbitrum();
        stub_vault(&chain, &params);
        let services = PoolServices {
            caller: chain,
            prices: Arc::new(StaticPrices::new([
                (TOKEN_A, PRICE_PRECISION),
                (TOKEN_B, PRICE_PRECISION * U256::from(2_000)),
            ])),
            quotes: Arc::new(StaticQuotes::new([SignedQuote {
                symbol: "ETH".to_string(),
                value: U256::from(200_000_000_000u64),
                signed_timestamp: U256::from(1),
                chain_id: 42161,
                valid_from_timestamp: U256::from(1),
                duration_seconds: U256::from(60),
                signature: Bytes::from(vec![7u8; 65]),
            }])),
            cache: Arc::new(InMemoryCache::new()),
        };
        HandleFiPool::bootstrap("HandleFi", &params, services, BlockTag::Latest)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_quote_through_pool() {
        let chain = Arc::new(MockChain::new());
        let pool = pool(chain.clone()).await;
        let params = DexParams::arbitrum();
        let balance = pow10(24);
        stub_state(&chain, &params, 100, balance, balance);

        pool.initialize(100).await.unwrap();
        assert_eq!(pool.phase().await, MirrorPhase::Seeded);

        let out = pool
            .get_amount_out(TOKEN_B, TOKEN_A, &[U256::ZERO, pow10(18)], 100)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(out[0], U256::ZERO);
        // 2000 units of a 6-decimal token, less at least the 0.3% base fee.
        assert!(out[1] > U256::ZERO);
        assert!(out[1] <= U256::from(1_994_000_000u64));
    }

    #[tokio::test]
    async fn test_quote_regenerates_missing_height() {
        let chain = Arc::new(MockChain::new());
        let pool = pool(chain.clone()).await;
        stub_state(&chain, &DexParams::arbitrum(), 250, pow10(20), pow10(20));

        let state = pool.get_state_or_generate(250).await.unwrap();
        assert_eq!(state.usdg_total_supply, pow10(20) * U256::from(2));
        assert_eq!(pool.phase().await, MirrorPhase::Live);
    }

    #[tokio::test]
    async fn test_handle_block_feeds_quotes() {
        let chain = Arc::new(MockChain::new());
        let pool = pool(chain.clone()).await;
        let params = DexParams::arbitrum();
        stub_state(&chain, &params, 100, pow10(20), pow10(20));
        pool.initialize(100).await.unwrap();

        let inc = Log {
            address: params.vault,
            data: IVault::IncreaseUsdgAmount {
                token: TOKEN_A,
                amount: pow10(20),
            }
            .encode_log_data(),
        };
        let state = pool.handle_block(101, &[inc]).await.unwrap();
        assert_eq!(
            state.usdg_amount(pool.config().tokens.id(&TOKEN_A).unwrap()),
            pow10(20) * U256::from(2)
        );
        assert!(pool.subscription_filter().addresses.contains(&params.vault));
    }

    #[tokio::test]
    async fn test_max_amount_in_is_cached() {
        let chain = Arc::new(MockChain::new());
        let pool = pool(chain.clone()).await;
        let params = DexParams::arbitrum();
        chain.stub(
            None,
            params.reader,
            IReader::getMaxAmountInCall {
                vault: params.vault,
                tokenIn: TOKEN_A,
                tokenOut: TOKEN_B,
            },
            U256::from(12_345),
        );

        let before = chain.batches();
        assert_eq!(
            pool.get_max_amount_in(TOKEN_A, TOKEN_B).await.unwrap(),
            U256::from(12_345)
        );
        assert_eq!(chain.batches(), before + 1);

        assert_eq!(
            pool.get_max_amount_in(TOKEN_A, TOKEN_B).await.unwrap(),
            U256::from(12_345)
        );
        assert_eq!(chain.batches(), before + 1);
    }

    #[tokio::test]
    async fn test_signed_quotes_through_pool() {
        let pool = pool(Arc::new(MockChain::new())).await;
        let encoded = pool.fetch_encoded_signed_quotes(&[TOKEN_B]).await.unwrap();
        assert!(!encoded.is_empty());

        let err = pool
            .fetch_encoded_signed_quotes(&[TOKEN_A])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::OracleFetch { .. }));
    }
}
