//! One-shot discovery of the vault's token set and configuration.

mod layout;

pub(crate) use layout::BatchCursor;

use alloy::primitives::{Address, U256};
use tracing::{debug, info};

use crate::{
    abi::IVault,
    multicall::{ensure_batch_len, BatchCaller, BlockTag, Call},
    prelude::*,
    types::{DexParams, PoolConfig},
    Error,
};

use layout::{config_calls, decode_config};

/// Read the vault's whitelisted tokens in whitelist order.
pub async fn discover_tokens(
    caller: &dyn BatchCaller,
    vault: Address,
    block: BlockTag,
) -> Result<Vec<Address>> {
    let outputs = caller
        .aggregate(
            &[Call::new(vault, IVault::allWhitelistedTokensLengthCall {})],
            block,
        )
        .await?;
    ensure_batch_len("token count", 1, &outputs)?;
    let count = BatchCursor::new(&outputs).decode::<IVault::allWhitelistedTokensLengthCall>()?;

    if count > U256::from(u16::MAX) {
        return Err(Error::ConfigDecode(format!(
            "whitelisted token count {count} exceeds {}",
            u16::MAX
        )));
    }
    let count = count.to::<usize>();

    let calls: Vec<Call> = (0..count)
        .map(|i| {
            Call::new(
                vault,
                IVault::allWhitelistedTokensCall {
                    index: U256::from(i),
                },
            )
        })
        .collect();
    let outputs = caller.aggregate(&calls, block).await?;
    ensure_batch_len("token list", count, &outputs)?;

    let mut cursor = BatchCursor::new(&outputs);
    let tokens = (0..count)
        .map(|_| cursor.decode::<IVault::allWhitelistedTokensCall>())
        .collect::<Result<Vec<_>>>()?;

    debug!(
        target: "handlefi::bootstrap",
        vault = %vault,
        count = tokens.len(),
        "Discovered whitelisted tokens"
    );
    Ok(tokens)
}

/// Read token and global configuration for `tokens` in a single batch.
pub async fn fetch_config(
    caller: &dyn BatchCaller,
    params: &DexParams,
    tokens: &[Address],
    block: BlockTag,
) -> Result<PoolConfig> {
    let calls = config_calls(params.vault, params.price_feed, tokens);
    let outputs = caller.aggregate(&calls, block).await?;
    let (global, registry) = decode_config(&outputs, tokens)?;
    Ok(PoolConfig::new(params, registry, global))
}

/// Discover tokens then fetch their configuration.
pub async fn bootstrap(
    params: &DexParams,
    caller: &dyn BatchCaller,
    block: BlockTag,
) -> Result<PoolConfig> {
    let tokens = discover_tokens(caller, params.vault, block).await?;
    let config = fetch_config(caller, params, &tokens, block).await?;

    info!(
        target: "handlefi::bootstrap",
        vault = %params.vault,
        tokens = config.tokens.len(),
        dynamic_fees = config.global.has_dynamic_fees,
        total_weight = %config.global.total_token_weights,
        "Pool configuration loaded"
    );
    Ok(config)
}


#[cfg(test)]
mod tests {
    use super::{fixtures::*, layout::config_call_count, *};
    use crate::testing::MockChain;

    #[tokio::test]
    async fn test_discover_tokens_preserves_whitelist_order() {
        let chain = MockChain::new();
        let params = DexParams::arbitrum();
        stub_vault(&chain, &params);

        let tokens = discover_tokens(&chain, params.vault, BlockTag::Latest)
            .await
            .unwrap();
        assert_eq!(tokens, vec![TOKEN_A, TOKEN_B]);
        assert_eq!(chain.batches(), 2);
    }

    #[tokio::test]
    async fn test_bootstrap_reads_config_in_one_batch() {
        let chain = MockChain::new();
        let params = DexParams::arbitrum();
        stub_vault(&chain, &params);

        let config = bootstrap(&params, &chain, BlockTag::Number(100))
            .await
            .unwrap();

        // length, index list, config
        assert_eq!(chain.batches(), 3);
        assert_eq!(config.vault, params.vault);
        assert_eq!(config.tokens.addresses(), vec![TOKEN_A, TOKEN_B]);

        let a = config.tokens.by_address(&TOKEN_A).unwrap();
        assert_eq!(a.decimals, 6);
        assert!(a.is_stable);
        let b = config.tokens.by_address(&TOKEN_B).unwrap();
        assert_eq!(b.decimals, 18);
        assert_eq!(b.spread_bps, U256::from(10));

        assert_eq!(config.global.total_token_weights, U256::from(2));
        assert!(config.global.has_dynamic_fees);
        assert_eq!(config.global.swap_fee_bps, U256::from(30));
    }

    #[tokio::test]
    async fn test_bootstrap_fails_on_missing_read() {
        let chain = MockChain::new();
        let params = DexParams::arbitrum();
        chain.stub(
            None,
            params.vault,
            IVault::allWhitelistedTokensLengthCall {},
            U256::from(1),
        );
        // No index or config stubs: the second batch errors.
        assert!(bootstrap(&params, &chain, BlockTag::Latest).await.is_err());
    }

    #[tokio::test]
    async fn test_discover_rejects_absurd_count() {
        let chain = MockChain::new();
        let params = DexParams::arbitrum();
        chain.stub(
            None,
            params.vault,
            IVault::allWhitelistedTokensLengthCall {},
            U256::from(1u64 << 20),
        );
        let err = discover_tokens(&chain, params.vault, BlockTag::Latest)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConfigDecode(_)));
    }

    #[tokio::test]
    async fn test_empty_vault_bootstraps() {
        let chain = MockChain::new();
        let params = DexParams::arbitrum();
        stub_vault(&chain, &params);
        chain.stub(
            None,
            params.vault,
            IVault::allWhitelistedTokensLengthCall {},
            U256::ZERO,
        );

        let config = bootstrap(&params, &chain, BlockTag::Latest).await.unwrap();
        assert!(config.tokens.is_empty());
        assert_eq!(config_call_count(0), 11);
    }
}
