//! Positional layout of the configuration batch.
//!
//! [`CONFIG_LAYOUT`] is the single source of truth for the order of reads.
//! [`config_calls`] and [`decode_config`] both walk it, so the i-th output is
//! always decoded as the i-th call.

use alloy::{
    primitives::{Address, Bytes},
    sol_types::SolCall,
};

use crate::{
    abi::{IVault, IVaultPriceFeed},
    helpers::narrow_u8,
    multicall::{ensure_batch_len, Call},
    prelude::*,
    types::{GlobalConfig, TokenConfig, TokenRegistry},
    Error,
};

/// A read issued once per whitelisted token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenField {
    TokenDecimals,
    StableTokens,
    TokenWeights,
    StrictStableTokens,
    SpreadBasisPoints,
    IsAdjustmentAdditive,
    AdjustmentBasisPoints,
    PriceDecimals,
}

/// A read issued once for the whole vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GlobalField {
    StableSwapFeeBasisPoints,
    SwapFeeBasisPoints,
    StableTaxBasisPoints,
    TaxBasisPoints,
    HasDynamicFees,
    TotalTokenWeights,
    IsAmmEnabled,
    IsSecondaryPriceEnabled,
    MaxStrictPriceDeviation,
    UseV2Pricing,
    PriceSampleSpace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigEntry {
    PerToken(TokenField),
    Global(GlobalField),
}

use ConfigEntry::{Global, PerToken};

pub(crate) const CONFIG_LAYOUT: [ConfigEntry; 19] = [
    // vault
    PerToken(TokenField::TokenDecimals),
    PerToken(TokenField::StableTokens),
    PerToken(TokenField::TokenWeights),
    Global(GlobalField::StableSwapFeeBasisPoints),
    Global(GlobalField::SwapFeeBasisPoints),
    Global(GlobalField::StableTaxBasisPoints),
    Global(GlobalField::TaxBasisPoints),
    Global(GlobalField::HasDynamicFees),
    Global(GlobalField::TotalTokenWeights),
    // price feed
    Global(GlobalField::IsAmmEnabled),
    Global(GlobalField::IsSecondaryPriceEnabled),
    PerToken(TokenField::StrictStableTokens),
    PerToken(TokenField::SpreadBasisPoints),
    PerToken(TokenField::IsAdjustmentAdditive),
    PerToken(TokenField::AdjustmentBasisPoints),
    PerToken(TokenField::PriceDecimals),
    Global(GlobalField::MaxStrictPriceDeviation),
    Global(GlobalField::UseV2Pricing),
    Global(GlobalField::PriceSampleSpace),
];

/// Number of results a config batch over `token_count` tokens produces.
pub(crate) fn config_call_count(token_count: usize) -> usize {
    CONFIG_LAYOUT
        .iter()
        .map(|entry| match entry {
            PerToken(_) => token_count,
            Global(_) => 1,
        })
        .sum()
}

impl TokenField {
    fn call(self, vault: Address, price_feed: Address, token: Address) -> Call {
        use TokenField::*;
        match self {
            TokenDecimals => Call::new(vault, IVault::tokenDecimalsCall { token }),
            StableTokens => Call::new(vault, IVault::stableTokensCall { token }),
            TokenWeights => Call::new(vault, IVault::tokenWeightsCall { token }),
            StrictStableTokens => {
                Call::new(price_feed, IVaultPriceFeed::strictStableTokensCall { token })
            }
            SpreadBasisPoints => {
                Call::new(price_feed, IVaultPriceFeed::spreadBasisPointsCall { token })
            }
            IsAdjustmentAdditive => {
                Call::new(price_feed, IVaultPriceFeed::isAdjustmentAdditiveCall { token })
            }
            AdjustmentBasisPoints => {
                Call::new(price_feed, IVaultPriceFeed::adjustmentBasisPointsCall { token })
            }
            PriceDecimals => Call::new(price_feed, IVaultPriceFeed::priceDecimalsCall { token }),
        }
    }

    fn decode(self, cursor: &mut BatchCursor<'_>, token: &mut TokenConfig) -> Result<()> {
        use TokenField::*;
        match self {
            TokenDecimals => {
                let raw = cursor.decode::<IVault::tokenDecimalsCall>()?;
                token.decimals = narrow_u8(raw, "tokenDecimals")?;
            }
            StableTokens => token.is_stable = cursor.decode::<IVault::stableTokensCall>()?,
            TokenWeights => token.weight = cursor.decode::<IVault::tokenWeightsCall>()?,
            StrictStableTokens => {
                token.is_strict_stable =
                    cursor.decode::<IVaultPriceFeed::strictStableTokensCall>()?
            }
            SpreadBasisPoints => {
                token.spread_bps = cursor.decode::<IVaultPriceFeed::spreadBasisPointsCall>()?
            }
            IsAdjustmentAdditive => {
                token.is_adjustment_additive =
                    cursor.decode::<IVaultPriceFeed::isAdjustmentAdditiveCall>()?
            }
            AdjustmentBasisPoints => {
                token.adjustment_bps =
                    cursor.decode::<IVaultPriceFeed::adjustmentBasisPointsCall>()?
            }
            PriceDecimals => {
                let raw = cursor.decode::<IVaultPriceFeed::priceDecimalsCall>()?;
                token.price_decimals = narrow_u8(raw, "priceDecimals")?;
            }
        }
        Ok(())
    }
}

impl GlobalField {
    fn call(self, vault: Address, price_feed: Address) -> Call {
        use GlobalField::*;
        match self {
            StableSwapFeeBasisPoints => Call::new(vault, IVault::stableSwapFeeBasisPointsCall {}),
            SwapFeeBasisPoints => Call::new(vault, IVault::swapFeeBasisPointsCall {}),
            StableTaxBasisPoints => Call::new(vault, IVault::stableTaxBasisPointsCall {}),
            TaxBasisPoints => Call::new(vault, IVault::taxBasisPointsCall {}),
            HasDynamicFees => Call::new(vault, IVault::hasDynamicFeesCall {}),
            TotalTokenWeights => Call::new(vault, IVault::totalTokenWeightsCall {}),
            IsAmmEnabled => Call::new(price_feed, IVaultPriceFeed::isAmmEnabledCall {}),
            IsSecondaryPriceEnabled => {
                Call::new(price_feed, IVaultPriceFeed::isSecondaryPriceEnabledCall {})
            }
            MaxStrictPriceDeviation => {
                Call::new(price_feed, IVaultPriceFeed::maxStrictPriceDeviationCall {})
            }
            UseV2Pricing => Call::new(price_feed, IVaultPriceFeed::useV2PricingCall {}),
            PriceSampleSpace => Call::new(price_feed, IVaultPriceFeed::priceSampleSpaceCall {}),
        }
    }

    fn decode(self, cursor: &mut BatchCursor<'_>, global: &mut GlobalConfig) -> Result<()> {
        use GlobalField::*;
        match self {
            StableSwapFeeBasisPoints => {
                global.stable_swap_fee_bps =
                    cursor.decode::<IVault::stableSwapFeeBasisPointsCall>()?
            }
            SwapFeeBasisPoints => {
                global.swap_fee_bps = cursor.decode::<IVault::swapFeeBasisPointsCall>()?
            }
            StableTaxBasisPoints => {
                global.stable_tax_bps = cursor.decode::<IVault::stableTaxBasisPointsCall>()?
            }
            TaxBasisPoints => global.tax_bps = cursor.decode::<IVault::taxBasisPointsCall>()?,
            HasDynamicFees => {
                global.has_dynamic_fees = cursor.decode::<IVault::hasDynamicFeesCall>()?
            }
            TotalTokenWeights => {
                global.total_token_weights = cursor.decode::<IVault::totalTokenWeightsCall>()?
            }
            IsAmmEnabled => {
                global.is_amm_enabled = cursor.decode::<IVaultPriceFeed::isAmmEnabledCall>()?
            }
            IsSecondaryPriceEnabled => {
                global.is_secondary_price_enabled =
                    cursor.decode::<IVaultPriceFeed::isSecondaryPriceEnabledCall>()?
            }
            MaxStrictPriceDeviation => {
                global.max_strict_price_deviation =
                    cursor.decode::<IVaultPriceFeed::maxStrictPriceDeviationCall>()?
            }
            UseV2Pricing => {
                global.use_v2_pricing = cursor.decode::<IVaultPriceFeed::useV2PricingCall>()?
            }
            PriceSampleSpace => {
                global.price_sample_space =
                    cursor.decode::<IVaultPriceFeed::priceSampleSpaceCall>()?
            }
        }
        Ok(())
    }
}

/// Sequential reader over a batch response.
pub(crate) struct BatchCursor<'a> {
    outputs: &'a [Bytes],
    position: usize,
}

impl<'a> BatchCursor<'a> {
    pub(crate) fn new(outputs: &'a [Bytes]) -> Self {
        Self {
            outputs,
            position: 0,
        }
    }

    /// Decode the next output as the return value of `C`.
    pub(crate) fn decode<C: SolCall>(&mut self) -> Result<C::Return> {
        let position = self.position;
        let raw = self.outputs.get(position).ok_or_else(|| {
            Error::ConfigDecode(format!(
                "batch exhausted at position {position} decoding {}",
                C::SIGNATURE
            ))
        })?;
        self.position += 1;
        C::abi_decode_returns(raw).map_err(|e| {
            Error::ConfigDecode(format!(
                "position {position} ({}): {e}",
                C::SIGNATURE
            ))
        })
    }

    pub(crate) fn remaining(&self) -> usize {
        self.outputs.len().saturating_sub(self.position)
    }
}

/// Build the flat config batch for `tokens`.
pub(crate) fn config_calls(vault: Address, price_feed: Address, tokens: &[Address]) -> Vec<Call> {
    let mut calls = Vec::with_capacity(config_call_count(tokens.len()));
    for entry in CONFIG_LAYOUT {
        match entry {
            PerToken(field) => {
                calls.extend(tokens.iter().map(|&t| field.call(vault, price_feed, t)))
            }
            Global(field) => calls.push(field.call(vault, price_feed)),
        }
    }
    calls
}

/// Decode the response to [`config_calls`] over the same `tokens`.
pub(crate) fn decode_config(
    outputs: &[Bytes],
    tokens: &[Address],
) -> Result<(GlobalConfig, TokenRegistry)> {
    ensure_batch_len("config", config_call_count(tokens.len()), outputs)?;

    let mut cursor = BatchCursor::new(outputs);
    let mut configs: Vec<TokenConfig> = tokens.iter().map(|&t| TokenConfig::new(t)).collect();
    let mut global = GlobalConfig::default();

    for entry in CONFIG_LAYOUT {
        match entry {
            PerToken(field) => {
                for token in configs.iter_mut() {
                    field.decode(&mut cursor, token)?;
                }
            }
            Global(field) => field.decode(&mut cursor, &mut global)?,
        }
    }
    debug_assert_eq!(cursor.remaining(), 0);

    Ok((global, TokenRegistry::new(configs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::{
        primitives::{address, U256},
        sol_types::SolValue,
    };

    const VAULT: Address = address!("1785e8491e7e9d771b2A6E9E389c25265F06326A");
    const FEED: Address = address!("f28e261b89fc4479ee41044dd55f7a4053f9844a");
    const A: Address = address!("7e141940932e3d13bfa54b224cb4a16510519308");
    const B: Address = address!("82af49447d8a07e3bd95bd0d56f35241523fbab1");

    #[test]
    fn test_call_count() {
        // 8 per-token fields, 11 globals.
        assert_eq!(config_call_count(0), 11);
        assert_eq!(config_call_count(2), 27);
        assert_eq!(config_calls(VAULT, FEED, &[A, B]).len(), 27);
    }

    #[test]
    fn test_calls_follow_layout_order() {
        let calls = config_calls(VAULT, FEED, &[A, B]);

        // tokenDecimals(A), tokenDecimals(B), stableTokens(A), ...
        assert_eq!(calls[0], Call::new(VAULT, IVault::tokenDecimalsCall { token: A }));
        assert_eq!(calls[1], Call::new(VAULT, IVault::tokenDecimalsCall { token: B }));
        assert_eq!(calls[2], Call::new(VAULT, IVault::stableTokensCall { token: A }));
        assert_eq!(calls[6], Call::new(VAULT, IVault::stableSwapFeeBasisPointsCall {}));
        assert_eq!(calls[12], Call::new(FEED, IVaultPriceFeed::isAmmEnabledCall {}));
        assert_eq!(
            calls[14],
            Call::new(FEED, IVaultPriceFeed::strictStableTokensCall { token: A })
        );
        assert_eq!(
            calls[26],
            Call::new(FEED, IVaultPriceFeed::priceSampleSpaceCall {})
        );
    }

    /// Encode one plausible answer per call, in call order.
    fn answer(call: &Call) -> Bytes {
        let selector: [u8; 4] = call.call_data[..4].try_into().unwrap();
        let token = if call.call_data.len() >= 36 {
            Address::from_slice(&call.call_data[16..36])
        } else {
            Address::ZERO
        };
        let is_a = token == A;
        let encoded = match selector {
            IVault::tokenDecimalsCall::SELECTOR => U256::from(if is_a { 6 } else { 18 }).abi_encode(),
            IVault::stableTokensCall::SELECTOR => is_a.abi_encode(),
            IVault::tokenWeightsCall::SELECTOR => U256::from(if is_a { 100 } else { 300 }).abi_encode(),
            IVault::stableSwapFeeBasisPointsCall::SELECTOR => U256::from(4).abi_encode(),
            IVault::swapFeeBasisPointsCall::SELECTOR => U256::from(30).abi_encode(),
            IVault::stableTaxBasisPointsCall::SELECTOR => U256::from(5).abi_encode(),
            IVault::taxBasisPointsCall::SELECTOR => U256::from(50).abi_encode(),
            IVault::hasDynamicFeesCall::SELECTOR => true.abi_encode(),
            IVault::totalTokenWeightsCall::SELECTOR => U256::from(400).abi_encode(),
            IVaultPriceFeed::isAmmEnabledCall::SELECTOR => false.abi_encode(),
            IVaultPriceFeed::isSecondaryPriceEnabledCall::SELECTOR => true.abi_encode(),
            IVaultPriceFeed::strictStableTokensCall::SELECTOR => is_a.abi_encode(),
            IVaultPriceFeed::spreadBasisPointsCall::SELECTOR => U256::from(if is_a { 0 } else { 20 }).abi_encode(),
            IVaultPriceFeed::isAdjustmentAdditiveCall::SELECTOR => (!is_a).abi_encode(),
            IVaultPriceFeed::adjustmentBasisPointsCall::SELECTOR => U256::from(if is_a { 0 } else { 3 }).abi_encode(),
            IVaultPriceFeed::priceDecimalsCall::SELECTOR => U256::from(8).abi_encode(),
            IVaultPriceFeed::maxStrictPriceDeviationCall::SELECTOR => U256::from(1_000_000u64).abi_encode(),
            IVaultPriceFeed::useV2PricingCall::SELECTOR => true.abi_encode(),
            IVaultPriceFeed::priceSampleSpaceCall::SELECTOR => U256::from(3).abi_encode(),
            other => panic!("unexpected selector {other:?}"),
        };
        encoded.into()
    }

    #[test]
    fn test_decode_config_mirrors_builder() {
        let tokens = [A, B];
        let outputs: Vec<Bytes> = config_calls(VAULT, FEED, &tokens).iter().map(answer).collect();

        let (global, registry) = decode_config(&outputs, &tokens).unwrap();

        let a = registry.by_address(&A).unwrap();
        assert_eq!(a.decimals, 6);
        assert!(a.is_stable);
        assert!(a.is_strict_stable);
        assert_eq!(a.weight, U256::from(100));
        assert_eq!(a.spread_bps, U256::ZERO);
        assert!(!a.is_adjustment_additive);

        let b = registry.by_address(&B).unwrap();
        assert_eq!(b.decimals, 18);
        assert!(!b.is_stable);
        assert_eq!(b.weight, U256::from(300));
        assert_eq!(b.spread_bps, U256::from(20));
        assert_eq!(b.adjustment_bps, U256::from(3));
        assert!(b.is_adjustment_additive);
        assert_eq!(b.price_decimals, 8);

        assert_eq!(global.stable_swap_fee_bps, U256::from(4));
        assert_eq!(global.swap_fee_bps, U256::from(30));
        assert_eq!(global.stable_tax_bps, U256::from(5));
        assert_eq!(global.tax_bps, U256::from(50));
        assert!(global.has_dynamic_fees);
        assert_eq!(global.total_token_weights, U256::from(400));
        assert!(!global.is_amm_enabled);
        assert!(global.is_secondary_price_enabled);
        assert_eq!(global.max_strict_price_deviation, U256::from(1_000_000u64));
        assert!(global.use_v2_pricing);
        assert_eq!(global.price_sample_space, U256::from(3));
    }

    #[test]
    fn test_decode_config_rejects_wrong_size() {
        let tokens = [A, B];
        let mut outputs: Vec<Bytes> =
            config_calls(VAULT, FEED, &tokens).iter().map(answer).collect();
        outputs.pop();

        assert!(matches!(
            decode_config(&outputs, &tokens),
            Err(Error::BatchSizeMismatch { expected: 27, actual: 26, .. })
        ));
    }

    #[test]
    fn test_decode_config_rejects_garbage() {
        let tokens = [A];
        let outputs = vec![Bytes::from_static(&[0xde, 0xad]); config_call_count(1)];
        assert!(matches!(
            decode_config(&outputs, &tokens),
            Err(Error::ConfigDecode(_))
        ));
    }

    #[test]
    fn test_decode_config_rejects_oversized_decimals() {
        let tokens = [A];
        let mut outputs: Vec<Bytes> =
            config_calls(VAULT, FEED, &tokens).iter().map(answer).collect();
        outputs[0] = U256::from(1000).abi_encode().into();
        assert!(matches!(
            decode_config(&outputs, &tokens),
            Err(Error::ConfigDecode(_))
        ));
    }
}
