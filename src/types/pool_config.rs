//! Vault-wide configuration and deployment addresses.

use alloy::primitives::{address, Address, U256};
use serde::{Deserialize, Serialize};

use super::TokenRegistry;

/// Contract addresses of one handle.fi deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DexParams {
    pub vault: Address,
    pub usdg: Address,
    pub price_feed: Address,
    pub router: Address,
    pub reader: Address,
}

impl DexParams {
    /// Arbitrum One deployment.
    pub const fn arbitrum() -> Self {
        Self {
            vault: address!("1785e8491e7e9d771b2A6E9E389c25265F06326A"),
            router: address!("434b5245f6Fe54D0C9F881d55c2Ba27fe7132d89"),
            usdg: address!("823412ac2FfD566cFE35560A850EFec81337e67f"),
            price_feed: address!("f28e261b89fc4479ee41044dd55f7a4053f9844a"),
            reader: address!("Cb7AEB7f471D1c19C78E3cd578ee5Ff0788278B6"),
        }
    }
}

impl Default for DexParams {
    fn default() -> Self {
        Self::arbitrum()
    }
}

/// Vault and price-feed parameters that apply to every token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    pub stable_swap_fee_bps: U256,
    pub swap_fee_bps: U256,
    pub stable_tax_bps: U256,
    pub tax_bps: U256,
    pub has_dynamic_fees: bool,
    pub total_token_weights: U256,
    pub is_amm_enabled: bool,
    pub is_secondary_price_enabled: bool,
    pub max_strict_price_deviation: U256,
    pub use_v2_pricing: bool,
    pub price_sample_space: U256,
}

impl GlobalConfig {
    /// Base fee and tax for a swap; the stable pair applies only when both
    /// sides are stable tokens.
    pub fn swap_fees(&self, is_stable_swap: bool) -> (U256, U256) {
        if is_stable_swap {
            (self.stable_swap_fee_bps, self.stable_tax_bps)
        } else {
            (self.swap_fee_bps, self.tax_bps)
        }
    }
}

/// Everything the mirror and the quoter need to know about a vault,
/// fixed at bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolConfig {
    pub vault: Address,
    pub usdg: Address,
    pub price_feed: Address,
    pub reader: Address,
    pub tokens: TokenRegistry,
    pub global: GlobalConfig,
}

impl PoolConfig {
    pub fn new(params: &DexParams, tokens: TokenRegistry, global: GlobalConfig) -> Self {
        Self {
            vault: params.vault,
            usdg: params.usdg,
            price_feed: params.price_feed,
            reader: params.reader,
            tokens,
            global,
        }
    }
}
