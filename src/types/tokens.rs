//! Per-token configuration, stored as an arena indexed by [`TokenId`].

use std::collections::HashMap;

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Index of a whitelisted token, assigned in whitelist order at bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(pub u16);

impl TokenId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Static configuration of one whitelisted token, read once at bootstrap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenConfig {
    pub address: Address,
    /// Vault-side decimal precision of the token.
    pub decimals: u8,
    pub is_stable: bool,
    /// Target share of total USDG backing, relative to `GlobalConfig::total_token_weights`.
    pub weight: U256,
    pub is_strict_stable: bool,
    pub spread_bps: U256,
    pub adjustment_bps: U256,
    pub is_adjustment_additive: bool,
    pub price_decimals: u8,
}

impl TokenConfig {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            ..Default::default()
        }
    }
}

/// Arena of token configs with an address lookup built once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRegistry {
    tokens: Vec<TokenConfig>,
    index: HashMap<Address, TokenId>,
}

impl TokenRegistry {
    /// Build the registry. Token ids follow the order of `tokens`; a repeated
    /// address keeps its first id.
    pub fn new(tokens: Vec<TokenConfig>) -> Self {
        let mut index = HashMap::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            index.entry(token.address).or_insert(TokenId(i as u16));
        }
        Self { tokens, index }
    }

    #[inline]
    pub fn id(&self, address: &Address) -> Option<TokenId> {
        self.index.get(address).copied()
    }

    #[inline]
    pub fn get(&self, id: TokenId) -> Option<&TokenConfig> {
        self.tokens.get(id.index())
    }

    pub fn by_address(&self, address: &Address) -> Option<&TokenConfig> {
        self.id(address).and_then(|id| self.get(id))
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.index.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TokenId, &TokenConfig)> {
        self.tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (TokenId(i as u16), t))
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.tokens.iter().map(|t| t.address).collect()
    }
}

impl Serialize for TokenRegistry {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.tokens.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TokenRegistry {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<TokenConfig>::deserialize(deserializer).map(Self::new)
    }
}
