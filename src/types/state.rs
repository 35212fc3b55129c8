//! Mirrored vault state.

use alloy::primitives::U256;

use super::TokenId;

/// Per-token USDG balances, indexed by [`TokenId`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VaultSnapshot {
    usdg_amounts: Vec<U256>,
}

impl VaultSnapshot {
    pub fn new(usdg_amounts: Vec<U256>) -> Self {
        Self { usdg_amounts }
    }

    /// Balance of a tracked token; ids outside the arena read as zero.
    #[inline]
    pub fn usdg_amount(&self, token: TokenId) -> U256 {
        self.usdg_amounts
            .get(token.index())
            .copied()
            .unwrap_or_default()
    }

    /// Mutable slot for a tracked token. Never grows the arena.
    pub(crate) fn usdg_amount_mut(&mut self, token: TokenId) -> Option<&mut U256> {
        self.usdg_amounts.get_mut(token.index())
    }

    pub fn len(&self) -> usize {
        self.usdg_amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usdg_amounts.is_empty()
    }

    pub fn as_slice(&self) -> &[U256] {
        &self.usdg_amounts
    }
}

/// The unit produced by the mirror and consumed by the quoter.
///
/// Published snapshots are shared behind `Arc` and never mutated; event
/// application clones before writing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MirrorState {
    pub vault: VaultSnapshot,
    pub usdg_total_supply: U256,
}

impl MirrorState {
    pub fn new(vault: VaultSnapshot, usdg_total_supply: U256) -> Self {
        Self {
            vault,
            usdg_total_supply,
        }
    }

    #[inline]
    pub fn usdg_amount(&self, token: TokenId) -> U256 {
        self.vault.usdg_amount(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_lookup() {
        let snapshot = VaultSnapshot::new(vec![U256::from(10), U256::from(20)]);
        assert_eq!(snapshot.usdg_amount(TokenId(1)), U256::from(20));
        assert_eq!(snapshot.usdg_amount(TokenId(9)), U256::ZERO);
    }

    #[test]
    fn test_snapshot_mut_does_not_grow() {
        let mut snapshot = VaultSnapshot::new(vec![U256::from(1)]);
        assert!(snapshot.usdg_amount_mut(TokenId(3)).is_none());
        assert_eq!(snapshot.len(), 1);
    }
}
