//! Replica of vault USDG balances and USDG total supply.

use std::sync::Arc;

use alloy::{
    primitives::{Address, Bytes, Log, B256},
    sol_types::SolEvent,
};

use super::{
    events::{parse_event, VaultEvent},
    Replica,
};
use crate::{
    abi::{IUsdg, IVault},
    bootstrap::BatchCursor,
    multicall::{ensure_batch_len, Call},
    prelude::*,
    types::{MirrorState, PoolConfig, VaultSnapshot},
    Error,
};

/// Emitters and topics a host must deliver for the mirror to stay current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionFilter {
    pub addresses: Vec<Address>,
    pub topics: Vec<B256>,
}

impl SubscriptionFilter {
    pub fn matches(&self, log: &Log) -> bool {
        self.addresses.contains(&log.address)
            && log
                .data
                .topics()
                .first()
                .is_some_and(|topic| self.topics.contains(topic))
    }
}

#[derive(Debug, Clone)]
pub struct VaultReplica {
    config: Arc<PoolConfig>,
}

impl VaultReplica {
    pub fn new(config: Arc<PoolConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}

impl Replica for VaultReplica {
    type State = MirrorState;

    fn generate_calls(&self) -> Vec<Call> {
        let vault = self.config.vault;
        self.config
            .tokens
            .iter()
            .map(|(_, token)| {
                Call::new(
                    vault,
                    IVault::usdgAmountsCall {
                        token: token.address,
                    },
                )
            })
            .chain(std::iter::once(Call::new(
                self.config.usdg,
                IUsdg::totalSupplyCall {},
            )))
            .collect()
    }

    fn generate_state(&self, outputs: &[Bytes]) -> Result<MirrorState> {
        let token_count = self.config.tokens.len();
        ensure_batch_len("vault state", token_count + 1, outputs)?;

        let mut cursor = BatchCursor::new(outputs);
        let amounts = (0..token_count)
            .map(|_| cursor.decode::<IVault::usdgAmountsCall>())
            .collect::<Result<Vec<_>>>()?;
        let supply = cursor.decode::<IUsdg::totalSupplyCall>()?;

        Ok(MirrorState::new(VaultSnapshot::new(amounts), supply))
    }

    fn process_log(&self, state: &MirrorState, log: &Log) -> Result<Option<MirrorState>> {
        let Some(event) = parse_event(self.config.vault, self.config.usdg, log)? else {
            return Ok(None);
        };

        match event {
            VaultEvent::IncreaseUsdgAmount { token, amount } => {
                let Some(id) = self.config.tokens.id(&token) else {
                    return Ok(None);
                };
                let mut next = state.clone();
                if let Some(balance) = next.vault.usdg_amount_mut(id) {
                    *balance = balance
                        .checked_add(amount)
                        .ok_or(Error::Overflow("usdg amount"))?;
                }
                Ok(Some(next))
            }
            VaultEvent::DecreaseUsdgAmount { token, amount } => {
                let Some(id) = self.config.tokens.id(&token) else {
                    return Ok(None);
                };
                let mut next = state.clone();
                if let Some(balance) = next.vault.usdg_amount_mut(id) {
                    *balance = balance
                        .checked_sub(amount)
                        .ok_or(Error::NegativeBalance {
                            token,
                            balance: *balance,
                            amount,
                        })?;
                }
                Ok(Some(next))
            }
            VaultEvent::Mint { amount } => {
                let supply = state
                    .usdg_total_supply
                    .checked_add(amount)
                    .ok_or(Error::Overflow("usdg supply"))?;
                Ok(Some(MirrorState::new(state.vault.clone(), supply)))
            }
            VaultEvent::Burn { amount } => {
                let supply = state.usdg_total_supply.checked_sub(amount).ok_or(
                    Error::NegativeSupply {
                        supply: state.usdg_total_supply,
                        amount,
                    },
                )?;
                Ok(Some(MirrorState::new(state.vault.clone(), supply)))
            }
        }
    }

    fn subscription_filter(&self) -> SubscriptionFilter {
        SubscriptionFilter {
            addresses: vec![self.config.vault, self.config.usdg],
            topics: vec![
                IVault::IncreaseUsdgAmount::SIGNATURE_HASH,
                IVault::DecreaseUsdgAmount::SIGNATURE_HASH,
                IUsdg::Transfer::SIGNATURE_HASH,
            ],
        }
    }
}
