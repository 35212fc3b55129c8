//! Decoding of the chain logs the vault mirror follows.

use alloy::{
    primitives::{Address, Log, U256},
    sol_types::SolEvent,
};

use crate::{
    abi::{IUsdg, IVault},
    prelude::*,
    Error,
};

/// A state-changing event, decoded but not yet checked against the token set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultEvent {
    IncreaseUsdgAmount { token: Address, amount: U256 },
    DecreaseUsdgAmount { token: Address, amount: U256 },
    Mint { amount: U256 },
    Burn { amount: U256 },
}

/// Decode `log` if it is one of the followed events.
///
/// Logs from other emitters, other topics, and USDG transfers between two
/// holders yield `Ok(None)`. A matching topic with a malformed payload is
/// `Error::EventParse`.
pub fn parse_event(vault: Address, usdg: Address, log: &Log) -> Result<Option<VaultEvent>> {
    let Some(topic0) = log.data.topics().first().copied() else {
        return Ok(None);
    };

    if log.address == vault {
        if topic0 == IVault::IncreaseUsdgAmount::SIGNATURE_HASH {
            let ev = IVault::IncreaseUsdgAmount::decode_log_data(&log.data).map_err(parse_err)?;
            return Ok(Some(VaultEvent::IncreaseUsdgAmount {
                token: ev.token,
                amount: ev.amount,
            }));
        }
        if topic0 == IVault::DecreaseUsdgAmount::SIGNATURE_HASH {
            let ev = IVault::DecreaseUsdgAmount::decode_log_data(&log.data).map_err(parse_err)?;
            return Ok(Some(VaultEvent::DecreaseUsdgAmount {
                token: ev.token,
                amount: ev.amount,
            }));
        }
    }

    if log.address == usdg && topic0 == IUsdg::Transfer::SIGNATURE_HASH {
        let ev = IUsdg::Transfer::decode_log_data(&log.data).map_err(parse_err)?;
        let event = match (ev.from.is_zero(), ev.to.is_zero()) {
            (true, false) => Some(VaultEvent::Mint { amount: ev.value }),
            (false, true) => Some(VaultEvent::Burn { amount: ev.value }),
            _ => None,
        };
        return Ok(event);
    }

    Ok(None)
}

fn parse_err(e: alloy::sol_types::Error) -> Error {
    Error::EventParse(e.to_string())
}
