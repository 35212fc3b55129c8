//! Dynamic swap fees that steer each token toward its weight target.

use alloy::primitives::U256;

use crate::{
    helpers::mul_div,
    prelude::*,
    types::{MirrorState, PoolConfig, TokenId},
};

/// USDG balance `token` would hold if the vault matched its weights exactly.
///
/// Zero when there is no supply or no total weight.
pub fn target_usdg_amount(config: &PoolConfig, state: &MirrorState, token: TokenId) -> Result<U256> {
    let supply = state.usdg_total_supply;
    let total_weight = config.global.total_token_weights;
    if supply.is_zero() || total_weight.is_zero() {
        return Ok(U256::ZERO);
    }
    let weight = config
        .tokens
        .get(token)
        .map(|t| t.weight)
        .unwrap_or_default();
    mul_div(weight, supply, total_weight, "target usdg amount")
}

/// Fee in basis points for moving `usdg_delta` of `token` into (`increment`)
/// or out of the vault.
///
/// Deviations are measured from the weight target before and after the
/// move. The lower of the two resulting tax rates is charged on top of
/// `base_bps`.
pub fn fee_basis_points(
    config: &PoolConfig,
    state: &MirrorState,
    token: TokenId,
    usdg_delta: U256,
    base_bps: U256,
    tax_bps: U256,
    increment: bool,
) -> Result<U256> {
    if !config.global.has_dynamic_fees {
        return Ok(base_bps);
    }

    let initial = state.usdg_amount(token);
    let next = if increment {
        initial.saturating_add(usdg_delta)
    } else {
        initial.saturating_sub(usdg_delta)
    };

    let target = target_usdg_amount(config, state, token)?;
    if target.is_zero() {
        return Ok(base_bps);
    }

    // Clamped so a single rate never exceeds tax_bps.
    let initial_diff = initial.abs_diff(target).min(target);
    let next_diff = next.abs_diff(target).min(target);

    let rate_before = mul_div(tax_bps, initial_diff, target, "fee rate")?;
    let rate_after = mul_div(tax_bps, next_diff, target, "fee rate")?;

    let rate = if rate_after <= rate_before {
        rate_after
    } else {
        rate_before
    };
    Ok(base_bps.saturating_add(rate))
}
