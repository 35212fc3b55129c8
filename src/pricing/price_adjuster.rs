use alloy::primitives::U256;

use crate::{consts::BASIS_POINTS_DIVISOR, helpers::mul_div, prelude::*, types::TokenConfig, Error};

/// Price the vault pays out at: raw price widened up by the token's spread.
pub fn max_price(price: U256, token: &TokenConfig) -> Result<U256> {
    let factor = BASIS_POINTS_DIVISOR
        .checked_add(token.spread_bps)
        .ok_or(Error::Overflow("max price"))?;
    mul_div(price, factor, BASIS_POINTS_DIVISOR, "max price")
}

/// Price the vault takes in at: raw price narrowed down by the token's spread.
pub fn min_price(price: U256, token: &TokenConfig) -> Result<U256> {
    let factor = BASIS_POINTS_DIVISOR.saturating_sub(token.spread_bps);
    mul_div(price, factor, BASIS_POINTS_DIVISOR, "min price")
}

/// Apply the feed's per-token adjustment, additive or subtractive.
///
/// A zero adjustment returns `price` unchanged.
pub fn adjusted_price(price: U256, token: &TokenConfig) -> Result<U256> {
    if token.adjustment_bps.is_zero() {
        return Ok(price);
    }
    let factor = if token.is_adjustment_additive {
        BASIS_POINTS_DIVISOR
            .checked_add(token.adjustment_bps)
            .ok_or(Error::Overflow("adjusted price"))?
    } else {
        BASIS_POINTS_DIVISOR.saturating_sub(token.adjustment_bps)
    };
    mul_div(price, factor, BASIS_POINTS_DIVISOR, "adjusted price")
}
