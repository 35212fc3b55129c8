use std::sync::Arc;

use alloy::primitives::{Address, U256};
use tracing::debug;

use super::{fee_basis_points, max_price, min_price, PriceSource};
use crate::{
    consts::{BASIS_POINTS_DIVISOR, PRICE_PRECISION, USDG_DECIMALS},
    helpers::{mul_div, pow10},
    prelude::*,
    types::{MirrorState, PoolConfig, TokenId},
};

/// Quotes swap outputs against a mirrored state and live oracle prices.
#[derive(Clone)]
pub struct SwapQuoter {
    config: Arc<PoolConfig>,
    prices: Arc<dyn PriceSource>,
}

impl SwapQuoter {
    pub fn new(config: Arc<PoolConfig>, prices: Arc<dyn PriceSource>) -> Self {
        Self { config, prices }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Output amounts for each of `amounts_in`, in order.
    ///
    /// `None` when either token is not tracked by the vault.
    pub async fn quote(
        &self,
        state: &MirrorState,
        token_in: Address,
        token_out: Address,
        amounts_in: &[U256],
    ) -> Result<Option<Vec<U256>>> {
        let tokens = &self.config.tokens;
        let (Some(id_in), Some(id_out)) = (tokens.id(&token_in), tokens.id(&token_out)) else {
            debug!(
                target: "handlefi::pricing",
                token_in = %token_in,
                token_out = %token_out,
                "Untracked token, pool cannot price pair"
            );
            return Ok(None);
        };

        if amounts_in.iter().all(|a| a.is_zero()) {
            return Ok(Some(vec![U256::ZERO; amounts_in.len()]));
        }

        let (raw_in, raw_out) =
            tokio::try_join!(self.prices.price(token_in), self.prices.price(token_out))?;

        quote_with_prices(&self.config, state, id_in, id_out, raw_in, raw_out, amounts_in).map(Some)
    }
}

/// Pure part of [`SwapQuoter::quote`] once both raw oracle prices are known.
///
/// The input price is narrowed by its spread and the output price widened,
/// so the pool never sells below or buys above its quoted band.
pub fn quote_with_prices(
    config: &PoolConfig,
    state: &MirrorState,
    token_in: TokenId,
    token_out: TokenId,
    raw_price_in: U256,
    raw_price_out: U256,
    amounts_in: &[U256],
) -> Result<Vec<U256>> {
    let (Some(cfg_in), Some(cfg_out)) = (config.tokens.get(token_in), config.tokens.get(token_out))
    else {
        return Ok(vec![U256::ZERO; amounts_in.len()]);
    };

    let price_in = min_price(raw_price_in, cfg_in)?;
    let price_out = max_price(raw_price_out, cfg_out)?;

    let (base_bps, tax_bps) = config
        .global
        .swap_fees(cfg_in.is_stable && cfg_out.is_stable);

    let usdg_unit = pow10(USDG_DECIMALS);
    let unit_in = pow10(cfg_in.decimals);
    let unit_out = pow10(cfg_out.decimals);

    let amounts_out = amounts_in
        .iter()
        .map(|&amount_in| {
            if amount_in.is_zero() {
                return Ok(U256::ZERO);
            }

            let usdg = mul_div(amount_in, price_in, PRICE_PRECISION, "usdg amount")?;
            let usdg = mul_div(usdg, usdg_unit, unit_in, "usdg amount")?;

            let fee_in = fee_basis_points(config, state, token_in, usdg, base_bps, tax_bps, true)?;
            let fee_out =
                fee_basis_points(config, state, token_out, usdg, base_bps, tax_bps, false)?;
            let fee_bps = fee_in.max(fee_out);

            let amount_out = mul_div(amount_in, price_in, price_out, "amount out")?;
            let amount_out = mul_div(amount_out, unit_out, unit_in, "amount out")?;

            mul_div(
                amount_out,
                BASIS_POINTS_DIVISOR.saturating_sub(fee_bps),
                BASIS_POINTS_DIVISOR,
                "amount out after fees",
            )
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        target: "handlefi::pricing",
        token_in = %cfg_in.address,
        token_out = %cfg_out.address,
        price_in = %price_in,
        price_out = %price_out,
        amounts = amounts_out.len(),
        "Quoted swap"
    );
    Ok(amounts_out)
}
