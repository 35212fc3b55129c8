//! Swap pricing against the mirrored vault state.

mod fee_model;
mod price_adjuster;
mod quoter;

pub use fee_model::{fee_basis_points, target_usdg_amount};
pub use price_adjuster::{adjusted_price, max_price, min_price};
pub use quoter::{quote_with_prices, SwapQuoter};

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::prelude::*;

/// Source of raw token prices at 10^30 precision.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn price(&self, token: Address) -> Result<U256>;
}
