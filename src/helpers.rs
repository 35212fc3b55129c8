use alloy::primitives::U256;

use crate::{prelude::*, Error};

/// 10^decimals as a 256-bit integer.
#[inline]
pub fn pow10(decimals: u8) -> U256 {
    U256::from(10u64).pow(U256::from(decimals))
}

/// `a * b / denominator` with a checked 256-bit product.
#[inline]
pub fn mul_div(a: U256, b: U256, denominator: U256, context: &'static str) -> Result<U256> {
    if denominator.is_zero() {
        return Err(Error::Overflow(context));
    }
    a.checked_mul(b)
        .map(|product| product / denominator)
        .ok_or(Error::Overflow(context))
}

/// Narrow an on-chain integer into `u8`, rejecting values that do not fit.
pub(crate) fn narrow_u8(value: U256, field: &str) -> Result<u8> {
    if value > U256::from(u8::MAX) {
        return Err(Error::ConfigDecode(format!(
            "{field} value {value} does not fit in u8"
        )));
    }
    Ok(value.to::<u8>())
}
