use alloy::primitives::{address, Address};

/// Arbitrum token addresses and the oracle symbols they are quoted under.
pub const ADDRESS_TO_CURRENCY: [(Address, &str); 12] = [
    (address!("7e141940932e3d13bfa54b224cb4a16510519308"), "AUD"),
    (address!("116172b2482c5dc3e6f445c16ac13367ac3fcd35"), "EUR"),
    (address!("3d147cd9ac957b2a5f968de9d1c6b9d0872286a0"), "PHP"),
    (address!("8616e8ea83f048ab9a5ec513c9412dd2993bce3f"), "fxUSD"),
    (address!("2c29daace6aa05e3b65743efd61f8a2c448302a3"), "CNY"),
    (address!("f4e8ba79d058fff263fd043ef50e1010c1bdf991"), "KRW"),
    (address!("8c414cb8a9af9f7b03673e93df73c23c1aa05b4e"), "CHF"),
    (address!("398b09b68aec6c58e28ade6147dac2ecc6789737"), "CAD"),
    (address!("1ae27d9068dadf10f611367332d162d184ed3414"), "GBP"),
    (address!("95e0e6230e9e965a4f12ede5ba8238aa04a85bc6"), "JPY"),
    (address!("55a90f0eb223f3b2c0c0759f375734c48220decb"), "SGD"),
    (address!("82af49447d8a07e3bd95bd0d56f35241523fbab1"), "ETH"),
];

pub fn currency_for(token: Address) -> Option<&'static str> {
    ADDRESS_TO_CURRENCY
        .iter()
        .find(|(address, _)| *address == token)
        .map(|(_, symbol)| *symbol)
}

pub fn token_for(symbol: &str) -> Option<Address> {
    ADDRESS_TO_CURRENCY
        .iter()
        .find(|(_, s)| *s == symbol)
        .map(|(address, _)| *address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_both_ways() {
        let weth = address!("82af49447d8a07e3bd95bd0d56f35241523fbab1");
        assert_eq!(currency_for(weth), Some("ETH"));
        assert_eq!(token_for("ETH"), Some(weth));
        assert_eq!(currency_for(Address::ZERO), None);
        assert_eq!(token_for("XAU"), None);
    }

    #[test]
    fn test_symbols_are_unique() {
        for (i, (_, a)) in ADDRESS_TO_CURRENCY.iter().enumerate() {
            for (_, b) in &ADDRESS_TO_CURRENCY[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
