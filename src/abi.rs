//! Solidity bindings for the contracts the vault mirror reads from.

use alloy::sol;

sol! {
    #[sol(all_derives)]
    interface IVault {
        event IncreaseUsdgAmount(address token, uint256 amount);
        event DecreaseUsdgAmount(address token, uint256 amount);

        function allWhitelistedTokensLength() external view returns (uint256);
        function allWhitelistedTokens(uint256 index) external view returns (address);

        function tokenDecimals(address token) external view returns (uint256);
        function stableTokens(address token) external view returns (bool);
        function tokenWeights(address token) external view returns (uint256);
        function usdgAmounts(address token) external view returns (uint256);

        function stableSwapFeeBasisPoints() external view returns (uint256);
        function swapFeeBasisPoints() external view returns (uint256);
        function stableTaxBasisPoints() external view returns (uint256);
        function taxBasisPoints() external view returns (uint256);
        function hasDynamicFees() external view returns (bool);
        function totalTokenWeights() external view returns (uint256);
    }
}

sol! {
    #[sol(all_derives)]
    interface IVaultPriceFeed {
        function isAmmEnabled() external view returns (bool);
        function isSecondaryPriceEnabled() external view returns (bool);
        function strictStableTokens(address token) external view returns (bool);
        function spreadBasisPoints(address token) external view returns (uint256);
        function isAdjustmentAdditive(address token) external view returns (bool);
        function adjustmentBasisPoints(address token) external view returns (uint256);
        function priceDecimals(address token) external view returns (uint256);
        function maxStrictPriceDeviation() external view returns (uint256);
        function useV2Pricing() external view returns (bool);
        function priceSampleSpace() external view returns (uint256);
    }
}

sol! {
    #[sol(all_derives)]
    interface IUsdg {
        event Transfer(address indexed from, address indexed to, uint256 value);

        function totalSupply() external view returns (uint256);
    }
}

sol! {
    #[sol(all_derives)]
    interface IReader {
        function getMaxAmountIn(address vault, address tokenIn, address tokenOut) external view returns (uint256);
    }
}

sol! {
    #[sol(all_derives)]
    interface IMulticall {
        struct Call {
            address target;
            bytes callData;
        }

        function aggregate(Call[] calls) external returns (uint256 blockNumber, bytes[] returnData);
    }
}
