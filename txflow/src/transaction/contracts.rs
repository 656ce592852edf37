//! Contract interfaces the builders call, plus conversions into ABI types.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::sol;
use chain_clients_common::strip_0x;
use num_bigint::{BigInt, Sign};

use crate::error::{FlowError, FlowResult};

pub use chain_clients_evm::{encode_calldata, IERC20};

sol! {
    /// Gravity Bridge contract on the Ethereum side
    interface IGravity {
        function sendToCosmos(address tokenContract, string calldata destination, uint256 amount) external;
    }

    /// LayerZero v1 OFT
    interface IOFT {
        function estimateSendFee(
            uint16 dstChainId,
            bytes calldata toAddress,
            uint256 amount,
            bool useZro,
            bytes calldata adapterParams
        ) external view returns (uint256 nativeFee, uint256 zroFee);

        function sendFrom(
            address from,
            uint16 dstChainId,
            bytes calldata toAddress,
            uint256 amount,
            address refundAddress,
            address zroPaymentAddress,
            bytes calldata adapterParams
        ) external payable;
    }

    /// cToken market with an ERC20 underlying
    interface ICErc20 {
        function mint(uint256 mintAmount) external returns (uint256);
        function repayBorrow(uint256 repayAmount) external returns (uint256);
        function redeemUnderlying(uint256 redeemAmount) external returns (uint256);
        function borrow(uint256 borrowAmount) external returns (uint256);
    }

    /// cToken market of the native coin; amounts travel as value
    interface ICEther {
        function mint() external payable;
        function repayBorrow() external payable;
    }

    interface IComptroller {
        function enterMarkets(address[] calldata cTokens) external returns (uint256[] memory);
        function exitMarket(address cToken) external returns (uint256);
    }

    interface IRouter {
        function addLiquidity(
            address tokenA,
            address tokenB,
            bool stable,
            uint256 amountADesired,
            uint256 amountBDesired,
            uint256 amountAMin,
            uint256 amountBMin,
            address to,
            uint256 deadline
        ) external returns (uint256 amountA, uint256 amountB, uint256 liquidity);

        function removeLiquidity(
            address tokenA,
            address tokenB,
            bool stable,
            uint256 liquidity,
            uint256 amountAMin,
            uint256 amountBMin,
            address to,
            uint256 deadline
        ) external returns (uint256 amountA, uint256 amountB);
    }
}

pub fn address(value: &str) -> FlowResult<Address> {
    chain_clients_evm::parse_address(value).map_err(|e| FlowError::InvalidState(e.to_string()))
}

/// Converts a base-unit amount into a uint256; negative or oversized values are rejected.
pub fn uint256(value: &BigInt) -> FlowResult<U256> {
    let (sign, bytes) = value.to_bytes_be();
    if sign == Sign::Minus {
        return Err(FlowError::InvalidAmount(format!("{} is negative", value)));
    }
    U256::try_from_be_slice(&bytes)
        .ok_or_else(|| FlowError::InvalidAmount(format!("{} does not fit in uint256", value)))
}

pub fn to_bigint(value: U256) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, &value.to_be_bytes::<32>())
}

/// Decodes `0x` hex into ABI bytes.
pub fn hex_bytes(value: &str) -> FlowResult<Bytes> {
    hex::decode(strip_0x(value))
        .map(Bytes::from)
        .map_err(|e| FlowError::InvalidState(format!("bad hex {}: {}", value, e)))
}
