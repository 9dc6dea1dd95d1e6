//! Conversions between token amounts and liquidity over a sqrt-price range.
//! Every function accepts its two sqrt prices in either order.

use crate::{dec::Dec, error::MathError};

fn ordered(sqrt_price_a: Dec, sqrt_price_b: Dec) -> (Dec, Dec) {
    if sqrt_price_a > sqrt_price_b { (sqrt_price_b, sqrt_price_a) } else { (sqrt_price_a, sqrt_price_b) }
}

/// Adds a signed delta to a non-negative liquidity value, refusing to go
/// below zero.
pub fn add_liquidity(before: Dec, delta: Dec) -> Result<Dec, MathError> {
    let after = before.checked_add(delta)?;
    if after.is_negative() {
        return Err(MathError::LiquidityUnderflow {
            before: before.to_string(),
            delta:  delta.to_string()
        })
    }

    Ok(after)
}

/// Liquidity backed by `amount0` of token0 over the range.
pub fn liquidity0(amount0: u128, sqrt_price_a: Dec, sqrt_price_b: Dec) -> Result<Dec, MathError> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
    let product = lower.checked_mul(upper)?;
    let width = upper.checked_sub(lower)?;

    Dec::from_amount(amount0).checked_mul(product)?.checked_quo(width)
}

/// Liquidity backed by `amount1` of token1 over the range.
pub fn liquidity1(amount1: u128, sqrt_price_a: Dec, sqrt_price_b: Dec) -> Result<Dec, MathError> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
    let width = upper.checked_sub(lower)?;

    Dec::from_amount(amount1).checked_quo(width)
}

/// Token0 owed for `liquidity` over the range. Negative liquidity yields a
/// negative amount.
pub fn calc_amount0_delta(liquidity: Dec, sqrt_price_a: Dec, sqrt_price_b: Dec) -> Result<Dec, MathError> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
    let width = upper.checked_sub(lower)?;
    let product = lower.checked_mul(upper)?;

    liquidity.checked_mul(width)?.checked_quo(product)
}

/// Token1 owed for `liquidity` over the range.
pub fn calc_amount1_delta(liquidity: Dec, sqrt_price_a: Dec, sqrt_price_b: Dec) -> Result<Dec, MathError> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
    liquidity.checked_mul(upper.checked_sub(lower)?)
}

/// Largest liquidity the two desired amounts can back at the current price.
pub fn get_liquidity_from_amounts(
    sqrt_price: Dec,
    sqrt_price_a: Dec,
    sqrt_price_b: Dec,
    amount0: u128,
    amount1: u128
) -> Result<Dec, MathError> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);

    if sqrt_price <= lower {
        liquidity0(amount0, lower, upper)
    } else if sqrt_price <= upper {
        let from_token0 = liquidity0(amount0, sqrt_price, upper)?;
        let from_token1 = liquidity1(amount1, sqrt_price, lower)?;
        Ok(from_token0.min(from_token1))
    } else {
        liquidity1(amount1, upper, lower)
    }
}
