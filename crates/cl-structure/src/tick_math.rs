use std::sync::OnceLock;

use malachite::{
    Natural,
    num::arithmetic::traits::{DivRound, FloorSqrt, Pow},
    rounding_modes::RoundingMode
};

use crate::{
    dec::{Dec, PRECISION},
    error::MathError
};

/// Lowest tick a position may reference.
pub const MIN_TICK: i64 = -887272;
/// Highest tick a position may reference.
pub const MAX_TICK: i64 = 887272;

/// Fractional digits carried while raising the tick base to a power. Results
/// are rounded to [`Dec`] precision once, at the end.
const WIDE_DIGITS: u64 = 72;

pub type Tick = i64;

fn pow10(exponent: u64) -> Natural {
    Natural::from(10u32).pow(exponent)
}

fn wide_one() -> &'static Natural {
    static ONE: OnceLock<Natural> = OnceLock::new();
    ONE.get_or_init(|| pow10(WIDE_DIGITS))
}

/// 1.0001, the price ratio between two adjacent ticks.
fn wide_tick_base() -> &'static Natural {
    static BASE: OnceLock<Natural> = OnceLock::new();
    BASE.get_or_init(|| Natural::from(10_001u32) * pow10(WIDE_DIGITS - 4))
}

fn wide_mul(lhs: &Natural, rhs: &Natural) -> Natural {
    (lhs * rhs).div_round(wide_one(), RoundingMode::Nearest).0
}

/// `1.0001^exponent` scaled by `10^72`.
fn wide_tick_power(exponent: u64) -> Natural {
    let mut base = wide_tick_base().clone();
    let mut power = wide_one().clone();
    let mut remaining = exponent;
    while remaining > 0 {
        if remaining % 2 == 1 {
            power = wide_mul(&power, &base);
        }
        remaining /= 2;
        if remaining > 0 {
            base = wide_mul(&base, &base);
        }
    }

    power
}

fn check_bounds(tick: Tick) -> Result<(), MathError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(MathError::TickOutOfBounds { tick })
    }
    Ok(())
}

/// `1.0001^tick`, rounded half to even. Prices below `10^-18` read as zero.
pub fn tick_to_price(tick: Tick) -> Result<Dec, MathError> {
    check_bounds(tick)?;

    let power = wide_tick_power(tick.unsigned_abs());
    let digits = PRECISION as u64;
    let raw = if tick < 0 {
        pow10(WIDE_DIGITS + digits).div_round(&power, RoundingMode::Nearest).0
    } else {
        power.div_round(pow10(WIDE_DIGITS - digits), RoundingMode::Nearest).0
    };

    Dec::from_raw_natural(raw)
}

/// Floor of `sqrt(1.0001^tick)`, taken from the wide power so that ticks whose
/// price underflows [`Dec`] still have a usable sqrt price.
pub fn tick_to_sqrt_price(tick: Tick) -> Result<Dec, MathError> {
    check_bounds(tick)?;

    let power = wide_tick_power(tick.unsigned_abs());
    let digits = 2 * PRECISION as u64;
    // sqrt price scaled by 10^18 is the root of the price scaled by 10^36
    let squared = if tick < 0 {
        pow10(WIDE_DIGITS + digits) / power
    } else {
        power / pow10(WIDE_DIGITS - digits)
    };

    let sqrt_price = Dec::from_raw_natural(squared.floor_sqrt())?;
    if sqrt_price.is_zero() {
        return Err(MathError::SqrtPriceUnderflow { tick })
    }

    Ok(sqrt_price)
}

/// Largest tick whose price does not exceed `price`.
pub fn price_to_tick(price: Dec) -> Result<Tick, MathError> {
    if !price.is_positive() {
        return Err(MathError::NonPositivePrice { value: price.to_string() })
    }
    if tick_to_price(MAX_TICK)? <= price {
        return Ok(MAX_TICK)
    }

    // tick_to_price(low) <= price < tick_to_price(high)
    let (mut low, mut high) = (MIN_TICK, MAX_TICK);
    while high - low > 1 {
        let mid = low + (high - low) / 2;
        if tick_to_price(mid)? <= price {
            low = mid;
        } else {
            high = mid;
        }
    }

    Ok(low)
}
