//! Signed fixed-point decimal with 18 fractional digits. Liquidity, sqrt
//! prices and the time-weighted accumulators are all carried in this type so
//! that every node computes bit-identical results.

use std::{
    cmp::Ordering,
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
    time::Duration
};

use alloy_primitives::{I256, Sign, U256};
use malachite::{Natural, num::arithmetic::traits::FloorSqrt};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::error::MathError;

/// Number of fractional digits carried by [`Dec`].
pub const PRECISION: usize = 18;

const SCALE: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);
const NANOS_TO_SCALE: U256 = U256::from_limbs([1_000_000_000, 0, 0, 0]);

#[derive(Copy, Clone, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Dec(I256);

impl Dec {
    pub const ONE: Dec = Dec(I256::from_raw(SCALE));
    pub const ZERO: Dec = Dec(I256::ZERO);

    /// Builds a decimal from its raw representation, i.e. `value * 10^-18`.
    pub const fn from_raw_u64(value: u64) -> Self {
        Self(I256::from_raw(U256::from_limbs([value, 0, 0, 0])))
    }

    pub fn from_amount(amount: u128) -> Self {
        // u128::MAX * 10^18 < 2^255
        Self(I256::from_raw(U256::from(amount) * SCALE))
    }

    pub fn from_int(value: i128) -> Self {
        let magnitude = U256::from(value.unsigned_abs()) * SCALE;
        Self::from_sign_and_magnitude(value < 0, magnitude)
    }

    /// Seconds as a decimal, keeping nanosecond resolution.
    pub fn from_duration(duration: Duration) -> Self {
        Self(I256::from_raw(U256::from(duration.as_nanos()) * NANOS_TO_SCALE))
    }

    fn from_sign_and_magnitude(negative: bool, magnitude: U256) -> Self {
        let value = I256::from_raw(magnitude);
        if negative { Self(-value) } else { Self(value) }
    }

    /// Builds a non-negative decimal from a raw value already scaled by `10^18`.
    pub(crate) fn from_raw_natural(raw: Natural) -> Result<Self, MathError> {
        let magnitude = U256::checked_from_limbs_slice(&raw.into_limbs_asc()).ok_or(MathError::Overflow)?;
        Self::checked_from_parts(false, magnitude)
    }

    fn checked_from_parts(negative: bool, magnitude: U256) -> Result<Self, MathError> {
        let sign = if negative { Sign::Negative } else { Sign::Positive };
        I256::checked_from_sign_and_abs(sign, magnitude)
            .map(Self)
            .ok_or(MathError::Overflow)
    }

    fn parts(self) -> (bool, U256) {
        let (sign, magnitude) = self.0.into_sign_and_abs();
        (sign.is_negative(), magnitude)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    pub fn abs(self) -> Self {
        let (_, magnitude) = self.parts();
        Self(I256::from_raw(magnitude))
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, MathError> {
        self.0.checked_add(rhs.0).map(Self).ok_or(MathError::Overflow)
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self, MathError> {
        self.0.checked_sub(rhs.0).map(Self).ok_or(MathError::Overflow)
    }

    /// Multiplication rounding half to even at the 18th digit.
    pub fn checked_mul(self, rhs: Self) -> Result<Self, MathError> {
        let (lhs_negative, lhs) = self.parts();
        let (rhs_negative, rhs) = rhs.parts();
        let product = lhs.checked_mul(rhs).ok_or(MathError::Overflow)?;

        Self::checked_from_parts(lhs_negative != rhs_negative, div_round_half_even(product, SCALE))
    }

    /// Multiplication truncating toward zero.
    pub fn checked_mul_truncate(self, rhs: Self) -> Result<Self, MathError> {
        let (lhs_negative, lhs) = self.parts();
        let (rhs_negative, rhs) = rhs.parts();
        let product = lhs.checked_mul(rhs).ok_or(MathError::Overflow)?;

        Self::checked_from_parts(lhs_negative != rhs_negative, product / SCALE)
    }

    /// Division rounding half to even at the 18th digit.
    pub fn checked_quo(self, rhs: Self) -> Result<Self, MathError> {
        let (negative, numerator, denominator) = self.quo_operands(rhs)?;
        Self::checked_from_parts(negative, div_round_half_even(numerator, denominator))
    }

    /// Division truncating toward zero.
    pub fn checked_quo_truncate(self, rhs: Self) -> Result<Self, MathError> {
        let (negative, numerator, denominator) = self.quo_operands(rhs)?;
        Self::checked_from_parts(negative, numerator / denominator)
    }

    /// Division rounding away from zero.
    pub fn checked_quo_round_up(self, rhs: Self) -> Result<Self, MathError> {
        let (negative, numerator, denominator) = self.quo_operands(rhs)?;
        let (quotient, remainder) = numerator.div_rem(denominator);
        let quotient = if remainder.is_zero() { quotient } else { quotient + U256::from(1u8) };

        Self::checked_from_parts(negative, quotient)
    }

    fn quo_operands(self, rhs: Self) -> Result<(bool, U256, U256), MathError> {
        if rhs.is_zero() {
            return Err(MathError::DivisionByZero)
        }
        let (lhs_negative, lhs) = self.parts();
        let (rhs_negative, rhs) = rhs.parts();
        let numerator = lhs.checked_mul(SCALE).ok_or(MathError::Overflow)?;

        Ok((lhs_negative != rhs_negative, numerator, rhs))
    }

    /// Floor of the exact square root at 18 digit precision.
    pub fn checked_sqrt(self) -> Result<Self, MathError> {
        if self.is_negative() {
            return Err(MathError::NegativeSqrt { value: self.to_string() })
        }
        if self.is_zero() {
            return Ok(Self::ZERO)
        }

        let (_, magnitude) = self.parts();
        let widened = magnitude.checked_mul(SCALE).ok_or(MathError::Overflow)?;
        let root = Natural::from_limbs_asc(widened.as_limbs()).floor_sqrt();
        let root = U256::checked_from_limbs_slice(&root.to_limbs_asc()).ok_or(MathError::Overflow)?;

        Self::checked_from_parts(false, root)
    }

    /// Integer part of a non-negative decimal.
    pub fn truncate_to_amount(self) -> Result<u128, MathError> {
        if self.is_negative() {
            return Err(MathError::NegativeAmount { value: self.to_string() })
        }
        let (_, magnitude) = self.parts();
        u128::try_from(magnitude / SCALE).map_err(|_| MathError::Overflow)
    }

    /// Lossy conversion, used for metrics only.
    pub fn to_f64(self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }
}

fn div_round_half_even(numerator: U256, denominator: U256) -> U256 {
    let (quotient, remainder) = numerator.div_rem(denominator);
    let distance_to_next = denominator - remainder;

    match remainder.cmp(&distance_to_next) {
        Ordering::Greater => quotient + U256::from(1u8),
        Ordering::Equal if quotient.bit(0) => quotient + U256::from(1u8),
        _ => quotient
    }
}

impl From<u128> for Dec {
    fn from(value: u128) -> Self {
        Self::from_amount(value)
    }
}

impl From<u64> for Dec {
    fn from(value: u64) -> Self {
        Self::from_amount(value as u128)
    }
}

impl From<i64> for Dec {
    fn from(value: i64) -> Self {
        Self::from_int(value as i128)
    }
}

// The operator impls below are unchecked and panic on overflow in debug
// builds. Ledger arithmetic goes through the `checked_*` methods.
impl Add for Dec {
    type Output = Dec;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Dec {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Dec {
    type Output = Dec;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Dec {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Dec {
    type Output = Dec;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Dec {
    fn sum<I: Iterator<Item = Dec>>(iter: I) -> Self {
        iter.fold(Dec::ZERO, |acc, value| acc + value)
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (negative, magnitude) = self.parts();
        let (integer, fraction) = magnitude.div_rem(SCALE);
        // fraction < 10^18 always fits a u64
        let fraction: u64 = fraction.to();

        if negative {
            write!(f, "-")?;
        }
        write!(f, "{integer}.{fraction:0width$}", width = PRECISION)
    }
}

impl fmt::Debug for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Dec {
    type Err = MathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || MathError::MalformedDecimal { input: s.to_string() };

        let (negative, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s)
        };
        let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        if integer.is_empty()
            || fraction.len() > PRECISION
            || !integer.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit())
        {
            return Err(malformed())
        }

        let integer = U256::from_str_radix(integer, 10).map_err(|_| malformed())?;
        let fraction = if fraction.is_empty() {
            U256::ZERO
        } else {
            let padded = format!("{fraction:0<width$}", width = PRECISION);
            U256::from_str_radix(&padded, 10).map_err(|_| malformed())?
        };

        let magnitude = integer
            .checked_mul(SCALE)
            .and_then(|scaled| scaled.checked_add(fraction))
            .ok_or(MathError::Overflow)?;

        Self::checked_from_parts(negative, magnitude)
    }
}

impl Serialize for Dec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Dec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
