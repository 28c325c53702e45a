use core::fmt;

use crate::error::{InteropError, InteropResult};

/// Signed 64-bit fixed-point decimal with 10⁻⁸ scale, used for asset
/// amounts and the gas budget. All arithmetic is checked; overflow is
/// an error, never a wrap.
#[derive(Debug, Copy, Clone, Default, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Fixed8(i64);

impl Fixed8 {
    /// Number of decimal places.
    pub const DECIMALS: u32 = 8;

    /// Raw units per whole unit.
    pub const SCALE: i64 = 100_000_000;

    pub const ZERO: Fixed8 = Fixed8(0);
    pub const ONE: Fixed8 = Fixed8(Self::SCALE);
    pub const MAX: Fixed8 = Fixed8(i64::MAX);
    pub const MIN: Fixed8 = Fixed8(i64::MIN);

    /// Wraps a raw 10⁻⁸-unit count.
    #[inline]
    pub const fn from_raw(value: i64) -> Self {
        Self(value)
    }

    /// Converts a whole-unit amount, failing on overflow.
    pub fn from_integer(value: i64) -> InteropResult<Self> {
        value
            .checked_mul(Self::SCALE)
            .map(Self)
            .ok_or_else(|| InteropError::overflow("Fixed8::from_integer"))
    }

    #[inline]
    pub const fn raw(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> InteropResult<Self> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or_else(|| InteropError::overflow("Fixed8::checked_add"))
    }

    pub fn checked_sub(self, other: Self) -> InteropResult<Self> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or_else(|| InteropError::overflow("Fixed8::checked_sub"))
    }

    pub fn checked_mul_int(self, factor: i64) -> InteropResult<Self> {
        self.0
            .checked_mul(factor)
            .map(Self)
            .ok_or_else(|| InteropError::overflow("Fixed8::checked_mul_int"))
    }
}

impl fmt::Display for Fixed8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        let whole = magnitude / Self::SCALE as u64;
        let frac = magnitude % Self::SCALE as u64;
        if frac == 0 {
            write!(f, "{sign}{whole}")
        } else {
            let rendered = format!("{frac:08}");
            write!(f, "{sign}{whole}.{}", rendered.trim_end_matches('0'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_unit_conversion() {
        assert_eq!(Fixed8::from_integer(1).unwrap(), Fixed8::ONE);
        assert_eq!(Fixed8::from_integer(0).unwrap(), Fixed8::ZERO);
        assert!(Fixed8::from_integer(i64::MAX).is_err());
    }

    #[test]
    fn checked_arithmetic_refuses_overflow() {
        assert!(Fixed8::MAX.checked_add(Fixed8::ONE).is_err());
        assert!(Fixed8::MIN.checked_sub(Fixed8::ONE).is_err());
        let two = Fixed8::ONE.checked_add(Fixed8::ONE).unwrap();
        assert_eq!(two.raw(), 2 * Fixed8::SCALE);
    }

    #[test]
    fn display_trims_trailing_zeros() {
        assert_eq!(Fixed8::from_raw(150_000_000).to_string(), "1.5");
        assert_eq!(Fixed8::from_raw(-25_000_000).to_string(), "-0.25");
        assert_eq!(Fixed8::ONE.to_string(), "1");
    }
}
