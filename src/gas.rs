//! Gas pricing for syscalls.
//!
//! Prices are quoted in units of 10⁻³ GAS; the meter itself holds a
//! [`Fixed8`] balance and deducts before a handler runs.

use crate::error::{InteropError, InteropResult};
use crate::types::Fixed8;

/// Fixed8 raw units per 10⁻³ GAS.
const RAW_PER_MILLI: i64 = Fixed8::SCALE / 1000;

/// Converts a price in 10⁻³ GAS into a Fixed8 amount.
pub fn milli_gas(price: i64) -> InteropResult<Fixed8> {
    price
        .checked_mul(RAW_PER_MILLI)
        .map(Fixed8::from_raw)
        .ok_or_else(|| InteropError::overflow("milli_gas"))
}

/// Dynamic price of `Storage.Put`/`Storage.PutEx` in 10⁻³ GAS: one GAS
/// per started KiB of key plus value.
pub fn storage_put_price(key_len: usize, value_len: usize) -> i64 {
    let total = key_len + value_len;
    let started_kib = if total == 0 { 1 } else { (total - 1) / 1024 + 1 };
    started_kib as i64 * 1000
}

/// Execution budget for one VM run.
#[derive(Debug, Clone)]
pub struct GasMeter {
    remaining: Fixed8,
}

impl GasMeter {
    pub fn new(budget: Fixed8) -> Self {
        Self { remaining: budget }
    }

    /// A meter that never refuses; used by verifications that are not
    /// gas-metered.
    pub fn unlimited() -> Self {
        Self::new(Fixed8::MAX)
    }

    pub fn remaining(&self) -> Fixed8 {
        self.remaining
    }

    /// Deducts a price quoted in 10⁻³ GAS, failing when the budget
    /// cannot cover it.
    pub fn consume_milli(&mut self, price: i64) -> InteropResult<()> {
        let cost = milli_gas(price)?;
        if self.remaining < cost {
            return Err(InteropError::InsufficientGas {
                required: price,
                remaining: self.remaining.raw() / RAW_PER_MILLI,
            });
        }
        self.remaining = self.remaining.checked_sub(cost)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_price_scales_per_started_kib() {
        assert_eq!(storage_put_price(1, 1), 1000);
        assert_eq!(storage_put_price(0, 1024), 1000);
        assert_eq!(storage_put_price(1, 1024), 2000);
        assert_eq!(storage_put_price(1024, 1024), 2000);
        assert_eq!(storage_put_price(0, 0), 1000);
    }

    #[test]
    fn meter_deducts_and_refuses() {
        let mut meter = GasMeter::new(Fixed8::from_raw(300 * super::RAW_PER_MILLI));
        meter.consume_milli(200).unwrap();
        assert!(matches!(
            meter.consume_milli(200),
            Err(InteropError::InsufficientGas { .. })
        ));
        meter.consume_milli(100).unwrap();
        assert!(meter.remaining().is_zero());
    }
}
