//! Numeric types for precise order and trade arithmetic

use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;

/// Price type with fixed-point precision
pub type Price = Decimal;

/// Order quantity in whole units
pub type Quantity = u64;

/// Amount type with high precision (typically Price * Quantity)
pub type Amount = Decimal;

/// Precision helpers for common operations
pub mod precision {
    use super::*;

    /// Default price precision (8 decimal places)
    pub const PRICE_PRECISION: u32 = 8;

    /// Round price to standard precision
    pub fn round_price(price: Price) -> Price {
        price.round_dp(PRICE_PRECISION)
    }

    /// Notional value of a fill
    pub fn notional(price: Price, quantity: Quantity) -> Amount {
        price * Decimal::from(quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::precision::{notional, round_price};
    use super::*;

    #[test]
    fn round_price_clamps_to_standard_precision() {
        let price: Price = dec!(19.123456789);
        assert_eq!(round_price(price), dec!(19.12345679));
    }

    #[test]
    fn notional_is_price_times_quantity() {
        assert_eq!(notional(dec!(18.50), 60), dec!(1110.00));
    }
}
