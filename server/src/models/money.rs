use rust_decimal::Decimal;

/// Money columns are `NUMERIC(12, 2)`.
pub const MONEY_SCALE: u32 = 2;

/// The largest amount a money column holds.
pub fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999, MONEY_SCALE)
}

/// True when `amount` fits a money column without rounding.
pub fn fits_column(amount: Decimal) -> bool {
    amount <= max_amount() && amount.normalize().scale() <= MONEY_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_column_bounds() {
        assert!(fits_column(Decimal::from(250)));
        assert!(fits_column(Decimal::from_str("10.50").unwrap()));
        assert!(fits_column(Decimal::from_str("9999999999.99").unwrap()));
        assert!(!fits_column(Decimal::from_str("10000000000").unwrap()));
        assert!(!fits_column(Decimal::from_str("10.125").unwrap()));
    }
}
