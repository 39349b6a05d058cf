//! Price arithmetic for cart lines and cart totals.
//!
//! Both ORM save hooks (`cart_products` and `carts`) go through these
//! functions so the stored denormalized values always agree with them.

use rust_decimal::Decimal;

/// Price of a cart line: quantity times the product's price at save time.
pub fn line_price(qty: i32, unit_price: Decimal) -> Decimal {
    (Decimal::from(qty) * unit_price).round_dp(2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub total_products: i32,
    pub final_price: Decimal,
}

impl CartTotals {
    pub fn empty() -> Self {
        Self {
            total_products: 0,
            final_price: Decimal::ZERO,
        }
    }

    /// Totals for a cart holding lines with the given final prices.
    pub fn from_line_prices<I>(prices: I) -> Self
    where
        I: IntoIterator<Item = Decimal>,
    {
        prices.into_iter().fold(Self::empty(), |acc, price| Self {
            total_products: acc.total_products + 1,
            final_price: acc.final_price + price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn line_price_multiplies_quantity() {
        assert_eq!(line_price(2, money(10000)), money(20000));
        assert_eq!(line_price(1, money(4999)), money(4999));
        assert_eq!(line_price(3, money(333)), money(999));
    }

    #[test]
    fn empty_cart_totals_are_zero() {
        let totals = CartTotals::from_line_prices(Vec::new());
        assert_eq!(totals, CartTotals::empty());
        assert_eq!(totals.final_price, Decimal::ZERO);
    }

    #[test]
    fn totals_sum_lines_and_count_them() {
        let lines = [line_price(2, money(10000)), line_price(1, money(5000))];
        let totals = CartTotals::from_line_prices(lines);
        assert_eq!(totals.final_price, money(25000));
        assert_eq!(totals.total_products, 2);
    }

    #[test]
    fn recomputing_is_idempotent() {
        let lines = vec![money(1999), money(1)];
        let first = CartTotals::from_line_prices(lines.clone());
        let second = CartTotals::from_line_prices(lines);
        assert_eq!(first, second);
    }
}
