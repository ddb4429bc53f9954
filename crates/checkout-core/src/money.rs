//! # Money Types
//!
//! Currency and price handling for the checkout flow.
//! All arithmetic is done in the smallest currency unit (paise, cents).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    INR,
    USD,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::INR => "INR",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
        }
    }

    /// Returns the number of decimal places for this currency
    /// (JPY has 0 decimals, the others here have 2)
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Convert a major-unit amount to the smallest currency unit.
    ///
    /// This is the single major-to-minor conversion point in the crate;
    /// everything downstream of the wire boundary works in minor units.
    pub fn to_minor_units(&self, amount: f64) -> i64 {
        let multiplier = 10_f64.powi(self.decimal_places() as i32);
        (amount * multiplier).round() as i64
    }

    /// Convert from the smallest unit back to a major-unit amount
    pub fn from_minor_units(&self, amount: i64) -> f64 {
        let divisor = 10_f64.powi(self.decimal_places() as i32);
        amount as f64 / divisor
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::INR
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Price with amount in smallest currency unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in smallest currency unit (paise for INR, cents for USD)
    pub amount_minor: i64,
    /// Currency
    pub currency: Currency,
}

impl Price {
    /// Create a price from a major-unit amount (e.g. 10.00)
    pub fn from_major(amount: f64, currency: Currency) -> Self {
        Self {
            amount_minor: currency.to_minor_units(amount),
            currency,
        }
    }

    /// Create a price from the smallest unit
    pub fn from_minor(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// Get the major-unit amount
    pub fn as_major(&self) -> f64 {
        self.currency.from_minor_units(self.amount_minor)
    }

    /// Format for display (e.g., "₹10.00", "$10.00")
    pub fn display(&self) -> String {
        let symbol = match self.currency {
            Currency::INR => "₹",
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::JPY => "¥",
            Currency::CAD => "C$",
            Currency::AUD => "A$",
        };
        if self.currency.decimal_places() == 0 {
            format!("{}{}", symbol, self.amount_minor)
        } else {
            format!("{}{:.2}", symbol, self.as_major())
        }
    }
}

/// Round `numerator / denominator` to the nearest integer, ties to even.
///
/// Used for the tax line so a half-paisa never rounds in the store's
/// favor systematically. Operands must be non-negative.
fn div_round_half_even(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    match (remainder * 2).cmp(&denominator) {
        Ordering::Less => quotient,
        Ordering::Greater => quotient + 1,
        Ordering::Equal => {
            if quotient % 2 == 0 {
                quotient
            } else {
                quotient + 1
            }
        }
    }
}

/// The fixed client-side order summary: subtotal + flat shipping + tax.
///
/// This is display math only; the server recomputes the authoritative
/// amount during checkout initiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Price,
    pub shipping: Price,
    pub tax: Price,
    pub total: Price,
}

impl OrderTotals {
    /// Compute totals from a subtotal, a flat shipping charge, and a tax
    /// rate in basis points (8% = 800 bps). Tax applies to the subtotal
    /// only and is rounded half-even to the minor unit.
    pub fn compute(subtotal: Price, flat_shipping: Price, tax_rate_bps: u32) -> Self {
        let currency = subtotal.currency;
        let tax_minor =
            div_round_half_even(subtotal.amount_minor * tax_rate_bps as i64, 10_000);
        let total_minor = subtotal.amount_minor + flat_shipping.amount_minor + tax_minor;
        Self {
            subtotal,
            shipping: flat_shipping,
            tax: Price::from_minor(tax_minor, currency),
            total: Price::from_minor(total_minor, currency),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_unit_conversion() {
        let usd = Currency::USD;
        assert_eq!(usd.to_minor_units(10.99), 1099);
        assert_eq!(usd.from_minor_units(1099), 10.99);

        let jpy = Currency::JPY;
        assert_eq!(jpy.to_minor_units(1000.0), 1000);
        assert_eq!(jpy.from_minor_units(1000), 1000.0);
    }

    #[test]
    fn test_price_display() {
        let price = Price::from_major(29.99, Currency::USD);
        assert_eq!(price.display(), "$29.99");

        let price_inr = Price::from_major(499.0, Currency::INR);
        assert_eq!(price_inr.display(), "₹499.00");
    }

    #[test]
    fn test_half_even_rounding() {
        // 12.5 -> 12 (toward even), 13.5 -> 14 (toward even)
        assert_eq!(div_round_half_even(125, 10), 12);
        assert_eq!(div_round_half_even(135, 10), 14);
        assert_eq!(div_round_half_even(124, 10), 12);
        assert_eq!(div_round_half_even(126, 10), 13);
        assert_eq!(div_round_half_even(160, 10), 16);
    }

    #[test]
    fn test_order_totals_formula() {
        // subtotal=20.00, flat shipping=9.99, tax 8% => 1.60, total 31.59
        let totals = OrderTotals::compute(
            Price::from_major(20.00, Currency::USD),
            Price::from_major(9.99, Currency::USD),
            800,
        );
        assert_eq!(totals.tax.amount_minor, 160);
        assert_eq!(totals.total.amount_minor, 3159);
        assert_eq!(totals.total.display(), "$31.59");
    }

    #[test]
    fn test_order_totals_tax_ties_to_even() {
        // subtotal=1.25 at 10%: raw tax 12.5 minor units, rounds to 12
        let totals = OrderTotals::compute(
            Price::from_major(1.25, Currency::USD),
            Price::from_minor(0, Currency::USD),
            1000,
        );
        assert_eq!(totals.tax.amount_minor, 12);

        // subtotal=1.35 at 10%: raw tax 13.5, rounds to 14
        let totals = OrderTotals::compute(
            Price::from_major(1.35, Currency::USD),
            Price::from_minor(0, Currency::USD),
            1000,
        );
        assert_eq!(totals.tax.amount_minor, 14);
    }
}
