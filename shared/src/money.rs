//! Money calculation utilities using rust_decimal for precision
//!
//! Calculations are done using `Decimal` internally, then converted back to
//! `f64` for storage/serialization.

use rust_decimal::prelude::*;

use crate::models::order::OrderItem;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a monetary value to 2 decimal places, half-up.
pub fn round_money(value: f64) -> f64 {
    Decimal::from_f64(value)
        .map(|d| round(d).to_f64().unwrap_or(value))
        .unwrap_or(value)
}

/// Line subtotal: quantity * unit price, rounded.
pub fn line_subtotal(quantity: i32, unit_price: f64) -> f64 {
    let quantity = Decimal::from(quantity);
    let price = Decimal::from_f64(unit_price).unwrap_or_default();
    round(quantity * price).to_f64().unwrap_or(0.0)
}

/// Sum of the stored item subtotals, rounded.
pub fn items_total(items: &[OrderItem]) -> f64 {
    let total = items
        .iter()
        .filter_map(|item| Decimal::from_f64(item.subtotal))
        .sum::<Decimal>();
    round(total).to_f64().unwrap_or(0.0)
}
