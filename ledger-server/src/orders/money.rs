//! Money rules for tabs
//!
//! Prices carry at most two decimal places, so line totals and order totals
//! are exact `Decimal` sums and no rounding step can drift the total away
//! from Σ(price × quantity).

use crate::utils::{LedgerError, LedgerResult};
use rust_decimal::Decimal;
use shared::models::Order;

/// Money scale (cents)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per item
const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Maximum allowed quantity per line operation
pub const MAX_QUANTITY: i32 = 9999;

/// Maximum accepted tendered amount
const MAX_TENDERED: Decimal = Decimal::from_parts(10_000_000, 0, 0, false, 0);

/// Validate a catalog price
pub fn validate_price(price: Decimal) -> LedgerResult<()> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(LedgerError::invalid(format!(
            "price must be non-negative, got {}",
            price
        )));
    }
    if price > MAX_PRICE {
        return Err(LedgerError::invalid(format!(
            "price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, price
        )));
    }
    if price.normalize().scale() > DECIMAL_PLACES {
        return Err(LedgerError::invalid(format!(
            "price must have at most {} decimal places, got {}",
            DECIMAL_PLACES, price
        )));
    }
    Ok(())
}

/// Validate an item quantity (add or void)
pub fn validate_quantity(quantity: i32) -> LedgerResult<()> {
    if quantity <= 0 {
        return Err(LedgerError::invalid(format!(
            "quantity must be positive, got {}",
            quantity
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(LedgerError::invalid(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, quantity
        )));
    }
    Ok(())
}

/// Validate the cash handed over at checkout
pub fn validate_tendered(tendered: Decimal, total: Decimal) -> LedgerResult<()> {
    if tendered.is_sign_negative() && !tendered.is_zero() {
        return Err(LedgerError::invalid(format!(
            "tendered must be non-negative, got {}",
            tendered
        )));
    }
    if tendered > MAX_TENDERED {
        return Err(LedgerError::invalid(format!(
            "tendered exceeds maximum allowed ({}), got {}",
            MAX_TENDERED, tendered
        )));
    }
    if tendered < total {
        return Err(LedgerError::invalid(format!(
            "tendered {} is less than total {}",
            tendered, total
        )));
    }
    Ok(())
}

/// Change owed back to the customer
pub fn change_due(tendered: Decimal, total: Decimal) -> Decimal {
    (tendered - total).round_dp(DECIMAL_PLACES)
}

/// Recompute subtotal, tax and total from the lines
pub fn recalculate_totals(order: &mut Order) {
    let subtotal = order.items_total();
    order.subtotal = subtotal;
    order.tax = Decimal::ZERO;
    order.total = subtotal + order.tax;
}
