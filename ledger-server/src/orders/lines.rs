//! Pure line-item operations on an order

use crate::utils::{LedgerError, LedgerResult};
use rust_decimal::Decimal;
use shared::models::{LineStatus, Order, OrderItem, Product};

/// Add quantity of a product, merging into a matching pending line
///
/// A line matches when it is still pending and has the same product, price
/// and note. Sent or served lines are never grown, so the bar sees new
/// rounds as new lines.
pub fn add_or_merge(
    order: &mut Order,
    product: &Product,
    quantity: i32,
    note: Option<String>,
) -> LedgerResult<()> {
    let note = note.filter(|n| !n.trim().is_empty());
    if let Some(line) = order.items.iter_mut().rev().find(|line| {
        line.product_id == product.id
            && line.price == product.price
            && line.line_status == LineStatus::Pending
            && line.note == note
    }) {
        line.quantity = line.quantity.checked_add(quantity).ok_or_else(|| {
            LedgerError::invalid(format!(
                "Line quantity for {} would exceed {}",
                product.name,
                i32::MAX
            ))
        })?;
        return Ok(());
    }

    order.items.push(OrderItem {
        product_id: product.id.clone(),
        name: product.name.clone(),
        price: product.price,
        quantity,
        line_status: LineStatus::Pending,
        note,
    });
    Ok(())
}

/// Take `quantity` of a product off the tab, newest lines first
///
/// Returns the value removed. The caller checks that enough quantity is on
/// the tab; anything beyond is ignored.
pub fn remove_quantity(order: &mut Order, product_id: &str, quantity: i32) -> Decimal {
    let mut remaining = quantity;
    let mut removed_value = Decimal::ZERO;

    for line in order.items.iter_mut().rev() {
        if remaining == 0 {
            break;
        }
        if line.product_id != product_id {
            continue;
        }
        let take = remaining.min(line.quantity);
        line.quantity -= take;
        remaining -= take;
        removed_value += line.price * Decimal::from(take);
    }

    order.items.retain(|line| line.quantity > 0);
    removed_value
}

/// Pending → Sent for every line; returns how many lines moved
pub fn send_pending(order: &mut Order) -> usize {
    let mut sent = 0;
    for line in order
        .items
        .iter_mut()
        .filter(|l| l.line_status == LineStatus::Pending)
    {
        line.line_status = LineStatus::Sent;
        sent += 1;
    }
    sent
}

/// Sent → Served, optionally for one product; returns how many lines moved
pub fn serve_sent(order: &mut Order, product_id: Option<&str>) -> usize {
    let mut served = 0;
    for line in order.items.iter_mut().filter(|l| {
        l.line_status == LineStatus::Sent && product_id.is_none_or(|id| l.product_id == id)
    }) {
        line.line_status = LineStatus::Served;
        served += 1;
    }
    served
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: i64) -> Product {
        Product {
            id: id.to_string(),
            name: id.to_uppercase(),
            price: Decimal::from(price),
            category: "Beer".to_string(),
            current_stock: 100,
            low_stock_threshold: 5,
            available: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn order() -> Order {
        Order::new("o-1".into(), "T1".into(), None, 0)
    }

    #[test]
    fn test_merge_same_pending_line() {
        let mut order = order();
        let beer = product("beer", 50);
        add_or_merge(&mut order, &beer, 2, None).unwrap();
        add_or_merge(&mut order, &beer, 3, None).unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 5);
    }

    #[test]
    fn test_no_merge_after_send_or_price_change() {
        let mut order = order();
        let mut beer = product("beer", 50);
        add_or_merge(&mut order, &beer, 2, None).unwrap();
        send_pending(&mut order);
        add_or_merge(&mut order, &beer, 1, None).unwrap();
        assert_eq!(order.items.len(), 2);

        beer.price = Decimal::from(55);
        add_or_merge(&mut order, &beer, 1, None).unwrap();
        assert_eq!(order.items.len(), 3);
        assert_eq!(order.quantity_of("beer"), 4);
        assert_eq!(order.items_total(), Decimal::from(205));
    }

    #[test]
    fn test_merge_overflow_is_rejected() {
        let mut order = order();
        let beer = product("beer", 50);
        add_or_merge(&mut order, &beer, 1, None).unwrap();
        order.items[0].quantity = i32::MAX - 1;

        let result = add_or_merge(&mut order, &beer, 5, None);
        assert!(matches!(result, Err(LedgerError::InvalidInput(_))));
        assert_eq!(order.items[0].quantity, i32::MAX - 1);

        // a separate line pushes the product total past i32
        add_or_merge(&mut order, &beer, 5, Some("no ice".into())).unwrap();
        assert_eq!(order.quantity_of("beer"), i64::from(i32::MAX) + 4);
    }

    #[test]
    fn test_no_merge_with_different_note() {
        let mut order = order();
        let beer = product("beer", 50);
        add_or_merge(&mut order, &beer, 1, Some("no ice".into())).unwrap();
        add_or_merge(&mut order, &beer, 1, None).unwrap();
        add_or_merge(&mut order, &beer, 1, Some("no ice".into())).unwrap();
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].quantity, 2);
    }

    #[test]
    fn test_remove_newest_first() {
        let mut order = order();
        let mut beer = product("beer", 50);
        add_or_merge(&mut order, &beer, 2, None).unwrap();
        beer.price = Decimal::from(60);
        add_or_merge(&mut order, &beer, 2, None).unwrap();

        let removed = remove_quantity(&mut order, "beer", 3);
        assert_eq!(removed, Decimal::from(170));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].price, Decimal::from(50));
        assert_eq!(order.items[0].quantity, 1);
    }

    #[test]
    fn test_remove_all_drops_lines() {
        let mut order = order();
        add_or_merge(&mut order, &product("beer", 50), 2, None).unwrap();
        add_or_merge(&mut order, &product("chips", 30), 1, None).unwrap();
        remove_quantity(&mut order, "beer", 2);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].product_id, "chips");
    }

    #[test]
    fn test_send_then_serve() {
        let mut order = order();
        add_or_merge(&mut order, &product("beer", 50), 2, None).unwrap();
        add_or_merge(&mut order, &product("chips", 30), 1, None).unwrap();
        assert_eq!(serve_sent(&mut order, None), 0);
        assert_eq!(send_pending(&mut order), 2);
        assert_eq!(serve_sent(&mut order, Some("chips")), 1);
        assert_eq!(order.items[0].line_status, LineStatus::Sent);
        assert_eq!(order.items[1].line_status, LineStatus::Served);
    }
}
