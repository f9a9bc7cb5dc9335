//! End-to-end ledger scenarios on an on-disk database
//!
//! Sell, void and pay on one table, plus concurrent sales on one and on two tables.

use ledger_server::services::LogPrinter;
use ledger_server::{Config, LedgerStorage, ServerState};
use rust_decimal::Decimal;
use shared::SessionContext;
use shared::models::{AddItemInput, LedgerEntryKind, OrderStatus, ProductCreate, VoidItemInput};
use std::sync::{Arc, Barrier};
use std::time::Duration;
use tempfile::TempDir;

fn setup() -> (TempDir, ServerState) {
    let dir = TempDir::new().unwrap();
    let config = Config::with_overrides(dir.path().to_string_lossy(), 0);
    let storage = LedgerStorage::open(config.db_path()).unwrap();
    let state = ServerState::from_storage(config, storage, Arc::new(LogPrinter));
    (dir, state)
}

fn bartender() -> SessionContext {
    SessionContext::new("bea", "Bartender", 0)
}

fn create_product(state: &ServerState, stock: i64, price: i64) -> String {
    state
        .inventory
        .create_product(
            ProductCreate {
                name: "Red Horse".into(),
                price: Decimal::from(price),
                category: "Beer".into(),
                current_stock: stock,
                low_stock_threshold: None,
                available: None,
                note: None,
            },
            &bartender(),
        )
        .unwrap()
        .id
}

async fn wait_until(mut check: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn sell_void_and_pay_one_tab() {
    let (_dir, state) = setup();
    let tasks = state.start_background_tasks();
    let session = bartender();
    let product_id = create_product(&state, 10, 50);

    // A: sell three
    let order = state.orders.get_or_create_open_order("T1", &session).unwrap();
    let order = state
        .orders
        .add_item(&order.id, AddItemInput::new(&product_id, 3), &session)
        .unwrap();
    assert_eq!(state.inventory.get_product(&product_id).unwrap().current_stock, 7);
    assert_eq!(order.total, Decimal::from(150));

    let entries = state.inventory.list_entries(Some(&product_id)).unwrap();
    let sales: Vec<_> = entries
        .iter()
        .filter(|e| e.kind == LedgerEntryKind::Sale)
        .collect();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].remaining_stock, 7);

    wait_until(|| state.floor.table_status("T1").is_some()).await;

    // B: void one
    let order = state
        .orders
        .void_item(&order.id, VoidItemInput::new(&product_id, 1), &session)
        .unwrap();
    assert_eq!(state.inventory.get_product(&product_id).unwrap().current_stock, 8);
    assert_eq!(order.total, Decimal::from(100));

    let latest = &state.inventory.list_entries(Some(&product_id)).unwrap()[0];
    assert_eq!(latest.kind, LedgerEntryKind::VoidDelete);
    assert_eq!(latest.remaining_stock, 8);

    // C: pay
    let receipt = state
        .checkout
        .checkout(&order.id, Decimal::from(200), &session)
        .unwrap();
    assert_eq!(receipt.total, Decimal::from(100));
    assert_eq!(receipt.change, Decimal::from(100));

    let paid = state.orders.get_order(&order.id).unwrap();
    assert_eq!(paid.status, OrderStatus::Paid);

    wait_until(|| state.floor.table_status("T1").is_none()).await;
    assert!(state.floor.get_floor_status().is_empty());

    tasks.shutdown().await;
}

#[test]
fn concurrent_sales_never_lose_an_update() {
    let (_dir, state) = setup();
    let session = bartender();
    let product_id = create_product(&state, 10, 50);
    let order = state.orders.get_or_create_open_order("T1", &session).unwrap();

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let state = state.clone();
            let order_id = order.id.clone();
            let product_id = product_id.clone();
            std::thread::spawn(move || {
                state
                    .orders
                    .add_item(&order_id, AddItemInput::new(&product_id, 1), &bartender())
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(state.inventory.get_product(&product_id).unwrap().current_stock, 8);
    let order = state.orders.get_order(&order.id).unwrap();
    assert_eq!(order.quantity_of(&product_id), 2);
    assert_eq!(order.total, Decimal::from(100));
    assert_eq!(order.version, 2);
}

#[test]
fn sales_on_two_tables_both_decrement_stock() {
    let (_dir, state) = setup();
    let product_id = create_product(&state, 10, 50);
    let orders: Vec<_> = ["T1", "T2"]
        .iter()
        .map(|table| state.orders.get_or_create_open_order(table, &bartender()).unwrap())
        .collect();

    let barrier = Arc::new(Barrier::new(orders.len()));
    let handles: Vec<_> = orders
        .iter()
        .map(|order| {
            let state = state.clone();
            let barrier = barrier.clone();
            let order_id = order.id.clone();
            let product_id = product_id.clone();
            std::thread::spawn(move || {
                barrier.wait();
                state
                    .orders
                    .add_item(&order_id, AddItemInput::new(&product_id, 1), &bartender())
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(state.inventory.get_product(&product_id).unwrap().current_stock, 8);
    for order in &orders {
        let order = state.orders.get_order(&order.id).unwrap();
        assert_eq!(order.quantity_of(&product_id), 1);
        assert_eq!(order.total, Decimal::from(50));
    }

    let sales = state.inventory.list_entries(Some(&product_id)).unwrap();
    assert_eq!(
        sales.iter().filter(|e| e.kind == LedgerEntryKind::Sale).count(),
        2
    );
    assert!(state.inventory.audit_product(&product_id).unwrap().consistent);
}

#[test]
fn state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let config = Config::with_overrides(dir.path().to_string_lossy(), 0);

    let (order_id, product_id) = {
        let state = ServerState::initialize(&config).unwrap();
        let product_id = create_product(&state, 5, 80);
        let order = state.orders.get_or_create_open_order("T3", &bartender()).unwrap();
        state
            .orders
            .add_item(&order.id, AddItemInput::new(&product_id, 2), &bartender())
            .unwrap();
        (order.id, product_id)
    };

    let state = ServerState::initialize(&config).unwrap();
    assert_eq!(state.inventory.get_product(&product_id).unwrap().current_stock, 3);
    let reopened = state.orders.try_get_open_order("T3").unwrap().unwrap();
    assert_eq!(reopened.id, order_id);
    assert_eq!(reopened.total, Decimal::from(160));
    assert!(state.inventory.audit_product(&product_id).unwrap().consistent);
}
