//! Order (tab) model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Paid,
    Void,
}

/// Kitchen/bar hand-off state of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStatus {
    #[default]
    Pending,
    Sent,
    Served,
}

/// Line item on a tab
///
/// `name` and `price` are copied from the product when the line is created
/// and never follow later product edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    #[serde(default)]
    pub line_status: LineStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Tab for one seating location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub table_identifier: String,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    /// Always zero: no tax regime is configured
    pub tax: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    pub is_reserved: bool,
    /// Operator who opened the tab; replaced by the cashier at checkout
    pub opened_by: Option<String>,
    pub closed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    /// Bumped on every committed mutation
    pub version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tendered: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub void_reason: Option<String>,
}

impl Order {
    /// Empty open tab
    pub fn new(id: String, table_identifier: String, opened_by: Option<String>, now: i64) -> Self {
        Self {
            id,
            table_identifier,
            items: Vec::new(),
            subtotal: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::ZERO,
            status: OrderStatus::Open,
            is_reserved: false,
            opened_by,
            closed_at: None,
            created_at: now,
            updated_at: now,
            version: 0,
            tendered: None,
            change: None,
            void_reason: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::Open
    }

    /// Quantity of a product across all lines
    pub fn quantity_of(&self, product_id: &str) -> i64 {
        self.items
            .iter()
            .filter(|i| i.product_id == product_id)
            .map(|i| i64::from(i.quantity))
            .sum()
    }

    /// Σ(price × quantity) over all lines
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}

/// Paid tab handed to the printing collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedOrderProjection {
    pub order_id: String,
    pub table_identifier: String,
    pub items: Vec<OrderItem>,
    pub total: Decimal,
    pub tendered: Decimal,
    pub change: Decimal,
    pub cashier: String,
    pub closed_at: i64,
}

/// One occupied table on the floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStatus {
    pub table_identifier: String,
    pub order_id: String,
    pub total: Decimal,
    pub status: OrderStatus,
    pub is_reserved: bool,
}

impl From<&Order> for TableStatus {
    fn from(order: &Order) -> Self {
        Self {
            table_identifier: order.table_identifier.clone(),
            order_id: order.id.clone(),
            total: order.total,
            status: order.status,
            is_reserved: order.is_reserved,
        }
    }
}

/// Running totals of one operator's session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSales {
    pub username: String,
    pub since: i64,
    pub total: Decimal,
    pub count: u64,
}

// ========== Command payloads ==========

/// Add a product to a tab
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddItemInput {
    pub product_id: String,
    pub quantity: i32,
    #[serde(default)]
    pub note: Option<String>,
    /// Reject with Conflict unless the order is still at this version
    #[serde(default)]
    pub expected_version: Option<u64>,
}

impl AddItemInput {
    pub fn new(product_id: impl Into<String>, quantity: i32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            note: None,
            expected_version: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn expecting(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }
}

/// Take items back off a tab
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoidItemInput {
    pub product_id: String,
    pub quantity: i32,
    #[serde(default)]
    pub expected_version: Option<u64>,
}

impl VoidItemInput {
    pub fn new(product_id: impl Into<String>, quantity: i32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            expected_version: None,
        }
    }

    pub fn expecting(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }
}

/// Mark sent lines as served (all products when `product_id` is None)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServeInput {
    #[serde(default)]
    pub product_id: Option<String>,
}

/// Cancel a whole tab
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoidOrderInput {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Settle a tab
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutInput {
    pub tendered: Decimal,
}
