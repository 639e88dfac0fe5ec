//! Order entity and its line items.
//!
//! `total` is always derived from the line items: it is computed on create and
//! recomputed whenever a patch replaces the items. Callers cannot set it.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::model::{check_price, round_cents, seed_date, EntityKind, Record, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

/// A product snapshot inside an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub product_id: u64,
    pub product_name: String,
    pub quantity: NonZeroU32,
    /// Unit price at the time of ordering.
    pub price: f64,
}

impl OrderLineItem {
    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity.get())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: u64,
    pub user_id: u64,
    pub user_name: String,
    #[serde(rename = "products")]
    pub line_items: Vec<OrderLineItem>,
    pub total: f64,
    pub status: OrderStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Order {
    /// Sum of `price * quantity` over the line items, in whole cents.
    pub fn line_total(items: &[OrderLineItem]) -> f64 {
        round_cents(items.iter().map(OrderLineItem::subtotal).sum())
    }

    pub fn recompute_total(&mut self) {
        self.total = Self::line_total(&self.line_items);
    }

    pub fn total_is_consistent(&self) -> bool {
        self.total == Self::line_total(&self.line_items)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user_id: u64,
    pub user_name: String,
    #[serde(rename = "products")]
    pub line_items: Vec<OrderLineItem>,
    #[serde(default)]
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderPatch {
    pub user_id: Option<u64>,
    pub user_name: Option<String>,
    #[serde(rename = "products")]
    pub line_items: Option<Vec<OrderLineItem>>,
    pub status: Option<OrderStatus>,
}

impl Record for Order {
    type Draft = NewOrder;
    type Patch = OrderPatch;

    const KIND: EntityKind = EntityKind::Order;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(id: u64, draft: NewOrder, now: Timestamp) -> Self {
        let total = Self::line_total(&draft.line_items);
        Self {
            id,
            user_id: draft.user_id,
            user_name: draft.user_name,
            line_items: draft.line_items,
            total,
            status: draft.status,
            created_at: now,
            updated_at: now,
        }
    }

    fn validate_draft(draft: &NewOrder) -> Result<(), String> {
        check_line_items(&draft.line_items)
    }

    fn validate_patch(patch: &OrderPatch) -> Result<(), String> {
        patch.line_items.as_deref().map_or(Ok(()), check_line_items)
    }

    fn apply_patch(&mut self, patch: OrderPatch) {
        if let Some(user_id) = patch.user_id {
            self.user_id = user_id;
        }
        if let Some(user_name) = patch.user_name {
            self.user_name = user_name;
        }
        if let Some(items) = patch.line_items {
            self.line_items = items;
            self.recompute_total();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }

    fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: Timestamp) {
        self.updated_at = at;
    }

    fn seed() -> Vec<Self> {
        let mut orders = vec![
            Order {
                id: 1,
                user_id: 1,
                user_name: "John Doe".into(),
                line_items: vec![line_item(1, "Laptop", 1, 999.99)],
                total: 0.0,
                status: OrderStatus::Delivered,
                created_at: seed_date(2023, 11, 1),
                updated_at: seed_date(2023, 11, 15),
            },
            Order {
                id: 2,
                user_id: 2,
                user_name: "Jane Smith".into(),
                line_items: vec![
                    line_item(2, "Smartphone", 1, 699.99),
                    line_item(3, "Headphones", 1, 199.99),
                ],
                total: 0.0,
                status: OrderStatus::Processing,
                created_at: seed_date(2023, 12, 1),
                updated_at: seed_date(2023, 12, 1),
            },
        ];
        orders.iter_mut().for_each(Order::recompute_total);
        orders
    }
}

fn check_line_items(items: &[OrderLineItem]) -> Result<(), String> {
    items
        .iter()
        .try_for_each(|item| check_price(item.price).map_err(|e| format!("{}: {e}", item.product_name)))
}

fn line_item(product_id: u64, name: &str, quantity: u32, price: f64) -> OrderLineItem {
    OrderLineItem {
        product_id,
        product_name: name.to_string(),
        quantity: NonZeroU32::new(quantity).unwrap_or(NonZeroU32::MIN),
        price,
    }
}
