//! crates/bytegurukul_core/src/cart.rs
//!
//! The client-side cart and order ledger. Nothing here is persisted server-side;
//! the ledger is loaded from and saved to a `DurableStorage` explicitly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::{load_json, save_json, scoped_key, DurableStorage, StorageError, CART_KEY, ORDERS_KEY};

/// Shipping address recorded on every order; all products are digital.
pub const DIGITAL_DELIVERY: &str = "Digital Delivery";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CartError {
    #[error("Quantity must be a positive integer")]
    InvalidQuantity,
    #[error("Product {0} is not in the cart")]
    LineNotFound(String),
    #[error("Cannot place an order with an empty cart")]
    EmptyCart,
}

//=========================================================================================
// Cart Types
//=========================================================================================

/// Anything that can be bought: a project or a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    pub price: f64,
    /// Display data carried along untouched (thumbnail, category, ...).
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub title: String,
    pub unit_price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl CartLine {
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Upi,
    #[serde(rename = "netbanking")]
    NetBanking,
    Wallet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Completed,
}

/// What the checkout page knows at the moment "place order" is clicked.
#[derive(Debug, Clone)]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    pub user_id: Option<String>,
}

/// An immutable snapshot of the cart taken at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<CartLine>,
    pub total: f64,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub user_id: Option<String>,
}

//=========================================================================================
// The Ledger
//=========================================================================================

/// Cart lines plus order history (newest first) for one identity.
///
/// Invariants: at most one line per product id, and every quantity is at least 1.
#[derive(Debug, Clone, Default)]
pub struct CartLedger {
    owner: Option<String>,
    lines: Vec<CartLine>,
    orders: Vec<Order>,
}

impl CartLedger {
    /// An empty ledger for `owner` (or the anonymous visitor).
    pub fn new(owner: Option<String>) -> Self {
        Self {
            owner,
            lines: Vec::new(),
            orders: Vec::new(),
        }
    }

    /// Restores the ledger saved for `owner`, starting empty if nothing was stored.
    pub fn load(storage: &dyn DurableStorage, owner: Option<String>) -> Result<Self, StorageError> {
        let lines = load_json(storage, &scoped_key(CART_KEY, owner.as_deref()))?.unwrap_or_default();
        let orders =
            load_json(storage, &scoped_key(ORDERS_KEY, owner.as_deref()))?.unwrap_or_default();
        Ok(Self {
            owner,
            lines,
            orders,
        })
    }

    /// Writes order history first so a failed second write can only leave a stale cart,
    /// never a lost order.
    pub fn save(&self, storage: &dyn DurableStorage) -> Result<(), StorageError> {
        save_json(storage, &scoped_key(ORDERS_KEY, self.owner.as_deref()), &self.orders)?;
        save_json(storage, &scoped_key(CART_KEY, self.owner.as_deref()), &self.lines)
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Order history, newest first.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Adds a product with quantity 1. Adding a product already in the cart is a no-op.
    /// Returns whether a line was added.
    pub fn add_item(&mut self, product: Product) -> bool {
        if self.is_in_cart(&product.id) {
            return false;
        }
        self.lines.push(CartLine {
            product_id: product.id,
            title: product.title,
            unit_price: product.price,
            quantity: 1,
            metadata: product.metadata,
        });
        true
    }

    /// Removes the line for `product_id` if present. Returns whether a line was removed.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        self.lines.len() != before
    }

    pub fn set_quantity(&mut self, product_id: &str, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
            .ok_or_else(|| CartError::LineNotFound(product_id.to_string()))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Sum of unit price times quantity. No platform fee or tax is applied.
    pub fn total(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Number of units across all lines.
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    pub fn is_in_cart(&self, product_id: &str) -> bool {
        self.lines.iter().any(|line| line.product_id == product_id)
    }

    /// Snapshots the cart into a new order at the head of the history and empties the cart.
    /// On error nothing is changed.
    pub fn checkout(&mut self, payment: PaymentDetails) -> Result<Order, CartError> {
        if self.lines.is_empty() {
            return Err(CartError::EmptyCart);
        }
        let order = Order {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            total: self.total(),
            lines: std::mem::take(&mut self.lines),
            payment_method: payment.method,
            status: OrderStatus::Completed,
            shipping_address: DIGITAL_DELIVERY.to_string(),
            user_id: payment.user_id,
        };
        self.orders.insert(0, order.clone());
        Ok(order)
    }

    /// Empties the cart without creating an order.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn product(id: &str, price: f64) -> Product {
        Product {
            id: id.to_string(),
            title: format!("Project {}", id),
            price,
            metadata: serde_json::json!({ "category": "web" }),
        }
    }

    fn card() -> PaymentDetails {
        PaymentDetails {
            method: PaymentMethod::Card,
            user_id: Some("u1".to_string()),
        }
    }

    #[test]
    fn adding_the_same_product_twice_keeps_one_line() {
        let mut ledger = CartLedger::new(None);
        assert!(ledger.add_item(product("p1", 499.0)));
        assert!(!ledger.add_item(product("p1", 499.0)));

        assert_eq!(ledger.lines().len(), 1);
        assert_eq!(ledger.lines()[0].quantity, 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut ledger = CartLedger::new(None);
        ledger.add_item(product("p1", 10.0));
        assert!(ledger.remove_item("p1"));
        assert!(!ledger.remove_item("p1"));
        assert!(ledger.lines().is_empty());
    }

    #[test]
    fn quantities_must_be_positive_and_drive_the_total() {
        let mut ledger = CartLedger::new(None);
        ledger.add_item(product("p1", 100.0));
        ledger.add_item(product("p2", 250.0));

        ledger.set_quantity("p1", 3).unwrap();
        assert_eq!(ledger.total(), 550.0);
        assert_eq!(ledger.item_count(), 4);

        assert_eq!(ledger.set_quantity("p1", 0), Err(CartError::InvalidQuantity));
        assert_eq!(
            ledger.set_quantity("missing", 2),
            Err(CartError::LineNotFound("missing".to_string()))
        );
        assert_eq!(ledger.lines()[0].quantity, 3);
    }

    #[test]
    fn checkout_snapshots_total_and_empties_cart() {
        let mut ledger = CartLedger::new(Some("u1".to_string()));
        ledger.add_item(product("p1", 100.0));
        ledger.add_item(product("p2", 50.0));
        ledger.set_quantity("p2", 2).unwrap();
        let expected_total = ledger.total();

        let first = ledger.checkout(card()).unwrap();
        assert_eq!(first.total, expected_total);
        assert_eq!(first.lines.len(), 2);
        assert_eq!(first.shipping_address, DIGITAL_DELIVERY);
        assert!(ledger.lines().is_empty());

        ledger.add_item(product("p3", 10.0));
        let second = ledger.checkout(card()).unwrap();
        assert_eq!(ledger.orders()[0].id, second.id);
        assert_eq!(ledger.orders()[1].id, first.id);
    }

    #[test]
    fn checkout_of_an_empty_cart_changes_nothing() {
        let mut ledger = CartLedger::new(None);
        assert_eq!(ledger.checkout(card()), Err(CartError::EmptyCart));
        assert!(ledger.orders().is_empty());
    }

    #[test]
    fn clear_does_not_create_an_order() {
        let mut ledger = CartLedger::new(None);
        ledger.add_item(product("p1", 10.0));
        ledger.clear();
        assert!(ledger.lines().is_empty());
        assert!(ledger.orders().is_empty());
    }

    #[test]
    fn ledgers_are_persisted_per_owner() {
        let storage = MemoryStorage::new();
        let mut alice = CartLedger::new(Some("alice".to_string()));
        alice.add_item(product("p1", 10.0));
        alice.checkout(card()).unwrap();
        alice.add_item(product("p2", 20.0));
        alice.save(&storage).unwrap();

        let restored = CartLedger::load(&storage, Some("alice".to_string())).unwrap();
        assert_eq!(restored.lines(), alice.lines());
        assert_eq!(restored.orders(), alice.orders());

        let anonymous = CartLedger::load(&storage, None).unwrap();
        assert!(anonymous.lines().is_empty());
        assert!(anonymous.orders().is_empty());
    }
}
