// purchase_flow/src/core/holder.rs

//! The item holder aggregate: a cart or an order, its line items, its status and
//! its dates. Shipping records are owned by value; they never point back at the order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::actor::CustomerId;

/// Persistent identity of an item holder. Absent until the holder is first saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolderId(pub u64);

impl fmt::Display for HolderId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// Concrete status code stored on an order.
///
/// The meaning of a code is deployment configuration; compare through
/// [`crate::StatusConfig`], never against literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderStatus(pub u32);

impl OrderStatus {
  pub const fn id(&self) -> u32 {
    self.0
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Carts of different sale types cannot be checked out together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaleType(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolderKind {
  Cart,
  Order,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
  pub product_class_id: u64,
  pub name: String,
  pub quantity: u32,
  /// Unit price recorded on the line, in minor currency units.
  pub price: i64,
  /// Catalog price at processing time, when the caller knows it.
  pub current_price: Option<i64>,
  /// Available stock. `None` means the product class does not track stock.
  pub stock: Option<u32>,
}

impl LineItem {
  pub fn new(product_class_id: u64, name: impl Into<String>, quantity: u32, price: i64) -> Self {
    Self {
      product_class_id,
      name: name.into(),
      quantity,
      price,
      current_price: None,
      stock: None,
    }
  }

  pub fn with_stock(mut self, stock: u32) -> Self {
    self.stock = Some(stock);
    self
  }

  pub fn with_current_price(mut self, current_price: i64) -> Self {
    self.current_price = Some(current_price);
    self
  }

  /// Saturates instead of overflowing.
  pub fn total(&self) -> i64 {
    self.price.saturating_mul(i64::from(self.quantity))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipping {
  pub name: String,
  pub shipping_commit_date: Option<DateTime<Utc>>,
}

impl Shipping {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      shipping_commit_date: None,
    }
  }
}

/// A cart or an order.
///
/// `version` is the staleness token the persistence collaborator compares on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemHolder {
  pub id: Option<HolderId>,
  pub kind: HolderKind,
  pub version: u64,
  pub customer_id: Option<CustomerId>,
  pub sale_type: SaleType,
  pub status: OrderStatus,
  pub items: Vec<LineItem>,
  pub shippings: Vec<Shipping>,
  pub order_date: Option<DateTime<Utc>>,
  pub payment_date: Option<DateTime<Utc>>,
  pub commit_date: Option<DateTime<Utc>>,
}

impl ItemHolder {
  fn empty(kind: HolderKind, status: OrderStatus) -> Self {
    Self {
      id: None,
      kind,
      version: 0,
      customer_id: None,
      sale_type: SaleType(1),
      status,
      items: Vec::new(),
      shippings: Vec::new(),
      order_date: None,
      payment_date: None,
      commit_date: None,
    }
  }

  /// A new, unsaved cart. Carts carry the status an order would start with.
  pub fn cart(sale_type: SaleType, status: OrderStatus) -> Self {
    Self {
      sale_type,
      ..Self::empty(HolderKind::Cart, status)
    }
  }

  /// A new, unsaved order.
  pub fn order(status: OrderStatus) -> Self {
    Self::empty(HolderKind::Order, status)
  }

  pub fn with_id(mut self, id: HolderId) -> Self {
    self.id = Some(id);
    self
  }

  pub fn with_customer(mut self, customer_id: CustomerId) -> Self {
    self.customer_id = Some(customer_id);
    self
  }

  pub fn with_item(mut self, item: LineItem) -> Self {
    self.items.push(item);
    self
  }

  pub fn with_shipping(mut self, shipping: Shipping) -> Self {
    self.shippings.push(shipping);
    self
  }

  pub fn is_new(&self) -> bool {
    self.id.is_none()
  }

  pub fn total(&self) -> i64 {
    self.items.iter().map(LineItem::total).fold(0, i64::saturating_add)
  }

  pub fn quantity(&self) -> u32 {
    self.items.iter().map(|item| item.quantity).fold(0, u32::saturating_add)
  }

  /// Sets the commit date and the commit date of every shipping to the same instant.
  pub fn stamp_commit_date(&mut self, at: DateTime<Utc>) {
    self.commit_date = Some(at);
    for shipping in &mut self.shippings {
      shipping.shipping_commit_date = Some(at);
    }
  }

  /// Adds `item` to this holder, summing quantities for an already present product class.
  pub fn absorb_item(&mut self, item: LineItem) {
    match self
      .items
      .iter_mut()
      .find(|existing| existing.product_class_id == item.product_class_id)
    {
      Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
      None => self.items.push(item),
    }
  }
}
