// purchase_flow/src/core/actor.rs

//! The authenticated party performing an operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub u64);

impl fmt::Display for CustomerId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A back-office staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
  pub id: u64,
  pub name: String,
  pub login_date: Option<DateTime<Utc>>,
}

impl Member {
  pub fn new(id: u64, name: impl Into<String>) -> Self {
    Self {
      id,
      name: name.into(),
      login_date: None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
  pub id: CustomerId,
  pub email: String,
}

impl Customer {
  pub fn new(id: u64, email: impl Into<String>) -> Self {
    Self {
      id: CustomerId(id),
      email: email.into(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
  Staff(Member),
  Customer(Customer),
}

impl Actor {
  pub fn is_staff(&self) -> bool {
    matches!(self, Actor::Staff(_))
  }

  pub fn customer_id(&self) -> Option<CustomerId> {
    match self {
      Actor::Customer(customer) => Some(customer.id),
      Actor::Staff(_) => None,
    }
  }
}
