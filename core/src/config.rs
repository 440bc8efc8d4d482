// purchase_flow/src/config.rs

//! Order status configuration: which concrete status code carries which meaning.
//!
//! Loaded once at process start and shared read-only (`Arc<StatusConfig>`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fmt;

use crate::core::holder::OrderStatus;
use crate::error::{FlowError, FlowResult};

/// Semantic status names the processors reason about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusRole {
  New,
  Cancelled,
  InProgress,
  Shipped,
  PaymentCompleted,
  PaymentPending,
  Processing,
  Returned,
}

impl StatusRole {
  pub const ALL: [StatusRole; 8] = [
    StatusRole::New,
    StatusRole::Cancelled,
    StatusRole::InProgress,
    StatusRole::Shipped,
    StatusRole::PaymentCompleted,
    StatusRole::PaymentPending,
    StatusRole::Processing,
    StatusRole::Returned,
  ];

  pub const fn as_str(&self) -> &'static str {
    match self {
      StatusRole::New => "new",
      StatusRole::Cancelled => "cancelled",
      StatusRole::InProgress => "in_progress",
      StatusRole::Shipped => "shipped",
      StatusRole::PaymentCompleted => "payment_completed",
      StatusRole::PaymentPending => "payment_pending",
      StatusRole::Processing => "processing",
      StatusRole::Returned => "returned",
    }
  }

  /// Environment variable overriding this role's code, e.g. `ORDER_STATUS_SHIPPED`.
  pub fn env_key(&self) -> String {
    format!("ORDER_STATUS_{}", self.as_str().to_ascii_uppercase())
  }

  const fn default_code(&self) -> u32 {
    match self {
      StatusRole::New => 1,
      StatusRole::Cancelled => 3,
      StatusRole::InProgress => 4,
      StatusRole::Shipped => 5,
      StatusRole::PaymentCompleted => 6,
      StatusRole::PaymentPending => 7,
      StatusRole::Processing => 8,
      StatusRole::Returned => 9,
    }
  }
}

impl fmt::Display for StatusRole {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Mapping from [`StatusRole`] to the deployment's concrete [`OrderStatus`] codes.
///
/// Serialized as a flat JSON object: `{"shipped": 5, "payment_completed": 6}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusConfig {
  codes: BTreeMap<StatusRole, OrderStatus>,
}

impl Default for StatusConfig {
  fn default() -> Self {
    Self {
      codes: StatusRole::ALL
        .into_iter()
        .map(|role| (role, OrderStatus(role.default_code())))
        .collect(),
    }
  }
}

impl StatusConfig {
  /// Parses an exact mapping. Roles absent from `json` stay unconfigured.
  pub fn from_json(json: &str) -> FlowResult<Self> {
    let config: StatusConfig = serde_json::from_str(json)
      .map_err(|e| FlowError::Configuration(format!("Invalid status configuration: {}", e)))?;
    config.check_unique()?;
    Ok(config)
  }

  /// Defaults overridden by `ORDER_STATUS_<ROLE>` variables (a `.env` file is honoured).
  pub fn from_env() -> FlowResult<Self> {
    dotenvy::dotenv().ok(); // Load .env file if present
    Self::from_lookup(|key| env::var(key).ok())
  }

  /// Like [`StatusConfig::from_env`], reading variables through `lookup`.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> FlowResult<Self> {
    let mut config = Self::default();
    for role in StatusRole::ALL {
      let key = role.env_key();
      if let Some(raw) = lookup(&key) {
        let code = raw
          .trim()
          .parse::<u32>()
          .map_err(|e| FlowError::Configuration(format!("Invalid {}: {}", key, e)))?;
        config.codes.insert(role, OrderStatus(code));
      }
    }
    config.check_unique()?;
    tracing::debug!(config = ?config, "Order status configuration loaded.");
    Ok(config)
  }

  fn check_unique(&self) -> FlowResult<()> {
    let mut seen: BTreeMap<OrderStatus, StatusRole> = BTreeMap::new();
    for (role, status) in &self.codes {
      if let Some(previous) = seen.insert(*status, *role) {
        return Err(FlowError::Configuration(format!(
          "Status code {} is mapped to both '{}' and '{}'",
          status, previous, role
        )));
      }
    }
    Ok(())
  }

  pub fn with(mut self, role: StatusRole, status: OrderStatus) -> Self {
    self.codes.insert(role, status);
    self
  }

  pub fn without(mut self, role: StatusRole) -> Self {
    self.codes.remove(&role);
    self
  }

  pub fn resolve(&self, role: StatusRole) -> FlowResult<OrderStatus> {
    self
      .codes
      .get(&role)
      .copied()
      .ok_or(FlowError::StatusNotConfigured { role })
  }

  /// Whether `status` is the code configured for `role`.
  pub fn is(&self, status: OrderStatus, role: StatusRole) -> FlowResult<bool> {
    Ok(self.resolve(role)? == status)
  }

  pub fn role_of(&self, status: OrderStatus) -> Option<StatusRole> {
    self
      .codes
      .iter()
      .find_map(|(role, code)| (*code == status).then_some(*role))
  }
}
