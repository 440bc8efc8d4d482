// purchase_flow/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

use crate::config::StatusRole;
use crate::core::holder::HolderId;
use crate::core::phase::Phase;

/// Failures that stop a purchase flow or one of its collaborators.
///
/// Ordinary business-rule rejections are *not* represented here: those are
/// [`ValidationError`]s collected in a [`crate::ProcessingResult`].
#[derive(Debug, Error)]
pub enum FlowError {
  /// A processor could not proceed. The remaining processors of the phase were not run.
  #[error("Processor '{processor}' faulted during the {phase} phase. Source: {source}")]
  Fault {
    phase: Phase,
    processor: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Processor '{processor}' changed the identity of the item holder")]
  IdentityChanged { processor: String },

  #[error("Order status role '{role}' is not configured")]
  StatusNotConfigured { role: StatusRole },

  #[error("Configuration error: {0}")]
  Configuration(String),

  /// The persisted aggregate moved on since it was loaded. Reload and retry.
  #[error("Concurrency conflict on item holder {holder_id}: expected version {expected}, found {found}")]
  ConcurrencyConflict {
    holder_id: HolderId,
    expected: u64,
    found: u64,
  },

  #[error("Item holder not found: {holder_id}")]
  NotFound { holder_id: HolderId },

  #[error("Persistence collaborator failed. Source: {source}")]
  Store {
    #[source]
    source: AnyhowError,
  },
}

// Collaborators written against anyhow land here.
impl From<AnyhowError> for FlowError {
  fn from(err: AnyhowError) -> Self {
    // Unwrap a FlowError that was only boxed into anyhow on its way through.
    match err.downcast::<FlowError>() {
      Ok(flow_err) => flow_err,
      Err(source) => FlowError::Store { source },
    }
  }
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;

/// A business rule rejected the current state of the item holder.
///
/// Blocks the commit but does not stop the other processors of the phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{processor}: {message}")]
pub struct ValidationError {
  pub processor: String,
  pub message: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn anyhow_wrapping_a_flow_error_is_unwrapped() {
    let wrapped = AnyhowError::new(FlowError::NotFound { holder_id: HolderId(7) });
    match FlowError::from(wrapped) {
      FlowError::NotFound { holder_id } => assert_eq!(holder_id, HolderId(7)),
      other => panic!("Expected NotFound, got {:?}", other),
    }
  }

  #[test]
  fn foreign_anyhow_becomes_store_error() {
    let err = FlowError::from(anyhow::anyhow!("connection reset"));
    assert!(matches!(err, FlowError::Store { .. }));
    assert!(err.to_string().contains("connection reset"));
  }

  #[test]
  fn validation_error_display_names_processor() {
    let err = ValidationError {
      processor: "stock".to_string(),
      message: "out of stock".to_string(),
    };
    assert_eq!(err.to_string(), "stock: out of stock");
  }
}
