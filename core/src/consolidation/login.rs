// purchase_flow/src/consolidation/login.rs

//! Reacts to an interactive login.
//!
//! Staff: the login timestamp is recorded directly, best effort.
//! Customers: persisted carts are folded into the session, every resulting
//! cart is validated and saved on its own, and the caller is told whether the
//! carts could not be consolidated into one.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{event, instrument, Level};

use crate::consolidation::merge::CartConsolidationService;
use crate::core::actor::{Actor, Customer, Member};
use crate::core::context::PurchaseContext;
use crate::core::holder::ItemHolder;
use crate::core::result::ProcessingResult;
use crate::error::{FlowError, FlowResult};
use crate::pipeline::PurchaseFlow;
use crate::store::MemberStore;

/// An authenticated session was just established.
#[derive(Debug, Clone)]
pub struct LoginEvent {
  pub actor: Actor,
  /// Carts held by the session before login.
  pub session_carts: Vec<ItemHolder>,
}

impl LoginEvent {
  pub fn new(actor: Actor) -> Self {
    Self {
      actor,
      session_carts: Vec::new(),
    }
  }

  pub fn with_session_carts(mut self, carts: Vec<ItemHolder>) -> Self {
    self.session_carts = carts;
    self
  }
}

/// A cart after consolidation, with the outcomes of its own validation and save.
#[derive(Debug)]
pub struct ConsolidatedCart {
  pub cart: ItemHolder,
  pub validation: FlowResult<ProcessingResult>,
  /// A failed save leaves this cart and the carts folded into it as they were stored.
  pub saved: FlowResult<()>,
}

#[derive(Debug)]
pub struct ConsolidationOutcome {
  pub carts: Vec<ConsolidatedCart>,
  /// More than one cart remains. The presentation layer shows this once.
  pub carts_divided: bool,
}

#[derive(Debug)]
pub enum LoginOutcome {
  Staff {
    member: Member,
    login_date: DateTime<Utc>,
    /// `false` when the timestamp could not be stored. The login still stands.
    persisted: bool,
  },
  Customer(ConsolidationOutcome),
}

pub struct LoginEventBridge {
  members: Arc<dyn MemberStore>,
  consolidation: CartConsolidationService,
  cart_flow: Arc<PurchaseFlow>,
}

impl LoginEventBridge {
  pub fn new(members: Arc<dyn MemberStore>, consolidation: CartConsolidationService, cart_flow: Arc<PurchaseFlow>) -> Self {
    Self {
      members,
      consolidation,
      cart_flow,
    }
  }

  #[instrument(
    name = "LoginEventBridge::on_interactive_login",
    skip_all,
    fields(staff = login.actor.is_staff()),
    err(Display)
  )]
  pub async fn on_interactive_login(&self, login: LoginEvent) -> FlowResult<LoginOutcome> {
    match login.actor {
      Actor::Staff(member) => Ok(self.record_staff_login(member).await),
      Actor::Customer(customer) => self
        .consolidate_customer_carts(customer, login.session_carts)
        .await
        .map(LoginOutcome::Customer),
    }
  }

  async fn record_staff_login(&self, mut member: Member) -> LoginOutcome {
    let login_date = Utc::now();
    member.login_date = Some(login_date);
    let persisted = match self.members.record_login(&member).await {
      Ok(()) => true,
      Err(err) => {
        event!(Level::ERROR, member_id = member.id, error = %err, "Failed to persist staff login date.");
        false
      }
    };
    LoginOutcome::Staff {
      member,
      login_date,
      persisted,
    }
  }

  async fn consolidate_customer_carts(
    &self,
    customer: Customer,
    session_carts: Vec<ItemHolder>,
  ) -> FlowResult<ConsolidationOutcome> {
    let mut merged = self.consolidation.merge_from_persisted(&customer, session_carts).await?;

    let actor = Actor::Customer(customer);
    let validations: Vec<FlowResult<ProcessingResult>> = merged
      .carts
      .iter_mut()
      .map(|folded| validate_cart(&self.cart_flow, &mut folded.cart, &actor))
      .collect();

    // Validation surfaces drift; it never blocks the merge.
    let saves = self.consolidation.save(&mut merged).await;

    let carts_divided = merged.carts.len() > 1;
    if carts_divided {
      event!(Level::INFO, carts = merged.carts.len(), "Carts could not be consolidated into one.");
    }

    let carts = merged
      .carts
      .into_iter()
      .zip(validations)
      .zip(saves)
      .map(|((folded, validation), saved)| ConsolidatedCart {
        cart: folded.cart,
        validation,
        saved,
      })
      .collect();
    Ok(ConsolidationOutcome { carts, carts_divided })
  }
}

// The cart is its own origin: this is a consistency check, not an edit.
fn validate_cart(flow: &PurchaseFlow, cart: &mut ItemHolder, actor: &Actor) -> FlowResult<ProcessingResult> {
  let ctx = PurchaseContext::snapshot(cart, actor.clone());
  let result = flow.validate(cart, &ctx);
  match &result {
    Ok(outcome) if !outcome.is_success() => {
      event!(Level::WARN, cart_id = ?cart.id, errors = outcome.errors().len(), "Merged cart failed validation.");
    }
    Err(FlowError::Fault { processor, .. }) => {
      event!(Level::ERROR, cart_id = ?cart.id, %processor, "Merged cart validation faulted.");
    }
    _ => {}
  }
  result
}
