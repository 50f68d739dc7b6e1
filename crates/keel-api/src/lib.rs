//! JSON REST API for keel.
//!
//! Exposes an axum [`Router`] backed by any
//! [`keel_core::store::ComplianceStore`] and any
//! [`keel_genai::TextGenerator`]. Auth, TLS, and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", keel_api::api_router(store.clone(), generator.clone()))
//! ```

pub mod alerts;
pub mod assistant;
pub mod compliance;
pub mod documents;
pub mod error;
pub mod items;


use std::{collections::HashMap, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use keel_core::store::ComplianceStore;
use keel_genai::TextGenerator;
use tokio::sync::Mutex;
use uuid::Uuid;

use assistant::ConversationMessage;
use documents::GeneratedContract;
pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
///
/// Conversations and generated contracts are held in memory only; they do
/// not survive a restart.
pub struct AppState<S, G> {
  pub store:     Arc<S>,
  pub generator: Arc<G>,
  pub(crate) conversations:
    Arc<Mutex<HashMap<Uuid, Vec<ConversationMessage>>>>,
  pub(crate) contracts: Arc<Mutex<HashMap<Uuid, GeneratedContract>>>,
}

impl<S, G> AppState<S, G> {
  pub fn new(store: Arc<S>, generator: Arc<G>) -> Self {
    Self {
      store,
      generator,
      conversations: Arc::new(Mutex::new(HashMap::new())),
      contracts: Arc::new(Mutex::new(HashMap::new())),
    }
  }
}

impl<S, G> Clone for AppState<S, G> {
  fn clone(&self) -> Self {
    Self {
      store:         Arc::clone(&self.store),
      generator:     Arc::clone(&self.generator),
      conversations: Arc::clone(&self.conversations),
      contracts:     Arc::clone(&self.contracts),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store` and `generator`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, G>(store: Arc<S>, generator: Arc<G>) -> Router<()>
where
  S: ComplianceStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: TextGenerator + 'static,
{
  Router::new()
    // Compliance
    .route(
      "/compliance/items",
      get(items::list::<S, G>).post(items::create::<S, G>),
    )
    .route("/compliance/items/{id}", get(items::get_one::<S, G>))
    .route("/compliance/monitor", post(compliance::monitor::<S, G>))
    .route("/compliance/alerts", get(alerts::list::<S, G>))
    .route(
      "/compliance/alerts/{id}/resolve",
      post(alerts::resolve::<S, G>),
    )
    .route("/compliance/check", post(compliance::check::<S, G>))
    .route(
      "/compliance/requirements/{jurisdiction}",
      get(compliance::requirements),
    )
    .route(
      "/compliance/audit-report",
      post(compliance::audit_report::<S, G>),
    )
    // Documents
    .route("/documents/contracts", post(documents::generate::<S, G>))
    .route(
      "/documents/contracts/{id}",
      get(documents::get_contract::<S, G>),
    )
    .route(
      "/documents/contracts/{id}/review",
      post(documents::review::<S, G>),
    )
    .route(
      "/documents/pending-approvals",
      get(documents::pending_approvals::<S, G>),
    )
    .route("/documents/templates", get(documents::templates))
    // Assistant
    .route("/assistant/chat", post(assistant::chat::<S, G>))
    .route(
      "/assistant/conversations/{id}",
      get(assistant::get_conversation::<S, G>),
    )
    .with_state(AppState::new(store, generator))
}
