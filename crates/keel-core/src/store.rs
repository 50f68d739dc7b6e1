//! The `ComplianceStore` trait and supporting filter types.
//!
//! The trait is implemented by storage backends (e.g. `keel-store-sqlite`).
//! Higher layers (`keel-api`, `keel-server`) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  alert::ComplianceAlert,
  item::{ComplianceItem, NewComplianceItem},
};

// ─── Filter types ────────────────────────────────────────────────────────────

/// Parameters for [`ComplianceStore::list_items`].
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
  pub subject_id:   Option<String>,
  pub jurisdiction: Option<String>,
}

/// Parameters for [`ComplianceStore::get_alerts`].
#[derive(Debug, Clone)]
pub struct AlertFilter {
  pub subject_id:      Option<String>,
  /// Skip resolved alerts. On by default.
  pub unresolved_only: bool,
}

impl Default for AlertFilter {
  fn default() -> Self {
    Self { subject_id: None, unresolved_only: true }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a keel compliance store backend.
///
/// Stores own status derivation: `add_item` classifies against the current
/// date, and `evaluate_all` is the periodic re-evaluation pass. Alerts are
/// only ever created by these two operations, never by callers directly.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ComplianceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Items ─────────────────────────────────────────────────────────────

  /// Create and persist a new item. Assigns the id, computes the initial
  /// status against today's date, and synchronously records one alert if
  /// that status warrants it.
  fn add_item(
    &self,
    input: NewComplianceItem,
  ) -> impl Future<Output = Result<ComplianceItem, Self::Error>> + Send + '_;

  /// Retrieve an item by id. Returns `None` if not found.
  fn get_item(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ComplianceItem>, Self::Error>> + Send + '_;

  /// List items matching `filter`, in insertion order. No side effects.
  fn list_items<'a>(
    &'a self,
    filter: &'a ItemFilter,
  ) -> impl Future<Output = Result<Vec<ComplianceItem>, Self::Error>> + Send + 'a;

  // ── Evaluation ────────────────────────────────────────────────────────

  /// Recompute every item's status as of `as_of` (today if `None`).
  ///
  /// A status change is persisted and, when the new status is at-risk or
  /// non-compliant, recorded as a new alert. Returns exactly the alerts
  /// created by this call. Safe to call repeatedly: with no intervening
  /// state change a second call returns an empty list.
  fn evaluate_all(
    &self,
    as_of: Option<NaiveDate>,
  ) -> impl Future<Output = Result<Vec<ComplianceAlert>, Self::Error>> + Send + '_;

  // ── Alerts ────────────────────────────────────────────────────────────

  /// List alerts matching `filter`, ordered by severity rank ascending
  /// (critical first) then creation time descending (newest first).
  fn get_alerts<'a>(
    &'a self,
    filter: &'a AlertFilter,
  ) -> impl Future<Output = Result<Vec<ComplianceAlert>, Self::Error>> + Send + 'a;

  /// Mark an alert resolved and return it, or `None` if no alert has this
  /// id. Resolving an already-resolved alert is a no-op success returning
  /// the record unchanged.
  fn resolve_alert(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ComplianceAlert>, Self::Error>> + Send + '_;
}
