//! Handlers for `/compliance/alerts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/compliance/alerts` | Optional `?subject_id`; `?unresolved_only` defaults to `true` |
//! | `POST` | `/compliance/alerts/:id/resolve` | Idempotent; 404 for an unknown id |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use keel_core::{
  alert::ComplianceAlert,
  store::{AlertFilter, ComplianceStore},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── List ────────────────────────────────────────────────────────────────────

fn default_unresolved_only() -> bool { true }

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub subject_id:      Option<String>,
  #[serde(default = "default_unresolved_only")]
  pub unresolved_only: bool,
}

/// `GET /compliance/alerts[?subject_id=...][&unresolved_only=false]`
///
/// Ordered most severe first, newest first within a severity.
pub async fn list<S, G>(
  State(state): State<AppState<S, G>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ComplianceAlert>>, ApiError>
where
  S: ComplianceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let filter = AlertFilter {
    subject_id:      params.subject_id,
    unresolved_only: params.unresolved_only,
  };
  let alerts = state
    .store
    .get_alerts(&filter)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(alerts))
}

// ─── Resolve ─────────────────────────────────────────────────────────────────

/// `POST /compliance/alerts/:id/resolve` — returns the resolved alert.
pub async fn resolve<S, G>(
  State(state): State<AppState<S, G>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ComplianceAlert>, ApiError>
where
  S: ComplianceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let alert = state
    .store
    .resolve_alert(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("alert {id} not found")))?;
  Ok(Json(alert))
}
