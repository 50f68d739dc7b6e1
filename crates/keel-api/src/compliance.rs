//! Handlers for compliance checks, monitoring, requirements, and the audit
//! report.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/compliance/check` | Body: `{subject_id?, jurisdiction?}` |
//! | `POST` | `/compliance/monitor` | Re-evaluates every item |
//! | `GET`  | `/compliance/requirements/:jurisdiction` | Unknown jurisdiction → empty list |
//! | `POST` | `/compliance/audit-report` | Body: `{jurisdiction?}`; never fails on generator errors |

use axum::{
  Json,
  extract::{Path, State},
};
use keel_core::{
  alert::ComplianceAlert,
  jurisdiction::{RequiredItem, required_items},
  report::{self, AuditReport, CheckSummary},
  store::{ComplianceStore, ItemFilter},
};
use keel_genai::{TextGenerator, recommend::compliance_recommendations};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

// ─── Check ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CheckBody {
  pub subject_id:   Option<String>,
  pub jurisdiction: Option<String>,
}

/// `POST /compliance/check` — a `subject_id` takes precedence over a
/// `jurisdiction`; an empty body (`{}`) checks everything.
pub async fn check<S, G>(
  State(state): State<AppState<S, G>>,
  Json(body): Json<CheckBody>,
) -> Result<Json<CheckSummary>, ApiError>
where
  S: ComplianceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let items = state
    .store
    .list_items(&ItemFilter::default())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(report::check(
    &items,
    body.subject_id.as_deref(),
    body.jurisdiction.as_deref(),
  )))
}

// ─── Monitor ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct MonitorResponse {
  pub new_alerts: usize,
  pub alerts:     Vec<ComplianceAlert>,
}

/// `POST /compliance/monitor` — recomputes every item's status and returns
/// exactly the alerts created by this pass. Safe to call on a schedule.
pub async fn monitor<S, G>(
  State(state): State<AppState<S, G>>,
) -> Result<Json<MonitorResponse>, ApiError>
where
  S: ComplianceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let alerts = state
    .store
    .evaluate_all(None)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(MonitorResponse { new_alerts: alerts.len(), alerts }))
}

// ─── Requirements ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RequirementsResponse {
  pub jurisdiction:   String,
  pub required_items: &'static [RequiredItem],
}

/// `GET /compliance/requirements/:jurisdiction`
pub async fn requirements(
  Path(jurisdiction): Path<String>,
) -> Json<RequirementsResponse> {
  let required_items = required_items(&jurisdiction);
  Json(RequirementsResponse { jurisdiction, required_items })
}

// ─── Audit report ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AuditBody {
  pub jurisdiction: Option<String>,
}

/// `POST /compliance/audit-report` — the numeric report always succeeds; a
/// failed recommendation call yields an empty list with
/// `recommendations_degraded` set.
pub async fn audit_report<S, G>(
  State(state): State<AppState<S, G>>,
  Json(body): Json<AuditBody>,
) -> Result<Json<AuditReport>, ApiError>
where
  S: ComplianceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  G: TextGenerator,
{
  let items = state
    .store
    .list_items(&ItemFilter::default())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let summary = report::summarize(&items, body.jurisdiction.as_deref());

  let (recommendations, degraded) =
    match compliance_recommendations(state.generator.as_ref(), &summary).await
    {
      Ok(recs) => (recs, false),
      Err(e) => {
        tracing::warn!(error = %e, "recommendation generation failed, degrading report");
        (Vec::new(), true)
      }
    };

  Ok(Json(AuditReport::from_summary(summary, recommendations, degraded)))
}
