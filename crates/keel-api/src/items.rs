//! Handlers for `/compliance/items` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/compliance/items` | Optional `?subject_id` and `?jurisdiction` |
//! | `POST` | `/compliance/items` | Body: [`NewItemBody`]; returns 201 + stored item |
//! | `GET`  | `/compliance/items/:id` | 404 if not found |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use keel_core::{
  item::{ComplianceItem, NewComplianceItem},
  store::{ComplianceStore, ItemFilter},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── Create ──────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /compliance/items`.
///
/// `item_id`, `status`, and `created_at` are assigned by the store; a
/// matching alert is recorded synchronously when the initial status warrants
/// one.
#[derive(Debug, Deserialize)]
pub struct NewItemBody {
  pub subject_id:   String,
  pub item_type:    String,
  pub name:         String,
  pub jurisdiction: String,
  pub issue_date:   Option<NaiveDate>,
  pub expiry_date:  Option<NaiveDate>,
  #[serde(default)]
  pub details:      serde_json::Map<String, serde_json::Value>,
}

impl From<NewItemBody> for NewComplianceItem {
  fn from(b: NewItemBody) -> Self {
    NewComplianceItem {
      subject_id:   b.subject_id,
      item_type:    b.item_type,
      name:         b.name,
      jurisdiction: b.jurisdiction,
      issue_date:   b.issue_date,
      expiry_date:  b.expiry_date,
      details:      b.details,
    }
  }
}

/// `POST /compliance/items` — returns 201 + the stored item.
pub async fn create<S, G>(
  State(state): State<AppState<S, G>>,
  Json(body): Json<NewItemBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ComplianceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if body.subject_id.trim().is_empty() {
    return Err(ApiError::BadRequest("subject_id must not be empty".into()));
  }
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("name must not be empty".into()));
  }

  let item = state
    .store
    .add_item(NewComplianceItem::from(body))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(item)))
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub subject_id:   Option<String>,
  pub jurisdiction: Option<String>,
}

/// `GET /compliance/items[?subject_id=...][&jurisdiction=...]`
pub async fn list<S, G>(
  State(state): State<AppState<S, G>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ComplianceItem>>, ApiError>
where
  S: ComplianceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let filter = ItemFilter {
    subject_id:   params.subject_id,
    jurisdiction: params.jurisdiction,
  };
  let items = state
    .store
    .list_items(&filter)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(items))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /compliance/items/:id`
pub async fn get_one<S, G>(
  State(state): State<AppState<S, G>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ComplianceItem>, ApiError>
where
  S: ComplianceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let item = state
    .store
    .get_item(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("item {id} not found")))?;
  Ok(Json(item))
}
