//! Contract generation and review for `/documents` endpoints.
//!
//! A jurisdiction template names the sections a contract needs; each section
//! is written by the text-generation client and the results are assembled
//! into one document. Generation failures surface as 502 — unlike the audit
//! report, the document *is* the generated text, so there is nothing to
//! degrade to.
//!
//! Generated contracts are retained in memory keyed by id, like assistant
//! conversations. Contracts created with `require_approval` start as
//! `pending_review` and move to `approved` or `rejected` through the review
//! endpoint.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/documents/contracts` | 201 + assembled contract |
//! | `GET`  | `/documents/contracts/:id` | 404 if not found |
//! | `POST` | `/documents/contracts/:id/review` | Only `pending_review` contracts |
//! | `GET`  | `/documents/pending-approvals` | Contracts awaiting review |
//! | `GET`  | `/documents/templates` | The static template catalog |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, Utc};
use keel_genai::TextGenerator;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── Templates ───────────────────────────────────────────────────────────────

/// A jurisdiction-specific contract layout.
#[derive(Debug, Serialize)]
pub struct ContractTemplate {
  pub template_id:  &'static str,
  pub jurisdiction: &'static str,
  pub sections:     &'static [&'static str],
}

pub const TEMPLATES: &[ContractTemplate] = &[
  ContractTemplate {
    template_id:  "us_full_time",
    jurisdiction: "United States",
    sections:     &[
      "employment_terms",
      "compensation",
      "benefits",
      "confidentiality",
      "termination",
      "jurisdiction_specific",
    ],
  },
  ContractTemplate {
    template_id:  "uk_full_time",
    jurisdiction: "United Kingdom",
    sections:     &[
      "employment_terms",
      "compensation",
      "benefits",
      "data_protection",
      "termination",
      "jurisdiction_specific",
    ],
  },
  ContractTemplate {
    template_id:  "sg_full_time",
    jurisdiction: "Singapore",
    sections:     &[
      "employment_terms",
      "compensation",
      "benefits",
      "confidentiality",
      "termination",
      "jurisdiction_specific",
    ],
  },
];

/// Look up a template by id. Unknown or missing ids fall back to the US
/// full-time template.
pub fn template_for(id: Option<&str>) -> &'static ContractTemplate {
  id.and_then(|id| TEMPLATES.iter().find(|t| t.template_id == id))
    .unwrap_or(&TEMPLATES[0])
}

fn section_title(section: &str) -> String {
  match section {
    "employment_terms" => "1. EMPLOYMENT TERMS".to_owned(),
    "compensation" => "2. COMPENSATION".to_owned(),
    "benefits" => "3. BENEFITS".to_owned(),
    "confidentiality" => "4. CONFIDENTIALITY".to_owned(),
    "data_protection" => "4. DATA PROTECTION".to_owned(),
    "termination" => "5. TERMINATION".to_owned(),
    "jurisdiction_specific" => "6. JURISDICTION-SPECIFIC PROVISIONS".to_owned(),
    other => other.to_uppercase(),
  }
}

// ─── Request / response types ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ContractRequest {
  pub subject_id:       String,
  pub first_name:       String,
  pub last_name:        String,
  pub position:         String,
  pub department:       String,
  pub start_date:       Option<NaiveDate>,
  /// One of the [`TEMPLATES`] ids; defaults to `us_full_time`.
  pub template_id:      Option<String>,
  #[serde(default)]
  pub require_approval: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
  Draft,
  PendingReview,
  Approved,
  Rejected,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedContract {
  pub contract_id:      Uuid,
  pub subject_id:       String,
  pub template_id:      String,
  pub jurisdiction:     String,
  pub content:          String,
  pub status:           ContractStatus,
  pub created_at:       DateTime<Utc>,
  pub reviewed_by:      Option<String>,
  pub reviewed_at:      Option<DateTime<Utc>>,
  pub rejection_reason: Option<String>,
}

// ─── Prompts ─────────────────────────────────────────────────────────────────

fn system_prompt(jurisdiction: &str) -> String {
  format!(
    "You are a legal document expert specializing in employment contracts \
     for {jurisdiction}. Generate accurate, professional contract language."
  )
}

fn section_prompt(
  section: &str,
  req: &ContractRequest,
  jurisdiction: &str,
) -> String {
  let start_date = req
    .start_date
    .map(|d| d.to_string())
    .unwrap_or_else(|| "to be agreed".to_owned());

  format!(
    "Generate a {section} section for an employment contract.\n\n\
     Employee Details:\n\
     - Name: {} {}\n\
     - Position: {}\n\
     - Department: {}\n\
     - Start Date: {start_date}\n\
     - Jurisdiction: {jurisdiction}\n\n\
     Generate professional, legally appropriate content for this section.",
    req.first_name, req.last_name, req.position, req.department,
  )
}

// ─── Assembly ────────────────────────────────────────────────────────────────

fn assemble_contract(
  req: &ContractRequest,
  template: &ContractTemplate,
  sections: &[(&str, String)],
) -> String {
  let divider = "=".repeat(60);
  let mut parts = vec![
    "EMPLOYMENT CONTRACT".to_owned(),
    format!("\n{divider}\n"),
    format!(
      "This Employment Contract is entered into on {} between the Employer \
       and {} {}.",
      Utc::now().format("%B %d, %Y"),
      req.first_name,
      req.last_name,
    ),
    format!("\nJurisdiction: {}", template.jurisdiction),
    format!("Position: {}", req.position),
    format!("Department: {}", req.department),
    format!("\n{divider}\n"),
  ];

  for (section, content) in sections {
    parts.push(format!("\n{}\n", section_title(section)));
    parts.push(content.clone());
    parts.push("\n".to_owned());
  }

  parts.push(format!("\n{divider}\n"));
  parts.push("\nSIGNATURES\n".to_owned());
  parts.push(format!("\nEmployee: {} {}", req.first_name, req.last_name));
  parts.push("\nDate: _________________".to_owned());
  parts.push("\n\nEmployer Representative: _________________".to_owned());
  parts.push("\nDate: _________________".to_owned());

  parts.join("\n")
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `POST /documents/contracts` — returns 201 + the assembled contract. The
/// contract is retained and can be fetched or reviewed afterwards.
pub async fn generate<S, G>(
  State(state): State<AppState<S, G>>,
  Json(body): Json<ContractRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  G: TextGenerator,
{
  if body.subject_id.trim().is_empty() {
    return Err(ApiError::BadRequest("subject_id must not be empty".into()));
  }

  let template = template_for(body.template_id.as_deref());
  let system = system_prompt(template.jurisdiction);

  let mut sections: Vec<(&str, String)> =
    Vec::with_capacity(template.sections.len());
  for section in template.sections.iter().copied() {
    let content = state
      .generator
      .generate(
        Some(&system),
        &section_prompt(section, &body, template.jurisdiction),
      )
      .await
      .map_err(|e| ApiError::Upstream(e.to_string()))?;
    sections.push((section, content));
  }

  let content = assemble_contract(&body, template, &sections);

  let contract = GeneratedContract {
    contract_id:      Uuid::new_v4(),
    subject_id:       body.subject_id,
    template_id:      template.template_id.to_owned(),
    jurisdiction:     template.jurisdiction.to_owned(),
    content,
    status: if body.require_approval {
      ContractStatus::PendingReview
    } else {
      ContractStatus::Draft
    },
    created_at:       Utc::now(),
    reviewed_by:      None,
    reviewed_at:      None,
    rejection_reason: None,
  };

  state
    .contracts
    .lock()
    .await
    .insert(contract.contract_id, contract.clone());

  Ok((StatusCode::CREATED, Json(contract)))
}

/// `GET /documents/contracts/:id`
pub async fn get_contract<S, G>(
  State(state): State<AppState<S, G>>,
  Path(id): Path<Uuid>,
) -> Result<Json<GeneratedContract>, ApiError> {
  let contracts = state.contracts.lock().await;
  contracts
    .get(&id)
    .cloned()
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("contract {id} not found")))
}

/// `GET /documents/pending-approvals` — oldest first.
pub async fn pending_approvals<S, G>(
  State(state): State<AppState<S, G>>,
) -> Json<Vec<GeneratedContract>> {
  let contracts = state.contracts.lock().await;
  let mut pending: Vec<GeneratedContract> = contracts
    .values()
    .filter(|c| c.status == ContractStatus::PendingReview)
    .cloned()
    .collect();
  pending.sort_by_key(|c| c.created_at);
  Json(pending)
}

/// `GET /documents/templates`
pub async fn templates() -> Json<&'static [ContractTemplate]> {
  Json(TEMPLATES)
}

#[derive(Debug, Deserialize)]
pub struct ReviewBody {
  pub reviewer_id: String,
  pub approved:    bool,
  pub comments:    Option<String>,
}

/// `POST /documents/contracts/:id/review` — approve or reject a contract
/// awaiting review. Contracts in any other state are rejected with 400.
pub async fn review<S, G>(
  State(state): State<AppState<S, G>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ReviewBody>,
) -> Result<Json<GeneratedContract>, ApiError> {
  let mut contracts = state.contracts.lock().await;
  let contract = contracts
    .get_mut(&id)
    .ok_or_else(|| ApiError::NotFound(format!("contract {id} not found")))?;

  if contract.status != ContractStatus::PendingReview {
    return Err(ApiError::BadRequest(format!(
      "contract {id} is not awaiting review"
    )));
  }

  contract.reviewed_by = Some(body.reviewer_id);
  contract.reviewed_at = Some(Utc::now());
  if body.approved {
    contract.status = ContractStatus::Approved;
  } else {
    contract.status = ContractStatus::Rejected;
    contract.rejection_reason = body.comments;
  }

  Ok(Json(contract.clone()))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
