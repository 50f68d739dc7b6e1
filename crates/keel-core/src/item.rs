//! Compliance items and the expiry-date status classifier.
//!
//! An item tracks one obligation (permit, training, certification) for one
//! subject. Its `status` is never set by callers; stores recompute it from
//! the expiry date whenever the item is created or re-evaluated.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Number of days before expiry at which an item becomes at-risk.
pub const AT_RISK_WINDOW_DAYS: i64 = 30;

/// Derived compliance state of an item as of some evaluation date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
  Compliant,
  AtRisk,
  NonCompliant,
}

/// Classify an expiry date against an evaluation date.
///
/// Total over its domain:
/// - no expiry date → [`ComplianceStatus::Compliant`] (the item never expires)
/// - already past → [`ComplianceStatus::NonCompliant`]
/// - within [`AT_RISK_WINDOW_DAYS`] days (inclusive of today) →
///   [`ComplianceStatus::AtRisk`]
/// - otherwise → [`ComplianceStatus::Compliant`]
pub fn classify(
  expiry_date: Option<NaiveDate>,
  as_of: NaiveDate,
) -> ComplianceStatus {
  classify_with_window(expiry_date, as_of, AT_RISK_WINDOW_DAYS)
}

/// [`classify`] with an explicit warning window, for callers that configure
/// per-deployment thresholds.
pub fn classify_with_window(
  expiry_date: Option<NaiveDate>,
  as_of: NaiveDate,
  window_days: i64,
) -> ComplianceStatus {
  let Some(expiry) = expiry_date else {
    return ComplianceStatus::Compliant;
  };

  let days_remaining = (expiry - as_of).num_days();

  if days_remaining < 0 {
    ComplianceStatus::NonCompliant
  } else if days_remaining < window_days {
    ComplianceStatus::AtRisk
  } else {
    ComplianceStatus::Compliant
  }
}

// ─── ComplianceItem ──────────────────────────────────────────────────────────

/// A tracked obligation for a subject. `status` and `created_at` are assigned
/// by the store; items are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceItem {
  pub item_id:     Uuid,
  /// Identity of the person or entity the item applies to (e.g. employee id).
  pub subject_id:  String,
  /// Free-form category tag, e.g. `"training"`, `"work_permit"`.
  pub item_type:   String,
  pub name:        String,
  /// Derived via [`classify`]; recomputed on every evaluation pass.
  pub status:      ComplianceStatus,
  pub issue_date:  Option<NaiveDate>,
  /// Absent means the item does not expire and is always compliant.
  pub expiry_date: Option<NaiveDate>,
  /// Region tag used for filtering and requirement lookup only; the at-risk
  /// window does not vary by jurisdiction.
  pub jurisdiction: String,
  #[serde(default)]
  pub details:     serde_json::Map<String, serde_json::Value>,
  pub created_at:  DateTime<Utc>,
}

// ─── NewComplianceItem ───────────────────────────────────────────────────────

/// Input to [`crate::store::ComplianceStore::add_item`].
/// `item_id`, `status`, and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewComplianceItem {
  pub subject_id:   String,
  pub item_type:    String,
  pub name:         String,
  pub jurisdiction: String,
  pub issue_date:   Option<NaiveDate>,
  pub expiry_date:  Option<NaiveDate>,
  pub details:      serde_json::Map<String, serde_json::Value>,
}

impl NewComplianceItem {
  /// Convenience constructor with no dates and empty details.
  pub fn new(
    subject_id: impl Into<String>,
    item_type: impl Into<String>,
    name: impl Into<String>,
    jurisdiction: impl Into<String>,
  ) -> Self {
    Self {
      subject_id:   subject_id.into(),
      item_type:    item_type.into(),
      name:         name.into(),
      jurisdiction: jurisdiction.into(),
      issue_date:   None,
      expiry_date:  None,
      details:      serde_json::Map::new(),
    }
  }

  pub fn expiring(mut self, expiry_date: NaiveDate) -> Self {
    self.expiry_date = Some(expiry_date);
    self
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
  }

  #[test]
  fn no_expiry_is_always_compliant() {
    assert_eq!(classify(None, today()), ComplianceStatus::Compliant);
  }

  #[test]
  fn past_expiry_is_non_compliant() {
    let expiry = today() - Duration::days(1);
    assert_eq!(
      classify(Some(expiry), today()),
      ComplianceStatus::NonCompliant
    );
  }

  #[test]
  fn expiry_today_is_at_risk() {
    assert_eq!(classify(Some(today()), today()), ComplianceStatus::AtRisk);
  }

  #[test]
  fn expiry_within_window_is_at_risk() {
    let expiry = today() + Duration::days(29);
    assert_eq!(classify(Some(expiry), today()), ComplianceStatus::AtRisk);
  }

  #[test]
  fn expiry_at_window_boundary_is_compliant() {
    let expiry = today() + Duration::days(AT_RISK_WINDOW_DAYS);
    assert_eq!(classify(Some(expiry), today()), ComplianceStatus::Compliant);
  }

  #[test]
  fn expiry_far_out_is_compliant() {
    let expiry = today() + Duration::days(365);
    assert_eq!(classify(Some(expiry), today()), ComplianceStatus::Compliant);
  }

  #[test]
  fn custom_window_shifts_the_at_risk_band() {
    let expiry = today() + Duration::days(40);
    assert_eq!(
      classify_with_window(Some(expiry), today(), 60),
      ComplianceStatus::AtRisk
    );
    assert_eq!(
      classify_with_window(Some(expiry), today(), 30),
      ComplianceStatus::Compliant
    );
  }
}
