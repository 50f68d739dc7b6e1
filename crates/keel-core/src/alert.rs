//! Compliance alerts and the status → alert mapping.
//!
//! Alerts are created only by stores, as a side effect of classification
//! (at item creation and on status transitions during re-evaluation). The
//! message is rendered once at creation time and never regenerated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::item::{ComplianceItem, ComplianceStatus};

// ─── Severity ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Critical,
  High,
  Medium,
  Low,
}

impl Severity {
  /// Sort rank: most severe first. Alert queries order by this ascending.
  pub fn rank(self) -> u8 {
    match self {
      Self::Critical => 0,
      Self::High => 1,
      Self::Medium => 2,
      Self::Low => 3,
    }
  }
}

// ─── AlertType ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
  Expiring,
  Expired,
}

// ─── ComplianceAlert ─────────────────────────────────────────────────────────

/// A record that an item has entered the at-risk or non-compliant band.
///
/// `item_id` is a weak reference; the alert is retained independently of the
/// item. `resolved` flips to `true` at most once, via
/// [`crate::store::ComplianceStore::resolve_alert`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceAlert {
  pub alert_id:   Uuid,
  pub item_id:    Uuid,
  /// Denormalized copy of the item's subject, so alert queries need no join.
  pub subject_id: String,
  pub alert_type: AlertType,
  pub severity:   Severity,
  /// Rendered at creation time and frozen.
  pub message:    String,
  pub created_at: DateTime<Utc>,
  pub resolved:   bool,
}

// ─── Status mapping ──────────────────────────────────────────────────────────

/// The alert type and severity warranted by a status, or `None` for
/// `Compliant` (which never produces an alert).
pub fn alert_for_status(
  status: ComplianceStatus,
) -> Option<(AlertType, Severity)> {
  match status {
    ComplianceStatus::Compliant => None,
    ComplianceStatus::AtRisk => Some((AlertType::Expiring, Severity::High)),
    ComplianceStatus::NonCompliant => {
      Some((AlertType::Expired, Severity::Critical))
    }
  }
}

/// Human-readable alert text naming the item and its subject.
pub fn alert_message(item: &ComplianceItem, alert_type: AlertType) -> String {
  match alert_type {
    AlertType::Expired => {
      format!("{} has expired for {}", item.name, item.subject_id)
    }
    AlertType::Expiring => {
      format!("{} is expiring soon for {}", item.name, item.subject_id)
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn compliant_never_alerts() {
    assert!(alert_for_status(ComplianceStatus::Compliant).is_none());
  }

  #[test]
  fn at_risk_maps_to_high_expiring() {
    assert_eq!(
      alert_for_status(ComplianceStatus::AtRisk),
      Some((AlertType::Expiring, Severity::High))
    );
  }

  #[test]
  fn non_compliant_maps_to_critical_expired() {
    assert_eq!(
      alert_for_status(ComplianceStatus::NonCompliant),
      Some((AlertType::Expired, Severity::Critical))
    );
  }

  #[test]
  fn severity_rank_orders_critical_first() {
    assert!(Severity::Critical.rank() < Severity::High.rank());
    assert!(Severity::High.rank() < Severity::Medium.rank());
    assert!(Severity::Medium.rank() < Severity::Low.rank());
  }
}
