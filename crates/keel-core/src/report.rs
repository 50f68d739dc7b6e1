//! Aggregation for compliance checks and audit reports.
//!
//! Everything here is pure and deterministic. The only non-deterministic
//! part of an audit report — the advisory recommendations — is produced by
//! the text-generation client and merged in by the API layer; a failure
//! there never affects these counts.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::item::{ComplianceItem, ComplianceStatus};

// ─── Counts ──────────────────────────────────────────────────────────────────

/// Item counts bucketed by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
  pub total:         u32,
  pub compliant:     u32,
  pub at_risk:       u32,
  pub non_compliant: u32,
}

impl StatusCounts {
  pub fn tally(&mut self, status: ComplianceStatus) {
    self.total += 1;
    match status {
      ComplianceStatus::Compliant => self.compliant += 1,
      ComplianceStatus::AtRisk => self.at_risk += 1,
      ComplianceStatus::NonCompliant => self.non_compliant += 1,
    }
  }
}

fn count_all<'a>(
  items: impl IntoIterator<Item = &'a ComplianceItem>,
) -> StatusCounts {
  let mut counts = StatusCounts::default();
  for item in items {
    counts.tally(item.status);
  }
  counts
}

// ─── Summary ─────────────────────────────────────────────────────────────────

/// The deterministic aggregate handed to the text-generation boundary and
/// embedded in audit reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceSummary {
  /// `None` means all jurisdictions.
  pub jurisdiction:   Option<String>,
  pub counts:         StatusCounts,
  /// Per-`item_type` breakdown; BTreeMap keeps serialization stable.
  pub by_type:        BTreeMap<String, StatusCounts>,
  pub total_subjects: usize,
}

/// Aggregate `items`, optionally restricted to one jurisdiction.
pub fn summarize(
  items: &[ComplianceItem],
  jurisdiction: Option<&str>,
) -> ComplianceSummary {
  let filtered: Vec<&ComplianceItem> = items
    .iter()
    .filter(|i| jurisdiction.is_none_or(|j| i.jurisdiction == j))
    .collect();

  let mut by_type: BTreeMap<String, StatusCounts> = BTreeMap::new();
  let mut subjects: BTreeSet<&str> = BTreeSet::new();

  for item in &filtered {
    by_type
      .entry(item.item_type.clone())
      .or_default()
      .tally(item.status);
    subjects.insert(item.subject_id.as_str());
  }

  ComplianceSummary {
    jurisdiction:   jurisdiction.map(str::to_owned),
    counts:         count_all(filtered.iter().copied()),
    by_type,
    total_subjects: subjects.len(),
  }
}

// ─── Check ───────────────────────────────────────────────────────────────────

/// Status summary for a compliance check, scoped per the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum CheckSummary {
  /// One subject's items and counts.
  Subject {
    subject_id: String,
    counts:     StatusCounts,
    items:      Vec<ComplianceItem>,
  },
  /// All items within one jurisdiction.
  Jurisdiction {
    jurisdiction:   String,
    total_subjects: usize,
    counts:         StatusCounts,
  },
  /// Everything the store tracks.
  All {
    total_subjects:      usize,
    total_jurisdictions: usize,
    counts:              StatusCounts,
  },
}

/// Build a [`CheckSummary`]. A `subject_id` takes precedence over a
/// `jurisdiction`; with neither, the whole collection is summarized.
pub fn check(
  items: &[ComplianceItem],
  subject_id: Option<&str>,
  jurisdiction: Option<&str>,
) -> CheckSummary {
  if let Some(subject) = subject_id {
    let own: Vec<ComplianceItem> = items
      .iter()
      .filter(|i| i.subject_id == subject)
      .cloned()
      .collect();
    return CheckSummary::Subject {
      subject_id: subject.to_owned(),
      counts:     count_all(&own),
      items:      own,
    };
  }

  if let Some(j) = jurisdiction {
    let within: Vec<&ComplianceItem> =
      items.iter().filter(|i| i.jurisdiction == j).collect();
    let subjects: BTreeSet<&str> =
      within.iter().map(|i| i.subject_id.as_str()).collect();
    return CheckSummary::Jurisdiction {
      jurisdiction:   j.to_owned(),
      total_subjects: subjects.len(),
      counts:         count_all(within.iter().copied()),
    };
  }

  let subjects: BTreeSet<&str> =
    items.iter().map(|i| i.subject_id.as_str()).collect();
  let jurisdictions: BTreeSet<&str> =
    items.iter().map(|i| i.jurisdiction.as_str()).collect();
  CheckSummary::All {
    total_subjects:      subjects.len(),
    total_jurisdictions: jurisdictions.len(),
    counts:              count_all(items),
  }
}

// ─── Audit report ────────────────────────────────────────────────────────────

/// Audit readiness report. Numeric fields are always present; the
/// recommendations degrade to empty (with the flag set) if the external
/// text-generation call fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
  pub report_id:      Uuid,
  pub generated_at:   DateTime<Utc>,
  pub jurisdiction:   String,
  pub total_subjects: usize,
  pub counts:         StatusCounts,
  pub items_summary:  BTreeMap<String, StatusCounts>,
  pub recommendations: Vec<String>,
  pub recommendations_degraded: bool,
}

impl AuditReport {
  /// Assemble a report from a summary plus (possibly degraded) advisory text.
  pub fn from_summary(
    summary: ComplianceSummary,
    recommendations: Vec<String>,
    degraded: bool,
  ) -> Self {
    Self {
      report_id:      Uuid::new_v4(),
      generated_at:   Utc::now(),
      jurisdiction:   summary
        .jurisdiction
        .unwrap_or_else(|| "All Jurisdictions".to_owned()),
      total_subjects: summary.total_subjects,
      counts:         summary.counts,
      items_summary:  summary.by_type,
      recommendations,
      recommendations_degraded: degraded,
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::item::ComplianceStatus;

  fn item(
    subject: &str,
    item_type: &str,
    jurisdiction: &str,
    status: ComplianceStatus,
  ) -> ComplianceItem {
    ComplianceItem {
      item_id:      Uuid::new_v4(),
      subject_id:   subject.to_owned(),
      item_type:    item_type.to_owned(),
      name:         item_type.to_owned(),
      status,
      issue_date:   None,
      expiry_date:  None,
      jurisdiction: jurisdiction.to_owned(),
      details:      serde_json::Map::new(),
      created_at:   Utc::now(),
    }
  }

  #[test]
  fn summarize_empty_is_all_zero() {
    let summary = summarize(&[], None);
    assert_eq!(summary.counts, StatusCounts::default());
    assert!(summary.by_type.is_empty());
    assert_eq!(summary.total_subjects, 0);
  }

  #[test]
  fn summarize_groups_by_type() {
    let items = vec![
      item("e1", "training", "United States", ComplianceStatus::Compliant),
      item("e1", "training", "United States", ComplianceStatus::AtRisk),
      item("e2", "permit", "Singapore", ComplianceStatus::NonCompliant),
    ];

    let summary = summarize(&items, None);
    assert_eq!(summary.counts.total, 3);
    assert_eq!(summary.counts.compliant, 1);
    assert_eq!(summary.counts.at_risk, 1);
    assert_eq!(summary.counts.non_compliant, 1);
    assert_eq!(summary.total_subjects, 2);

    let training = &summary.by_type["training"];
    assert_eq!(training.total, 2);
    assert_eq!(training.at_risk, 1);
    assert_eq!(summary.by_type["permit"].non_compliant, 1);
  }

  #[test]
  fn summarize_filters_by_jurisdiction() {
    let items = vec![
      item("e1", "training", "United States", ComplianceStatus::Compliant),
      item("e2", "permit", "Singapore", ComplianceStatus::NonCompliant),
    ];

    let summary = summarize(&items, Some("Singapore"));
    assert_eq!(summary.counts.total, 1);
    assert_eq!(summary.counts.non_compliant, 1);
    assert_eq!(summary.total_subjects, 1);
  }

  #[test]
  fn check_prefers_subject_scope() {
    let items = vec![
      item("e1", "training", "United States", ComplianceStatus::Compliant),
      item("e2", "permit", "Singapore", ComplianceStatus::NonCompliant),
    ];

    match check(&items, Some("e1"), Some("Singapore")) {
      CheckSummary::Subject { subject_id, counts, items } => {
        assert_eq!(subject_id, "e1");
        assert_eq!(counts.total, 1);
        assert_eq!(items.len(), 1);
      }
      other => panic!("expected subject scope, got {other:?}"),
    }
  }

  #[test]
  fn check_all_counts_distinct_subjects_and_jurisdictions() {
    let items = vec![
      item("e1", "training", "United States", ComplianceStatus::Compliant),
      item("e1", "permit", "Singapore", ComplianceStatus::AtRisk),
      item("e2", "permit", "Singapore", ComplianceStatus::NonCompliant),
    ];

    match check(&items, None, None) {
      CheckSummary::All { total_subjects, total_jurisdictions, counts } => {
        assert_eq!(total_subjects, 2);
        assert_eq!(total_jurisdictions, 2);
        assert_eq!(counts.total, 3);
      }
      other => panic!("expected all scope, got {other:?}"),
    }
  }

  #[test]
  fn report_from_empty_summary_has_default_jurisdiction() {
    let report = AuditReport::from_summary(summarize(&[], None), vec![], false);
    assert_eq!(report.jurisdiction, "All Jurisdictions");
    assert_eq!(report.counts, StatusCounts::default());
    assert!(report.recommendations.is_empty());
    assert!(!report.recommendations_degraded);
  }
}
