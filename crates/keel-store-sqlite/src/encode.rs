//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as `YYYY-MM-DD`,
//! details as compact JSON, and UUIDs as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use keel_core::{
  alert::{AlertType, ComplianceAlert, Severity},
  item::{ComplianceItem, ComplianceStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ComplianceStatus ────────────────────────────────────────────────────────

pub fn encode_status(s: ComplianceStatus) -> &'static str {
  match s {
    ComplianceStatus::Compliant => "compliant",
    ComplianceStatus::AtRisk => "at_risk",
    ComplianceStatus::NonCompliant => "non_compliant",
  }
}

pub fn decode_status(s: &str) -> Result<ComplianceStatus> {
  match s {
    "compliant" => Ok(ComplianceStatus::Compliant),
    "at_risk" => Ok(ComplianceStatus::AtRisk),
    "non_compliant" => Ok(ComplianceStatus::NonCompliant),
    other => Err(Error::DateParse(format!("unknown status: {other:?}"))),
  }
}

// ─── Severity ────────────────────────────────────────────────────────────────

pub fn encode_severity(s: Severity) -> &'static str {
  match s {
    Severity::Critical => "critical",
    Severity::High => "high",
    Severity::Medium => "medium",
    Severity::Low => "low",
  }
}

pub fn decode_severity(s: &str) -> Result<Severity> {
  match s {
    "critical" => Ok(Severity::Critical),
    "high" => Ok(Severity::High),
    "medium" => Ok(Severity::Medium),
    "low" => Ok(Severity::Low),
    other => Err(Error::DateParse(format!("unknown severity: {other:?}"))),
  }
}

// ─── AlertType ───────────────────────────────────────────────────────────────

pub fn encode_alert_type(t: AlertType) -> &'static str {
  match t {
    AlertType::Expiring => "expiring",
    AlertType::Expired => "expired",
  }
}

pub fn decode_alert_type(s: &str) -> Result<AlertType> {
  match s {
    "expiring" => Ok(AlertType::Expiring),
    "expired" => Ok(AlertType::Expired),
    other => Err(Error::DateParse(format!("unknown alert type: {other:?}"))),
  }
}

// ─── Details ─────────────────────────────────────────────────────────────────

pub fn encode_details(
  details: &serde_json::Map<String, serde_json::Value>,
) -> Result<String> {
  Ok(serde_json::to_string(details)?)
}

pub fn decode_details(
  s: &str,
) -> Result<serde_json::Map<String, serde_json::Value>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `items` row.
pub struct RawItem {
  pub item_id:      String,
  pub subject_id:   String,
  pub item_type:    String,
  pub name:         String,
  pub status:       String,
  pub issue_date:   Option<String>,
  pub expiry_date:  Option<String>,
  pub jurisdiction: String,
  pub details:      String,
  pub created_at:   String,
}

impl RawItem {
  pub fn into_item(self) -> Result<ComplianceItem> {
    Ok(ComplianceItem {
      item_id:      decode_uuid(&self.item_id)?,
      subject_id:   self.subject_id,
      item_type:    self.item_type,
      name:         self.name,
      status:       decode_status(&self.status)?,
      issue_date:   self.issue_date.as_deref().map(decode_date).transpose()?,
      expiry_date:  self.expiry_date.as_deref().map(decode_date).transpose()?,
      jurisdiction: self.jurisdiction,
      details:      decode_details(&self.details)?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `alerts` row.
pub struct RawAlert {
  pub alert_id:   String,
  pub item_id:    String,
  pub subject_id: String,
  pub alert_type: String,
  pub severity:   String,
  pub message:    String,
  pub created_at: String,
  pub resolved:   bool,
}

impl RawAlert {
  pub fn into_alert(self) -> Result<ComplianceAlert> {
    Ok(ComplianceAlert {
      alert_id:   decode_uuid(&self.alert_id)?,
      item_id:    decode_uuid(&self.item_id)?,
      subject_id: self.subject_id,
      alert_type: decode_alert_type(&self.alert_type)?,
      severity:   decode_severity(&self.severity)?,
      message:    self.message,
      created_at: decode_dt(&self.created_at)?,
      resolved:   self.resolved,
    })
  }
}
