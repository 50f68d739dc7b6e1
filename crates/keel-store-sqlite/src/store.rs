//! [`SqliteStore`] — the SQLite implementation of [`ComplianceStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use keel_core::{
  alert::{ComplianceAlert, alert_for_status, alert_message},
  item::{ComplianceItem, NewComplianceItem, classify},
  store::{AlertFilter, ComplianceStore, ItemFilter},
};

use crate::{
  Error, Result,
  encode::{
    RawAlert, RawItem, encode_alert_type, encode_date, encode_details,
    encode_dt, encode_severity, encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A keel compliance store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All writes
/// go through one connection, so mutations are serialized and there are no
/// lost updates under concurrent requests.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

fn item_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawItem> {
  Ok(RawItem {
    item_id:      row.get(0)?,
    subject_id:   row.get(1)?,
    item_type:    row.get(2)?,
    name:         row.get(3)?,
    status:       row.get(4)?,
    issue_date:   row.get(5)?,
    expiry_date:  row.get(6)?,
    jurisdiction: row.get(7)?,
    details:      row.get(8)?,
    created_at:   row.get(9)?,
  })
}

const ITEM_COLUMNS: &str = "item_id, subject_id, item_type, name, status, \
                            issue_date, expiry_date, jurisdiction, details, \
                            created_at";

fn alert_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAlert> {
  Ok(RawAlert {
    alert_id:   row.get(0)?,
    item_id:    row.get(1)?,
    subject_id: row.get(2)?,
    alert_type: row.get(3)?,
    severity:   row.get(4)?,
    message:    row.get(5)?,
    created_at: row.get(6)?,
    resolved:   row.get(7)?,
  })
}

const ALERT_COLUMNS: &str = "alert_id, item_id, subject_id, alert_type, \
                             severity, message, created_at, resolved";

/// Build the alert record warranted by an item's current status, if any.
fn alert_for_item(item: &ComplianceItem) -> Option<ComplianceAlert> {
  let (alert_type, severity) = alert_for_status(item.status)?;
  Some(ComplianceAlert {
    alert_id: Uuid::new_v4(),
    item_id: item.item_id,
    subject_id: item.subject_id.clone(),
    alert_type,
    severity,
    message: alert_message(item, alert_type),
    created_at: Utc::now(),
    resolved: false,
  })
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a fully-built [`ComplianceItem`] into the `items` table.
  async fn insert_item(&self, item: &ComplianceItem) -> Result<()> {
    let item_id_str    = encode_uuid(item.item_id);
    let subject_id     = item.subject_id.clone();
    let item_type      = item.item_type.clone();
    let name           = item.name.clone();
    let status_str     = encode_status(item.status).to_owned();
    let issue_str      = item.issue_date.map(encode_date);
    let expiry_str     = item.expiry_date.map(encode_date);
    let jurisdiction   = item.jurisdiction.clone();
    let details_str    = encode_details(&item.details)?;
    let created_at_str = encode_dt(item.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO items (
             item_id, subject_id, item_type, name, status,
             issue_date, expiry_date, jurisdiction, details, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            item_id_str,
            subject_id,
            item_type,
            name,
            status_str,
            issue_str,
            expiry_str,
            jurisdiction,
            details_str,
            created_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a fully-built [`ComplianceAlert`] into the `alerts` table.
  pub(crate) async fn insert_alert(&self, alert: &ComplianceAlert) -> Result<()> {
    let alert_id_str   = encode_uuid(alert.alert_id);
    let item_id_str    = encode_uuid(alert.item_id);
    let subject_id     = alert.subject_id.clone();
    let type_str       = encode_alert_type(alert.alert_type).to_owned();
    let severity_str   = encode_severity(alert.severity).to_owned();
    let message        = alert.message.clone();
    let created_at_str = encode_dt(alert.created_at);
    let resolved       = alert.resolved;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO alerts (
             alert_id, item_id, subject_id, alert_type,
             severity, message, created_at, resolved
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            alert_id_str,
            item_id_str,
            subject_id,
            type_str,
            severity_str,
            message,
            created_at_str,
            resolved,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Persist a recomputed status for an existing item.
  async fn update_status(
    &self,
    item_id: Uuid,
    status: keel_core::item::ComplianceStatus,
  ) -> Result<()> {
    let id_str     = encode_uuid(item_id);
    let status_str = encode_status(status).to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE items SET status = ?1 WHERE item_id = ?2",
          rusqlite::params![status_str, id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// All items in insertion order, unfiltered.
  async fn load_all_items(&self) -> Result<Vec<ComplianceItem>> {
    let raws: Vec<RawItem> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY rowid"))?;
        let rows = stmt
          .query_map([], item_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawItem::into_item).collect()
  }
}

// ─── ComplianceStore impl ────────────────────────────────────────────────────

impl ComplianceStore for SqliteStore {
  type Error = Error;

  // ── Items ─────────────────────────────────────────────────────────────────

  async fn add_item(&self, input: NewComplianceItem) -> Result<ComplianceItem> {
    let today = Utc::now().date_naive();

    let item = ComplianceItem {
      item_id:      Uuid::new_v4(),
      subject_id:   input.subject_id,
      item_type:    input.item_type,
      name:         input.name,
      status:       classify(input.expiry_date, today),
      issue_date:   input.issue_date,
      expiry_date:  input.expiry_date,
      jurisdiction: input.jurisdiction,
      details:      input.details,
      created_at:   Utc::now(),
    };

    self.insert_item(&item).await?;

    if let Some(alert) = alert_for_item(&item) {
      self.insert_alert(&alert).await?;
    }

    Ok(item)
  }

  async fn get_item(&self, id: Uuid) -> Result<Option<ComplianceItem>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawItem> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ITEM_COLUMNS} FROM items WHERE item_id = ?1"),
              rusqlite::params![id_str],
              item_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawItem::into_item).transpose()
  }

  async fn list_items(&self, filter: &ItemFilter) -> Result<Vec<ComplianceItem>> {
    let subject      = filter.subject_id.clone();
    let jurisdiction = filter.jurisdiction.clone();

    let raws: Vec<RawItem> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ITEM_COLUMNS} FROM items
           WHERE (?1 IS NULL OR subject_id = ?1)
             AND (?2 IS NULL OR jurisdiction = ?2)
           ORDER BY rowid"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![subject.as_deref(), jurisdiction.as_deref()],
            item_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawItem::into_item).collect()
  }

  // ── Evaluation ────────────────────────────────────────────────────────────

  async fn evaluate_all(
    &self,
    as_of: Option<NaiveDate>,
  ) -> Result<Vec<ComplianceAlert>> {
    let evaluation_date = as_of.unwrap_or_else(|| Utc::now().date_naive());

    let mut new_alerts = Vec::new();

    for mut item in self.load_all_items().await? {
      let recomputed = classify(item.expiry_date, evaluation_date);
      if recomputed == item.status {
        continue;
      }

      item.status = recomputed;
      self.update_status(item.item_id, recomputed).await?;

      // Alerts are emitted on transition only, never for an unchanged
      // already-flagged item.
      if let Some(alert) = alert_for_item(&item) {
        self.insert_alert(&alert).await?;
        new_alerts.push(alert);
      }
    }

    Ok(new_alerts)
  }

  // ── Alerts ────────────────────────────────────────────────────────────────

  async fn get_alerts(&self, filter: &AlertFilter) -> Result<Vec<ComplianceAlert>> {
    let subject         = filter.subject_id.clone();
    let unresolved_only = filter.unresolved_only;

    let raws: Vec<RawAlert> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ALERT_COLUMNS} FROM alerts
           WHERE (?1 IS NULL OR subject_id = ?1)
             AND (?2 = 0 OR resolved = 0)"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![subject.as_deref(), unresolved_only],
            alert_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut alerts: Vec<ComplianceAlert> = raws
      .into_iter()
      .map(RawAlert::into_alert)
      .collect::<Result<_>>()?;

    // Most severe first; newest first within the same severity.
    alerts.sort_by_key(|a| (a.severity.rank(), std::cmp::Reverse(a.created_at)));

    Ok(alerts)
  }

  async fn resolve_alert(&self, id: Uuid) -> Result<Option<ComplianceAlert>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawAlert> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ALERT_COLUMNS} FROM alerts WHERE alert_id = ?1"),
              rusqlite::params![id_str],
              alert_row,
            )
            .optional()?,
        )
      })
      .await?;

    let Some(raw) = raw else { return Ok(None) };
    let mut alert = raw.into_alert()?;

    // Already resolved: no-op success, record returned unchanged.
    if alert.resolved {
      return Ok(Some(alert));
    }

    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE alerts SET resolved = 1 WHERE alert_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;

    alert.resolved = true;
    Ok(Some(alert))
  }
}
