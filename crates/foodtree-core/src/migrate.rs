//! One-way migration of legacy source values.
//!
//! `grown` and `gathered` become `plant`, `prepared` becomes `other`. The
//! replaced value is kept under `data.previousSource`. Records already on
//! the current vocabulary, or without a source, are left alone.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
  Error,
  Result,
  source::{LegacySource, Source},
  store::{KvStore, SUBMISSION_PATTERN},
  submission::{SubmissionRecord, filled},
  timestamp,
};

/// Migrate `record` in place. Returns the mapping applied, or `None` if the
/// record was left unchanged. Only `data.source` is consulted.
pub fn migrate_record(
  record: &mut SubmissionRecord,
  now: &str,
) -> Option<(LegacySource, Source)> {
  let data = record.data.as_mut()?;
  let legacy: LegacySource = filled(&data.source)?.parse().ok()?;
  let current = legacy.forward();

  data.source = Some(current.to_string());
  data.previous_source = Some(legacy.to_string());
  record.updated_at = Some(now.to_owned());
  Some((legacy, current))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
  pub success:   bool,
  pub message:   String,
  pub total:     usize,
  pub updated:   usize,
  pub unchanged: usize,
  pub errors:    Vec<String>,
}

async fn migrate_key<S: KvStore>(store: &S, key: &str, now: &str) -> Result<Option<bool>> {
  let Some(raw) = store.get(key).await.map_err(Error::store)? else {
    return Ok(None);
  };
  let mut record = SubmissionRecord::parse(&raw)?;
  let Some((from, to)) = migrate_record(&mut record, now) else {
    return Ok(Some(false));
  };
  store
    .set(key, record.to_json()?)
    .await
    .map_err(Error::store)?;
  tracing::info!(%key, %from, %to, "migrated submission source");
  Ok(Some(true))
}

/// Migrate every `submission:*` record. Keys are processed one at a time;
/// failures are collected in the report and do not stop the run.
pub async fn migrate_sources<S: KvStore>(
  store: &S,
  now: DateTime<Utc>,
) -> Result<MigrationReport> {
  let now = timestamp(now);
  let keys = store
    .keys(SUBMISSION_PATTERN)
    .await
    .map_err(Error::store)?;
  tracing::info!(total = keys.len(), "migrating submission sources");

  let mut report = MigrationReport {
    total: keys.len(),
    ..Default::default()
  };

  for key in &keys {
    match migrate_key(store, key, &now).await {
      Ok(Some(true)) => report.updated += 1,
      Ok(Some(false)) => report.unchanged += 1,
      Ok(None) => tracing::warn!(%key, "submission disappeared during migration"),
      Err(e) => {
        let message = format!("Error processing {key}: {e}");
        tracing::error!("{message}");
        report.errors.push(message);
      }
    }
  }

  report.success = true;
  report.message = format!(
    "Migration complete. Updated {} of {} submissions.",
    report.updated, report.total
  );
  Ok(report)
}
