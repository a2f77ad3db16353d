//! The normalization pass: rewrite every stored submission into the
//! canonical record shape.
//!
//! Everything except `updatedAt` is a fixed point: running the pass again
//! yields the same `data` and `status`. Records are rewritten one key at a
//! time; a failure on one key is logged and the pass moves on, so a crash
//! mid-run leaves a mix of rewritten and untouched records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
  Result,
  SITE_AUTHOR,
  lifecycle::SubmissionStatus,
  repo::load_submissions,
  store::KvStore,
  submission::{RecordData, SubmissionRecord, filled},
  timestamp,
};

/// Canonical form of `record`. `now` fills missing timestamps and always
/// becomes `updatedAt`.
pub fn normalize(record: &SubmissionRecord, now: &str) -> SubmissionRecord {
  let data = record.data.as_ref();
  let in_data = |f: fn(&RecordData) -> &Option<String>| {
    data.and_then(|d| filled(f(d))).map(str::to_owned)
  };

  let parent_ingredients = match data.and_then(|d| d.parent_ingredients.as_ref()) {
    Some(Value::Array(items)) => items.clone(),
    _ => Vec::new(),
  };

  let submitted_at = filled(&record.submitted_at).unwrap_or(now).to_owned();
  let created_at = record.created_or_submitted().unwrap_or(now).to_owned();

  SubmissionRecord {
    id: record.id.clone(),
    kind: record.kind.clone(),
    status: Some(
      filled(&record.status)
        .unwrap_or(SubmissionStatus::Pending.as_ref())
        .to_owned(),
    ),
    data: Some(RecordData {
      name: record.resolved_name().map(str::to_owned),
      source: record.resolved_source().map(str::to_owned),
      preparation_method: in_data(|d| &d.preparation_method),
      parent_ingredients: Some(Value::Array(parent_ingredients)),
      submitted_by: Some(SITE_AUTHOR.to_owned()),
      submitted_name: Some(SITE_AUTHOR.to_owned()),
      is_source_animal: data.and_then(|d| d.is_source_animal),
      animal_type: in_data(|d| &d.animal_type),
      previous_source: in_data(|d| &d.previous_source),
      description: None,
      cooking_method: None,
      ingredients: None,
      extra: Map::new(),
    }),
    notes: record.notes.clone(),
    submitted_at: Some(submitted_at),
    updated_at: Some(now.to_owned()),
    created_at: Some(created_at),
    ..Default::default()
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
  pub total:   usize,
  pub updated: usize,
  pub errors:  Vec<String>,
}

/// Normalize every `submission:*` record in place.
pub async fn cleanup_submissions<S: KvStore>(
  store: &S,
  now: DateTime<Utc>,
) -> Result<CleanupReport> {
  let now = timestamp(now);
  let submissions = load_submissions(store).await?;
  let mut report = CleanupReport {
    total: submissions.len(),
    ..Default::default()
  };
  tracing::info!(total = report.total, "normalizing submissions");

  for stored in &submissions {
    let record = match &stored.record {
      Ok(record) => record,
      Err(e) => {
        tracing::error!(key = %stored.key, error = %e, "skipping unreadable submission");
        report.errors.push(format!("Error processing {}: {e}", stored.key));
        continue;
      }
    };

    let written = match normalize(record, &now).to_json() {
      Ok(json) => store
        .set(&stored.key, json)
        .await
        .map_err(crate::Error::store),
      Err(e) => Err(e),
    };

    match written {
      Ok(()) => {
        report.updated += 1;
        tracing::debug!(key = %stored.key, "normalized submission");
      }
      Err(e) => {
        tracing::error!(key = %stored.key, error = %e, "failed to normalize submission");
        report.errors.push(format!("Error processing {}: {e}", stored.key));
      }
    }
  }

  tracing::info!(
    updated = report.updated,
    errors = report.errors.len(),
    "cleanup complete"
  );
  Ok(report)
}
