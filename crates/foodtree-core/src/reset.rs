//! Replace every stored submission with a supplied set.
//!
//! Existing `submission:*` keys are deleted first, then each entry that has
//! an `id`, a `type` and a `data` object is written under
//! `submission:<id>`. There is no transaction: a failure part way through
//! leaves the store partially reset.

use serde::Serialize;
use serde_json::Value;

use crate::{
  Error,
  Result,
  store::{KvStore, SUBMISSION_PATTERN, submission_key},
};

/// Keys deleted per batch.
pub const DELETE_BATCH: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResetReport {
  pub success: bool,
  pub message: String,
  pub deleted: usize,
  pub written: usize,
  pub skipped: usize,
}

/// The storage id of a usable entry.
fn entry_id(entry: &Value) -> Option<String> {
  let id = match entry.get("id")? {
    Value::String(s) if !s.is_empty() => s.clone(),
    Value::Number(n) => n.to_string(),
    _ => return None,
  };
  let has_type = entry.get("type").is_some_and(|t| !t.is_null());
  let has_data = entry.get("data").is_some_and(Value::is_object);
  (has_type && has_data).then_some(id)
}

pub async fn reset_submissions<S: KvStore>(
  store: &S,
  entries: Vec<Value>,
) -> Result<ResetReport> {
  let keys = store
    .keys(SUBMISSION_PATTERN)
    .await
    .map_err(Error::store)?;

  let mut report = ResetReport::default();
  for batch in keys.chunks(DELETE_BATCH) {
    let results = futures::future::join_all(batch.iter().map(|key| store.del(key))).await;
    for result in results {
      if result.map_err(Error::store)? {
        report.deleted += 1;
      }
    }
  }
  tracing::info!(deleted = report.deleted, "cleared submissions");

  for entry in &entries {
    let Some(id) = entry_id(entry) else {
      tracing::warn!("skipping reset entry without id, type or data");
      report.skipped += 1;
      continue;
    };
    store
      .set(&submission_key(&id), serde_json::to_string(entry)?)
      .await
      .map_err(Error::store)?;
    report.written += 1;
  }

  report.success = true;
  report.message = format!(
    "Reset complete. Deleted {}, wrote {}, skipped {}.",
    report.deleted, report.written, report.skipped
  );
  tracing::info!(written = report.written, skipped = report.skipped, "reset complete");
  Ok(report)
}
