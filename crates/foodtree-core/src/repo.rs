//! Submission CRUD and counters over any [`KvStore`].

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  Error,
  Result,
  lifecycle::SubmissionStatus,
  migrate::migrate_record,
  profanity::contains_profanity,
  store::{COMPLAINT_COUNTER, KvStore, SUBMISSION_PATTERN, submission_id, submission_key},
  submission::{NewSubmission, Submission, SubmissionKind, SubmissionRecord, filled, title_case},
  timestamp,
};

// ─── Loading ─────────────────────────────────────────────────────────────────

/// One `submission:*` entry as read from the store. `record` holds the read
/// or parse error for values that are not a readable record.
#[derive(Debug, Clone)]
pub struct StoredSubmission {
  pub key:    String,
  pub record: Result<SubmissionRecord, String>,
}

impl StoredSubmission {
  /// The id encoded in the key.
  pub fn id(&self) -> &str { submission_id(&self.key) }
}

/// Fetch every stored submission. Values are fetched concurrently; keys
/// that vanish between listing and reading are skipped.
pub async fn load_submissions<S: KvStore>(store: &S) -> Result<Vec<StoredSubmission>> {
  let keys = store
    .keys(SUBMISSION_PATTERN)
    .await
    .map_err(Error::store)?;

  let values =
    futures::future::join_all(keys.iter().map(|key| store.get(key))).await;

  let loaded = keys
    .into_iter()
    .zip(values)
    .filter_map(|(key, value)| {
      let record = match value {
        Ok(Some(raw)) => SubmissionRecord::parse(&raw).map_err(|e| e.to_string()),
        Ok(None) => return None,
        Err(e) => Err(e.to_string()),
      };
      if let Err(e) = &record {
        tracing::warn!(%key, error = %e, "unreadable submission");
      }
      Some(StoredSubmission { key, record })
    })
    .collect();
  Ok(loaded)
}

// ─── Queries ─────────────────────────────────────────────────────────────────

/// Query parameters for the admin listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionFilter {
  #[serde(rename = "type")]
  pub kind:   Option<SubmissionKind>,
  pub status: Option<SubmissionStatus>,
  /// Case-insensitive substring of the resolved name.
  pub search: Option<String>,
}

impl SubmissionFilter {
  fn matches(&self, record: &SubmissionRecord) -> bool {
    let kind_ok = self
      .kind
      .is_none_or(|k| filled(&record.kind) == Some(k.as_ref()));
    let status_ok = self
      .status
      .is_none_or(|s| record.parsed_status().unwrap_or_default() == s);
    let search_ok = match filled(&self.search) {
      None => true,
      Some(needle) => record
        .resolved_name()
        .is_some_and(|n| n.to_lowercase().contains(&needle.to_lowercase())),
    };
    kind_ok && status_ok && search_ok
  }
}

/// Readable submissions matching `filter`, newest first. Records missing an
/// `id` or `createdAt` get them filled in from the key and `submittedAt`.
pub async fn list_submissions<S: KvStore>(
  store: &S,
  filter: &SubmissionFilter,
) -> Result<Vec<SubmissionRecord>> {
  let mut records: Vec<SubmissionRecord> = load_submissions(store)
    .await?
    .into_iter()
    .filter_map(|stored| {
      let id = stored.id().to_owned();
      let mut record = stored.record.ok()?;
      if filled(&record.id).is_none() {
        record.id = Some(id);
      }
      if filled(&record.created_at).is_none() {
        record.created_at = filled(&record.submitted_at).map(str::to_owned);
      }
      filter.matches(&record).then_some(record)
    })
    .collect();

  // Timestamps share one fixed-width format, so string order is time order.
  records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
  Ok(records)
}

pub async fn get_submission<S: KvStore>(store: &S, id: &str) -> Result<SubmissionRecord> {
  let key = submission_key(id);
  let raw = store
    .get(&key)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(key.clone()))?;
  SubmissionRecord::parse(&raw)
}

// ─── Mutations ───────────────────────────────────────────────────────────────

fn check_language(field: &'static str, value: Option<&str>) -> Result<()> {
  match value {
    Some(text) if contains_profanity(text) => Err(Error::Profanity { field }),
    _ => Ok(()),
  }
}

fn same_name(a: &str, b: &str) -> bool {
  a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Store a new pending submission.
///
/// The name is title-cased, free text is screened for profanity, the record
/// must pass the content rules, and no other submission of the same type may
/// carry the same name. Legacy source values are mapped forward.
pub async fn create_submission<S: KvStore>(
  store: &S,
  input: NewSubmission,
  now: DateTime<Utc>,
) -> Result<SubmissionRecord> {
  let NewSubmission { kind, mut data } = input;
  data.name = filled(&data.name).map(title_case);

  check_language("name", filled(&data.name))?;
  check_language("description", filled(&data.description))?;

  let at = timestamp(now);
  let mut draft = SubmissionRecord {
    id: Some(Uuid::new_v4().to_string()),
    kind: Some(kind.to_string()),
    status: Some(SubmissionStatus::Pending.to_string()),
    data: Some(data),
    submitted_at: Some(at.clone()),
    created_at: Some(at.clone()),
    updated_at: Some(at.clone()),
    ..Default::default()
  };
  migrate_record(&mut draft, &at);
  let submission = Submission::try_from(&draft)?;

  let existing = load_submissions(store).await?;
  let duplicate = existing.iter().filter_map(|s| s.record.as_ref().ok()).any(|r| {
    filled(&r.kind) == Some(kind.as_ref())
      && r.resolved_name().is_some_and(|n| same_name(n, &submission.name))
  });
  if duplicate {
    return Err(Error::Duplicate(format!(
      "A {kind} named '{}' already exists",
      submission.name
    )));
  }

  let record = submission.to_record();
  store
    .set(&submission_key(&submission.id), record.to_json()?)
    .await
    .map_err(Error::store)?;
  tracing::info!(id = %submission.id, %kind, name = %submission.name, "created submission");
  Ok(record)
}

/// Apply an admin decision to a pending submission.
pub async fn decide_submission<S: KvStore>(
  store: &S,
  id: &str,
  next: SubmissionStatus,
  notes: Option<String>,
  now: DateTime<Utc>,
) -> Result<SubmissionRecord> {
  let mut record = get_submission(store, id).await?;
  let current = record.parsed_status().unwrap_or_default();
  let status = current.transition(next)?;

  record.status = Some(status.to_string());
  if notes.is_some() {
    record.notes = notes;
  }
  record.updated_at = Some(timestamp(now));

  store
    .set(&submission_key(id), record.to_json()?)
    .await
    .map_err(Error::store)?;
  tracing::info!(%id, from = %current, to = %status, "decided submission");
  Ok(record)
}

pub async fn delete_submission<S: KvStore>(store: &S, id: &str) -> Result<()> {
  let key = submission_key(id);
  if !store.del(&key).await.map_err(Error::store)? {
    return Err(Error::NotFound(key));
  }
  tracing::info!(%key, "deleted submission");
  Ok(())
}

// ─── Complaints ──────────────────────────────────────────────────────────────

/// Current complaint count; a missing or unreadable counter reads as zero.
pub async fn complaint_count<S: KvStore>(store: &S) -> Result<i64> {
  let raw = store
    .get(COMPLAINT_COUNTER)
    .await
    .map_err(Error::store)?;
  Ok(raw.and_then(|v| v.trim().parse().ok()).unwrap_or(0))
}

pub async fn record_complaint<S: KvStore>(store: &S) -> Result<i64> {
  store.incr(COMPLAINT_COUNTER).await.map_err(Error::store)
}
