//! The validation pass: a read-only report over every stored submission.
//!
//! Rules are evaluated per record in a fixed order and each failure becomes
//! one line of the report. A record that cannot be read is reported, not
//! raised, so one bad value never hides the rest.

use std::fmt;

use serde::Serialize;

use crate::{
  Result,
  repo::{StoredSubmission, load_submissions},
  source::CHECKED_SOURCES,
  store::KvStore,
  submission::{SubmissionRecord, filled},
};

const UNNAMED: &str = "Unnamed Submission";

// ─── Rules ───────────────────────────────────────────────────────────────────

/// A single content-rule failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
  MissingName,
  MissingSource,
  InvalidSource(String),
  MissingPreparationMethod,
  MissingParentIngredients,
  MissingAnimalType,
  Unreadable(String),
}

impl fmt::Display for Issue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::MissingName => f.write_str("Missing name"),
      Self::MissingSource => f.write_str("Missing source"),
      Self::InvalidSource(s) => write!(
        f,
        "Invalid source '{s}'. Must be one of: {}",
        CHECKED_SOURCES.join(", ")
      ),
      Self::MissingPreparationMethod => {
        f.write_str("Prepared items must have a preparation method")
      }
      Self::MissingParentIngredients => {
        f.write_str("Prepared items must have at least one parent ingredient")
      }
      Self::MissingAnimalType => {
        f.write_str("Animal items must have an animal type if not a source animal")
      }
      Self::Unreadable(e) => write!(f, "Unreadable record ({e})"),
    }
  }
}

/// Every rule `record` fails, in evaluation order.
pub fn record_issues(record: &SubmissionRecord) -> Vec<Issue> {
  let mut issues = Vec::new();

  if record.resolved_name().is_none() {
    issues.push(Issue::MissingName);
  }

  let Some(source) = record.resolved_source() else {
    issues.push(Issue::MissingSource);
    return issues;
  };

  if !CHECKED_SOURCES.contains(&source) {
    issues.push(Issue::InvalidSource(source.to_owned()));
  }

  // A migrated `prepared` record is still composed after moving to `other`.
  let composed = source == "prepared" || record.previous_source() == Some("prepared");
  if composed {
    if record.resolved_preparation_method().is_none() {
      issues.push(Issue::MissingPreparationMethod);
    }
    if record.resolved_parent_ingredients().is_empty() {
      issues.push(Issue::MissingParentIngredients);
    }
  }

  if source == "animal"
    && !record.resolved_is_source_animal()
    && record.resolved_animal_type().is_none()
  {
    issues.push(Issue::MissingAnimalType);
  }

  issues
}

// ─── Report ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
  pub success: bool,
  pub message: String,
  pub total:   usize,
  /// Submissions with no issue.
  pub valid:   usize,
  /// Number of issue lines in `details`.
  pub issues:  usize,
  pub details: Vec<String>,
}

/// Build the report for an already-loaded set of submissions.
///
/// Submissions are checked in key order so the report does not depend on
/// the order the store returned them in.
pub fn check_records(submissions: &[StoredSubmission]) -> CheckReport {
  let mut ordered: Vec<&StoredSubmission> = submissions.iter().collect();
  ordered.sort_by(|a, b| a.key.cmp(&b.key));

  let mut details = Vec::new();
  let mut valid = 0;

  for stored in ordered {
    let (label, issues) = match &stored.record {
      Ok(record) => {
        let id = filled(&record.id).unwrap_or_else(|| stored.id());
        let name = record.resolved_name().unwrap_or(UNNAMED);
        (format!("{name} ({id})"), record_issues(record))
      }
      Err(e) => (
        format!("{UNNAMED} ({})", stored.id()),
        vec![Issue::Unreadable(e.clone())],
      ),
    };

    if issues.is_empty() {
      valid += 1;
    }
    details.extend(issues.iter().map(|issue| format!("{label}: {issue}")));
  }

  let total = submissions.len();
  let issues = details.len();
  let message = if issues == 0 {
    format!("All {total} submissions are valid!")
  } else {
    format!(
      "Found {issues} issue{} in {total} submissions",
      if issues == 1 { "" } else { "s" }
    )
  };

  CheckReport {
    success: issues == 0,
    message,
    total,
    valid,
    issues,
    details,
  }
}

/// Run the validation pass over every `submission:*` key. Never writes.
pub async fn check_submissions<S: KvStore>(store: &S) -> Result<CheckReport> {
  let submissions = load_submissions(store).await?;
  let report = check_records(&submissions);
  tracing::info!(
    total = report.total,
    valid = report.valid,
    issues = report.issues,
    "checked submissions"
  );
  Ok(report)
}
