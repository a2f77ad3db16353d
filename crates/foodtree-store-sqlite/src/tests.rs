//! Integration tests for `SqliteStore` against an in-memory database,
//! including the core passes run end to end.

use chrono::{TimeZone as _, Utc};
use foodtree_core::{
  Error as CoreError,
  check::check_submissions,
  cleanup::cleanup_submissions,
  ingredient::{NewIngredient, create_ingredient, list_ingredients},
  lifecycle::SubmissionStatus,
  migrate::migrate_sources,
  repo::{
    SubmissionFilter, complaint_count, create_submission, decide_submission,
    delete_submission, get_submission, list_submissions, record_complaint,
  },
  reset::reset_submissions,
  store::KvStore,
  submission::{NewSubmission, SubmissionRecord},
};
use serde_json::{Value, json};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn put(s: &SqliteStore, key: &str, v: Value) {
  s.set(key, v.to_string()).await.unwrap();
}

async fn read(s: &SqliteStore, key: &str) -> Value {
  let raw = s.get(key).await.unwrap().expect("key present");
  serde_json::from_str(&raw).unwrap()
}

async fn snapshot(s: &SqliteStore) -> Vec<(String, Option<String>)> {
  let mut out = Vec::new();
  for key in s.keys("*").await.unwrap() {
    let value = s.get(&key).await.unwrap();
    out.push((key, value));
  }
  out
}

fn new_submission(v: Value) -> NewSubmission { serde_json::from_value(v).unwrap() }

fn now() -> chrono::DateTime<Utc> { Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() }

// ─── Key-value semantics ─────────────────────────────────────────────────────

#[tokio::test]
async fn set_overwrites_and_get_reads_back() {
  let s = store().await;
  assert_eq!(s.get("a").await.unwrap(), None);
  s.set("a", "1".into()).await.unwrap();
  s.set("a", "2".into()).await.unwrap();
  assert_eq!(s.get("a").await.unwrap().as_deref(), Some("2"));
}

#[tokio::test]
async fn del_reports_existence() {
  let s = store().await;
  s.set("a", "1".into()).await.unwrap();
  assert!(s.del("a").await.unwrap());
  assert!(!s.del("a").await.unwrap());
  assert_eq!(s.get("a").await.unwrap(), None);
}

#[tokio::test]
async fn keys_match_glob_pattern() {
  let s = store().await;
  for key in ["submission:1", "submission:2", "ingredient:1", "complaint_counter"] {
    s.set(key, "{}".into()).await.unwrap();
  }
  assert_eq!(
    s.keys("submission:*").await.unwrap(),
    vec!["submission:1".to_owned(), "submission:2".to_owned()]
  );
  assert_eq!(s.keys("ingredient:?").await.unwrap(), vec!["ingredient:1".to_owned()]);
  assert_eq!(s.keys("*").await.unwrap().len(), 4);
}

#[tokio::test]
async fn incr_starts_at_one() {
  let s = store().await;
  assert_eq!(s.incr("n").await.unwrap(), 1);
  assert_eq!(s.incr("n").await.unwrap(), 2);
  assert_eq!(s.get("n").await.unwrap().as_deref(), Some("2"));
}

#[tokio::test]
async fn incr_rejects_non_integer() {
  let s = store().await;
  s.set("n", "\"abc\"".into()).await.unwrap();
  assert!(matches!(s.incr("n").await, Err(crate::Error::NotAnInteger(_))));
  assert_eq!(s.get("n").await.unwrap().as_deref(), Some("\"abc\""));
}

// ─── Validation pass ─────────────────────────────────────────────────────────

#[tokio::test]
async fn check_reports_missing_name_without_writing() {
  let s = store().await;
  put(&s, "submission:1", json!({ "id": "1", "data": { "source": "plant" } })).await;
  let before = snapshot(&s).await;

  let report = check_submissions(&s).await.unwrap();
  assert_eq!(report.details, vec!["Unnamed Submission (1): Missing name".to_owned()]);
  assert_eq!(report.issues, 1);
  assert_eq!(snapshot(&s).await, before);
}

#[tokio::test]
async fn check_reports_invalid_source() {
  let s = store().await;
  put(&s, "submission:1", json!({ "id": "1", "data": { "name": "Salt", "source": "mineral" } }))
    .await;
  let report = check_submissions(&s).await.unwrap();
  assert_eq!(
    report.details,
    vec!["Salt (1): Invalid source 'mineral'. Must be one of: plant, animal, other, prepared"
      .to_owned()]
  );
}

#[tokio::test]
async fn check_survives_unreadable_values() {
  let s = store().await;
  s.set("submission:bad", "not json".into()).await.unwrap();
  put(&s, "submission:ok", json!({ "id": "ok", "data": { "name": "Basil", "source": "plant" } }))
    .await;

  let report = check_submissions(&s).await.unwrap();
  assert_eq!(report.total, 2);
  assert_eq!(report.valid, 1);
  assert_eq!(report.issues, 1);
  assert!(report.details[0].starts_with("Unnamed Submission (bad): Unreadable record"));
}

// ─── Normalization pass ──────────────────────────────────────────────────────

#[tokio::test]
async fn cleanup_twice_is_stable() {
  let s = store().await;
  put(
    &s,
    "submission:1",
    json!({ "id": "1", "type": "ingredient", "name": "Milk", "source": "animal",
            "data": { "animalType": "cow", "parentIngredients": "cow" } }),
  )
  .await;
  put(&s, "submission:2", json!({ "id": "2", "data": { "name": "Basil", "source": "plant" } }))
    .await;

  let first = cleanup_submissions(&s, now()).await.unwrap();
  assert_eq!(first.total, 2);
  assert_eq!(first.updated, 2);
  assert!(first.errors.is_empty());
  let once = read(&s, "submission:1").await;

  cleanup_submissions(&s, now() + chrono::Duration::hours(1)).await.unwrap();
  let twice = read(&s, "submission:1").await;

  assert_eq!(once["data"], twice["data"]);
  assert_eq!(once["status"], twice["status"]);
  assert_ne!(once["updatedAt"], twice["updatedAt"]);
  assert_eq!(once["data"]["name"], "Milk");
  assert_eq!(once["data"]["source"], "animal");
  assert_eq!(once["data"]["parentIngredients"], json!([]));
}

#[tokio::test]
async fn cleanup_skips_unreadable_and_continues() {
  let s = store().await;
  s.set("submission:bad", "{".into()).await.unwrap();
  put(&s, "submission:ok", json!({ "data": { "name": "Basil", "source": "plant" } })).await;

  let report = cleanup_submissions(&s, now()).await.unwrap();
  assert_eq!(report.updated, 1);
  assert_eq!(report.errors.len(), 1);
  assert_eq!(s.get("submission:bad").await.unwrap().as_deref(), Some("{"));
}

// ─── Migration ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn migrate_maps_legacy_sources_and_counts_unchanged() {
  let s = store().await;
  put(&s, "submission:g", json!({ "id": "g", "data": { "name": "Apple", "source": "grown" } }))
    .await;
  put(&s, "submission:h", json!({ "id": "h", "data": { "name": "Berry", "source": "gathered" } }))
    .await;
  put(&s, "submission:p", json!({ "id": "p", "data": { "name": "Jam", "source": "prepared" },
                                  "reviewer": "kept" }))
    .await;
  put(&s, "submission:c", json!({ "id": "c", "data": { "name": "Milk", "source": "animal" } }))
    .await;
  let current_before = s.get("submission:c").await.unwrap();

  let report = migrate_sources(&s, now()).await.unwrap();
  assert!(report.success);
  assert_eq!(report.total, 4);
  assert_eq!(report.updated, 3);
  assert_eq!(report.unchanged, 1);
  assert_eq!(report.message, "Migration complete. Updated 3 of 4 submissions.");

  let g = read(&s, "submission:g").await;
  assert_eq!(g["data"]["source"], "plant");
  assert_eq!(g["data"]["previousSource"], "grown");
  assert_eq!(g["updatedAt"], "2024-06-01T12:00:00.000Z");
  assert_eq!(read(&s, "submission:h").await["data"]["source"], "plant");

  let p = read(&s, "submission:p").await;
  assert_eq!(p["data"]["source"], "other");
  assert_eq!(p["data"]["previousSource"], "prepared");
  assert_eq!(p["reviewer"], "kept");

  assert_eq!(s.get("submission:c").await.unwrap(), current_before);

  let again = migrate_sources(&s, now()).await.unwrap();
  assert_eq!(again.updated, 0);
  assert_eq!(again.unchanged, 4);
}

// ─── Submissions ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_stores_pending_title_cased_record() {
  let s = store().await;
  let created = create_submission(
    &s,
    new_submission(json!({
      "type": "ingredient",
      "data": { "name": "olive OIL", "source": "plant", "submittedBy": "someone" }
    })),
    now(),
  )
  .await
  .unwrap();

  let id = created.id.clone().unwrap();
  let stored = get_submission(&s, &id).await.unwrap();
  assert_eq!(stored, created);
  assert_eq!(stored.status.as_deref(), Some("pending"));
  assert_eq!(stored.resolved_name(), Some("Olive Oil"));
  assert_eq!(
    stored.data.unwrap().submitted_by.as_deref(),
    Some(foodtree_core::SITE_AUTHOR)
  );
  assert_eq!(stored.created_at.as_deref(), Some("2024-06-01T12:00:00.000Z"));
}

#[tokio::test]
async fn create_maps_legacy_source_forward() {
  let s = store().await;
  let created = create_submission(
    &s,
    new_submission(json!({ "type": "ingredient", "data": { "name": "Apple", "source": "grown" } })),
    now(),
  )
  .await
  .unwrap();
  let data = created.data.unwrap();
  assert_eq!(data.source.as_deref(), Some("plant"));
  assert_eq!(data.previous_source.as_deref(), Some("grown"));
}

#[tokio::test]
async fn create_requires_parents_for_legacy_prepared_source() {
  let s = store().await;
  let bare = create_submission(
    &s,
    new_submission(json!({ "type": "ingredient", "data": { "name": "Jam", "source": "prepared" } })),
    now(),
  )
  .await;
  match bare {
    Err(CoreError::Invalid(problems)) => {
      assert!(problems.iter().any(|p| p.contains("parent ingredient")), "{problems:?}");
    }
    other => panic!("expected invalid submission, got {other:?}"),
  }
  assert!(s.keys("*").await.unwrap().is_empty());

  let composed = create_submission(
    &s,
    new_submission(json!({
      "type": "ingredient",
      "data": {
        "name": "Jam",
        "source": "prepared",
        "preparationMethod": "boiled",
        "parentIngredients": ["strawberry"]
      }
    })),
    now(),
  )
  .await
  .unwrap();
  let data = composed.data.unwrap();
  assert_eq!(data.source.as_deref(), Some("other"));
  assert_eq!(data.previous_source.as_deref(), Some("prepared"));

  let report = check_submissions(&s).await.unwrap();
  assert_eq!(report.valid, 1);
  assert!(report.details.is_empty(), "{:?}", report.details);
}

#[tokio::test]
async fn check_flags_migrated_prepared_record_without_parents() {
  let s = store().await;
  put(&s, "submission:p", json!({ "id": "p", "data": { "name": "Jam", "source": "prepared" } }))
    .await;
  migrate_sources(&s, now()).await.unwrap();

  let report = check_submissions(&s).await.unwrap();
  assert_eq!(report.valid, 0);
  assert!(
    report.details.iter().any(|d| d.contains("parent ingredient")),
    "{:?}",
    report.details
  );
}

#[tokio::test]
async fn create_rejects_invalid_profane_and_duplicate() {
  let s = store().await;

  let invalid = create_submission(
    &s,
    new_submission(json!({ "type": "ingredient", "data": { "name": "Salt" } })),
    now(),
  )
  .await;
  assert!(matches!(invalid, Err(CoreError::Invalid(_))));

  let profane = create_submission(
    &s,
    new_submission(json!({ "type": "ingredient", "data": { "name": "Shit", "source": "plant" } })),
    now(),
  )
  .await;
  assert!(matches!(profane, Err(CoreError::Profanity { field: "name" })));
  assert!(s.keys("*").await.unwrap().is_empty());

  let basil = json!({ "type": "ingredient", "data": { "name": "Basil", "source": "plant" } });
  create_submission(&s, new_submission(basil), now()).await.unwrap();
  let dup = create_submission(
    &s,
    new_submission(json!({ "type": "ingredient", "data": { "name": " BASIL ", "source": "plant" } })),
    now(),
  )
  .await;
  assert!(matches!(dup, Err(CoreError::Duplicate(_))));

  // Same name under a different type is allowed.
  create_submission(
    &s,
    new_submission(json!({ "type": "dish", "data": { "name": "Basil", "source": "plant" } })),
    now(),
  )
  .await
  .unwrap();
  assert_eq!(s.keys("submission:*").await.unwrap().len(), 2);
}

#[tokio::test]
async fn list_filters_and_sorts_newest_first() {
  let s = store().await;
  put(&s, "submission:old", json!({ "type": "ingredient", "status": "approved",
    "createdAt": "2024-01-01T00:00:00.000Z", "data": { "name": "Basil" } }))
    .await;
  put(&s, "submission:new", json!({ "id": "new", "type": "ingredient",
    "submittedAt": "2024-03-01T00:00:00.000Z", "data": { "name": "Sweet Basil" } }))
    .await;
  put(&s, "submission:dish", json!({ "id": "dish", "type": "dish",
    "createdAt": "2024-02-01T00:00:00.000Z", "data": { "name": "Pesto" } }))
    .await;

  let all = list_submissions(&s, &SubmissionFilter::default()).await.unwrap();
  let ids: Vec<_> = all.iter().map(|r| r.id.clone().unwrap()).collect();
  assert_eq!(ids, ["new", "dish", "old"]);
  assert_eq!(all[0].created_at.as_deref(), Some("2024-03-01T00:00:00.000Z"));

  let filter: SubmissionFilter =
    serde_json::from_value(json!({ "type": "ingredient", "search": "BASIL" })).unwrap();
  assert_eq!(list_submissions(&s, &filter).await.unwrap().len(), 2);

  let pending = SubmissionFilter {
    status: Some(SubmissionStatus::Pending),
    ..Default::default()
  };
  let pending = list_submissions(&s, &pending).await.unwrap();
  assert_eq!(pending.len(), 2);
}

#[tokio::test]
async fn decide_moves_pending_once() {
  let s = store().await;
  put(&s, "submission:1", json!({ "id": "1", "status": "pending", "data": { "name": "Basil" } }))
    .await;

  let approved =
    decide_submission(&s, "1", SubmissionStatus::Approved, Some("looks good".into()), now())
      .await
      .unwrap();
  assert_eq!(approved.status.as_deref(), Some("approved"));
  assert_eq!(approved.notes.as_deref(), Some("looks good"));

  let flip = decide_submission(&s, "1", SubmissionStatus::Rejected, None, now()).await;
  assert!(matches!(flip, Err(CoreError::InvalidTransition { .. })));
  assert_eq!(read(&s, "submission:1").await["status"], "approved");

  let missing = decide_submission(&s, "nope", SubmissionStatus::Approved, None, now()).await;
  assert!(matches!(missing, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn delete_accepts_prefixed_ids_and_reports_missing() {
  let s = store().await;
  put(&s, "submission:1", json!({ "id": "1" })).await;
  put(&s, "submission:2", json!({ "id": "2" })).await;

  delete_submission(&s, "1").await.unwrap();
  delete_submission(&s, "submission:2").await.unwrap();
  assert!(s.keys("*").await.unwrap().is_empty());

  let missing = delete_submission(&s, "1").await;
  assert!(matches!(missing, Err(CoreError::NotFound(_))));
}

// ─── Reset ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reset_replaces_all_submissions() {
  let s = store().await;
  for i in 0..150 {
    put(&s, &format!("submission:{i:03}"), json!({ "id": i })).await;
  }
  s.set("complaint_counter", "3".into()).await.unwrap();

  let report = reset_submissions(
    &s,
    vec![
      json!({ "id": "a", "type": "ingredient", "data": { "name": "Basil" } }),
      json!({ "id": "b", "data": { "name": "Nope" } }),
    ],
  )
  .await
  .unwrap();

  assert_eq!(report.deleted, 150);
  assert_eq!(report.written, 1);
  assert_eq!(report.skipped, 1);
  assert_eq!(s.keys("submission:*").await.unwrap(), vec!["submission:a".to_owned()]);
  assert_eq!(s.get("complaint_counter").await.unwrap().as_deref(), Some("3"));
}

// ─── Ingredients and complaints ──────────────────────────────────────────────

#[tokio::test]
async fn ingredients_fall_back_to_submissions() {
  let s = store().await;
  put(&s, "submission:1", json!({ "id": "1", "type": "ingredient",
    "data": { "name": "Tomato", "source": "plant" } }))
    .await;
  put(&s, "submission:2", json!({ "id": "2", "name": "Root Only" })).await;

  let listed = list_ingredients(&s, None).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].name, "Tomato");

  let created = create_ingredient(
    &s,
    NewIngredient {
      name: "garlic".into(),
      ..Default::default()
    },
    now(),
  )
  .await
  .unwrap();
  assert_eq!(created.name, "Garlic");

  let catalogue = list_ingredients(&s, Some("GAR")).await.unwrap();
  assert_eq!(catalogue, vec![created]);
  assert!(list_ingredients(&s, Some("tomato")).await.unwrap().is_empty());
}

#[tokio::test]
async fn complaint_counter_counts() {
  let s = store().await;
  assert_eq!(complaint_count(&s).await.unwrap(), 0);
  assert_eq!(record_complaint(&s).await.unwrap(), 1);
  assert_eq!(record_complaint(&s).await.unwrap(), 2);
  assert_eq!(complaint_count(&s).await.unwrap(), 2);
}

#[tokio::test]
async fn stored_records_keep_unknown_fields_through_decisions() {
  let s = store().await;
  put(&s, "submission:1", json!({ "id": "1", "data": { "name": "Basil", "colour": "green" },
                                  "reviewer": "r" }))
    .await;
  decide_submission(&s, "1", SubmissionStatus::Rejected, None, now()).await.unwrap();
  let back: SubmissionRecord =
    SubmissionRecord::parse(&s.get("submission:1").await.unwrap().unwrap()).unwrap();
  assert_eq!(back.extra["reviewer"], "r");
  assert_eq!(back.data.unwrap().extra["colour"], "green");
}
