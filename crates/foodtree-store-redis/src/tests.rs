//! Tests against a live Redis server. They are ignored by default; run them
//! with `REDIS_URL=redis://127.0.0.1:6379 cargo test -- --ignored`.
//!
//! Every key is namespaced by process id and removed again at the end.

use foodtree_core::store::KvStore;

use crate::RedisStore;

async fn store() -> Option<RedisStore> {
  let url = std::env::var("REDIS_URL").ok()?;
  Some(RedisStore::connect(&url).await.expect("connect to REDIS_URL"))
}

fn namespace(test: &str) -> String {
  format!("foodtree-test:{}:{test}:", std::process::id())
}

#[tokio::test]
#[ignore = "needs a Redis server at REDIS_URL"]
async fn set_get_del_round_trip() {
  let Some(s) = store().await else { return };
  let key = format!("{}a", namespace("kv"));

  assert_eq!(s.get(&key).await.unwrap(), None);
  s.set(&key, "1".into()).await.unwrap();
  s.set(&key, "2".into()).await.unwrap();
  assert_eq!(s.get(&key).await.unwrap().as_deref(), Some("2"));

  assert!(s.del(&key).await.unwrap());
  assert!(!s.del(&key).await.unwrap());
  assert_eq!(s.get(&key).await.unwrap(), None);
}

#[tokio::test]
#[ignore = "needs a Redis server at REDIS_URL"]
async fn keys_match_glob_pattern() {
  let Some(s) = store().await else { return };
  let ns = namespace("keys");
  for k in ["submission:1", "submission:2", "ingredient:1"] {
    s.set(&format!("{ns}{k}"), "{}".into()).await.unwrap();
  }

  let mut found = s.keys(&format!("{ns}submission:*")).await.unwrap();
  found.sort();
  assert_eq!(found, vec![format!("{ns}submission:1"), format!("{ns}submission:2")]);

  for key in s.keys(&format!("{ns}*")).await.unwrap() {
    s.del(&key).await.unwrap();
  }
  assert!(s.keys(&format!("{ns}*")).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "needs a Redis server at REDIS_URL"]
async fn incr_counts_from_zero_and_rejects_text() {
  let Some(s) = store().await else { return };
  let ns = namespace("incr");
  let counter = format!("{ns}complaint_counter");
  let text = format!("{ns}text");

  assert_eq!(s.incr(&counter).await.unwrap(), 1);
  assert_eq!(s.incr(&counter).await.unwrap(), 2);
  assert_eq!(s.get(&counter).await.unwrap().as_deref(), Some("2"));

  s.set(&text, "not a number".into()).await.unwrap();
  assert!(s.incr(&text).await.is_err());

  s.del(&counter).await.unwrap();
  s.del(&text).await.unwrap();
}
