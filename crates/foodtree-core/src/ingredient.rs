//! The ingredient catalogue stored under `ingredient:<id>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error,
  Result,
  profanity::contains_profanity,
  repo::load_submissions,
  store::{INGREDIENT_PATTERN, KvStore, ingredient_key},
  submission::{SubmissionRecord, filled, title_case},
  timestamp,
};

const DEFAULT_KIND: &str = "ingredient";

fn default_kind() -> String { DEFAULT_KIND.to_owned() }

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
  pub id:                 String,
  pub name:               String,
  #[serde(rename = "type", default = "default_kind")]
  pub kind:               String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub category:           Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description:        Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub food_type:          Option<String>,
  #[serde(default)]
  pub parent_ingredients: Vec<String>,
  #[serde(default)]
  pub created_at:         String,
  #[serde(default)]
  pub updated_at:         String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIngredient {
  #[serde(default)]
  pub name:               String,
  #[serde(rename = "type", default)]
  pub kind:               Option<String>,
  #[serde(default)]
  pub category:           Option<String>,
  #[serde(default)]
  pub description:        Option<String>,
  #[serde(default)]
  pub food_type:          Option<String>,
  #[serde(default)]
  pub parent_ingredients: Vec<String>,
}

/// Catalogue view of a stored submission. Only submissions that carry
/// `data.name` are listed.
fn from_submission(id: &str, record: &SubmissionRecord) -> Option<Ingredient> {
  let data = record.data.as_ref()?;
  let name = filled(&data.name)?;
  let created = record.created_or_submitted().unwrap_or_default();
  Some(Ingredient {
    id:                 filled(&record.id).unwrap_or(id).to_owned(),
    name:               name.to_owned(),
    kind:               filled(&record.kind).unwrap_or(DEFAULT_KIND).to_owned(),
    category:           record.resolved_source().map(str::to_owned),
    description:        filled(&data.description).map(str::to_owned),
    food_type:          None,
    parent_ingredients: record
      .resolved_parent_ingredients()
      .iter()
      .filter_map(|v| v.as_str().map(str::to_owned))
      .collect(),
    created_at:         created.to_owned(),
    updated_at:         filled(&record.updated_at).unwrap_or(created).to_owned(),
  })
}

async fn load_catalogue<S: KvStore>(store: &S) -> Result<Vec<Ingredient>> {
  let keys = store
    .keys(INGREDIENT_PATTERN)
    .await
    .map_err(Error::store)?;
  let values =
    futures::future::join_all(keys.iter().map(|key| store.get(key))).await;

  let mut items = Vec::with_capacity(keys.len());
  for (key, value) in keys.iter().zip(values) {
    let Some(raw) = value.map_err(Error::store)? else {
      continue;
    };
    match serde_json::from_str::<Ingredient>(&raw) {
      Ok(item) => items.push(item),
      Err(e) => tracing::warn!(%key, error = %e, "skipping unreadable ingredient"),
    }
  }
  Ok(items)
}

/// Catalogue entries sorted by name, optionally filtered by a
/// case-insensitive name substring. An empty catalogue falls back to the
/// named submissions.
pub async fn list_ingredients<S: KvStore>(
  store: &S,
  search: Option<&str>,
) -> Result<Vec<Ingredient>> {
  let mut items = load_catalogue(store).await?;
  if items.is_empty() {
    tracing::debug!("ingredient catalogue empty, listing submissions");
    items = load_submissions(store)
      .await?
      .iter()
      .filter_map(|s| from_submission(s.id(), s.record.as_ref().ok()?))
      .collect();
  }

  if let Some(needle) = search.map(str::trim).filter(|s| !s.is_empty()) {
    let needle = needle.to_lowercase();
    items.retain(|i| i.name.to_lowercase().contains(&needle));
  }
  items.sort_by(|a, b| a.name.cmp(&b.name));
  Ok(items)
}

pub async fn create_ingredient<S: KvStore>(
  store: &S,
  input: NewIngredient,
  now: DateTime<Utc>,
) -> Result<Ingredient> {
  let name = title_case(&input.name);
  if name.is_empty() {
    return Err(Error::Invalid(vec!["Missing name".to_owned()]));
  }
  if contains_profanity(&name) {
    return Err(Error::Profanity { field: "name" });
  }
  let description = filled(&input.description).map(str::to_owned);
  if description.as_deref().is_some_and(contains_profanity) {
    return Err(Error::Profanity { field: "description" });
  }

  let at = timestamp(now);
  let item = Ingredient {
    id: Uuid::new_v4().to_string(),
    name,
    kind: filled(&input.kind).unwrap_or(DEFAULT_KIND).to_owned(),
    category: filled(&input.category).map(str::to_owned),
    description,
    food_type: filled(&input.food_type).map(str::to_owned),
    parent_ingredients: input.parent_ingredients,
    created_at: at.clone(),
    updated_at: at,
  };

  store
    .set(&ingredient_key(&item.id), serde_json::to_string(&item)?)
    .await
    .map_err(Error::store)?;
  tracing::info!(id = %item.id, name = %item.name, "created ingredient");
  Ok(item)
}
