//! Submission records: the stored shape and the typed domain model.
//!
//! [`SubmissionRecord`] is what lives under `submission:<id>`. It is loose on
//! purpose: legacy writers put `name`/`source` at the record root, left
//! fields out, or stored non-array `parentIngredients`. Unknown fields are
//! kept in `extra` so that rewrites which only touch one field preserve
//! everything else.
//!
//! [`Submission`] is the typed model. Records are adapted into it with
//! [`Submission::try_from`], which applies the content rules from
//! [`crate::check`] and maps legacy source values forward.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString};

use crate::{
  Error,
  Result,
  SITE_AUTHOR,
  check::record_issues,
  lifecycle::SubmissionStatus,
  source::{AnySource, LegacySource, Source},
  timestamp,
};

// ─── Stored record ───────────────────────────────────────────────────────────

/// Payload object stored under a record's `data` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordData {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:               Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description:        Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source:             Option<String>,
  /// Source value replaced by the legacy migration.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub previous_source:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub preparation_method: Option<String>,
  /// Ingredient ids; legacy records may hold a non-array here.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub parent_ingredients: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub is_source_animal:   Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub animal_type:        Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cooking_method:     Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ingredients:        Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub submitted_by:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub submitted_name:     Option<String>,
  #[serde(flatten)]
  pub extra:              Map<String, Value>,
}

/// A submission as stored in the key-value store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id:           Option<String>,
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub kind:         Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data:         Option<RecordData>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes:        Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub submitted_by: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub submitted_at: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at:   Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_at:   Option<String>,

  // ── Legacy root-level payload fields ────────────────────────────────────
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:               Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source:             Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub preparation_method: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub parent_ingredients: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub is_source_animal:   Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub animal_type:        Option<String>,

  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// A non-empty string, or `None`.
pub(crate) fn filled(v: &Option<String>) -> Option<&str> {
  v.as_deref().filter(|s| !s.is_empty())
}

impl SubmissionRecord {
  pub fn parse(json: &str) -> Result<Self> { Ok(serde_json::from_str(json)?) }

  pub fn to_json(&self) -> Result<String> { Ok(serde_json::to_string(self)?) }

  /// Prefer the `data` field, fall back to the legacy root field.
  fn resolve<'a>(
    &'a self,
    in_data: impl Fn(&'a RecordData) -> &'a Option<String>,
    at_root: &'a Option<String>,
  ) -> Option<&'a str> {
    self
      .data
      .as_ref()
      .and_then(|d| filled(in_data(d)))
      .or_else(|| filled(at_root))
  }

  pub fn resolved_name(&self) -> Option<&str> {
    self.resolve(|d| &d.name, &self.name)
  }

  pub fn resolved_source(&self) -> Option<&str> {
    self.resolve(|d| &d.source, &self.source)
  }

  pub fn resolved_preparation_method(&self) -> Option<&str> {
    self.resolve(|d| &d.preparation_method, &self.preparation_method)
  }

  pub fn resolved_animal_type(&self) -> Option<&str> {
    self.resolve(|d| &d.animal_type, &self.animal_type)
  }

  pub fn resolved_is_source_animal(&self) -> bool {
    self
      .data
      .as_ref()
      .and_then(|d| d.is_source_animal)
      .or(self.is_source_animal)
      .unwrap_or(false)
  }

  /// Parent ingredient entries; a missing or non-array value reads as empty.
  pub fn resolved_parent_ingredients(&self) -> &[Value] {
    fn as_array(v: &Option<Value>) -> Option<&[Value]> {
      match v {
        Some(Value::Array(items)) => Some(items.as_slice()),
        _ => None,
      }
    }
    self
      .data
      .as_ref()
      .and_then(|d| as_array(&d.parent_ingredients))
      .or_else(|| as_array(&self.parent_ingredients))
      .unwrap_or(&[])
  }

  /// The legacy source a migration replaced, if any.
  pub fn previous_source(&self) -> Option<&str> {
    self.data.as_ref().and_then(|d| filled(&d.previous_source))
  }

  /// The stored status, if it is one of the known values.
  pub fn parsed_status(&self) -> Option<SubmissionStatus> {
    filled(&self.status).and_then(|s| s.parse().ok())
  }

  /// Best available creation time: `createdAt`, then `submittedAt`.
  pub fn created_or_submitted(&self) -> Option<&str> {
    filled(&self.created_at).or_else(|| filled(&self.submitted_at))
  }
}

// ─── Typed model ─────────────────────────────────────────────────────────────

/// The kind of entry a submission proposes. Immutable after creation.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubmissionKind {
  Ingredient,
  Dish,
  Other,
}

/// Animal-specific detail for items whose source is [`Source::Animal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Animal {
  /// The item is itself a base animal source (e.g. "Cow").
  Base,
  /// The item comes from an animal (e.g. "Milk" from a cow).
  Derived { animal_type: String },
}

/// Where an item comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
  pub source:             Source,
  /// Set when the item was submitted or stored with a legacy source value.
  pub previous_source:    Option<LegacySource>,
  pub preparation_method: Option<String>,
  pub parent_ingredients: Vec<String>,
  /// Present iff `source` is [`Source::Animal`].
  pub animal:             Option<Animal>,
}

/// Type-specific payload, tagged by [`SubmissionKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
  Ingredient,
  Dish {
    cooking_method: Option<String>,
    /// Ingredient ids used by the dish.
    ingredients:    Vec<String>,
  },
  Other,
}

impl Payload {
  pub fn kind(&self) -> SubmissionKind {
    match self {
      Self::Ingredient => SubmissionKind::Ingredient,
      Self::Dish { .. } => SubmissionKind::Dish,
      Self::Other => SubmissionKind::Other,
    }
  }
}

/// A validated submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
  pub id:           String,
  pub status:       SubmissionStatus,
  pub name:         String,
  pub description:  Option<String>,
  pub provenance:   Provenance,
  pub payload:      Payload,
  pub notes:        Option<String>,
  pub submitted_at: DateTime<Utc>,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

fn string_ids(v: &[Value]) -> Vec<String> {
  v.iter()
    .filter_map(|item| match item {
      Value::String(s) => Some(s.clone()),
      Value::Number(n) => Some(n.to_string()),
      _ => None,
    })
    .collect()
}

fn parse_time(v: Option<&str>) -> Option<DateTime<Utc>> {
  v.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    .map(|dt| dt.with_timezone(&Utc))
}

impl TryFrom<&SubmissionRecord> for Submission {
  type Error = Error;

  fn try_from(record: &SubmissionRecord) -> Result<Self> {
    let mut problems: Vec<String> =
      record_issues(record).iter().map(ToString::to_string).collect();

    let id = filled(&record.id).map(str::to_owned);
    if id.is_none() {
      problems.push("Missing id".to_owned());
    }
    let kind = filled(&record.kind).and_then(|k| k.parse::<SubmissionKind>().ok());
    if kind.is_none() {
      problems.push(format!(
        "Invalid type '{}'. Must be one of: ingredient, dish, other",
        record.kind.as_deref().unwrap_or_default()
      ));
    }
    let status = match filled(&record.status) {
      None => Some(SubmissionStatus::Pending),
      Some(s) => s.parse().ok(),
    };
    if status.is_none() {
      problems.push(format!(
        "Invalid status '{}'",
        record.status.as_deref().unwrap_or_default()
      ));
    }

    let submitted = parse_time(filled(&record.submitted_at));
    let created = parse_time(record.created_or_submitted());
    let updated = parse_time(filled(&record.updated_at));
    let Some(created_at) = created.or(submitted) else {
      problems.push("Missing or unreadable timestamps".to_owned());
      return Err(Error::Invalid(problems));
    };

    // `record_issues` guarantees a name and a known source when it is empty.
    let (Some(id), Some(kind), Some(status), Some(name), Some(source), true) = (
      id,
      kind,
      status,
      record.resolved_name(),
      record.resolved_source().and_then(AnySource::parse),
      problems.is_empty(),
    ) else {
      return Err(Error::Invalid(problems));
    };

    let animal = match source.current() {
      Source::Animal if record.resolved_is_source_animal() => Some(Animal::Base),
      Source::Animal => record
        .resolved_animal_type()
        .map(|t| Animal::Derived { animal_type: t.to_owned() }),
      _ => None,
    };

    let data = record.data.clone().unwrap_or_default();
    let previous_source = source.legacy().or_else(|| {
      filled(&data.previous_source).and_then(|p| p.parse::<LegacySource>().ok())
    });

    let payload = match kind {
      SubmissionKind::Ingredient => Payload::Ingredient,
      SubmissionKind::Dish => Payload::Dish {
        cooking_method: filled(&data.cooking_method).map(str::to_owned),
        ingredients:    match &data.ingredients {
          Some(Value::Array(items)) => string_ids(items),
          _ => Vec::new(),
        },
      },
      SubmissionKind::Other => Payload::Other,
    };

    Ok(Submission {
      id,
      status,
      name: name.to_owned(),
      description: filled(&data.description).map(str::to_owned),
      provenance: Provenance {
        source: source.current(),
        previous_source,
        preparation_method: record.resolved_preparation_method().map(str::to_owned),
        parent_ingredients: string_ids(record.resolved_parent_ingredients()),
        animal,
      },
      payload,
      notes: filled(&record.notes).map(str::to_owned),
      submitted_at: submitted.unwrap_or(created_at),
      created_at,
      updated_at: updated.unwrap_or(created_at),
    })
  }
}

impl Submission {
  pub fn kind(&self) -> SubmissionKind { self.payload.kind() }

  /// The canonical stored shape of this submission.
  pub fn to_record(&self) -> SubmissionRecord {
    let p = &self.provenance;
    let (is_source_animal, animal_type) = match &p.animal {
      Some(Animal::Base) => (Some(true), None),
      Some(Animal::Derived { animal_type }) => (Some(false), Some(animal_type.clone())),
      None => (None, None),
    };
    let (cooking_method, ingredients) = match &self.payload {
      Payload::Dish { cooking_method, ingredients } => (
        cooking_method.clone(),
        Some(Value::Array(ingredients.iter().cloned().map(Value::String).collect())),
      ),
      Payload::Ingredient | Payload::Other => (None, None),
    };

    SubmissionRecord {
      id: Some(self.id.clone()),
      kind: Some(self.kind().to_string()),
      status: Some(self.status.to_string()),
      data: Some(RecordData {
        name: Some(self.name.clone()),
        description: self.description.clone(),
        source: Some(p.source.to_string()),
        previous_source: p.previous_source.map(|s| s.to_string()),
        preparation_method: p.preparation_method.clone(),
        parent_ingredients: Some(Value::Array(
          p.parent_ingredients.iter().cloned().map(Value::String).collect(),
        )),
        is_source_animal,
        animal_type,
        cooking_method,
        ingredients,
        submitted_by: Some(SITE_AUTHOR.to_owned()),
        submitted_name: Some(SITE_AUTHOR.to_owned()),
        extra: Map::new(),
      }),
      notes: self.notes.clone(),
      submitted_at: Some(timestamp(self.submitted_at)),
      created_at: Some(timestamp(self.created_at)),
      updated_at: Some(timestamp(self.updated_at)),
      ..Default::default()
    }
  }
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// Body of a public submission: `{"type": "ingredient", "data": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSubmission {
  #[serde(rename = "type")]
  pub kind: SubmissionKind,
  pub data: RecordData,
}

/// Capitalise the first letter of each space-separated word and lowercase
/// the rest: `"olive OIL"` becomes `"Olive Oil"`.
pub fn title_case(name: &str) -> String {
  name
    .trim()
    .to_lowercase()
    .split(' ')
    .map(|word| {
      let mut chars = word.chars();
      match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
      }
    })
    .collect::<Vec<_>>()
    .join(" ")
}
