//! Provenance vocabulary for ingredients.
//!
//! The current vocabulary is [`Source`]. Records written before the
//! vocabulary change carry a [`LegacySource`], which maps forward one way.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Sources accepted by the validation pass. `prepared` is still accepted
/// there because it marks composed items awaiting migration.
pub const CHECKED_SOURCES: [&str; 4] = ["plant", "animal", "other", "prepared"];

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Source {
  Plant,
  Animal,
  Other,
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LegacySource {
  Grown,
  Gathered,
  /// Composed from other ingredients.
  Prepared,
}

impl LegacySource {
  /// `prepared` becomes `other`; everything else was plant matter.
  pub fn forward(self) -> Source {
    match self {
      Self::Prepared => Source::Other,
      Self::Grown | Self::Gathered => Source::Plant,
    }
  }
}

/// A source string as found in a record, in either vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnySource {
  Current(Source),
  Legacy(LegacySource),
}

impl AnySource {
  pub fn parse(s: &str) -> Option<Self> {
    if let Ok(current) = Source::from_str(s) {
      return Some(Self::Current(current));
    }
    LegacySource::from_str(s).ok().map(Self::Legacy)
  }

  /// The current-vocabulary source, mapping legacy values forward.
  pub fn current(self) -> Source {
    match self {
      Self::Current(s) => s,
      Self::Legacy(l) => l.forward(),
    }
  }

  pub fn legacy(self) -> Option<LegacySource> {
    match self {
      Self::Legacy(l) => Some(l),
      Self::Current(_) => None,
    }
  }
}
