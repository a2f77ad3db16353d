//! Submission status and the transitions an admin may apply.
//!
//! A submission starts `pending`. An admin decision moves it to `approved`
//! or `rejected`; deletion removes it entirely. Decided submissions stay
//! decided.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubmissionStatus {
  #[default]
  Pending,
  Approved,
  Rejected,
}

impl SubmissionStatus {
  pub fn is_decided(self) -> bool { !matches!(self, Self::Pending) }

  /// Validate a move from `self` to `next`.
  ///
  /// Only `pending → approved` and `pending → rejected` are allowed.
  /// Re-applying the current decision is accepted as a no-op so that a
  /// retried admin action does not fail.
  pub fn transition(self, next: Self) -> Result<Self> {
    match (self, next) {
      (Self::Pending, Self::Approved | Self::Rejected) => Ok(next),
      (from, to) if from == to && from.is_decided() => Ok(to),
      (from, to) => Err(Error::InvalidTransition { from, to }),
    }
  }
}
