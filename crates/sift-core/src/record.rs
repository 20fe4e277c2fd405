//! Candidate records returned by the remote lookup.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier of a candidate. Lookup endpoints send either a JSON
/// number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
  Int(i64),
  Str(String),
}

impl fmt::Display for RecordId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Int(n) => write!(f, "{n}"),
      Self::Str(s) => f.write_str(s),
    }
  }
}

impl From<i64> for RecordId {
  fn from(n: i64) -> Self { Self::Int(n) }
}

/// One selectable user. Read-only once decoded; unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
  pub id:           RecordId,
  #[serde(default)]
  pub first_name:   String,
  #[serde(default)]
  pub last_name:    String,
  #[serde(default)]
  pub phone_number: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:        Option<String>,
}

impl CandidateRecord {
  /// `"First Last"`, skipping empty parts.
  pub fn display_name(&self) -> String {
    [self.first_name.trim(), self.last_name.trim()]
      .into_iter()
      .filter(|s| !s.is_empty())
      .collect::<Vec<_>>()
      .join(" ")
  }

  /// Two uppercase characters: the first letter of each name part. With only
  /// one part present, its first two letters; with none, `"?"`.
  pub fn initials(&self) -> String {
    let first = self.first_name.trim();
    let last = self.last_name.trim();
    let picked: Vec<char> = match (first.chars().next(), last.chars().next()) {
      (Some(a), Some(b)) => vec![a, b],
      (Some(_), None) => first.chars().take(2).collect(),
      (None, Some(_)) => last.chars().take(2).collect(),
      (None, None) => return "?".into(),
    };
    picked.into_iter().flat_map(char::to_uppercase).collect()
  }
}

/// Response body of `GET <endpoint>?q=<query>`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsersResponse {
  #[serde(default)]
  pub users: Vec<CandidateRecord>,
}
