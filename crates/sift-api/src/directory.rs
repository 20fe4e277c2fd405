//! User directories the lookup endpoint searches.

use std::{cmp::Reverse, convert::Infallible, future::Future, path::Path};

use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use serde::Deserialize;
use sift_core::{CandidateRecord, RecordId, UsersResponse};

use crate::error::LoadError;

/// Abstraction over a searchable user directory.
pub trait Directory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Return at most `limit` users matching `query`, best match first.
  fn search<'a>(
    &'a self,
    query: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<CandidateRecord>, Self::Error>> + Send + 'a;
}

// ─── In-memory directory ─────────────────────────────────────────────────────

/// A directory held entirely in memory.
///
/// A user matches when the query occurs (case-insensitively) in their name,
/// phone number or email. Matches are ranked by fuzzy score against the
/// display name; ties keep directory order.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
  users: Vec<CandidateRecord>,
}

/// Accepted file shapes: a bare array or `{"users": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum DirectoryFile {
  Bare(Vec<CandidateRecord>),
  Wrapped(UsersResponse),
}

impl MemoryDirectory {
  pub fn new(users: Vec<CandidateRecord>) -> Self { Self { users } }

  pub fn from_json(raw: &str) -> Result<Self, LoadError> {
    let users = match serde_json::from_str(raw)? {
      DirectoryFile::Bare(users) => users,
      DirectoryFile::Wrapped(resp) => resp.users,
    };
    Ok(Self::new(users))
  }

  pub fn load(path: &Path) -> Result<Self, LoadError> {
    let raw = std::fs::read_to_string(path)?;
    Self::from_json(&raw)
  }

  /// A handful of users for local runs without a directory file.
  pub fn demo() -> Self {
    let user = |id: i64, first: &str, last: &str, phone: &str, email: Option<&str>| {
      CandidateRecord {
        id:           RecordId::Int(id),
        first_name:   first.into(),
        last_name:    last.into(),
        phone_number: phone.into(),
        email:        email.map(Into::into),
      }
    };
    Self::new(vec![
      user(7, "Ali", "Rezaei", "09121234567", None),
      user(8, "Sara", "Karimi", "09351112233", Some("sara.karimi@example.com")),
      user(9, "Reza", "Alavi", "09197654321", Some("reza@example.com")),
      user(12, "Maryam", "Hosseini", "09012223344", None),
      user(15, "Alice", "Martin", "+33 6 12 34 56 78", Some("alice@example.org")),
    ])
  }

  pub fn len(&self) -> usize { self.users.len() }

  pub fn is_empty(&self) -> bool { self.users.is_empty() }

  fn matches(user: &CandidateRecord, needle: &str) -> bool {
    let fields = [
      user.display_name(),
      user.phone_number.clone(),
      user.email.clone().unwrap_or_default(),
    ];
    fields.iter().any(|f| f.to_lowercase().contains(needle))
  }
}

impl Directory for MemoryDirectory {
  type Error = Infallible;

  async fn search(
    &self,
    query: &str,
    limit: usize,
  ) -> Result<Vec<CandidateRecord>, Self::Error> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
      return Ok(Vec::new());
    }

    let matcher = SkimMatcherV2::default();
    let mut hits: Vec<(i64, &CandidateRecord)> = self
      .users
      .iter()
      .filter(|u| Self::matches(u, &needle))
      .map(|u| {
        let score = matcher.fuzzy_match(&u.display_name(), &needle).unwrap_or(0);
        (score, u)
      })
      .collect();
    hits.sort_by_key(|(score, _)| Reverse(*score));

    Ok(hits.into_iter().take(limit).map(|(_, u)| u.clone()).collect())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ids(users: &[CandidateRecord]) -> Vec<String> {
    users.iter().map(|u| u.id.to_string()).collect()
  }

  #[tokio::test]
  async fn substring_match_across_fields() {
    let dir = MemoryDirectory::demo();
    assert_eq!(ids(&dir.search("0935", 10).await.unwrap()), ["8"]);
    assert_eq!(ids(&dir.search("EXAMPLE.ORG", 10).await.unwrap()), ["15"]);
    assert!(dir.search("nobody", 10).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn blank_query_matches_nothing() {
    let dir = MemoryDirectory::demo();
    assert!(dir.search("   ", 10).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn limit_is_applied() {
    let dir = MemoryDirectory::demo();
    let all = dir.search("a", 10).await.unwrap();
    assert!(all.len() > 2);
    assert_eq!(dir.search("a", 2).await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn only_matching_users_are_ranked() {
    let dir = MemoryDirectory::demo();
    let mut hits = ids(&dir.search("ali", 10).await.unwrap());
    hits.sort();
    assert_eq!(hits, ["15", "7"]);
  }

  #[test]
  fn loads_both_file_shapes() {
    let bare = r#"[{"id": 1, "first_name": "A", "last_name": "B", "phone_number": "1"}]"#;
    let wrapped = r#"{"users": [{"id": "x", "first_name": "C"}]}"#;
    assert_eq!(MemoryDirectory::from_json(bare).unwrap().len(), 1);
    assert_eq!(MemoryDirectory::from_json(wrapped).unwrap().len(), 1);
    assert!(matches!(
      MemoryDirectory::from_json("{\"users\": 3}"),
      Err(LoadError::Json(_))
    ));
  }
}
