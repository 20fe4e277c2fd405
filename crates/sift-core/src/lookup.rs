//! The `Lookup` trait: where a widget gets its candidates from.
//!
//! Implemented over HTTP by `sift-client::HttpLookup`. Tests implement it
//! with scripted fakes.

use std::future::Future;

use crate::{error::LookupError, record::CandidateRecord};

/// A remote candidate source.
///
/// Futures are `Send` so a driver can run each lookup on its own task.
pub trait Lookup: Send + Sync {
  /// Fetch the candidates matching `query`, in the order the source ranks
  /// them.
  fn lookup<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<Vec<CandidateRecord>, LookupError>> + Send + 'a;
}
