//! Runtime side of the `sift` search-select widget.
//!
//! - [`HttpLookup`] implements [`sift_core::Lookup`] against a JSON lookup
//!   endpoint with reqwest.
//! - [`Driver`] hosts one [`sift_core::SearchSelect`] on a tokio task: it owns
//!   the debounce and blur-grace timers, runs lookups under a timeout and
//!   publishes views and notifications through a [`Handle`].

pub mod driver;
pub mod error;
pub mod http;

pub use driver::{Command, Driver, Handle};
pub use error::{Error, Result};
pub use http::{Credentials, HttpLookup};
