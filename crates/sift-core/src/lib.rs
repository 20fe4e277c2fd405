//! Core types for the `sift` search-select widget.
//!
//! This crate is deliberately free of HTTP and runtime dependencies. It holds
//! the candidate record model, widget configuration, the lookup error
//! taxonomy, the [`SearchSelect`] state machine and the view tree it renders
//! to. Hosts (`sift-client`'s driver, `sift-tui`) feed it events and draw its
//! [`View`].

// Native `async fn` in traits; the `Send` bound is spelled out on `Lookup`.
#![allow(async_fn_in_trait)]

pub mod config;
pub mod error;
pub mod lookup;
pub mod record;
pub mod view;
pub mod widget;

pub use config::WidgetConfig;
pub use error::{Error, LookupError, Result};
pub use lookup::Lookup;
pub use record::{CandidateRecord, RecordId, UsersResponse};
pub use view::View;
pub use widget::{Completion, InputOutcome, Notification, Phase, SearchSelect, Ticket};
