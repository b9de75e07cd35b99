//! # merge-kit
//!
//! Field-by-field reconciliation of server-pushed records for messaging
//! clients.
//!
//! A chat client keeps a local cache of messages, topic descriptions, and
//! subscriptions, and receives incremental updates for them over a
//! persistent connection. Each update is a partial record: fields the
//! server has news about are set, everything else is absent. The
//! [`Mergeable`] trait reconciles such an update into the cached record in
//! place and reports how many fields changed, so the storage layer knows
//! whether to persist and the UI whether to redraw.
//!
//! ## Quick Start
//!
//! ```
//! use merge_kit::prelude::*;
//! use serde_json::json;
//!
//! let mut cached = Envelope {
//!     id: None,
//!     topic: "grp1".into(),
//!     head: Headers::new(),
//!     from: Some("usrA".into()),
//!     ts: "2024-05-01T10:00:00Z".parse().unwrap(),
//!     seq: 5,
//!     content: json!("hello"),
//! };
//!
//! // The server acknowledges the message and assigns it an id.
//! let mut update = cached.clone();
//! update.id = Some("inFnXY-42".into());
//!
//! assert_eq!(cached.merge(&update), Ok(1));
//! assert_eq!(cached.id.as_deref(), Some("inFnXY-42"));
//! ```
//!
//! ## Record types
//!
//! - [`Envelope`] - one server-pushed message, keyed by `(topic, seq)`
//! - [`Description`] - topic metadata with forward-only timestamps and
//!   monotone counters
//! - [`Subscription`] - a user's subscription to a topic, with nested
//!   [`LastSeen`] presence info
//! - [`Replace`] - wraps any plain value with full-replace merge semantics
//!
//! Supporting types: [`Headers`] with default-safe typed reads over
//! loosely-typed server headers, and [`Pair`] as a minimal two-slot
//! holder.
//!
//! ## The `Mergeable` trait
//!
//! All record types implement [`Mergeable`]. Merging is directional (the
//! receiver is mutated, the argument only read), skips absent fields, and
//! refuses to combine records with different identity keys with
//! [`MergeError::IdentityMismatch`].

mod description;
mod envelope;
mod header;
mod last_seen;
mod mergeable;
mod pair;
mod subscription;

pub mod prelude;

pub use description::Description;
pub use envelope::{CallState, Envelope};
pub use header::{HeaderValue, Headers};
pub use last_seen::LastSeen;
pub use mergeable::{MergeError, Mergeable, Replace};
pub use pair::Pair;
pub use subscription::Subscription;
