use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{MergeError, Mergeable};

/// Topic description as reported by the server.
///
/// Unlike an [`Envelope`](crate::Envelope), a description carries no identity key of
/// its own: it always describes the topic it was fetched for, so its merge
/// is infallible. Timestamps only move forward and counters only grow;
/// a stale update therefore cannot regress the cached state.
///
/// The `public` and `private` payloads are opaque to this crate (user
/// profiles, app settings). They are adopted whenever the server sends
/// them, and that adoption is not counted as a change, since the server
/// may resend identical payloads that the client has no cheap way to
/// compare.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Description {
    /// When the topic was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// Last update to the topic's metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    /// Last message or metadata activity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub touched: Option<DateTime<Utc>>,
    /// Highest message sequence number in the topic.
    #[serde(default)]
    pub seq: u32,
    /// Highest sequence number the current user reported as read.
    #[serde(default)]
    pub read: u32,
    /// Highest sequence number the current user reported as received.
    #[serde(default)]
    pub recv: u32,
    /// Messages with sequence numbers up to this value are deleted.
    #[serde(default)]
    pub clear: u32,
    /// Application-defined public payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<Value>,
    /// Application-defined per-user payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<Value>,
}

impl Mergeable for Description {
    fn merge(&mut self, other: &Self) -> Result<usize, MergeError> {
        let mut changed = 0;

        if self.created.is_none() && other.created.is_some() {
            self.created = other.created;
            changed += 1;
        }
        if advance(&mut self.updated, other.updated) {
            changed += 1;
        }
        if advance(&mut self.touched, other.touched) {
            changed += 1;
        }
        if other.seq > self.seq {
            self.seq = other.seq;
            changed += 1;
        }
        if other.read > self.read {
            self.read = other.read;
            changed += 1;
        }
        if other.recv > self.recv {
            self.recv = other.recv;
            changed += 1;
        }
        if other.clear > self.clear {
            self.clear = other.clear;
            changed += 1;
        }
        if other.public.is_some() {
            self.public = other.public.clone();
        }
        if other.private.is_some() {
            self.private = other.private.clone();
        }
        Ok(changed)
    }
}

/// Move `slot` forward to `incoming` when the incoming time is later.
pub(crate) fn advance(slot: &mut Option<DateTime<Utc>>, incoming: Option<DateTime<Utc>>) -> bool {
    match (slot.as_ref(), incoming) {
        (_, None) => false,
        (Some(current), Some(theirs)) if theirs <= *current => false,
        (_, theirs) => {
            *slot = theirs;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(s: &str) -> Option<DateTime<Utc>> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn merge_of_identical_descriptions_changes_nothing() {
        let mut a = Description {
            created: at("2024-01-01T00:00:00Z"),
            updated: at("2024-05-01T00:00:00Z"),
            seq: 10,
            read: 8,
            ..Description::default()
        };
        let b = a.clone();
        assert_eq!(a.merge(&b), Ok(0));
        assert_eq!(a, b);
    }

    #[test]
    fn created_fills_once_and_never_changes() {
        let mut d = Description::default();
        let first = Description {
            created: at("2024-01-01T00:00:00Z"),
            ..Description::default()
        };
        assert_eq!(d.merge(&first), Ok(1));

        let second = Description {
            created: at("2024-02-01T00:00:00Z"),
            ..Description::default()
        };
        assert_eq!(d.merge(&second), Ok(0));
        assert_eq!(d.created, at("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn timestamps_only_move_forward() {
        let mut d = Description {
            updated: at("2024-05-02T00:00:00Z"),
            touched: at("2024-05-02T00:00:00Z"),
            ..Description::default()
        };
        let stale = Description {
            updated: at("2024-05-01T00:00:00Z"),
            touched: at("2024-05-03T00:00:00Z"),
            ..Description::default()
        };

        assert_eq!(d.merge(&stale), Ok(1));
        assert_eq!(d.updated, at("2024-05-02T00:00:00Z"));
        assert_eq!(d.touched, at("2024-05-03T00:00:00Z"));
    }

    #[test]
    fn counters_are_monotone() {
        let mut d = Description {
            seq: 10,
            read: 8,
            recv: 9,
            clear: 2,
            ..Description::default()
        };
        let update = Description {
            seq: 12,
            read: 5, // stale read marker must not regress
            recv: 12,
            clear: 2,
            ..Description::default()
        };

        assert_eq!(d.merge(&update), Ok(2));
        assert_eq!((d.seq, d.read, d.recv, d.clear), (12, 8, 12, 2));
    }

    #[test]
    fn payloads_are_adopted_without_counting() {
        let mut d = Description::default();
        let update = Description {
            public: Some(json!({"fn": "Group One"})),
            ..Description::default()
        };

        assert_eq!(d.merge(&update), Ok(0));
        assert_eq!(d.public, Some(json!({"fn": "Group One"})));
    }

    #[test]
    fn absent_payload_does_not_clear_cached_one() {
        let mut d = Description {
            private: Some(json!({"comment": "keep me"})),
            ..Description::default()
        };
        assert_eq!(d.merge(&Description::default()), Ok(0));
        assert!(d.private.is_some());
    }
}
