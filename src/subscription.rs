use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::description::advance;
use crate::{LastSeen, MergeError, Mergeable};

/// One user's subscription to a topic.
///
/// Depending on which query produced it, a subscription record describes
/// either a subscriber of a topic (then `user` is set) or a topic the
/// current user is subscribed to (then `topic` is set); both are filled
/// once and kept. Like [`Description`](crate::Description), it has no identity key of
/// its own, so its merge is infallible.
///
/// Counting follows the same pattern as the rest of the crate: counters
/// and identity-ish strings count one unit each, nested [`LastSeen`]
/// counts at most one unit, opaque payloads and presence are adopted
/// without counting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Id of the subscribed user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Name of the subscribed-to topic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Last update to the subscription.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    /// Last message or metadata activity in the topic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub touched: Option<DateTime<Utc>>,
    /// When the subscription was terminated, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<DateTime<Utc>>,
    /// Highest message sequence number in the topic.
    #[serde(default)]
    pub seq: u32,
    /// Highest sequence number reported as read.
    #[serde(default)]
    pub read: u32,
    /// Highest sequence number reported as received.
    #[serde(default)]
    pub recv: u32,
    /// Messages up to this sequence number are deleted.
    #[serde(default)]
    pub clear: u32,
    /// Whether the peer is currently online.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online: Option<bool>,
    /// Application-defined public payload of the user or topic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<Value>,
    /// Application-defined per-user payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<Value>,
    /// When and with which client the peer was last online.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seen: Option<LastSeen>,
}

impl Mergeable for Subscription {
    fn merge(&mut self, other: &Self) -> Result<usize, MergeError> {
        let mut changed = 0;

        if non_empty(&self.user).is_none() {
            if let Some(user) = non_empty(&other.user) {
                self.user = Some(user.to_owned());
                changed += 1;
            }
        }

        // A newer `updated` carries the public payload that was current at
        // that time; adopting both is one logical change.
        if advance(&mut self.updated, other.updated) {
            if other.public.is_some() {
                self.public = other.public.clone();
            }
            changed += 1;
        } else if self.public.is_none() && other.public.is_some() {
            self.public = other.public.clone();
        }
        advance(&mut self.touched, other.touched);

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
        if other.private.is_some() {
            self.private = other.private.clone();
        }
        if other.online.is_some() {
            self.online = other.online;
        }

        if non_empty(&self.topic).is_none() {
            if let Some(topic) = non_empty(&other.topic) {
                self.topic = Some(topic.to_owned());
                changed += 1;
            }
        }
        if other.seq > self.seq {
            self.seq = other.seq;
            changed += 1;
        }

        if let Some(theirs) = &other.seen {
            match &mut self.seen {
                None => {
                    self.seen = Some(theirs.clone());
                    changed += 1;
                }
                Some(mine) => {
                    if mine.merge_changed(theirs)? {
                        changed += 1;
                    }
                }
            }
        }

        Ok(changed)
    }
}

/// Empty strings arrive from older servers where the field is unset.
fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}
