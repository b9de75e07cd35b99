use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Headers, MergeError, Mergeable};

/// One message record pushed by the server, keyed by `(topic, seq)`.
///
/// The decoder collaborator produces an `Envelope` per server push; the
/// client reconciles it against its cached copy with [`Mergeable::merge`]
/// and hands the result to storage and the UI together with the change
/// count.
///
/// `seq` is assigned by the server and strictly increases within a topic;
/// `seq == 0` marks a local draft that has not been acknowledged yet. `id`
/// is a transport-layer correlation key that arrives asynchronously after
/// the send is acknowledged, so it starts out unset.
///
/// # Example
///
/// ```
/// use merge_kit::prelude::*;
///
/// let mut cached: Envelope = serde_json::from_str(
///     r#"{"topic":"grp1","from":"usrA","ts":"2024-05-01T10:00:00Z","seq":5,
///         "head":{"replace":1},"content":"hello"}"#,
/// ).unwrap();
///
/// let mut incoming = cached.clone();
/// incoming.head.insert("attachment", 2);
///
/// assert_eq!(cached.merge(&incoming), Ok(1));
/// assert_eq!(cached.head.int_or("attachment", -1), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Server-assigned message id, unset until acknowledged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Topic the message belongs to.
    pub topic: String,
    /// Message headers; the wire omits the field for most messages.
    #[serde(default, skip_serializing_if = "Headers::is_empty")]
    pub head: Headers,
    /// Sender id, unset for messages generated by the server itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Server timestamp.
    pub ts: DateTime<Utc>,
    /// Sequence number within the topic; 0 for unacknowledged drafts.
    #[serde(default)]
    pub seq: u32,
    /// Opaque rich-content payload, parsed by a collaborator.
    pub content: Value,
}

impl Envelope {
    /// True while the message is a local draft the server has not numbered.
    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.seq == 0
    }

    /// Raw header lookup; an unset map reads as empty.
    #[must_use]
    pub fn header(&self, key: &str) -> Option<&crate::HeaderValue> {
        self.head.get(key)
    }

    /// Integer header, or `default` when absent or of another kind.
    #[must_use]
    pub fn int_header(&self, key: &str, default: i64) -> i64 {
        self.head.int_or(key, default)
    }

    /// String header, or `None` when absent or of another kind.
    #[must_use]
    pub fn string_header(&self, key: &str) -> Option<&str> {
        self.head.get(key).and_then(crate::HeaderValue::as_str)
    }

    /// Boolean header, defaulting to `false`.
    #[must_use]
    pub fn bool_header(&self, key: &str) -> bool {
        self.head.bool_or(key, false)
    }

    /// State of the call this message describes, from the `"webrtc"`
    /// header. [`CallState::Unknown`] when the header is missing or
    /// unrecognized.
    #[must_use]
    pub fn call_state(&self) -> CallState {
        self.string_header("webrtc").map_or(CallState::Unknown, CallState::parse)
    }

    fn identity(&self) -> String {
        format!("{}:{}", self.topic, self.seq)
    }
}

impl Mergeable for Envelope {
    /// Field order: `id`, `head`, `from`, `ts`, `content`.
    ///
    /// The header sub-merge is key-wise and contributes at most one unit to
    /// the change count no matter how many keys it updates.
    fn merge(&mut self, other: &Self) -> Result<usize, MergeError> {
        if self.topic != other.topic || self.seq != other.seq {
            return Err(MergeError::IdentityMismatch {
                expected: self.identity(),
                found: other.identity(),
            });
        }

        let mut changed = 0;
        if let Some(id) = &other.id {
            if self.id.as_deref() != Some(id) {
                self.id = Some(id.clone());
                changed += 1;
            }
        }
        if self.head.merge_from(&other.head) {
            changed += 1;
        }
        if let Some(from) = &other.from {
            if self.from.as_deref() != Some(from) {
                self.from = Some(from.clone());
                changed += 1;
            }
        }
        if self.ts != other.ts {
            self.ts = other.ts;
            changed += 1;
        }
        if self.content != other.content {
            self.content = other.content.clone();
            changed += 1;
        }
        Ok(changed)
    }
}

/// State of a voice/video call carried in the `"webrtc"` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallState {
    /// Call answered by the callee.
    Accepted,
    /// Callee is in another call.
    Busy,
    /// Call rejected by the callee.
    Declined,
    /// Call dropped mid-way.
    Disconnected,
    /// Call ended normally.
    Finished,
    /// Call not answered in time.
    Missed,
    /// Call is being established.
    Started,
    /// Header missing or value not recognized.
    Unknown,
}

impl CallState {
    /// Parse a `"webrtc"` header value. Unrecognized strings map to
    /// [`CallState::Unknown`] rather than failing; servers add states over
    /// time.
    #[must_use]
    pub fn parse(what: &str) -> Self {
        match what {
            "accepted" => Self::Accepted,
            "busy" => Self::Busy,
            "declined" => Self::Declined,
            "disconnected" => Self::Disconnected,
            "finished" => Self::Finished,
            "missed" => Self::Missed,
            "started" => Self::Started,
            _ => Self::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(topic: &str, seq: u32) -> Envelope {
        Envelope {
            id: None,
            topic: topic.into(),
            head: Headers::new(),
            from: Some("usrA".into()),
            ts: "2024-05-01T10:00:00Z".parse().unwrap(),
            seq,
            content: json!("hello"),
        }
    }

    #[test]
    fn merge_of_identical_records_changes_nothing() {
        let mut a = envelope("grp1", 5);
        let b = a.clone();
        assert_eq!(a.merge(&b), Ok(0));
        assert_eq!(a, b);
    }

    #[test]
    fn header_merge_counts_as_one_field() {
        let mut cached = envelope("grp1", 5);
        cached.head.insert("replace", 1);

        let mut incoming = envelope("grp1", 5);
        incoming.head.insert("attachment", 2);
        incoming.head.insert("mime", "image/png");

        assert_eq!(cached.merge(&incoming), Ok(1));
        assert_eq!(cached.head.int_or("replace", -1), 1);
        assert_eq!(cached.head.int_or("attachment", -1), 2);
        assert_eq!(cached.head.str_or("mime", ""), "image/png");
    }

    #[test]
    fn id_arrives_after_acknowledgement() {
        let mut cached = envelope("grp1", 5);
        let mut incoming = cached.clone();
        incoming.id = Some("inFnXY-42".into());

        assert_eq!(cached.merge(&incoming), Ok(1));
        assert_eq!(cached.id.as_deref(), Some("inFnXY-42"));
    }

    #[test]
    fn absent_optional_fields_do_not_regress() {
        let mut cached = envelope("grp1", 5);
        cached.id = Some("inFnXY-42".into());

        let mut incoming = envelope("grp1", 5);
        incoming.id = None;
        incoming.from = None;

        assert_eq!(cached.merge(&incoming), Ok(0));
        assert_eq!(cached.id.as_deref(), Some("inFnXY-42"));
        assert_eq!(cached.from.as_deref(), Some("usrA"));
    }

    #[test]
    fn changed_content_and_timestamp_are_counted_separately() {
        let mut cached = envelope("grp1", 5);
        let mut incoming = cached.clone();
        incoming.ts = "2024-05-01T10:00:01Z".parse().unwrap();
        incoming.content = json!("hello, edited");

        assert_eq!(cached.merge(&incoming), Ok(2));
        assert_eq!(cached.content, json!("hello, edited"));
    }

    #[test]
    fn seq_mismatch_is_refused_without_mutation() {
        let mut cached = envelope("grp1", 5);
        let before = cached.clone();
        let incoming = envelope("grp1", 6);

        assert_eq!(
            cached.merge(&incoming),
            Err(MergeError::IdentityMismatch {
                expected: "grp1:5".into(),
                found: "grp1:6".into(),
            })
        );
        assert_eq!(cached, before);
    }

    #[test]
    fn topic_mismatch_is_refused() {
        let mut cached = envelope("grp1", 5);
        assert!(cached.merge(&envelope("grp2", 5)).is_err());
    }

    #[test]
    fn draft_has_no_sequence_number() {
        assert!(envelope("grp1", 0).is_draft());
        assert!(!envelope("grp1", 5).is_draft());
    }

    #[test]
    fn decodes_wire_json_without_head() {
        let e: Envelope = serde_json::from_str(
            r#"{"topic":"grp1","from":"usrA","ts":"2024-05-01T10:00:00Z","seq":5,"content":"hi"}"#,
        )
        .unwrap();
        assert!(e.head.is_empty());
        assert_eq!(e.int_header("replace", -1), -1);
        assert_eq!(e.seq, 5);
    }

    #[test]
    fn call_state_from_header() {
        let mut e = envelope("grp1", 5);
        assert_eq!(e.call_state(), CallState::Unknown);

        e.head.insert("webrtc", "missed");
        assert_eq!(e.call_state(), CallState::Missed);

        e.head.insert("webrtc", "on-hold");
        assert_eq!(e.call_state(), CallState::Unknown);
    }

    #[test]
    fn call_state_parses_all_known_states() {
        for (s, state) in [
            ("accepted", CallState::Accepted),
            ("busy", CallState::Busy),
            ("declined", CallState::Declined),
            ("disconnected", CallState::Disconnected),
            ("finished", CallState::Finished),
            ("missed", CallState::Missed),
            ("started", CallState::Started),
        ] {
            assert_eq!(CallState::parse(s), state);
        }
    }
}
