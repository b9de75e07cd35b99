use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One header value: a tagged union over the scalar kinds servers send.
///
/// Header schemas evolve server-side without client coordination, so values
/// are loosely typed. Anything that is not a boolean, integer, or string
/// lands in [`HeaderValue::Other`] and is preserved verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    /// Boolean flag.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// String value.
    Str(String),
    /// Any other JSON scalar or structure, kept as-is.
    Other(Value),
}

impl HeaderValue {
    /// The integer behind this value, if it is one.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The string behind this value, if it is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean behind this value, if it is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<i64> for HeaderValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for HeaderValue {
    fn from(n: i32) -> Self {
        Self::Int(n.into())
    }
}

impl From<bool> for HeaderValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for HeaderValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for HeaderValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

/// Out-of-band metadata attached to an envelope, keyed by string name.
///
/// The map may be entirely unset (the wire omits it for most messages); an
/// unset map behaves as an empty map for every read. Typed accessors never
/// fail: an absent key or a value of the wrong kind yields the caller's
/// default.
///
/// # Example
///
/// ```
/// use merge_kit::prelude::*;
///
/// let mut head = Headers::new();
/// assert_eq!(head.int_or("replace", -1), -1);
///
/// head.insert("replace", 3);
/// assert_eq!(head.int_or("replace", -1), 3);
/// // Wrong kind falls back to the default, never errors.
/// assert_eq!(head.str_or("replace", "none"), "none");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers {
    map: Option<BTreeMap<String, HeaderValue>>,
}

impl Headers {
    /// Create an unset header map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a raw value. Never fails, even when the map is unset.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.map.as_ref()?.get(key)
    }

    /// The integer under `key`, or `default` when absent or not an integer.
    #[must_use]
    pub fn int_or(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(HeaderValue::as_int).unwrap_or(default)
    }

    /// The string under `key`, or `default` when absent or not a string.
    #[must_use]
    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).and_then(HeaderValue::as_str).unwrap_or(default)
    }

    /// The boolean under `key`, or `default` when absent or not a boolean.
    #[must_use]
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(HeaderValue::as_bool).unwrap_or(default)
    }

    /// Insert or overwrite a header.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<HeaderValue>) {
        self.map
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
    }

    /// Number of headers present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.as_ref().map_or(0, BTreeMap::len)
    }

    /// True when the map is unset or holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over present headers in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.map
            .iter()
            .flat_map(|m| m.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Key-wise merge: keys present in `other` overwrite or insert, keys
    /// absent in `other` are untouched. Returns whether anything changed.
    ///
    /// Callers implementing [`crate::Mergeable`] count this as at most one
    /// changed field regardless of how many keys were updated.
    pub fn merge_from(&mut self, other: &Headers) -> bool {
        let mut changed = false;
        for (key, value) in other.iter() {
            if self.get(key) != Some(value) {
                self.insert(key, value.clone());
                changed = true;
            }
        }
        changed
    }
}

impl From<Value> for HeaderValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) if n.is_i64() => Self::Int(n.as_i64().unwrap_or_default()),
            Value::String(s) => Self::Str(s),
            other => Self::Other(other),
        }
    }
}

impl FromIterator<(String, HeaderValue)> for Headers {
    fn from_iter<I: IntoIterator<Item = (String, HeaderValue)>>(iter: I) -> Self {
        let map: BTreeMap<_, _> = iter.into_iter().collect();
        Self {
            map: if map.is_empty() { None } else { Some(map) },
        }
    }
}
