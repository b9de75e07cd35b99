use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a merge is attempted between unrelated records.
///
/// Merging is only defined for two representations of the same logical
/// entity. When the primary keys differ the merge is refused outright and
/// the receiver is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// The records' primary keys differ.
    IdentityMismatch {
        /// Identity key of the receiver.
        expected: String,
        /// Identity key of the incoming record.
        found: String,
    },
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdentityMismatch { expected, found } => {
                write!(f, "identity mismatch: expected {expected}, found {found}")
            }
        }
    }
}

impl std::error::Error for MergeError {}

/// A record that can absorb a newer or partial version of itself.
///
/// A client holding a cached record receives incremental updates from the
/// server; `merge` reconciles the two in place and reports how many
/// top-level fields changed, so storage can decide whether to persist and
/// the UI whether to redraw.
///
/// # Contract
///
/// - Merging is directional: `self` is mutated, `other` is read-only.
/// - A field absent in `other` carries no information and is skipped; a
///   present field that differs is adopted.
/// - Merging a record into an identical copy returns `Ok(0)` and changes
///   nothing.
/// - Records with an identity key must refuse to merge a counterpart with a
///   different key, returning [`MergeError::IdentityMismatch`] before any
///   field is written.
///
/// Each implementation compares its fields in a fixed, hand-written order;
/// there is no reflective generic routine.
///
/// # Example
///
/// ```
/// use merge_kit::prelude::*;
///
/// let mut cached = Replace::new("draft");
/// let incoming = Replace::new("final");
///
/// assert_eq!(cached.merge(&incoming), Ok(1));
/// assert_eq!(cached.get(), &"final");
/// ```
pub trait Mergeable {
    /// Merge `other` into `self`, returning the number of top-level fields
    /// that changed.
    fn merge(&mut self, other: &Self) -> Result<usize, MergeError>;

    /// Merge `other` into `self`, reporting only whether anything changed.
    fn merge_changed(&mut self, other: &Self) -> Result<bool, MergeError> {
        Ok(self.merge(other)? > 0)
    }
}

/// Full-replace merge semantics for any plain value.
///
/// Wraps a value so it can participate in the merge protocol: the incoming
/// value always wins, and the merge counts one changed field only when the
/// values actually differ. Serializes as the bare inner value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Replace<T>(T);

impl<T> Replace<T> {
    /// Wrap a value.
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the inner value.
    #[must_use]
    pub fn get(&self) -> &T {
        &self.0
    }

    /// Unwrap the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Clone + PartialEq> Mergeable for Replace<T> {
    fn merge(&mut self, other: &Self) -> Result<usize, MergeError> {
        if self.0 == other.0 {
            return Ok(0);
        }
        self.0 = other.0.clone();
        Ok(1)
    }
}

impl<T> From<T> for Replace<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}
