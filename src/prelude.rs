//! Convenient re-exports for common usage.
//!
//! ```
//! use merge_kit::prelude::*;
//! ```

pub use crate::CallState;
pub use crate::Description;
pub use crate::Envelope;
pub use crate::HeaderValue;
pub use crate::Headers;
pub use crate::LastSeen;
pub use crate::MergeError;
pub use crate::Mergeable;
pub use crate::Pair;
pub use crate::Replace;
pub use crate::Subscription;
