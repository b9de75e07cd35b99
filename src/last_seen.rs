use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{MergeError, Mergeable};

/// When a user was last online, and with which client.
///
/// Merge never moves `when` backwards; adopting a newer timestamp also
/// adopts the user agent that was reported with it, since the two describe
/// the same sighting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastSeen {
    /// Time of the last sighting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<DateTime<Utc>>,
    /// User agent of the client seen then.
    #[serde(rename = "ua", default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl LastSeen {
    /// A sighting at `when` with no user agent.
    #[must_use]
    pub fn at(when: DateTime<Utc>) -> Self {
        Self {
            when: Some(when),
            user_agent: None,
        }
    }
}

impl Mergeable for LastSeen {
    fn merge(&mut self, other: &Self) -> Result<usize, MergeError> {
        match (self.when, other.when) {
            (Some(mine), Some(theirs)) if theirs <= mine => Ok(0),
            (_, None) => Ok(0),
            (_, Some(theirs)) => {
                self.when = Some(theirs);
                self.user_agent = other.user_agent.clone();
                Ok(1)
            }
        }
    }
}
