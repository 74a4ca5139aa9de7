//! The persisted story record.

use serde::{Deserialize, Serialize};

/// A satirical news story with its originating prompt and vote counters.
///
/// The wire shape is `{ id, prompt, story, upvotes, downvotes }` — the
/// generated body serializes under the field name `story`. Counters default
/// to zero when absent so records written before voting existed stay
/// readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    /// Unique identity, assigned by the store on first save.
    #[serde(default)]
    pub id: String,

    /// The user-supplied prompt the story was generated from.
    pub prompt: String,

    /// The generated story body.
    #[serde(rename = "story")]
    pub text: String,

    #[serde(default)]
    pub upvotes: u64,

    #[serde(default)]
    pub downvotes: u64,
}

impl Story {
    /// Create a new unsaved story with zeroed counters and no id.
    pub fn new(prompt: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            prompt: prompt.into(),
            text: text.into(),
            upvotes: 0,
            downvotes: 0,
        }
    }

    /// Set an explicit id (normally the store assigns one).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Net score used for the top-stories listing.
    pub fn score(&self) -> i64 {
        self.upvotes as i64 - self.downvotes as i64
    }
}
