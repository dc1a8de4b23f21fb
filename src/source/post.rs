//! The item type shared by every page source.
//!
//! `Post` is one entry of the feed.  Sources convert whatever they fetch into
//! `Post`s so that the loader and the UI stay source-agnostic.
//!
//! ## For contributors
//!
//! Fields are private on purpose: a post is immutable once fetched, so the
//! rest of the application only reads it through the accessors below.

use serde::Deserialize;

/// Unique identifier of a post.
pub type PostId = u64;

/// A single feed entry.
///
/// The wire format is the JSONPlaceholder post object:
///
/// ```json
/// { "userId": 1, "id": 1, "title": "...", "body": "..." }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
pub struct Post {
    id: PostId,
    title: String,
    body: String,
    #[serde(rename = "userId")]
    user_id: u64,
}

impl Post {
    pub fn new(id: PostId, title: impl Into<String>, body: impl Into<String>, user_id: u64) -> Self {
        Self {
            id,
            title: title.into(),
            body: body.into(),
            user_id,
        }
    }

    /// Unique identifier, used to mark the sentinel item.
    pub fn id(&self) -> PostId {
        self.id
    }

    /// Headline shown on the first line of the card.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Body text.  May contain newlines; the UI flattens it.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Id of the user who owns the post ("By User N").
    pub fn user_id(&self) -> u64 {
        self.user_id
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
