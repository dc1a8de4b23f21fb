//! In-memory page source.
//!
//! Serves a fixed list of posts in pages.  Used by `--demo` mode so the UI can
//! be tried without network access, and by tests that need a well-behaved
//! source.

use async_trait::async_trait;

use super::{PageSource, Post};
use crate::error::FetchError;

pub struct MemoryPageSource {
    label: String,
    posts: Vec<Post>,
    page_size: usize,
}

impl MemoryPageSource {
    pub fn new(label: impl Into<String>, posts: Vec<Post>, page_size: usize) -> Self {
        Self {
            label: label.into(),
            posts,
            page_size: page_size.max(1),
        }
    }

    /// A source of `count` generated posts with ids `1..=count`.
    pub fn generated(count: u64, page_size: usize) -> Self {
        let posts = (1..=count)
            .map(|id| {
                Post::new(
                    id,
                    format!("Demo post #{id}"),
                    format!("This is the body of demo post {id}.\nScroll down to load more."),
                    (id - 1) / 10 + 1,
                )
            })
            .collect();
        Self::new("demo", posts, page_size)
    }

    /// The posts of `page` (1-based).  Page 0 and pages past the end are empty.
    pub fn page(&self, page: u32) -> &[Post] {
        let Some(index) = (page as usize).checked_sub(1) else {
            return &[];
        };
        let start = index.saturating_mul(self.page_size).min(self.posts.len());
        let end = start.saturating_add(self.page_size).min(self.posts.len());
        &self.posts[start..end]
    }
}

#[async_trait]
impl PageSource for MemoryPageSource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<Post>, FetchError> {
        Ok(self.page(page).to_vec())
    }
}
