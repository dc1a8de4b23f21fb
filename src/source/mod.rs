//! Page source abstraction layer.
//!
//! This module defines the [`PageSource`] trait and the common [`Post`] type.
//! Concrete sources live in sub-modules: [`http`] talks to a JSONPlaceholder
//! style endpoint, [`memory`] serves a fixed list (tests and `--demo`).
//!
//! ## For contributors — adding a new source
//!
//! 1. Create a new file in this directory (e.g. `graphql.rs`).
//! 2. Define a struct and implement [`PageSource`] for it.
//! 3. Add `mod graphql;` below and re-export your struct in the `pub use` block.
//! 4. Construct it in `main.rs` where the other sources are chosen.
//!
//! The loader, dispatcher and UI are all source-agnostic.

mod http;
mod memory;
mod post;

pub use http::{HttpPageSource, HttpSettings};
pub use memory::MemoryPageSource;
pub use post::{Post, PostId};

use async_trait::async_trait;

use crate::error::FetchError;

/// Trait that every page source must implement.
///
/// The dispatcher calls [`fetch_page()`](PageSource::fetch_page) on a tokio
/// worker, so implementations must be [`Send`] + [`Sync`].
///
/// ## Contract
///
/// * `page` starts at 1.
/// * Return only the items of the requested page; pages must not overlap.
/// * An empty vector means there is no more data.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Human-readable label shown in the status bar and in log lines.
    fn name(&self) -> &str;

    /// Fetch one page of posts.
    async fn fetch_page(&self, page: u32) -> Result<Vec<Post>, FetchError>;
}
