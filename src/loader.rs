//! Paginated feed loader.
//!
//! Owns the feed, the page cursor and the load state, and decides when a page
//! may be fetched.  The loader never performs I/O itself: starting a fetch
//! returns a [`PageRequest`] that the caller hands to a
//! [`Dispatcher`](crate::fetch::Dispatcher), and the result comes back
//! through [`FeedLoader::complete`].
//!
//! ```text
//!            request_next_page()           complete(Ok(N > 0))
//!   ┌──────┐ ──────────────────► ┌─────────┐ ─────────────────► Idle
//!   │ Idle │                     │ Loading │ ─ complete(Err) ─► Idle
//!   └──────┘ ◄─────────────────  └─────────┘ ─ complete(Ok(0)) ─► Exhausted
//! ```
//!
//! At most one request is in flight.  `Exhausted` is terminal.

use std::collections::HashSet;
use std::ops::Range;

use log::{debug, info, warn};

use crate::error::FetchError;
use crate::sentinel::{Sentinel, SentinelTarget};
use crate::source::{Post, PostId};

/// Where the loader is in its fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Ready to fetch the page under the cursor.
    Idle,
    /// Exactly one fetch is in flight.
    Loading,
    /// A page came back empty.  No further fetches are issued.
    Exhausted,
}

/// A fetch the loader has committed to.
///
/// The ticket ties the eventual completion to this request; completions for
/// any other ticket are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub ticket: u64,
    pub page: u32,
}

/// Observable outcome of a completed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    Appended { page: u32, added: usize },
    Exhausted { page: u32 },
    Failed { page: u32, error: FetchError },
}

pub struct FeedLoader {
    /// Fetched posts in page order.
    items: Vec<Post>,
    /// Ids already in `items`.
    seen: HashSet<PostId>,
    /// Next page to request.
    cursor: u32,
    state: LoadState,
    in_flight: Option<PageRequest>,
    next_ticket: u64,
    /// Error from the most recent fetch, cleared by the next success.
    last_error: Option<FetchError>,
    sentinel: Sentinel,
}

impl Default for FeedLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedLoader {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            cursor: 1,
            state: LoadState::Idle,
            in_flight: None,
            next_ticket: 0,
            last_error: None,
            sentinel: Sentinel::new(),
        }
    }

    // -- read-only access for the render surface ------------------------------

    pub fn items(&self) -> &[Post] {
        &self.items
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    pub fn in_flight(&self) -> Option<PageRequest> {
        self.in_flight
    }

    /// The item the sentinel should be attached to.
    pub fn last_item(&self) -> Option<SentinelTarget> {
        self.items.last().map(|post| SentinelTarget {
            id: post.id(),
            index: self.items.len() - 1,
        })
    }

    pub fn sentinel_target(&self) -> Option<SentinelTarget> {
        self.sentinel.target()
    }

    // -- transitions ----------------------------------------------------------

    /// Start fetching the page under the cursor.
    ///
    /// Returns `None` (and does nothing) unless the loader is idle.
    pub fn request_next_page(&mut self) -> Option<PageRequest> {
        match self.state {
            LoadState::Idle => {}
            LoadState::Loading => {
                debug!("page request ignored: page {} already loading", self.cursor);
                return None;
            }
            LoadState::Exhausted => {
                debug!("page request ignored: feed exhausted");
                return None;
            }
        }

        let request = PageRequest {
            ticket: self.next_ticket,
            page: self.cursor,
        };
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.state = LoadState::Loading;
        self.in_flight = Some(request);
        debug!("requesting page {} (ticket {})", request.page, request.ticket);
        Some(request)
    }

    /// The sentinel item scrolled into view.
    pub fn on_sentinel_visible(&mut self) -> Option<PageRequest> {
        if self.state != LoadState::Idle {
            return None;
        }
        info!("last item in view, loading page {}", self.cursor);
        self.request_next_page()
    }

    /// Apply the result of `request`.
    ///
    /// Completions that do not belong to the in-flight request are dropped and
    /// `None` is returned.
    pub fn complete(
        &mut self,
        request: PageRequest,
        result: Result<Vec<Post>, FetchError>,
    ) -> Option<LoadEvent> {
        if self.in_flight != Some(request) {
            debug!(
                "dropping completion for page {} (ticket {}): not in flight",
                request.page, request.ticket
            );
            return None;
        }
        self.in_flight = None;

        match result {
            Ok(posts) if posts.is_empty() => {
                info!("page {} is empty, feed exhausted", request.page);
                self.state = LoadState::Exhausted;
                self.last_error = None;
                self.sentinel.disconnect();
                Some(LoadEvent::Exhausted { page: request.page })
            }
            Ok(posts) => {
                let added = self.append(posts);
                self.cursor += 1;
                if added == 0 {
                    // The last item did not move, so the sentinel would stay
                    // silent while it is on screen.
                    self.sentinel.reset();
                }
                self.state = LoadState::Idle;
                self.last_error = None;
                info!(
                    "page {} appended {added} posts ({} total)",
                    request.page,
                    self.items.len()
                );
                Some(LoadEvent::Appended {
                    page: request.page,
                    added,
                })
            }
            Err(error) => {
                warn!("page {} failed: {error}", request.page);
                self.state = LoadState::Idle;
                self.last_error = Some(error.clone());
                Some(LoadEvent::Failed {
                    page: request.page,
                    error,
                })
            }
        }
    }

    fn append(&mut self, posts: Vec<Post>) -> usize {
        let before = self.items.len();
        for post in posts {
            if self.seen.insert(post.id()) {
                self.items.push(post);
            } else {
                warn!("dropping duplicate post {}", post.id());
            }
        }
        self.items.len() - before
    }

    // -- sentinel ---------------------------------------------------------------

    /// Point the sentinel at the current last item.
    ///
    /// The render surface calls this whenever the rendered item set changes.
    /// An exhausted feed keeps the sentinel disconnected.
    pub fn rearm_sentinel(&mut self) {
        if self.state == LoadState::Exhausted {
            self.sentinel.disconnect();
        } else {
            let target = self.last_item();
            self.sentinel.rearm(target);
        }
    }

    /// Report which feed indices are on screen.
    ///
    /// Returns a request when the sentinel has just come into view and the
    /// loader is idle.
    pub fn observe_viewport(&mut self, visible: Range<usize>) -> Option<PageRequest> {
        if self.sentinel.observe(&visible) {
            self.on_sentinel_visible()
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
