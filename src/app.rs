//! Application state for the render surface.
//!
//! [`App`] wraps the [`FeedLoader`] with everything the terminal UI needs:
//! list selection, the status line and the size of the visible window.  It
//! never performs I/O; page requests it decides on are parked in an outbox
//! that the main loop hands to the dispatcher.

use std::ops::Range;

use chrono::{DateTime, Local};
use log::debug;
use ratatui::widgets::ListState;

use crate::fetch::Completion;
use crate::loader::{FeedLoader, LoadEvent, PageRequest};
use crate::source::Post;

pub struct App {
    pub loader: FeedLoader,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last status message.
    pub status: String,
    /// How many posts fit in the list at the last draw.
    pub viewport_rows: usize,
    /// When the last page completed.
    pub last_update: Option<DateTime<Local>>,
    /// Whether the selected post is open in full.
    pub reading: bool,
    source_name: String,
    outbox: Option<PageRequest>,
}

impl App {
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            loader: FeedLoader::new(),
            list_state: ListState::default(),
            quit: false,
            status: "Starting…".into(),
            viewport_rows: 0,
            last_update: None,
            reading: false,
            source_name: source_name.into(),
            outbox: None,
        }
    }

    /// Kick off the first page.  An empty feed has no sentinel to scroll to.
    pub fn start(&mut self) {
        if let Some(request) = self.loader.request_next_page() {
            self.status = format!("Loading page {} from {}…", request.page, self.source_name);
            self.outbox = Some(request);
        }
    }

    /// The page request waiting to be dispatched, if any.
    pub fn take_request(&mut self) -> Option<PageRequest> {
        self.outbox.take()
    }

    /// Apply a finished fetch and re-arm the sentinel on the new last item.
    pub fn apply(&mut self, completion: Completion) {
        let Some(event) = self.loader.complete(completion.request, completion.result) else {
            return;
        };
        self.last_update = Some(Local::now());
        self.status = match event {
            LoadEvent::Appended { page, added } => {
                format!("Loaded {added} posts from page {page}")
            }
            LoadEvent::Exhausted { .. } => {
                format!("Reached the end after {} posts", self.loader.items().len())
            }
            LoadEvent::Failed { page, error } => format!("Error on page {page}: {error}"),
        };
        self.loader.rearm_sentinel();
        if let Some(target) = self.loader.sentinel_target() {
            debug!("sentinel on post {} at index {}", target.id, target.index);
        }
    }

    /// Explicit retry (or "load more") from the keyboard.
    pub fn retry(&mut self) {
        if let Some(request) = self.loader.request_next_page() {
            self.status = format!("Retrying page {}…", request.page);
            self.outbox = Some(request);
        }
    }

    /// Feed indices currently on screen.
    pub fn visible_range(&self) -> Range<usize> {
        let len = self.loader.items().len();
        let start = self.list_state.offset().min(len);
        let end = start.saturating_add(self.viewport_rows).min(len);
        start..end
    }

    /// Report the viewport to the loader after a frame has been drawn.
    pub fn after_draw(&mut self) {
        let visible = self.visible_range();
        if let Some(request) = self.loader.observe_viewport(visible) {
            self.status = format!("Loading page {}…", request.page);
            self.outbox = Some(request);
        }
    }

    /// Open or close the full text of the selected post.
    pub fn toggle_read_more(&mut self) {
        if self.reading {
            self.reading = false;
            return;
        }
        if self.item_count() == 0 {
            return;
        }
        if self.list_state.selected().is_none() {
            self.list_state.select(Some(self.list_state.offset()));
        }
        self.reading = true;
    }

    /// Close the post being read, or quit if none is open.
    pub fn back_or_quit(&mut self) {
        if self.reading {
            self.reading = false;
        } else {
            self.quit = true;
        }
    }

    /// The post open in full, if any.
    pub fn reading_post(&self) -> Option<&Post> {
        if !self.reading {
            return None;
        }
        self.list_state
            .selected()
            .and_then(|i| self.loader.items().get(i))
    }

    fn item_count(&self) -> usize {
        self.loader.items().len()
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        self.move_selection(1);
    }

    pub fn select_previous(&mut self) {
        self.move_selection(-1);
    }

    pub fn page_down(&mut self) {
        self.move_selection(self.viewport_rows.max(1) as isize);
    }

    pub fn page_up(&mut self) {
        self.move_selection(-(self.viewport_rows.max(1) as isize));
    }

    pub fn select_first(&mut self) {
        if self.item_count() > 0 {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.item_count();
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.item_count();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_add_signed(delta).min(len - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }
}
