//! Background page fetching.
//!
//! The [`Dispatcher`] owns a small tokio runtime.  Each [`PageRequest`] the
//! loader emits is turned into one task that awaits the page source and sends
//! a [`Completion`] to the UI thread over an [`mpsc`] channel.  The UI thread
//! drains the channel on every tick and hands completions back to the loader.
//!
//! ## For contributors
//!
//! The dispatcher does not decide *whether* to fetch; the loader already
//! guarantees at most one request is outstanding.  Keep that policy in
//! `loader.rs`.

use std::sync::mpsc;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, error};
use tokio::runtime::Runtime;
use tokio::task::AbortHandle;

use crate::error::FetchError;
use crate::loader::PageRequest;
use crate::source::{PageSource, Post};

/// Messages sent from fetch tasks to the UI thread.
#[derive(Debug)]
pub struct Completion {
    pub request: PageRequest,
    pub result: Result<Vec<Post>, FetchError>,
}

pub struct Dispatcher {
    /// Only `None` while dropping.
    runtime: Option<Runtime>,
    source: Arc<dyn PageSource>,
    tx: mpsc::Sender<Completion>,
    in_flight: Option<AbortHandle>,
}

impl Dispatcher {
    /// Start the fetch runtime.
    ///
    /// Returns the dispatcher and the receiver the main loop should drain on
    /// every tick.
    pub fn new(source: Arc<dyn PageSource>) -> Result<(Self, mpsc::Receiver<Completion>)> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("page-fetch")
            .enable_all()
            .build()
            .context("failed to start fetch runtime")?;
        let (tx, rx) = mpsc::channel();

        let dispatcher = Self {
            runtime: Some(runtime),
            source,
            tx,
            in_flight: None,
        };
        Ok((dispatcher, rx))
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Fetch `request.page` in the background.
    pub fn dispatch(&mut self, request: PageRequest) {
        let Some(runtime) = &self.runtime else {
            return;
        };
        debug!(
            "dispatching page {} (ticket {}) to {}",
            request.page,
            request.ticket,
            self.source.name()
        );

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let handle = runtime.spawn(async move {
            let result = source.fetch_page(request.page).await;
            // If the receiver is gone the view has been torn down; the result
            // has nowhere to go.
            if tx.send(Completion { request, result }).is_err() {
                debug!("page {} finished after teardown, discarded", request.page);
            }
        });

        if let Some(previous) = self.in_flight.replace(handle.abort_handle()) {
            if !previous.is_finished() {
                error!("dispatching page {} while another fetch is running", request.page);
            }
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        // A fetch stuck in blocking code cannot observe the abort; do not wait
        // for it.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::error::FailureKind;
    use crate::loader::{FeedLoader, LoadState};
    use crate::source::MemoryPageSource;

    const WAIT: Duration = Duration::from_secs(5);

    /// Wraps a memory source and records how many fetches overlap.
    struct CountingSource {
        inner: MemoryPageSource,
        calls: AtomicUsize,
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    impl CountingSource {
        fn new(total: u64, page_size: usize) -> Self {
            Self {
                inner: MemoryPageSource::generated(total, page_size),
                calls: AtomicUsize::new(0),
                active: AtomicUsize::new(0),
                max_active: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PageSource for CountingSource {
        fn name(&self) -> &str {
            "counting"
        }

        async fn fetch_page(&self, page: u32) -> Result<Vec<Post>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            let result = self.inner.fetch_page(page).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    struct FailingSource;

    #[async_trait]
    impl PageSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        async fn fetch_page(&self, _page: u32) -> Result<Vec<Post>, FetchError> {
            Err(FetchError::new(FailureKind::HttpStatus(500), "Internal Server Error"))
        }
    }

    struct SlowSource {
        finished: Arc<AtomicBool>,
    }

    #[async_trait]
    impl PageSource for SlowSource {
        fn name(&self) -> &str {
            "slow"
        }

        async fn fetch_page(&self, _page: u32) -> Result<Vec<Post>, FetchError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            self.finished.store(true, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    #[test]
    fn completion_carries_request_and_page() {
        let source = Arc::new(MemoryPageSource::generated(15, 10));
        let (mut dispatcher, rx) = Dispatcher::new(source).unwrap();
        let request = PageRequest { ticket: 7, page: 2 };

        dispatcher.dispatch(request);
        let completion = rx.recv_timeout(WAIT).unwrap();

        assert_eq!(completion.request, request);
        assert_eq!(completion.result.unwrap().len(), 5);
        assert_eq!(dispatcher.source_name(), "demo");
    }

    #[test]
    fn failures_are_delivered_not_dropped() {
        let (mut dispatcher, rx) = Dispatcher::new(Arc::new(FailingSource)).unwrap();
        dispatcher.dispatch(PageRequest { ticket: 0, page: 1 });

        let completion = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(
            completion.result.unwrap_err().kind,
            FailureKind::HttpStatus(500)
        );
    }

    #[test]
    fn drop_aborts_in_flight_fetch() {
        let finished = Arc::new(AtomicBool::new(false));
        let source = Arc::new(SlowSource {
            finished: Arc::clone(&finished),
        });
        let (mut dispatcher, rx) = Dispatcher::new(source).unwrap();

        dispatcher.dispatch(PageRequest { ticket: 0, page: 1 });
        drop(dispatcher);

        assert!(rx.recv_timeout(Duration::from_millis(500)).is_err());
        assert!(!finished.load(Ordering::SeqCst));
    }

    /// Blocks a runtime thread, so aborting the task has no effect.
    struct StuckSource;

    #[async_trait]
    impl PageSource for StuckSource {
        fn name(&self) -> &str {
            "stuck"
        }

        async fn fetch_page(&self, _page: u32) -> Result<Vec<Post>, FetchError> {
            let _ = tokio::task::spawn_blocking(|| std::thread::sleep(Duration::from_secs(10))).await;
            Ok(Vec::new())
        }
    }

    #[test]
    fn drop_does_not_wait_for_blocked_fetch() {
        let (mut dispatcher, _rx) = Dispatcher::new(Arc::new(StuckSource)).unwrap();
        dispatcher.dispatch(PageRequest { ticket: 0, page: 1 });
        std::thread::sleep(Duration::from_millis(50));

        let started = std::time::Instant::now();
        drop(dispatcher);

        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn completion_after_receiver_dropped_is_discarded() {
        let source = Arc::new(CountingSource::new(10, 10));
        let (mut dispatcher, rx) = Dispatcher::new(Arc::clone(&source) as Arc<dyn PageSource>).unwrap();
        drop(rx);

        dispatcher.dispatch(PageRequest { ticket: 0, page: 1 });
        std::thread::sleep(Duration::from_millis(100));

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn loader_and_dispatcher_page_through_source_one_fetch_at_a_time() {
        let source = Arc::new(CountingSource::new(25, 10));
        let (mut dispatcher, rx) = Dispatcher::new(Arc::clone(&source) as Arc<dyn PageSource>).unwrap();
        let mut loader = FeedLoader::new();

        if let Some(request) = loader.request_next_page() {
            dispatcher.dispatch(request);
        }

        while loader.state() != LoadState::Exhausted {
            // The sentinel keeps firing while the fetch runs.
            for _ in 0..5 {
                if let Some(request) = loader.on_sentinel_visible() {
                    dispatcher.dispatch(request);
                }
            }
            let completion = rx.recv_timeout(WAIT).unwrap();
            loader.complete(completion.request, completion.result);
            if let Some(request) = loader.on_sentinel_visible() {
                dispatcher.dispatch(request);
            }
        }

        assert_eq!(loader.items().len(), 25);
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
        assert_eq!(source.max_active.load(Ordering::SeqCst), 1);
    }
}
