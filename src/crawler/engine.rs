//! Crawl engine - main crawl orchestration logic
//!
//! The engine runs a single dispatch loop that pops address records from the
//! frontier and hands each one to a worker task. Workers fetch, parse, store,
//! and push discovered links back into the frontier.
//!
//! # Lifecycle
//!
//! `Idle -> Running -> {Completed, Cancelled, TimedOut}`
//!
//! - **Completed**: the frontier is empty and no worker is in flight
//! - **Cancelled**: [`Engine::stop`] was called
//! - **TimedOut**: the global timeout elapsed
//!
//! On cancellation or timeout no new work is dispatched, and in-flight workers
//! are allowed to finish before `start` returns.

use crate::config::CrawlOptions;
use crate::crawler::fetcher::{FetchError, Fetcher, HttpFetcher};
use crate::crawler::parser::{HtmlParser, ParsedPage, Parser};
use crate::crawler::stats::{CrawlStats, StatsRecorder};
use crate::frontier::{AddressRecord, FifoQueue, FrontierQueue};
use crate::state::{DuplicateTracker, EngineState, MemoryDuplicateTracker};
use crate::storage::{MemoryResultStore, ResultStore};
use crate::url::{normalize_link, parse_seed};
use crate::CrawlError;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// How a crawl run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlOutcome {
    /// Frontier drained with no workers in flight
    Completed,

    /// Stopped on request
    Cancelled,

    /// The global timeout elapsed
    TimedOut,
}

impl CrawlOutcome {
    /// The terminal engine state matching this outcome
    /// Returns the current lifecycle state
    pub fn state(&self) -> EngineState {
        match self {
            Self::Completed => EngineState::Completed,
            Self::Cancelled => EngineState::Cancelled,
            Self::TimedOut => EngineState::TimedOut,
        }
    }
}

impl fmt::Display for CrawlOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.state())
    }
}

/// Bounded-concurrency crawl engine
///
/// Every collaborator is a trait object with a default implementation and can
/// be replaced with the `with_*` builder methods before the run starts.
///
/// # Example
///
/// ```no_run
/// use fathom::{CrawlOptions, Engine};
///
/// # async fn example() -> Result<(), fathom::CrawlError> {
/// let engine = Engine::new(CrawlOptions::default())?;
/// engine.add_url("https://example.com/")?;
///
/// let outcome = engine.start().await?;
/// println!("{}: {:?}", outcome, engine.stats());
/// # Ok(())
/// # }
/// ```
pub struct Engine {
    options: Arc<CrawlOptions>,
    queue: Arc<dyn FrontierQueue>,
    tracker: Arc<dyn DuplicateTracker>,
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<dyn Parser>,
    storage: Arc<dyn ResultStore>,
    stats: Arc<StatsRecorder>,
    state: Mutex<EngineState>,
    stop: CancellationToken,
}

impl Engine {
    /// Creates an engine with the default collaborators
    ///
    /// # Arguments
    ///
    /// * `options` - Run options; validated here
    ///
    /// # Returns
    ///
    /// * `Ok(Engine)` - Idle engine with an empty frontier
    /// * `Err(CrawlError)` - Invalid options or the HTTP client could not be built
    pub fn new(options: CrawlOptions) -> Result<Self, CrawlError> {
        options.validate()?;
        let fetcher = HttpFetcher::new(&options)?;

        Ok(Self {
            options: Arc::new(options),
            queue: Arc::new(FifoQueue::new()),
            tracker: Arc::new(MemoryDuplicateTracker::new()),
            fetcher: Arc::new(fetcher),
            parser: Arc::new(HtmlParser::new()),
            storage: Arc::new(MemoryResultStore::new()),
            stats: Arc::new(StatsRecorder::new()),
            state: Mutex::new(EngineState::Idle),
            stop: CancellationToken::new(),
        })
    }

    /// Replaces the frontier queue, e.g. with a [`DepthPriorityQueue`](crate::frontier::DepthPriorityQueue)
    pub fn with_queue(mut self, queue: Arc<dyn FrontierQueue>) -> Self {
        self.queue = queue;
        self
    }

    /// Replaces the HTTP fetcher
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Replaces the HTML parser
    pub fn with_parser(mut self, parser: Arc<dyn Parser>) -> Self {
        self.parser = parser;
        self
    }

    /// Replaces the in-memory result store
    pub fn with_storage(mut self, storage: Arc<dyn ResultStore>) -> Self {
        self.storage = storage;
        self
    }

    /// Replaces the in-memory duplicate tracker
    pub fn with_tracker(mut self, tracker: Arc<dyn DuplicateTracker>) -> Self {
        self.tracker = tracker;
        self
    }

    /// Seeds the frontier with a depth-0 record
    ///
    /// The address must be absolute http(s). It is fetched as given; only its
    /// deduplication key is normalized, so a seed and a link to it are still
    /// recognized as equal.
    pub fn add_url(&self, target: &str) -> Result<(), CrawlError> {
        let seed = parse_seed(target)?;
        tracing::debug!("Seeding {}", seed);
        self.queue.push(AddressRecord::seed(seed));
        Ok(())
    }

    /// Runs the crawl until it completes, is stopped, or times out
    ///
    /// Per-address failures are recorded in [`stats`](Self::stats) and never
    /// returned here.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - How the run ended
    /// * `Err(CrawlError::AlreadyStarted)` - The engine is not idle
    pub async fn start(&self) -> Result<CrawlOutcome, CrawlError> {
        {
            let mut state = self.lock_state();
            if *state != EngineState::Idle {
                return Err(CrawlError::AlreadyStarted(*state));
            }
            *state = EngineState::Running;
        }

        let outcome = self.run().await;
        *self.lock_state() = outcome.state();
        Ok(outcome)
    }

    /// Requests cancellation of the run
    ///
    /// Safe to call from any task and any number of times. Calling it before
    /// `start` makes the run end as `Cancelled` without dispatching anything;
    /// calling it after the run ended has no effect.
    pub fn stop(&self) {
        if !self.stop.is_cancelled() {
            tracing::info!("Stop requested");
        }
        self.stop.cancel();
    }

    /// Returns a snapshot of the run statistics
    pub fn stats(&self) -> CrawlStats {
        self.stats.snapshot()
    }

    pub fn state(&self) -> EngineState {
        *self.lock_state()
    }

    /// Returns the result store handle
    pub fn storage(&self) -> Arc<dyn ResultStore> {
        Arc::clone(&self.storage)
    }

    /// Returns the validated run options
    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(&self) -> CrawlOutcome {
        let started = Instant::now();
        tracing::info!(
            "Starting crawl: {} queued, max depth {}, concurrency {}",
            self.queue.len(),
            self.options.max_depth,
            self.options.concurrency
        );

        let scope = self.stop.child_token();
        let timed_out = Arc::new(AtomicBool::new(false));
        let timer = (!self.options.global_timeout.is_zero()).then(|| {
            let scope = scope.clone();
            let timed_out = Arc::clone(&timed_out);
            let limit = self.options.global_timeout;
            tokio::spawn(async move {
                tokio::time::sleep(limit).await;
                tracing::warn!("Global timeout of {:?} reached", limit);
                timed_out.store(true, Ordering::SeqCst);
                scope.cancel();
            })
        });

        let semaphore = Arc::new(Semaphore::new(self.options.concurrency));
        let in_flight = Arc::new(InFlight::default());
        let workers = TaskTracker::new();
        let worker = Arc::new(Worker {
            options: Arc::clone(&self.options),
            queue: Arc::clone(&self.queue),
            fetcher: Arc::clone(&self.fetcher),
            parser: Arc::clone(&self.parser),
            storage: Arc::clone(&self.storage),
            stats: Arc::clone(&self.stats),
        });

        let outcome = loop {
            if scope.is_cancelled() {
                break if timed_out.load(Ordering::SeqCst) {
                    CrawlOutcome::TimedOut
                } else {
                    CrawlOutcome::Cancelled
                };
            }

            // Read before popping: a worker only decrements after pushing its links
            let active = in_flight.active.load(Ordering::SeqCst);

            let Some(record) = self.queue.pop() else {
                if active == 0 {
                    break CrawlOutcome::Completed;
                }

                tokio::select! {
                    _ = in_flight.idle.notified() => {}
                    _ = scope.cancelled() => {}
                }
                continue;
            };

            if record.depth > self.options.max_depth {
                tracing::debug!(
                    "Discarding {}: depth {} exceeds {}",
                    record.target,
                    record.depth,
                    self.options.max_depth
                );
                continue;
            }

            let key = normalize_link(&record.target);
            if self.tracker.is_duplicate(&key) {
                tracing::trace!("Skipping already seen {}", record.target);
                continue;
            }

            if !self.options.request_delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = scope.cancelled() => continue,
                    _ = tokio::time::sleep(self.options.request_delay) => {}
                }
            }

            let permit = tokio::select! {
                biased;
                _ = scope.cancelled() => continue,
                permit = Arc::clone(&semaphore).acquire_owned() => permit,
            };
            let Ok(permit) = permit else {
                tracing::error!("Worker slots closed unexpectedly");
                break CrawlOutcome::Cancelled;
            };

            // Marked only once the record is certain to be dispatched
            if !self.tracker.check_and_mark(&key) {
                tracing::trace!("Skipping already seen {}", record.target);
                continue;
            }

            in_flight.active.fetch_add(1, Ordering::SeqCst);
            let guard = InFlightGuard {
                in_flight: Arc::clone(&in_flight),
                _permit: permit,
            };
            let worker = Arc::clone(&worker);
            workers.spawn(async move {
                let _guard = guard;
                worker.process(record, key).await;
            });
        };

        if let Some(timer) = timer {
            timer.abort();
        }

        workers.close();
        if !workers.is_empty() {
            tracing::info!("Waiting for {} in-flight workers", workers.len());
        }
        workers.wait().await;

        let stats = self.stats.snapshot();
        tracing::info!(
            "Crawl {}: {} processed, {} succeeded, {} failed, {} links found in {:?}",
            outcome,
            stats.urls_processed,
            stats.pages_succeeded,
            stats.pages_failed,
            stats.urls_found,
            started.elapsed()
        );

        outcome
    }
}

/// Count of dispatched workers that have not finished yet
#[derive(Default)]
struct InFlight {
    active: AtomicUsize,

    /// Signalled every time a worker finishes
    idle: Notify,
}

/// Held by a worker for its whole lifetime, including on panic
struct InFlightGuard {
    in_flight: Arc<InFlight>,
    _permit: OwnedSemaphorePermit,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.active.fetch_sub(1, Ordering::SeqCst);
        self.in_flight.idle.notify_one();
    }
}

/// Per-record processing shared by every worker task
struct Worker {
    options: Arc<CrawlOptions>,
    queue: Arc<dyn FrontierQueue>,
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<dyn Parser>,
    storage: Arc<dyn ResultStore>,
    stats: Arc<StatsRecorder>,
}

impl Worker {
    /// Fetches, parses, stores, and enqueues the links of one record
    ///
    /// Results are stored under `key`, the normalized address. Every failure
    /// stays local to this record.
    async fn process(&self, record: AddressRecord, key: String) {
        self.stats.record_processed();
        tracing::debug!("Fetching {} (depth {})", record.target, record.depth);

        let timeout = self.options.per_request_timeout;
        let fetched = tokio::time::timeout(timeout, self.fetcher.fetch(&record.target, timeout))
            .await
            .unwrap_or(Err(FetchError::Timeout));

        let page = match fetched {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", record.target, e);
                self.stats
                    .record_failure(format!("{}: {}", record.target, e));
                return;
            }
        };
        self.stats.record_success();

        let parsed = self.parser.parse(&page).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse {}: {}", record.target, e);
            ParsedPage::default()
        });

        if !parsed.results.is_empty() {
            if let Err(e) = self.storage.store(&key, parsed.results) {
                tracing::warn!("Failed to store results for {}: {}", record.target, e);
            }
        }

        self.stats.record_found(parsed.links.len());

        if record.depth < self.options.max_depth {
            for link in parsed.links {
                self.queue.push(record.child(link));
            }
        }
    }
}
