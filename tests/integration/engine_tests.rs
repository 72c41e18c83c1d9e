//! Engine behavior tests
//!
//! These tests replace the HTTP fetcher with an in-process link graph so
//! concurrency, depth, and lifecycle properties can be checked precisely.

use async_trait::async_trait;
use fathom::crawler::{FetchError, Fetcher, Page, ParseError, ParsedPage, Parser};
use fathom::frontier::DepthPriorityQueue;
use fathom::state::{DuplicateTracker, EngineState};
use fathom::storage::{ResultStore, SqliteDuplicateTracker, StorageError, StorageResult};
use fathom::{CrawlError, CrawlOptions, CrawlOutcome, Engine, ExtractedResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const SITE: &str = "http://site.test";

fn page_url(name: &str) -> String {
    format!("{}/{}", SITE, name)
}

/// Serves pages from a fixed link graph and records every fetch
#[derive(Default)]
struct GraphFetcher {
    /// Target -> absolute links on that page; unknown targets are 404s
    graph: HashMap<String, Vec<String>>,

    /// Pages without a graph entry get two generated children instead of a 404
    endless: bool,

    delay: Duration,
    fetches: Mutex<HashMap<String, usize>>,
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl GraphFetcher {
    fn new(edges: &[(&str, &[&str])]) -> Self {
        let graph: HashMap<String, Vec<String>> = edges
            .iter()
            .map(|(from, to)| (page_url(from), to.iter().map(|t| page_url(t)).collect()))
            .collect();

        Self {
            graph,
            ..Self::default()
        }
    }

    fn endless(delay: Duration) -> Self {
        Self {
            endless: true,
            delay,
            ..Self::default()
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn fetch_count(&self, name: &str) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .get(&page_url(name))
            .copied()
            .unwrap_or(0)
    }

    fn total_fetches(&self) -> usize {
        self.fetches.lock().unwrap().values().sum()
    }

    fn links_for(&self, target: &str) -> Option<Vec<String>> {
        match self.graph.get(target) {
            Some(links) => Some(links.clone()),
            None if self.endless => Some(vec![format!("{}/a", target), format!("{}/b", target)]),
            None => None,
        }
    }
}

#[async_trait]
impl Fetcher for GraphFetcher {
    async fn fetch(&self, target: &str, _timeout: Duration) -> Result<Page, FetchError> {
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(target.to_string())
            .or_insert(0) += 1;

        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.current.fetch_sub(1, Ordering::SeqCst);

        let links = self.links_for(target).ok_or(FetchError::Status(404))?;
        let anchors: String = links
            .iter()
            .map(|link| format!(r#"<a href="{}">link</a>"#, link))
            .collect();

        Ok(Page::new(
            target,
            format!(
                "<html><head><title>{}</title></head><body>{}</body></html>",
                target, anchors
            ),
        ))
    }
}

/// Rejects every page
struct FailingParser;

impl Parser for FailingParser {
    fn parse(&self, page: &Page) -> Result<ParsedPage, ParseError> {
        Err(ParseError::Malformed(page.target.clone()))
    }
}

/// Refuses every write
struct FailingStore;

impl ResultStore for FailingStore {
    fn store(&self, _target: &str, _results: Vec<ExtractedResult>) -> StorageResult<()> {
        Err(StorageError::Database("disk full".to_string()))
    }

    fn get(&self, _target: &str) -> StorageResult<Option<Vec<ExtractedResult>>> {
        Ok(None)
    }

    fn get_all(&self) -> StorageResult<HashMap<String, Vec<ExtractedResult>>> {
        Ok(HashMap::new())
    }

    fn clear(&self) -> StorageResult<()> {
        Ok(())
    }

    fn len(&self) -> StorageResult<usize> {
        Ok(0)
    }
}

fn test_options(max_depth: u32, concurrency: usize) -> CrawlOptions {
    CrawlOptions {
        max_depth,
        concurrency,
        global_timeout: Duration::from_secs(30),
        per_request_timeout: Duration::from_secs(5),
        request_delay: Duration::ZERO,
        ..CrawlOptions::default()
    }
}

fn test_engine(options: CrawlOptions, fetcher: &Arc<GraphFetcher>) -> Engine {
    let fetcher: Arc<dyn Fetcher> = fetcher.clone();
    Engine::new(options).unwrap().with_fetcher(fetcher)
}

#[tokio::test]
async fn test_depth_zero_fetches_only_seeds() {
    let fetcher = Arc::new(GraphFetcher::new(&[
        ("a", &["c", "d"]),
        ("b", &["e"]),
        ("c", &[]),
    ]));
    let engine = test_engine(test_options(0, 4), &fetcher);
    engine.add_url(&page_url("a")).unwrap();
    engine.add_url(&page_url("b")).unwrap();

    assert_eq!(engine.start().await.unwrap(), CrawlOutcome::Completed);

    assert_eq!(fetcher.fetch_count("a"), 1);
    assert_eq!(fetcher.fetch_count("b"), 1);
    assert_eq!(fetcher.total_fetches(), 2);

    let stats = engine.stats();
    assert_eq!(stats.urls_processed, 2);
    assert_eq!(stats.urls_found, 3);
}

#[tokio::test]
async fn test_deep_chain_respects_max_depth() {
    let names: Vec<String> = (0..20).map(|i| format!("p{}", i)).collect();
    let edges: Vec<(&str, Vec<&str>)> = names
        .windows(2)
        .map(|pair| (pair[0].as_str(), vec![pair[1].as_str()]))
        .collect();
    let edges: Vec<(&str, &[&str])> = edges
        .iter()
        .map(|(from, to)| (*from, to.as_slice()))
        .collect();

    let fetcher = Arc::new(GraphFetcher::new(&edges));
    let engine = test_engine(test_options(3, 2), &fetcher);
    engine.add_url(&page_url("p0")).unwrap();

    assert_eq!(engine.start().await.unwrap(), CrawlOutcome::Completed);

    for name in ["p0", "p1", "p2", "p3"] {
        assert_eq!(fetcher.fetch_count(name), 1, "{} should be fetched once", name);
    }
    assert_eq!(fetcher.fetch_count("p4"), 0);
    assert_eq!(fetcher.total_fetches(), 4);
}

#[tokio::test]
async fn test_every_page_fetched_once() {
    // Dense graph with cycles, self links, and dead links
    let fetcher = Arc::new(GraphFetcher::new(&[
        ("root", &["a", "b", "c", "root"]),
        ("a", &["b", "c", "missing1"]),
        ("b", &["a", "c", "d"]),
        ("c", &["root", "d", "missing2"]),
        ("d", &["a", "b", "c", "d", "missing1"]),
    ]));
    let engine = test_engine(test_options(10, 3), &fetcher);
    engine.add_url(&page_url("root")).unwrap();

    assert_eq!(engine.start().await.unwrap(), CrawlOutcome::Completed);

    for name in ["root", "a", "b", "c", "d", "missing1", "missing2"] {
        assert_eq!(fetcher.fetch_count(name), 1, "{} should be fetched once", name);
    }

    let stats = engine.stats();
    assert_eq!(stats.urls_processed, 7);
    assert_eq!(stats.pages_succeeded, 5);
    assert_eq!(stats.pages_failed, 2);
    assert_eq!(
        stats.urls_processed,
        stats.pages_succeeded + stats.pages_failed
    );
    assert!(stats.last_error.unwrap().contains("missing"));

    // Results are stored for successful pages only
    assert_eq!(engine.storage().len().unwrap(), 5);
}

#[tokio::test]
async fn test_concurrency_bound_respected() {
    let children: Vec<String> = (0..30).map(|i| format!("child{}", i)).collect();
    let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();
    let mut edges: Vec<(&str, &[&str])> = vec![("root", child_refs.as_slice())];
    for child in &child_refs {
        edges.push((*child, &[]));
    }

    let fetcher = Arc::new(GraphFetcher::new(&edges).with_delay(Duration::from_millis(20)));
    let engine = test_engine(test_options(1, 3), &fetcher);
    engine.add_url(&page_url("root")).unwrap();

    assert_eq!(engine.start().await.unwrap(), CrawlOutcome::Completed);

    let peak = fetcher.peak.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak concurrency was {}", peak);
    assert!(peak >= 2, "workers never overlapped");
    assert_eq!(fetcher.total_fetches(), 31);
    assert_eq!(fetcher.current.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_duplicate_seeds_fetched_once() {
    let fetcher = Arc::new(GraphFetcher::new(&[("home", &[])]));
    let engine = test_engine(test_options(2, 4), &fetcher);
    engine.add_url(&page_url("home")).unwrap();
    engine.add_url(&format!("{}/", page_url("home"))).unwrap();
    engine.add_url(&format!("{}#section", page_url("home"))).unwrap();

    assert_eq!(engine.start().await.unwrap(), CrawlOutcome::Completed);
    assert_eq!(fetcher.fetch_count("home"), 1);
    assert_eq!(engine.stats().urls_processed, 1);
}

#[tokio::test]
async fn test_stop_cancels_run() {
    let fetcher = Arc::new(GraphFetcher::endless(Duration::from_millis(10)));
    let engine = Arc::new(test_engine(
        CrawlOptions {
            global_timeout: Duration::ZERO,
            ..test_options(1_000, 4)
        },
        &fetcher,
    ));
    engine.add_url(&page_url("start")).unwrap();

    let stopper = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            engine.stop();
        })
    };

    let started = Instant::now();
    assert_eq!(engine.start().await.unwrap(), CrawlOutcome::Cancelled);
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(engine.state(), EngineState::Cancelled);
    stopper.await.unwrap();

    // In-flight workers were drained before start returned
    assert_eq!(fetcher.current.load(Ordering::SeqCst), 0);

    let processed = engine.stats().urls_processed;
    assert!(processed > 0);

    // Nothing is dispatched after the run ended
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(engine.stats().urls_processed, processed);
}

#[tokio::test]
async fn test_global_timeout() {
    let fetcher = Arc::new(GraphFetcher::endless(Duration::from_millis(10)));
    let engine = test_engine(
        CrawlOptions {
            global_timeout: Duration::from_millis(200),
            ..test_options(1_000, 4)
        },
        &fetcher,
    );
    engine.add_url(&page_url("start")).unwrap();

    let started = Instant::now();
    assert_eq!(engine.start().await.unwrap(), CrawlOutcome::TimedOut);
    assert!(started.elapsed() >= Duration::from_millis(200));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(engine.state(), EngineState::TimedOut);
    assert_eq!(fetcher.current.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_stop_after_completion_is_noop() {
    let fetcher = Arc::new(GraphFetcher::new(&[("home", &[])]));
    let engine = test_engine(test_options(1, 1), &fetcher);
    engine.add_url(&page_url("home")).unwrap();

    assert_eq!(engine.start().await.unwrap(), CrawlOutcome::Completed);
    engine.stop();

    assert_eq!(engine.state(), EngineState::Completed);
    assert!(matches!(
        engine.start().await,
        Err(CrawlError::AlreadyStarted(EngineState::Completed))
    ));
}

#[tokio::test]
async fn test_parse_failure_does_not_abort_run() {
    let fetcher = Arc::new(GraphFetcher::new(&[("a", &[]), ("b", &[])]));
    let engine = test_engine(test_options(2, 2), &fetcher).with_parser(Arc::new(FailingParser));
    engine.add_url(&page_url("a")).unwrap();
    engine.add_url(&page_url("b")).unwrap();

    assert_eq!(engine.start().await.unwrap(), CrawlOutcome::Completed);

    let stats = engine.stats();
    assert_eq!(stats.pages_succeeded, 2);
    assert_eq!(stats.pages_failed, 0);
    assert_eq!(stats.urls_found, 0);
    assert!(engine.storage().is_empty().unwrap());
}

#[tokio::test]
async fn test_storage_failure_still_follows_links() {
    let fetcher = Arc::new(GraphFetcher::new(&[
        ("root", &["a", "b"]),
        ("a", &[]),
        ("b", &[]),
    ]));
    let engine = test_engine(test_options(2, 2), &fetcher).with_storage(Arc::new(FailingStore));
    engine.add_url(&page_url("root")).unwrap();

    assert_eq!(engine.start().await.unwrap(), CrawlOutcome::Completed);

    let stats = engine.stats();
    assert_eq!(stats.urls_processed, 3);
    assert_eq!(stats.pages_succeeded, 3);
    assert!(stats.last_error.is_none());
}

#[tokio::test]
async fn test_priority_queue_crawl() {
    let fetcher = Arc::new(GraphFetcher::new(&[
        ("root", &["a", "b"]),
        ("a", &["c"]),
        ("b", &["c", "d"]),
        ("c", &[]),
        ("d", &["e"]),
    ]));
    let engine = test_engine(test_options(2, 2), &fetcher)
        .with_queue(Arc::new(DepthPriorityQueue::new()));
    engine.add_url(&page_url("root")).unwrap();

    assert_eq!(engine.start().await.unwrap(), CrawlOutcome::Completed);

    assert_eq!(fetcher.total_fetches(), 5);
    assert_eq!(fetcher.fetch_count("e"), 0);
}

#[tokio::test]
async fn test_sqlite_tracker_shared_between_runs() {
    let tracker = Arc::new(SqliteDuplicateTracker::open_in_memory().unwrap());
    let fetcher = Arc::new(GraphFetcher::new(&[("root", &["a"]), ("a", &["b"]), ("b", &[])]));

    let first = test_engine(test_options(1, 2), &fetcher).with_tracker(tracker.clone());
    first.add_url(&page_url("root")).unwrap();
    assert_eq!(first.start().await.unwrap(), CrawlOutcome::Completed);
    assert_eq!(tracker.count().unwrap(), 2);

    // A deeper second run only reaches what the first one left behind
    let second = test_engine(test_options(2, 2), &fetcher).with_tracker(tracker.clone());
    second.add_url(&page_url("root")).unwrap();
    second.add_url(&page_url("b")).unwrap();
    assert_eq!(second.start().await.unwrap(), CrawlOutcome::Completed);

    assert_eq!(fetcher.fetch_count("root"), 1);
    assert_eq!(fetcher.fetch_count("b"), 1);
    assert!(tracker.is_duplicate(&page_url("b")));
}

#[tokio::test]
async fn test_stop_during_delay_keeps_target_for_next_run() {
    let tracker = Arc::new(SqliteDuplicateTracker::open_in_memory().unwrap());
    let fetcher = Arc::new(GraphFetcher::new(&[("root", &[])]));

    let options = CrawlOptions {
        request_delay: Duration::from_millis(500),
        ..test_options(1, 1)
    };
    let first = Arc::new(test_engine(options, &fetcher).with_tracker(tracker.clone()));
    first.add_url(&page_url("root")).unwrap();

    let stopper = {
        let engine = Arc::clone(&first);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            engine.stop();
        })
    };

    assert_eq!(first.start().await.unwrap(), CrawlOutcome::Cancelled);
    stopper.await.unwrap();
    assert_eq!(fetcher.total_fetches(), 0);
    assert_eq!(tracker.count().unwrap(), 0);
    assert!(!tracker.is_duplicate(&page_url("root")));

    // The interrupted target is still crawled by the next run over the same tracker
    let second = test_engine(test_options(1, 1), &fetcher).with_tracker(tracker.clone());
    second.add_url(&page_url("root")).unwrap();
    assert_eq!(second.start().await.unwrap(), CrawlOutcome::Completed);

    assert_eq!(fetcher.fetch_count("root"), 1);
    assert!(tracker.is_duplicate(&page_url("root")));
}
