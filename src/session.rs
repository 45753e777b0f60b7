use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, PoisonError,
};

use tokio::task::{AbortHandle, JoinHandle};
use tracing::debug;

use crate::{book::Book, google_books_api::BookFetcher};

/// Result of the most recent search that was allowed to complete.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchOutcome {
    pub token: u64,
    pub query: String,
    pub books: Vec<Book>,
}

/// Latest issued token plus the latest accepted outcome.
#[derive(Debug, Default)]
struct ResultSlot {
    generation: AtomicU64,
    latest: Mutex<Option<SearchOutcome>>,
}

impl ResultSlot {
    /// Stores `outcome` only if its token is still the newest one issued.
    fn accept(&self, outcome: SearchOutcome) -> bool {
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::SeqCst) != outcome.token {
            debug!(
                "discarding stale results for {:?} (request {})",
                outcome.query, outcome.token
            );
            return false;
        }
        debug!(
            "{} books for {:?} (request {})",
            outcome.books.len(),
            outcome.query,
            outcome.token
        );
        *latest = Some(outcome);
        true
    }
}

/// Runs searches in the background. A new submission supersedes the one in
/// flight: the older task is aborted, and if it still finishes first its
/// books are discarded because its token is no longer current.
pub struct SearchSession {
    fetcher: Arc<BookFetcher>,
    slot: Arc<ResultSlot>,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl SearchSession {
    pub fn new(fetcher: BookFetcher) -> SearchSession {
        SearchSession {
            fetcher: Arc::new(fetcher),
            slot: Arc::new(ResultSlot::default()),
            in_flight: Mutex::new(None),
        }
    }

    /// Spawns a search for `query`. The handle resolves to `true` when the
    /// result was accepted as the latest one. Must be called inside a tokio
    /// runtime.
    pub fn submit(&self, query: impl Into<String>) -> JoinHandle<bool> {
        let query = query.into();

        // Held until the new handle is registered so that tokens and aborts
        // are issued in the same order across concurrent callers.
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        let token = self.slot.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let fetcher = Arc::clone(&self.fetcher);
        let slot = Arc::clone(&self.slot);
        let handle = tokio::spawn(async move {
            let books = fetcher.search(&query).await;
            slot.accept(SearchOutcome {
                token,
                query,
                books,
            })
        });

        if let Some(previous) = in_flight.replace(handle.abort_handle()) {
            previous.abort();
        }

        handle
    }

    /// Token of the most recent submission, 0 before the first one.
    pub fn current_token(&self) -> u64 {
        self.slot.generation.load(Ordering::SeqCst)
    }

    pub fn latest(&self) -> Option<SearchOutcome> {
        self.slot
            .latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google_books_api::FetchConfig;

    fn unreachable_session() -> SearchSession {
        // Port 9 (discard) on localhost refuses connections, so every search is empty.
        let fetcher = BookFetcher::new(FetchConfig {
            endpoint: "http://127.0.0.1:9/volumes".to_string(),
            ..FetchConfig::default()
        })
        .unwrap();
        SearchSession::new(fetcher)
    }

    #[tokio::test]
    async fn tokens_increase_with_each_submission() {
        let session = unreachable_session();
        assert_eq!(session.current_token(), 0);
        let first = session.submit("one");
        let second = session.submit("two");
        assert_eq!(session.current_token(), 2);

        assert!(second.await.unwrap());
        let _ = first.await;
        let latest = session.latest().unwrap();
        assert_eq!(latest.token, 2);
        assert_eq!(latest.query, "two");
    }

    #[tokio::test]
    async fn failed_search_is_accepted_as_empty_result() {
        let session = unreachable_session();
        assert!(session.submit("anything").await.unwrap());
        let latest = session.latest().unwrap();
        assert!(latest.books.is_empty());
    }

    #[test]
    fn nothing_is_latest_before_a_search() {
        assert_eq!(unreachable_session().latest(), None);
    }

    fn outcome(token: u64, query: &str) -> SearchOutcome {
        SearchOutcome {
            token,
            query: query.to_string(),
            books: vec![],
        }
    }

    #[test]
    fn stale_token_is_not_accepted() {
        let slot = ResultSlot::default();
        slot.generation.store(2, Ordering::SeqCst);

        assert!(!slot.accept(outcome(1, "old")));
        assert_eq!(*slot.latest.lock().unwrap(), None);

        assert!(slot.accept(outcome(2, "new")));
        assert!(!slot.accept(outcome(1, "old")));
        assert_eq!(slot.latest.lock().unwrap().as_ref().unwrap().query, "new");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_submitters_always_keep_the_newest_search() {
        let session = Arc::new(unreachable_session());
        let runtime = tokio::runtime::Handle::current();

        for round in 0..50 {
            let barrier = Arc::new(std::sync::Barrier::new(8));
            let threads: Vec<_> = (0..8)
                .map(|n| {
                    let session = Arc::clone(&session);
                    let barrier = Arc::clone(&barrier);
                    let runtime = runtime.clone();
                    std::thread::spawn(move || {
                        let _guard = runtime.enter();
                        barrier.wait();
                        session.submit(format!("round {round} caller {n}"))
                    })
                })
                .collect();

            let handles: Vec<_> = threads.into_iter().map(|t| t.join().unwrap()).collect();
            for handle in handles {
                let _ = handle.await;
            }

            assert_eq!(
                session.latest().map(|o| o.token),
                Some(session.current_token()),
                "newest search lost in round {round}"
            );
        }
    }
}
