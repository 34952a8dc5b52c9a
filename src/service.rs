use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::cache::{CacheOutcome, GraphStore, fingerprint_with_dataset};
use crate::collab::{Dataset, GraphData};
use crate::config::Configuration;
use crate::error::{GraphError, Result};
use crate::reduce::reduce;
use crate::util::CancellationToken;

#[derive(Clone, Debug)]
pub struct Generated {
    pub graph: GraphData,
    pub key: String,
    pub outcome: CacheOutcome,
}

#[derive(Clone)]
pub struct GraphService {
    dataset: Arc<Dataset>,
    store: Option<Arc<dyn GraphStore>>,
}

impl GraphService {
    pub fn new(dataset: Arc<Dataset>, store: Option<Arc<dyn GraphStore>>) -> Self {
        Self { dataset, store }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn generate(&self, config: &Configuration) -> Result<Generated> {
        let limit = config.limit()?;
        if self.dataset.is_empty() {
            return Err(GraphError::EmptyDataset);
        }

        let key = fingerprint_with_dataset(config, self.dataset.digest())?;
        let Some(store) = &self.store else {
            let graph = reduce(self.dataset.graph(), limit, config.shrink_method)?;
            return Ok(Generated {
                graph,
                key,
                outcome: CacheOutcome::Uncached,
            });
        };

        match store.read(&key) {
            Ok(Some(graph)) => {
                debug!(%key, nodes = graph.node_count(), "serving cached graph");
                return Ok(Generated {
                    graph,
                    key,
                    outcome: CacheOutcome::Hit,
                });
            }
            Ok(None) => {}
            Err(error) => warn!(%key, %error, "cache read failed; treating as a miss"),
        }

        let graph = reduce(self.dataset.graph(), limit, config.shrink_method)?;
        let outcome = match store.write(&key, &graph) {
            Ok(()) => CacheOutcome::Stored,
            Err(error) => {
                warn!(%key, %error, "cache write failed; graph computed but not persisted");
                CacheOutcome::NotPersisted
            }
        };
        info!(
            %key,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            outcome = outcome.label(),
            "generated graph"
        );
        Ok(Generated {
            graph,
            key,
            outcome,
        })
    }
}

#[derive(Clone, Debug)]
pub struct EgoResponse {
    pub artist: String,
    pub max_degree: u32,
    pub graph: GraphData,
}

struct EgoReply {
    generation: u64,
    result: Result<EgoResponse>,
}

/// Background ego-network queries where only the latest submission counts.
///
/// Submitting cancels the previous query's token, and replies carrying an
/// older generation are discarded on receipt.
pub struct EgoRequests {
    dataset: Arc<Dataset>,
    sender: Sender<EgoReply>,
    receiver: Receiver<EgoReply>,
    generation: u64,
    token: Option<CancellationToken>,
}

impl EgoRequests {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            dataset,
            sender,
            receiver,
            generation: 0,
            token: None,
        }
    }

    pub fn submit(&mut self, artist: impl Into<String>, max_degree: u32) -> u64 {
        self.cancel();
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let token = CancellationToken::new();
        self.token = Some(token.clone());

        let artist = artist.into();
        let dataset = Arc::clone(&self.dataset);
        let sender = self.sender.clone();
        thread::spawn(move || {
            let result = dataset
                .ego_network_cancellable(&artist, max_degree, &token)
                .map(|graph| EgoResponse {
                    artist: artist.clone(),
                    max_degree,
                    graph,
                });
            if token.is_cancelled() {
                debug!(%artist, generation, "dropping superseded ego result");
                return;
            }
            let _ = sender.send(EgoReply { generation, result });
        });
        generation
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.token.is_some()
    }

    pub fn poll(&mut self) -> Option<Result<EgoResponse>> {
        loop {
            match self.receiver.try_recv() {
                Ok(reply) => {
                    if let Some(result) = self.accept(reply) {
                        return Some(result);
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return None,
            }
        }
    }

    pub fn wait(&mut self, timeout: Duration) -> Option<Result<EgoResponse>> {
        let deadline = Instant::now() + timeout;
        while self.is_pending() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(reply) => {
                    if let Some(result) = self.accept(reply) {
                        return Some(result);
                    }
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
        None
    }

    fn accept(&mut self, reply: EgoReply) -> Option<Result<EgoResponse>> {
        if reply.generation != self.generation || self.token.is_none() {
            debug!(
                stale = reply.generation,
                current = self.generation,
                "discarding stale ego reply"
            );
            return None;
        }
        self.token = None;
        Some(reply.result)
    }
}

impl Drop for EgoRequests {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::cache::MemoryStore;
    use crate::collab::Adjacency;
    use crate::config::ShrinkMethod;

    fn dataset() -> Arc<Dataset> {
        let adjacency: Adjacency = serde_json::from_str(
            r#"{
                "Drake": {"Future": 6, "Rihanna": 4, "21 Savage": 3},
                "Future": {"Drake": 6, "Metro Boomin": 5},
                "Rihanna": {"Drake": 4},
                "21 Savage": {"Drake": 3, "Metro Boomin": 2},
                "Metro Boomin": {"Future": 5, "21 Savage": 2},
                "Adele": {}
            }"#,
        )
        .unwrap();
        Arc::new(Dataset::from_adjacency(&adjacency))
    }

    struct FailingStore {
        reads: AtomicUsize,
    }

    impl GraphStore for FailingStore {
        fn has(&self, _key: &str) -> Result<bool> {
            Ok(false)
        }

        fn read(&self, _key: &str) -> Result<Option<GraphData>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Err(GraphError::Cancelled)
        }

        fn write(&self, key: &str, _graph: &GraphData) -> Result<()> {
            Err(GraphError::InvalidConfig(format!("read-only store: {key}")))
        }
    }

    fn config(limit: i64) -> Configuration {
        Configuration {
            vertex_limit: limit,
            shrink_method: ShrinkMethod::ByDegree,
            ..Configuration::default()
        }
    }

    #[test]
    fn miss_then_hit() {
        let store = Arc::new(MemoryStore::new());
        let service = GraphService::new(dataset(), Some(store.clone()));
        let first = service.generate(&config(3)).unwrap();
        assert_eq!(first.outcome, CacheOutcome::Stored);
        assert_eq!(first.graph.node_count(), 3);
        assert!(store.has(&first.key).unwrap());

        let second = service.generate(&config(3)).unwrap();
        assert_eq!(second.outcome, CacheOutcome::Hit);
        assert_eq!(second.key, first.key);
        assert!(second.graph.same_structure(&first.graph));
    }

    #[test]
    fn cache_failures_do_not_fail_generation() {
        let store = Arc::new(FailingStore {
            reads: AtomicUsize::new(0),
        });
        let service = GraphService::new(dataset(), Some(store.clone()));
        let generated = service.generate(&config(2)).unwrap();
        assert_eq!(generated.outcome, CacheOutcome::NotPersisted);
        assert_eq!(generated.graph.node_count(), 2);
        assert_eq!(store.reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn invalid_config_is_rejected_before_work() {
        let store = Arc::new(FailingStore {
            reads: AtomicUsize::new(0),
        });
        let service = GraphService::new(dataset(), Some(store.clone()));
        let error = service.generate(&config(0)).unwrap_err();
        assert!(matches!(error, GraphError::InvalidConfig(_)));
        assert_eq!(store.reads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_dataset_is_not_found() {
        let service = GraphService::new(Arc::new(Dataset::default()), None);
        let error = service.generate(&config(5)).unwrap_err();
        assert!(matches!(error, GraphError::EmptyDataset));
        assert_eq!(error.to_string(), "collaboration dataset is empty: no artists found");
    }

    #[test]
    fn uncached_service_still_reduces() {
        let service = GraphService::new(dataset(), None);
        let generated = service.generate(&config(100)).unwrap();
        assert_eq!(generated.outcome, CacheOutcome::Uncached);
        assert_eq!(generated.graph.node_count(), 6);
    }

    #[test]
    fn latest_ego_request_wins() {
        let mut requests = EgoRequests::new(dataset());
        requests.submit("Rihanna", 1);
        requests.submit("Metro Boomin", 1);
        let response = requests
            .wait(Duration::from_secs(5))
            .expect("latest request replies")
            .unwrap();
        assert_eq!(response.artist, "Metro Boomin");
        assert!(response.graph.node("Metro Boomin").unwrap().is_special);
        assert!(!requests.is_pending());
        assert!(requests.poll().is_none());
    }

    #[test]
    fn stays_pending_until_the_reply_is_polled() {
        let mut requests = EgoRequests::new(dataset());
        assert!(!requests.is_pending());
        requests.submit("Drake", 1);
        assert!(requests.is_pending());

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut reply = None;
        while reply.is_none() && Instant::now() < deadline {
            assert!(requests.is_pending());
            reply = requests.poll();
            if reply.is_none() {
                thread::sleep(Duration::from_millis(5));
            }
        }
        assert!(reply.unwrap().is_ok());
        assert!(!requests.is_pending());
    }

    #[test]
    fn ego_errors_are_delivered() {
        let mut requests = EgoRequests::new(dataset());
        requests.submit("Nobody", 2);
        let result = requests.wait(Duration::from_secs(5)).unwrap();
        assert!(matches!(result, Err(GraphError::ArtistNotFound(_))));
    }

    #[test]
    fn cancelled_request_never_replies() {
        let mut requests = EgoRequests::new(dataset());
        requests.submit("Drake", 2);
        requests.cancel();
        assert!(requests.wait(Duration::from_millis(200)).is_none());
        assert!(requests.poll().is_none());
    }
}
