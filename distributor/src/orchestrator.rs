//! Race orchestrator: fan a work request out to every backend node, take
//! the first valid reply, retry whole rounds on total failure, and cache
//! the winner.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use powdist_peer::{HttpWorkPeer, WorkGenerateMessage, WorkPeer};
use powdist_types::{WorkRequest, WorkResult};
use powdist_work::{NanoWorkValidator, WorkCache, WorkValidator};
use tokio::task::JoinSet;
use tracing::{debug, info, warn, Instrument};

use crate::fetcher::fetch_work;
use crate::tracing_spans::{node_fetch_span, pow_request_span, race_attempt_span};
use crate::{DistributorConfig, DistributorError, DistributorMetrics};

/// Tuning for the attempt loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RaceSettings {
    /// Fan-out rounds tried before giving up.
    pub max_attempts: u32,
    /// Abort the losing node calls of a round once a winner is found.
    /// When false they are detached and run to completion unobserved.
    pub cancel_losing_calls: bool,
    pub cache_capacity: usize,
}

impl Default for RaceSettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            cancel_losing_calls: true,
            cache_capacity: powdist_work::DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl From<&DistributorConfig> for RaceSettings {
    fn from(config: &DistributorConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            cancel_losing_calls: config.cancel_losing_calls,
            cache_capacity: config.cache_capacity,
        }
    }
}

/// Distributes work requests across a fixed set of backend nodes.
///
/// One instance is shared by every in-flight request. The node list is
/// immutable; the cache is the only shared mutable state and sits behind a
/// mutex that is never held across an `.await`.
pub struct WorkDistributor {
    peers: Vec<Arc<dyn WorkPeer>>,
    validator: Arc<dyn WorkValidator>,
    cache: Mutex<WorkCache>,
    settings: RaceSettings,
    metrics: Arc<DistributorMetrics>,
}

impl WorkDistributor {
    pub fn new(
        peers: Vec<Arc<dyn WorkPeer>>,
        validator: Arc<dyn WorkValidator>,
        settings: RaceSettings,
        metrics: Arc<DistributorMetrics>,
    ) -> Self {
        Self {
            peers,
            validator,
            cache: Mutex::new(WorkCache::new(settings.cache_capacity)),
            settings,
            metrics,
        }
    }

    /// Build a distributor talking HTTP to every configured node, all
    /// sharing one connection pool, validating with Nano's work algorithm.
    pub fn from_config(
        config: &DistributorConfig,
        metrics: Arc<DistributorMetrics>,
    ) -> Result<Self, DistributorError> {
        config.validate()?;
        let http = HttpWorkPeer::build_client(config.request_timeout(), config.connect_timeout())?;
        let peers = config
            .urls
            .iter()
            .map(|url| Arc::new(HttpWorkPeer::new(http.clone(), url.clone())) as Arc<dyn WorkPeer>)
            .collect();
        Ok(Self::new(
            peers,
            Arc::new(NanoWorkValidator::new()),
            RaceSettings::from(config),
            metrics,
        ))
    }

    pub fn metrics(&self) -> &Arc<DistributorMetrics> {
        &self.metrics
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    pub fn settings(&self) -> RaceSettings {
        self.settings
    }

    /// Cached result for `hash`, refreshing its recency.
    pub fn cached(&self, hash: &str) -> Option<WorkResult> {
        self.lock_cache().get(hash)
    }

    pub fn cache_len(&self) -> usize {
        self.lock_cache().len()
    }

    /// Obtain valid work for `request`.
    ///
    /// Served from cache when possible. Otherwise every node is asked at
    /// once and the first valid reply, in completion order, wins and is
    /// cached. A round where every node fails is retried immediately, up to
    /// `max_attempts` rounds.
    pub async fn generate(&self, request: &WorkRequest) -> Result<WorkResult, DistributorError> {
        self.generate_inner(request)
            .instrument(pow_request_span(&request.hash))
            .await
    }

    async fn generate_inner(&self, request: &WorkRequest) -> Result<WorkResult, DistributorError> {
        self.metrics.requests.inc();

        if let Some(hit) = self.cached(&request.hash) {
            self.metrics.cache_hits.inc();
            debug!("served from cache");
            return Ok(hit);
        }

        let started = Instant::now();
        let message = WorkGenerateMessage::new(request);
        let max_attempts = self.settings.max_attempts;

        for attempt in 1..=max_attempts {
            let winner = self
                .race(request, &message)
                .instrument(race_attempt_span(attempt))
                .await;

            if let Some(result) = winner {
                let entries = {
                    let mut cache = self.lock_cache();
                    if let Some(evicted) = cache.set(request.hash.clone(), result.clone()) {
                        debug!(evicted = %evicted, "evicted least recently used work");
                    }
                    cache.len()
                };
                self.metrics.cache_entries.set(entries as i64);

                let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                self.metrics.race_latency_ms.observe(elapsed_ms);
                info!(attempt, elapsed_ms, "work generated");
                return Ok(result);
            }

            self.metrics.attempts_failed.inc();
            warn!(attempt, max_attempts, "every node failed this attempt");
        }

        self.metrics.requests_failed.inc();
        warn!(attempts = max_attempts, "no node produced valid work");
        Err(DistributorError::Exhausted {
            attempts: max_attempts,
        })
    }

    /// One fan-out round. Returns the first valid reply to complete.
    async fn race(
        &self,
        request: &WorkRequest,
        message: &WorkGenerateMessage,
    ) -> Option<WorkResult> {
        let mut calls = JoinSet::new();
        for peer in &self.peers {
            let peer = Arc::clone(peer);
            let validator = Arc::clone(&self.validator);
            let metrics = Arc::clone(&self.metrics);
            let request = request.clone();
            let message = message.clone();
            let span = node_fetch_span(peer.endpoint());

            calls.spawn(
                async move {
                    fetch_work(
                        peer.as_ref(),
                        validator.as_ref(),
                        &request,
                        &message,
                        &metrics,
                    )
                    .await
                }
                .instrument(span),
            );
        }

        while let Some(joined) = calls.join_next().await {
            match joined {
                Ok(Some(result)) => {
                    if self.settings.cancel_losing_calls {
                        calls.abort_all();
                    } else {
                        calls.detach_all();
                    }
                    return Some(result);
                }
                Ok(None) => {}
                Err(e) => debug!(error = %e, "node call task did not finish"),
            }
        }
        None
    }

    fn lock_cache(&self) -> MutexGuard<'_, WorkCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use powdist_nullables::{NullReply, NullWorkPeer, NullWorkValidator};
    use powdist_types::DifficultyParam;
    use serde_json::json;
    use std::time::Duration;

    const HASH: &str = "718CC2121C3E641059BC1C2CFC45666C99E8AE922F7A807B7D07B62C995D79E2";
    const GOOD_WORK: &str = "2b3d689bbcb21dca";

    fn good_reply(node: &str) -> NullReply {
        NullReply::json(json!({ "work": GOOD_WORK, "hash": HASH, "node": node }))
    }

    fn distributor(peers: Vec<Arc<NullWorkPeer>>, settings: RaceSettings) -> WorkDistributor {
        WorkDistributor::new(
            peers.into_iter().map(|p| p as Arc<dyn WorkPeer>).collect(),
            Arc::new(NanoWorkValidator::new()),
            settings,
            Arc::new(DistributorMetrics::new()),
        )
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn fastest_valid_node_wins() {
        let a = Arc::new(NullWorkPeer::new("a").always(good_reply("a").after(ms(200))));
        let b = Arc::new(NullWorkPeer::new("b").always(good_reply("b").after(ms(50))));
        let c = Arc::new(NullWorkPeer::new("c").always(good_reply("c").after(ms(200))));
        let dist = distributor(vec![a.clone(), b.clone(), c.clone()], RaceSettings::default());

        let result = dist.generate(&WorkRequest::new(HASH)).await.unwrap();
        assert_eq!(result.get("node"), Some(&json!("b")));
        assert_eq!(dist.cached(HASH).unwrap().get("node"), Some(&json!("b")));
        assert_eq!((a.calls(), b.calls(), c.calls()), (1, 1, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn fast_invalid_reply_does_not_win() {
        let cheat = Arc::new(
            NullWorkPeer::new("cheat")
                .always(NullReply::json(json!({ "work": "0000000000000000", "node": "cheat" }))),
        );
        let slow = Arc::new(NullWorkPeer::new("slow").always(good_reply("slow").after(ms(300))));
        let dist = distributor(vec![cheat, slow], RaceSettings::default());

        let result = dist.generate(&WorkRequest::new(HASH)).await.unwrap();
        assert_eq!(result.get("node"), Some(&json!("slow")));
        assert_eq!(dist.metrics().work_rejected.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cache_hit_skips_nodes() {
        let a = Arc::new(NullWorkPeer::new("a").always(good_reply("a")));
        let dist = distributor(vec![a.clone()], RaceSettings::default());

        let first = dist.generate(&WorkRequest::new(HASH)).await.unwrap();
        let second = dist.generate(&WorkRequest::new(HASH)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(a.calls(), 1);
        assert_eq!(dist.metrics().cache_hits.get(), 1);
        assert_eq!(dist.metrics().requests.get(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_an_attempt_succeeds() {
        let a = Arc::new(
            NullWorkPeer::new("a")
                .then(NullReply::fail("down"))
                .then(NullReply::json(json!({ "error": "busy" })))
                .always(good_reply("a").after(ms(10))),
        );
        let b = Arc::new(NullWorkPeer::new("b"));
        let dist = distributor(vec![a.clone(), b.clone()], RaceSettings::default());

        let result = dist.generate(&WorkRequest::new(HASH)).await.unwrap();
        assert_eq!(result.get("node"), Some(&json!("a")));
        assert_eq!(a.calls(), 3);
        assert_eq!(b.calls(), 3);
        assert_eq!(dist.metrics().attempts_failed.get(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_leaves_cache_unchanged() {
        let a = Arc::new(NullWorkPeer::new("a"));
        let b = Arc::new(
            NullWorkPeer::new("b").always(NullReply::json(json!({ "work": "0000000000000000" }))),
        );
        let settings = RaceSettings {
            max_attempts: 3,
            ..Default::default()
        };
        let dist = distributor(vec![a.clone(), b.clone()], settings);

        let err = dist.generate(&WorkRequest::new(HASH)).await.unwrap_err();
        assert!(matches!(err, DistributorError::Exhausted { attempts: 3 }));
        assert_eq!(a.calls(), 3);
        assert_eq!(b.calls(), 3);
        assert_eq!(dist.cache_len(), 0);
        assert_eq!(dist.metrics().requests_failed.get(), 1);
    }

    #[tokio::test]
    async fn no_peers_fails_every_attempt() {
        let dist = distributor(Vec::new(), RaceSettings::default());
        let err = dist.generate(&WorkRequest::new(HASH)).await.unwrap_err();
        assert!(matches!(err, DistributorError::Exhausted { attempts: 5 }));
        assert_eq!(dist.metrics().attempts_failed.get(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn losing_calls_are_cancelled() {
        let fast = Arc::new(NullWorkPeer::new("fast").always(good_reply("fast").after(ms(10))));
        let slow = Arc::new(NullWorkPeer::new("slow").always(good_reply("slow").after(ms(500))));
        let dist = distributor(vec![fast.clone(), slow.clone()], RaceSettings::default());

        dist.generate(&WorkRequest::new(HASH)).await.unwrap();
        tokio::time::sleep(ms(1000)).await;

        assert_eq!(slow.calls(), 1);
        assert_eq!(slow.completed(), 0);
        assert_eq!(dist.metrics().work_accepted.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn detached_losers_finish_without_overwriting_cache() {
        let fast = Arc::new(NullWorkPeer::new("fast").always(good_reply("fast").after(ms(10))));
        let slow = Arc::new(NullWorkPeer::new("slow").always(good_reply("slow").after(ms(500))));
        let settings = RaceSettings {
            cancel_losing_calls: false,
            ..Default::default()
        };
        let dist = distributor(vec![fast, slow.clone()], settings);

        dist.generate(&WorkRequest::new(HASH)).await.unwrap();
        tokio::time::sleep(ms(1000)).await;

        assert_eq!(slow.completed(), 1);
        assert_eq!(dist.metrics().work_accepted.get(), 2);
        assert_eq!(dist.cached(HASH).unwrap().get("node"), Some(&json!("fast")));
    }

    #[tokio::test(start_paused = true)]
    async fn forwards_difficulty_but_validates_against_reply() {
        let a = Arc::new(NullWorkPeer::new("a").always(good_reply("a")));
        let validator = Arc::new(NullWorkValidator::accept_all());
        let dist = WorkDistributor::new(
            vec![a.clone() as Arc<dyn WorkPeer>],
            validator.clone(),
            RaceSettings::default(),
            Arc::new(DistributorMetrics::new()),
        );
        let request =
            WorkRequest::new(HASH).with_difficulty(DifficultyParam::Hex("fffffe0000000000".into()));

        dist.generate(&request).await.unwrap();

        let sent = &a.received()[0];
        assert_eq!(sent.action, "work_generate");
        assert_eq!(sent.difficulty, request.difficulty);
        assert_eq!(validator.checks()[0].difficulty, None);
    }

    #[tokio::test(start_paused = true)]
    async fn cache_is_bounded_across_requests() {
        let a = Arc::new(NullWorkPeer::new("a").always(NullReply::json(json!({ "work": "w" }))));
        let settings = RaceSettings {
            cache_capacity: 2,
            ..Default::default()
        };
        let dist = WorkDistributor::new(
            vec![a.clone() as Arc<dyn WorkPeer>],
            Arc::new(NullWorkValidator::accept_all()),
            settings,
            Arc::new(DistributorMetrics::new()),
        );

        for hash in ["h1", "h2", "h3"] {
            dist.generate(&WorkRequest::new(hash)).await.unwrap();
        }
        assert_eq!(dist.cache_len(), 2);
        assert!(dist.cached("h1").is_none());
        assert!(dist.cached("h2").is_some());
        assert!(dist.cached("h3").is_some());
        assert_eq!(dist.metrics().cache_entries.get(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_requests_share_one_cache() {
        let a = Arc::new(NullWorkPeer::new("a").always(NullReply::json(json!({ "work": "w" }))));
        let dist = Arc::new(WorkDistributor::new(
            vec![a as Arc<dyn WorkPeer>],
            Arc::new(NullWorkValidator::accept_all()),
            RaceSettings {
                cache_capacity: 16,
                ..Default::default()
            },
            Arc::new(DistributorMetrics::new()),
        ));

        let mut tasks = JoinSet::new();
        for i in 0..64 {
            let dist = Arc::clone(&dist);
            tasks.spawn(async move { dist.generate(&WorkRequest::new(format!("h{i}"))).await });
        }
        while let Some(joined) = tasks.join_next().await {
            assert!(joined.unwrap().is_ok());
        }
        assert_eq!(dist.cache_len(), 16);
    }
}
