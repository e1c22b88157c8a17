//! Nullable work peer: scripted replies without touching the network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use powdist_peer::{PeerError, WorkGenerateMessage, WorkPeer};
use serde_json::Value;

/// One scripted outcome, delivered after an optional delay.
#[derive(Clone, Debug)]
pub struct NullReply {
    delay: Duration,
    outcome: Result<Value, String>,
}

impl NullReply {
    /// Reply with a parsed JSON body.
    pub fn json(body: Value) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Ok(body),
        }
    }

    /// Fail as if the transport broke.
    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Err(reason.into()),
        }
    }

    /// Deliver this outcome only after `delay` (uses tokio time, so it
    /// follows a paused test clock).
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Default)]
struct State {
    script: Mutex<VecDeque<NullReply>>,
    received: Mutex<Vec<WorkGenerateMessage>>,
    calls: AtomicUsize,
    completed: AtomicUsize,
}

/// A test peer that replays scripted outcomes.
///
/// Each call consumes the next scripted reply; once the script is empty the
/// fallback reply is used for every further call. Without a fallback the
/// peer fails every call.
pub struct NullWorkPeer {
    endpoint: String,
    fallback: NullReply,
    state: Arc<State>,
}

impl NullWorkPeer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            fallback: NullReply::fail("no scripted reply"),
            state: Arc::new(State::default()),
        }
    }

    /// Queue a reply for the next unscripted call.
    pub fn then(self, reply: NullReply) -> Self {
        self.state
            .script
            .lock()
            .expect("null peer script poisoned")
            .push_back(reply);
        self
    }

    /// Reply used once the script runs out.
    pub fn always(mut self, reply: NullReply) -> Self {
        self.fallback = reply;
        self
    }

    /// Number of calls started.
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// Number of calls that ran to completion (were not dropped mid-delay).
    pub fn completed(&self) -> usize {
        self.state.completed.load(Ordering::SeqCst)
    }

    /// Every message received so far.
    pub fn received(&self) -> Vec<WorkGenerateMessage> {
        self.state
            .received
            .lock()
            .expect("null peer log poisoned")
            .clone()
    }
}

impl WorkPeer for NullWorkPeer {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn work_generate(
        &self,
        message: &WorkGenerateMessage,
    ) -> BoxFuture<'static, Result<Value, PeerError>> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        self.state
            .received
            .lock()
            .expect("null peer log poisoned")
            .push(message.clone());
        let reply = self
            .state
            .script
            .lock()
            .expect("null peer script poisoned")
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        let state = Arc::clone(&self.state);

        async move {
            if !reply.delay.is_zero() {
                tokio::time::sleep(reply.delay).await;
            }
            state.completed.fetch_add(1, Ordering::SeqCst);
            reply.outcome.map_err(PeerError::Transport)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use powdist_types::WorkRequest;
    use serde_json::json;

    fn message() -> WorkGenerateMessage {
        WorkGenerateMessage::new(&WorkRequest::new("AB"))
    }

    #[tokio::test]
    async fn script_then_fallback() {
        let peer = NullWorkPeer::new("a")
            .then(NullReply::fail("down"))
            .always(NullReply::json(json!({ "work": "01" })));

        assert!(peer.work_generate(&message()).await.is_err());
        assert_eq!(peer.work_generate(&message()).await.unwrap()["work"], "01");
        assert_eq!(peer.work_generate(&message()).await.unwrap()["work"], "01");
        assert_eq!(peer.calls(), 3);
        assert_eq!(peer.completed(), 3);
        assert_eq!(peer.received()[0].hash, "AB");
    }

    #[tokio::test]
    async fn default_peer_always_fails() {
        let peer = NullWorkPeer::new("a");
        assert!(matches!(
            peer.work_generate(&message()).await,
            Err(PeerError::Transport(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_call_never_completes() {
        let peer = NullWorkPeer::new("a")
            .always(NullReply::json(json!({})).after(Duration::from_secs(1)));
        let fut = peer.work_generate(&message());
        drop(fut);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(peer.calls(), 1);
        assert_eq!(peer.completed(), 0);
    }
}
