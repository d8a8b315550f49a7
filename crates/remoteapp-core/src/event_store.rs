//! Broadcast + history store of RAIL channel events.

use std::{
    collections::VecDeque,
    sync::{PoisonError, RwLock},
};

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::AbortStatus;

/// Default number of events kept for late observers.
const HISTORY_EVENTS: usize = 256;

/// Something that happened on the RAIL channel of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RailEvent {
    /// Channel is up and handlers are installed.
    ChannelConnected,
    /// Server handshake received.
    HandshakeReceived { extended: bool },
    /// All four startup orders were sent.
    HandshakeCompleted,
    /// A startup order failed to send.
    HandshakeFailed { code: u32 },
    /// Server reported the outcome of the execute request.
    ExecuteResult { code: u16, raw_result: u32 },
    /// The owning session was aborted.
    SessionAborted { status: AbortStatus, reason: String },
}

/// Event store with broadcast and history support.
///
/// Observers attaching late receive history first, then live events.
pub struct RailEventStore {
    history: RwLock<VecDeque<RailEvent>>,
    limit: usize,
    sender: broadcast::Sender<RailEvent>,
}

impl Default for RailEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RailEventStore {
    /// Create a store with the default history limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limit(HISTORY_EVENTS)
    }

    /// Create a store keeping at most `limit` events of history.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        let (sender, _) = broadcast::channel(limit.max(1));
        Self {
            history: RwLock::new(VecDeque::with_capacity(limit.min(32))),
            limit,
            sender,
        }
    }

    /// Push an event to both live listeners and history.
    pub fn push(&self, event: RailEvent) {
        // Broadcast and record under one lock so a subscriber sees each event
        // in exactly one of the two.
        let mut history = self.history.write().unwrap_or_else(PoisonError::into_inner);
        let _ = self.sender.send(event.clone()); // live listeners

        while history.len() >= self.limit {
            if history.pop_front().is_none() {
                break;
            }
        }
        if self.limit > 0 {
            history.push_back(event);
        }
    }

    /// Get a receiver for live updates.
    #[must_use]
    pub fn get_receiver(&self) -> broadcast::Receiver<RailEvent> {
        self.sender.subscribe()
    }

    /// Get a snapshot of the history.
    #[must_use]
    pub fn get_history(&self) -> Vec<RailEvent> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Stream that yields history first, then live updates.
    #[must_use]
    pub fn history_plus_stream(&self) -> futures::stream::BoxStream<'static, RailEvent> {
        let (history, rx) = {
            let guard = self.history.read().unwrap_or_else(PoisonError::into_inner);
            let rx = self.sender.subscribe();
            (guard.iter().cloned().collect::<Vec<_>>(), rx)
        };

        let hist = futures::stream::iter(history);
        let live = BroadcastStream::new(rx).filter_map(|res| async move { res.ok() });

        Box::pin(hist.chain(live))
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread, time::Duration};

    use futures::StreamExt;

    use super::*;

    #[test]
    fn test_history_is_bounded() {
        let store = RailEventStore::with_limit(2);
        store.push(RailEvent::ChannelConnected);
        store.push(RailEvent::HandshakeReceived { extended: false });
        store.push(RailEvent::HandshakeCompleted);

        assert_eq!(
            store.get_history(),
            vec![
                RailEvent::HandshakeReceived { extended: false },
                RailEvent::HandshakeCompleted,
            ]
        );
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_string(&RailEvent::ExecuteResult {
            code: 6,
            raw_result: 1,
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"execute_result","code":6,"raw_result":1}"#);
    }

    #[tokio::test]
    async fn test_history_then_live() {
        let store = RailEventStore::new();
        store.push(RailEvent::ChannelConnected);

        let mut stream = store.history_plus_stream();
        store.push(RailEvent::HandshakeCompleted);

        assert_eq!(stream.next().await, Some(RailEvent::ChannelConnected));
        assert_eq!(stream.next().await, Some(RailEvent::HandshakeCompleted));
    }

    #[tokio::test]
    async fn test_subscribe_during_pushes_misses_nothing() {
        const EVENTS: u32 = 10_000;

        for _ in 0..10 {
            let store = Arc::new(RailEventStore::with_limit(EVENTS as usize + 10));
            let pusher = {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for code in 0..EVENTS {
                        store.push(RailEvent::HandshakeFailed { code });
                    }
                })
            };

            // Attach once pushes are under way.
            while store.get_history().is_empty() {
                thread::yield_now();
            }
            let stream = store.history_plus_stream();

            let codes: Vec<u32> = tokio::time::timeout(
                Duration::from_secs(10),
                stream
                    .take(EVENTS as usize)
                    .map(|event| match event {
                        RailEvent::HandshakeFailed { code } => code,
                        other => panic!("unexpected event {other:?}"),
                    })
                    .collect(),
            )
            .await
            .expect("stream stalled before every event arrived");
            pusher.join().unwrap();

            assert_eq!(codes, (0..EVENTS).collect::<Vec<_>>());
        }
    }
}
