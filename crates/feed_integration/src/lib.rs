use std::collections::HashMap;

use async_trait::async_trait;
use futures::{future, stream::BoxStream, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use shared::{error::FeedError, protocol::Snapshot};
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::{debug, warn};

const PATH_CHANNEL_CAPACITY: usize = 256;

/// Live listener on one feed path.
///
/// `initial` holds the value stored at the path when the listener attached, so a
/// consumer sees the current state before any later update.
pub struct FeedSubscription {
    pub path: String,
    pub initial: Option<Snapshot>,
    pub receiver: broadcast::Receiver<Snapshot>,
}

impl FeedSubscription {
    pub fn into_stream(self) -> BoxStream<'static, Snapshot> {
        let path = self.path;
        let initial = futures::stream::iter(self.initial);
        let updates = BroadcastStream::new(self.receiver).filter_map(move |item| {
            let snapshot = match item {
                Ok(snapshot) => Some(snapshot),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(%path, skipped, "feed listener lagged; updates dropped");
                    None
                }
            };
            future::ready(snapshot)
        });
        initial.chain(updates).boxed()
    }
}

#[async_trait]
pub trait RealtimeFeed: Send + Sync {
    async fn subscribe(&self, path: &str) -> Result<FeedSubscription, FeedError>;
}

struct PathSlot {
    latest: Option<Value>,
    sender: broadcast::Sender<Snapshot>,
}

impl PathSlot {
    fn new() -> Self {
        let (sender, _) = broadcast::channel(PATH_CHANNEL_CAPACITY);
        Self {
            latest: None,
            sender,
        }
    }
}

#[derive(Default)]
struct MemoryFeedState {
    closed: bool,
    paths: HashMap<String, PathSlot>,
}

/// In-process key/value feed. Every path keeps its latest value.
#[derive(Default)]
pub struct MemoryFeed {
    state: Mutex<MemoryFeedState>,
}

impl MemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` at `path` and notifies current listeners. Returns how many
    /// listeners received the update.
    pub fn publish(&self, path: &str, value: Value) -> usize {
        let path = normalize_path(path);
        let mut state = self.state.lock();
        if state.closed {
            debug!(%path, "publish on closed feed ignored");
            return 0;
        }
        let slot = state
            .paths
            .entry(path.to_string())
            .or_insert_with(PathSlot::new);
        slot.latest = Some(value.clone());
        slot.sender
            .send(Snapshot::at_path(path, value))
            .unwrap_or_default()
    }

    pub fn latest(&self, path: &str) -> Option<Value> {
        let state = self.state.lock();
        state
            .paths
            .get(normalize_path(path))
            .and_then(|slot| slot.latest.clone())
    }

    /// Ends every listener stream. Later subscriptions fail.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        state.paths.clear();
    }
}

#[async_trait]
impl RealtimeFeed for MemoryFeed {
    async fn subscribe(&self, path: &str) -> Result<FeedSubscription, FeedError> {
        let path = normalize_path(path);
        if path.is_empty() {
            return Err(FeedError::InvalidPath {
                path: path.to_string(),
            });
        }

        let mut state = self.state.lock();
        if state.closed {
            return Err(FeedError::Closed {
                path: path.to_string(),
            });
        }
        let slot = state
            .paths
            .entry(path.to_string())
            .or_insert_with(PathSlot::new);
        let initial = slot
            .latest
            .clone()
            .map(|value| Snapshot::at_path(path, value));
        Ok(FeedSubscription {
            path: path.to_string(),
            initial,
            receiver: slot.sender.subscribe(),
        })
    }
}

fn normalize_path(path: &str) -> &str {
    path.trim().trim_end_matches('/')
}
