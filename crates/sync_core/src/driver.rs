use std::sync::Arc;

use feed_integration::RealtimeFeed;
use futures::{
    stream::{self, BoxStream},
    StreamExt,
};
use shared::{error::FeedError, protocol::FeedEvent};
use tokio::{
    sync::{watch, Mutex},
    task::{JoinError, JoinHandle},
};
use tracing::{debug, info};

use crate::engine::SyncEngine;

/// Runs a [`SyncEngine`] against a feed on a single task.
///
/// All subscription streams are merged into one, and each event is handled
/// to completion before the next is pulled. The engine sits behind a mutex
/// only so callers can inspect it between events.
pub struct SyncDriver {
    engine: Arc<Mutex<SyncEngine>>,
    processed: watch::Receiver<u64>,
    task: JoinHandle<()>,
}

impl SyncDriver {
    pub async fn spawn<F>(engine: SyncEngine, feed: &F) -> Result<Self, FeedError>
    where
        F: RealtimeFeed + ?Sized,
    {
        let mut streams: Vec<BoxStream<'static, FeedEvent>> =
            Vec::with_capacity(engine.subscriptions().len());
        for subscription in engine.subscriptions() {
            let channel = subscription.channel;
            let listener = feed.subscribe(&subscription.path).await?;
            info!(path = %subscription.path, ?channel, "feed subscription attached");
            streams.push(
                listener
                    .into_stream()
                    .map(move |snapshot| FeedEvent::new(channel, snapshot))
                    .boxed(),
            );
        }

        let engine = Arc::new(Mutex::new(engine));
        let (processed_tx, processed) = watch::channel(0);
        let task = tokio::spawn(run(engine.clone(), stream::select_all(streams), processed_tx));

        Ok(Self {
            engine,
            processed,
            task,
        })
    }

    pub fn engine(&self) -> Arc<Mutex<SyncEngine>> {
        self.engine.clone()
    }

    /// Number of events handled so far.
    pub fn processed(&self) -> u64 {
        *self.processed.borrow()
    }

    /// Waits until at least `count` events have been handled. Returns `false`
    /// if the event loop ended first.
    pub async fn wait_for(&self, count: u64) -> bool {
        let mut processed = self.processed.clone();
        let reached = processed.wait_for(|seen| *seen >= count).await.is_ok();
        reached
    }

    pub fn abort(&self) {
        self.task.abort();
    }

    /// Resolves once every feed stream has closed.
    pub async fn join(self) -> Result<(), JoinError> {
        self.task.await
    }
}

async fn run(
    engine: Arc<Mutex<SyncEngine>>,
    mut events: stream::SelectAll<BoxStream<'static, FeedEvent>>,
    processed: watch::Sender<u64>,
) {
    while let Some(event) = events.next().await {
        debug!(channel = ?event.channel, "feed event received");
        engine.lock().await.handle_event(event);
        processed.send_modify(|count| *count += 1);
    }
    info!("feed streams closed; sync loop finished");
}

#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod tests;
