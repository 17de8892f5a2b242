//! Registry of open watches.
//!
//! Every watch owns a background task, a capacity-one delivery channel and a
//! cancellation token. The registry keeps the table `watch id -> task` so
//! that all remaining watches can be torn down together.

use std::pin::Pin;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::task::Context;
use std::task::Poll;

use dashmap::DashMap;
use futures::future::join_all;
use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::trace;

use super::Response;
use crate::proto::DiscoveryRequest;
use crate::ACTIVE_WATCHES;

/// Internal watch state
#[derive(Debug)]
struct WatchEntry {
    request: DiscoveryRequest,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

#[derive(Debug)]
pub struct WatchRegistry {
    watches: DashMap<u64, WatchEntry>,

    /// Next watch ID (monotonically increasing)
    next_id: AtomicU64,

    /// Parent of every watch token, child of the token passed to `new`
    shutdown: CancellationToken,
}

impl WatchRegistry {
    /// Watches registered here are cancelled together with `shutdown`.
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            watches: DashMap::new(),
            next_id: AtomicU64::new(1),
            shutdown: shutdown.child_token(),
        }
    }

    /// Reserve an id and a token for a new watch.
    pub(crate) fn allocate(&self) -> (u64, CancellationToken) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        (id, self.shutdown.child_token())
    }

    pub(crate) fn insert(
        &self,
        id: u64,
        request: DiscoveryRequest,
        token: CancellationToken,
        task: JoinHandle<()>,
    ) {
        ACTIVE_WATCHES.with_label_values(&[request.type_url.as_str()]).inc();
        trace!(watch_id = id, type_url = %request.type_url, "Watch registered");
        let cancelled = token.clone();
        self.watches.insert(
            id,
            WatchEntry {
                request,
                token,
                task: Some(task),
            },
        );

        // The task may have exited before it was registered
        if cancelled.is_cancelled() {
            self.unregister(id);
        }
    }

    /// Remove a watch from the table.
    ///
    /// Returns `false` if the watch was already gone.
    pub fn unregister(
        &self,
        id: u64,
    ) -> bool {
        match self.watches.remove(&id) {
            Some((_, entry)) => {
                entry.token.cancel();
                ACTIVE_WATCHES
                    .with_label_values(&[entry.request.type_url.as_str()])
                    .dec();
                trace!(watch_id = id, "Watch unregistered");
                true
            }
            None => false,
        }
    }

    pub fn contains(
        &self,
        id: u64,
    ) -> bool {
        self.watches.contains_key(&id)
    }

    /// Get the number of open watches
    pub fn len(&self) -> usize {
        self.watches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }

    /// Number of open watches whose request names `type_url`
    pub fn watch_count(
        &self,
        type_url: &str,
    ) -> usize {
        self.watches
            .iter()
            .filter(|entry| entry.value().request.type_url == type_url)
            .count()
    }

    /// Cancel every watch and wait for their tasks to exit.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();

        let ids: Vec<u64> = self.watches.iter().map(|entry| *entry.key()).collect();
        let mut tasks = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some((_, mut entry)) = self.watches.remove(&id) {
                ACTIVE_WATCHES
                    .with_label_values(&[entry.request.type_url.as_str()])
                    .dec();
                if let Some(task) = entry.task.take() {
                    tasks.push(task);
                }
            }
        }

        debug!(watches = tasks.len(), "Waiting for watch tasks to stop");
        for result in join_all(tasks).await {
            if let Err(e) = result {
                debug!(error = %e, "Watch task ended abnormally");
            }
        }
    }
}

/// Consumer side of a watch
///
/// Yields snapshots in generation order. Once the watch is cancelled no
/// further snapshot is returned, including one already sitting in the channel.
#[derive(Debug)]
pub struct WatchStream {
    id: u64,
    receiver: mpsc::Receiver<Response>,
    token: CancellationToken,
}

impl WatchStream {
    pub(crate) fn new(
        id: u64,
        receiver: mpsc::Receiver<Response>,
        token: CancellationToken,
    ) -> Self {
        Self { id, receiver, token }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the next snapshot.
    ///
    /// Returns `None` once the watch is cancelled or its task has stopped.
    pub async fn recv(&mut self) -> Option<Response> {
        let token = self.token.clone();
        if token.is_cancelled() {
            self.receiver.close();
            return None;
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                self.receiver.close();
                None
            }
            response = self.receiver.recv() => response.filter(|_| !token.is_cancelled()),
        }
    }
}

impl Stream for WatchStream {
    type Item = Response;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        if self.token.is_cancelled() {
            self.receiver.close();
            return Poll::Ready(None);
        }

        match self.receiver.poll_recv(cx) {
            Poll::Ready(Some(_)) if self.token.is_cancelled() => Poll::Ready(None),
            other => other,
        }
    }
}

/// Cancellation handle of a watch
///
/// Cancelling is idempotent and only affects this watch.
#[derive(Debug, Clone)]
pub struct WatchCancel {
    id: u64,
    token: CancellationToken,
    registry: Arc<WatchRegistry>,
}

impl WatchCancel {
    pub(crate) fn new(
        id: u64,
        token: CancellationToken,
        registry: Arc<WatchRegistry>,
    ) -> Self {
        Self {
            id,
            token,
            registry,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.token.cancel();
        if self.registry.unregister(self.id) {
            debug!(watch_id = self.id, "Watch cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
