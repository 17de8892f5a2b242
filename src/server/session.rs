//! One discovery stream.
//!
//! A session multiplexes at most one watch per type URL onto a single
//! response channel and stamps every outgoing response with a nonce that is
//! unique within the stream.

use std::collections::HashMap;
use std::sync::Arc;

use futures::Stream;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::StreamMap;
use tokio_util::sync::CancellationToken;
use tonic::Status;
use tracing::debug;
use tracing::trace;

use super::resolve_type_url;
use super::Callbacks;
use crate::cache::Cache;
use crate::cache::Response;
use crate::cache::WatchCancel;
use crate::cache::WatchStream;
use crate::proto::DiscoveryRequest;
use crate::proto::DiscoveryResponse;

/// Open watch of one type URL
#[derive(Debug)]
struct WatchState {
    cancel: WatchCancel,
    resource_names: Vec<String>,
    /// Nonce of the last response sent for this type, empty until the first
    nonce: String,
}

pub(crate) struct StreamSession {
    stream_id: u64,
    default_type_url: &'static str,
    cache: Arc<dyn Cache>,
    callbacks: Arc<dyn Callbacks>,
    responses: mpsc::Sender<Result<DiscoveryResponse, Status>>,
    shutdown: CancellationToken,
    watches: HashMap<String, WatchState>,
    pending: StreamMap<String, WatchStream>,
    nonce: u64,
}

impl StreamSession {
    pub(crate) fn new(
        stream_id: u64,
        default_type_url: &'static str,
        cache: Arc<dyn Cache>,
        callbacks: Arc<dyn Callbacks>,
        responses: mpsc::Sender<Result<DiscoveryResponse, Status>>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            stream_id,
            default_type_url,
            cache,
            callbacks,
            responses,
            shutdown,
            watches: HashMap::new(),
            pending: StreamMap::new(),
            nonce: 0,
        }
    }

    pub(crate) async fn run<S>(
        mut self,
        mut requests: S,
    ) where
        S: Stream<Item = Result<DiscoveryRequest, Status>> + Unpin,
    {
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    debug!(stream_id = self.stream_id, "Server shutting down, closing stream");
                    break;
                }
                _ = self.responses.closed() => {
                    debug!(stream_id = self.stream_id, "Response receiver dropped");
                    break;
                }
                request = requests.next() => match request {
                    Some(Ok(request)) => {
                        if let Err(status) = self.handle_request(request) {
                            self.send_error(status).await;
                            break;
                        }
                    }
                    Some(Err(status)) => {
                        debug!(stream_id = self.stream_id, %status, "Request stream failed");
                        break;
                    }
                    None => {
                        debug!(stream_id = self.stream_id, "Request stream ended");
                        break;
                    }
                },
                Some((type_url, response)) = self.pending.next(), if !self.pending.is_empty() => {
                    if !self.send_response(type_url, response).await {
                        break;
                    }
                }
            }
        }

        self.close();
    }

    fn handle_request(
        &mut self,
        mut request: DiscoveryRequest,
    ) -> Result<(), Status> {
        resolve_type_url(&mut request, self.default_type_url)?;
        self.callbacks.on_stream_request(self.stream_id, &request)?;

        if let Some(state) = self.watches.get(&request.type_url) {
            if !state.cancel.is_cancelled() {
                if !request.response_nonce.is_empty() && request.response_nonce != state.nonce {
                    debug!(
                        stream_id = self.stream_id,
                        type_url = %request.type_url,
                        nonce = %request.response_nonce,
                        expected = %state.nonce,
                        "Ignoring request with stale nonce"
                    );
                    return Ok(());
                }
                if request.resource_names == state.resource_names {
                    trace!(stream_id = self.stream_id, type_url = %request.type_url, "Acknowledged");
                    return Ok(());
                }
            }
            state.cancel.cancel();
        }

        let type_url = request.type_url.clone();
        let resource_names = request.resource_names.clone();
        let (stream, cancel) = self.cache.create_watch(request);
        self.pending.insert(type_url.clone(), stream);
        self.watches.insert(
            type_url,
            WatchState {
                cancel,
                resource_names,
                nonce: String::new(),
            },
        );
        Ok(())
    }

    /// Returns `false` once the response receiver is gone or the server stops.
    async fn send_response(
        &mut self,
        type_url: String,
        response: Response,
    ) -> bool {
        self.nonce += 1;
        let nonce = self.nonce.to_string();
        let wire = response.to_discovery_response(nonce.clone());
        if let Some(state) = self.watches.get_mut(&type_url) {
            state.nonce = nonce;
        }

        self.callbacks.on_stream_response(self.stream_id, &response.request, &wire);
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => false,
            sent = self.responses.send(Ok(wire)) => sent.is_ok(),
        }
    }

    /// Best effort: gives up when the server stops before the transport drains.
    async fn send_error(
        &self,
        status: Status,
    ) {
        debug!(stream_id = self.stream_id, %status, "Rejecting stream");
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => {}
            _ = self.responses.send(Err(status)) => {}
        }
    }

    fn close(mut self) {
        for (_, state) in self.watches.drain() {
            state.cancel.cancel();
        }
        self.callbacks.on_stream_closed(self.stream_id);
    }
}
