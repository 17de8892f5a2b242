//! Discovery service front end.
//!
//! [`DiscoveryServer`] turns a stream of discovery requests into a stream of
//! discovery responses backed by a [`Cache`]. It does not own a transport: a
//! tonic service implementation forwards its `Streaming<DiscoveryRequest>`
//! here and returns the [`ResponseStream`] as-is.
//!
//! ```text
//! requests ──> StreamSession (1 task / stream) ──create_watch──> Cache
//!                   │  ◄── WatchStream per type URL ──┘
//!                   ▼
//!             ResponseStream (nonce-stamped)
//! ```

mod callbacks;
mod session;

pub use callbacks::*;
pub(crate) use session::*;


use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tonic::Status;
use tracing::debug;

use crate::cache::Cache;
use crate::constants::ANY_TYPE;
use crate::constants::CLUSTER_TYPE;
use crate::constants::ENDPOINT_TYPE;
use crate::constants::LISTENER_TYPE;
use crate::constants::ROUTE_TYPE;
use crate::constants::RUNTIME_TYPE;
use crate::constants::SECRET_TYPE;
use crate::proto::DiscoveryRequest;
use crate::proto::DiscoveryResponse;
use crate::SessionConfig;

pub type ResponseStream = ReceiverStream<Result<DiscoveryResponse, Status>>;

/// Drives discovery streams and fetches against one cache
pub struct DiscoveryServer {
    cache: Arc<dyn Cache>,
    callbacks: Arc<dyn Callbacks>,
    config: SessionConfig,
    /// Ends every open stream when cancelled
    shutdown: CancellationToken,
    next_stream_id: AtomicU64,
}

impl DiscoveryServer {
    /// # Errors
    /// Returns `Error::InvalidConfig` if the response buffer size is zero
    pub fn new(
        cache: Arc<dyn Cache>,
        callbacks: Arc<dyn Callbacks>,
        config: SessionConfig,
        shutdown: CancellationToken,
    ) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self {
            cache,
            callbacks,
            config,
            shutdown,
            next_stream_id: AtomicU64::new(1),
        })
    }

    /// Serve one bidirectional discovery stream.
    ///
    /// Requests with an empty type URL are served as `default_type_url`.
    /// Pass [`ANY_TYPE`] for the aggregated stream, which accepts every type
    /// but requires each request to name one.
    ///
    /// # Errors
    /// Returns the status produced by [`Callbacks::on_stream_open`].
    pub fn stream<S>(
        &self,
        requests: S,
        default_type_url: &'static str,
    ) -> Result<ResponseStream, Status>
    where
        S: Stream<Item = Result<DiscoveryRequest, Status>> + Send + Unpin + 'static,
    {
        let stream_id = self.next_stream_id.fetch_add(1, Ordering::Relaxed);
        self.callbacks.on_stream_open(stream_id, default_type_url)?;

        let (sender, receiver) = mpsc::channel(self.config.response_buffer_size);
        let session = StreamSession::new(
            stream_id,
            default_type_url,
            self.cache.clone(),
            self.callbacks.clone(),
            sender,
            self.shutdown.child_token(),
        );
        tokio::spawn(session.run(requests));

        Ok(ReceiverStream::new(receiver))
    }

    pub fn stream_aggregated<S>(
        &self,
        requests: S,
    ) -> Result<ResponseStream, Status>
    where
        S: Stream<Item = Result<DiscoveryRequest, Status>> + Send + Unpin + 'static,
    {
        self.stream(requests, ANY_TYPE)
    }

    pub fn stream_endpoints<S>(
        &self,
        requests: S,
    ) -> Result<ResponseStream, Status>
    where
        S: Stream<Item = Result<DiscoveryRequest, Status>> + Send + Unpin + 'static,
    {
        self.stream(requests, ENDPOINT_TYPE)
    }

    pub fn stream_clusters<S>(
        &self,
        requests: S,
    ) -> Result<ResponseStream, Status>
    where
        S: Stream<Item = Result<DiscoveryRequest, Status>> + Send + Unpin + 'static,
    {
        self.stream(requests, CLUSTER_TYPE)
    }

    pub fn stream_routes<S>(
        &self,
        requests: S,
    ) -> Result<ResponseStream, Status>
    where
        S: Stream<Item = Result<DiscoveryRequest, Status>> + Send + Unpin + 'static,
    {
        self.stream(requests, ROUTE_TYPE)
    }

    pub fn stream_listeners<S>(
        &self,
        requests: S,
    ) -> Result<ResponseStream, Status>
    where
        S: Stream<Item = Result<DiscoveryRequest, Status>> + Send + Unpin + 'static,
    {
        self.stream(requests, LISTENER_TYPE)
    }

    pub fn stream_secrets<S>(
        &self,
        requests: S,
    ) -> Result<ResponseStream, Status>
    where
        S: Stream<Item = Result<DiscoveryRequest, Status>> + Send + Unpin + 'static,
    {
        self.stream(requests, SECRET_TYPE)
    }

    pub fn stream_runtime<S>(
        &self,
        requests: S,
    ) -> Result<ResponseStream, Status>
    where
        S: Stream<Item = Result<DiscoveryRequest, Status>> + Send + Unpin + 'static,
    {
        self.stream(requests, RUNTIME_TYPE)
    }

    /// Answer a single request without opening a watch.
    ///
    /// # Errors
    /// - `InvalidArgument` if the type URL is missing or does not match
    /// - `Unavailable` if the cache has nothing to serve for the type
    /// - the converted cache error if generation fails
    pub async fn fetch(
        &self,
        mut request: DiscoveryRequest,
        default_type_url: &'static str,
    ) -> Result<DiscoveryResponse, Status> {
        resolve_type_url(&mut request, default_type_url)?;
        self.callbacks.on_fetch_request(&request)?;

        let Some(response) = self.cache.fetch(request.clone()).await? else {
            debug!(type_url = %request.type_url, "Fetch found nothing to serve");
            return Err(Status::unavailable("empty response"));
        };

        let wire = response.to_discovery_response(String::new());
        self.callbacks.on_fetch_response(&request, &wire);
        Ok(wire)
    }
}

/// Fill in or check the type URL of a request arriving on a stream whose
/// service serves `default_type_url`.
pub(crate) fn resolve_type_url(
    request: &mut DiscoveryRequest,
    default_type_url: &str,
) -> Result<(), Status> {
    if request.type_url.is_empty() {
        if default_type_url == ANY_TYPE {
            return Err(Status::invalid_argument("type URL is required for aggregated discovery"));
        }
        request.type_url = default_type_url.to_string();
        return Ok(());
    }

    if default_type_url != ANY_TYPE && request.type_url != default_type_url {
        return Err(Status::invalid_argument(format!(
            "type URL {} does not match service type {}",
            request.type_url, default_type_url
        )));
    }
    Ok(())
}
