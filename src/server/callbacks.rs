#[cfg(test)]
use mockall::automock;
use tracing::info;

use crate::proto::DiscoveryRequest;
use crate::proto::DiscoveryResponse;
use crate::Result;

/// Hooks invoked by [`super::DiscoveryServer`] around every stream and fetch
///
/// An error returned from a request hook aborts the stream or fetch and is
/// reported to the client as a status.
#[cfg_attr(test, automock)]
pub trait Callbacks: Send + Sync + 'static {
    fn on_stream_open(
        &self,
        stream_id: u64,
        type_url: &str,
    ) -> Result<()>;

    /// Called once per stream, after every watch of the stream is cancelled.
    fn on_stream_closed(
        &self,
        stream_id: u64,
    );

    fn on_stream_request(
        &self,
        stream_id: u64,
        request: &DiscoveryRequest,
    ) -> Result<()>;

    fn on_stream_response(
        &self,
        stream_id: u64,
        request: &DiscoveryRequest,
        response: &DiscoveryResponse,
    );

    fn on_fetch_request(
        &self,
        request: &DiscoveryRequest,
    ) -> Result<()>;

    fn on_fetch_response(
        &self,
        request: &DiscoveryRequest,
        response: &DiscoveryResponse,
    );
}

/// Logs every stream and fetch event
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingCallbacks;

impl Callbacks for LoggingCallbacks {
    fn on_stream_open(
        &self,
        stream_id: u64,
        type_url: &str,
    ) -> Result<()> {
        info!(stream_id, type_url, "Stream opened");
        Ok(())
    }

    fn on_stream_closed(
        &self,
        stream_id: u64,
    ) {
        info!(stream_id, "Stream closed");
    }

    fn on_stream_request(
        &self,
        stream_id: u64,
        request: &DiscoveryRequest,
    ) -> Result<()> {
        info!(
            stream_id,
            node_id = %request.node_id(),
            type_url = %request.type_url,
            version = %request.version_info,
            nonce = %request.response_nonce,
            "Stream request"
        );
        Ok(())
    }

    fn on_stream_response(
        &self,
        stream_id: u64,
        request: &DiscoveryRequest,
        response: &DiscoveryResponse,
    ) {
        info!(
            stream_id,
            node_id = %request.node_id(),
            type_url = %response.type_url,
            version = %response.version_info,
            nonce = %response.nonce,
            resources = response.resources.len(),
            "Stream response"
        );
    }

    fn on_fetch_request(
        &self,
        request: &DiscoveryRequest,
    ) -> Result<()> {
        info!(
            node_id = %request.node_id(),
            type_url = %request.type_url,
            "Fetch request"
        );
        Ok(())
    }

    fn on_fetch_response(
        &self,
        request: &DiscoveryRequest,
        response: &DiscoveryResponse,
    ) {
        info!(
            node_id = %request.node_id(),
            type_url = %response.type_url,
            version = %response.version_info,
            "Fetch response"
        );
    }
}
