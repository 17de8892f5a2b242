//! Discovery cache and watch-dispatch engine
//!
//! The cache answers two kinds of requests coming from the session layer:
//!
//! - **Watches**: long-lived subscriptions to one resource type. Each watch
//!   gets a background task that periodically regenerates the snapshot and
//!   pushes it to the watch's consumer.
//! - **Fetches**: one-shot requests answered with a single snapshot.
//!
//! ```text
//! create_watch(req) ──> WatchRegistry ──spawn──> UpdateScheduler (1 task / watch)
//!                                                   │ every refresh interval
//!                                                   ▼
//!                                          ResourceGenerator (1 mutex)
//!                                                   │ Some(snapshot)
//!                                                   ▼
//!                                   capacity-1 channel ──> WatchStream
//! ```
//!
//! # Lifecycle
//!
//! `create_watch` never blocks. The returned [`WatchCancel`] must be invoked
//! when the subscriber goes away; dropping the [`WatchStream`] also stops the
//! task. Watches of one cache are all cancelled by [`NaiveCache::shutdown`]
//! or by the process-wide token the cache was built with.

mod generator;
mod naive_cache;
mod resource;
mod scheduler;
mod watch;

pub use generator::*;
pub use naive_cache::*;
pub use resource::*;
pub(crate) use scheduler::*;
pub use watch::*;

#[cfg(test)]
mod resource_test;
#[cfg(test)]
mod watch_test;

use tonic::async_trait;

use crate::proto::DiscoveryRequest;
use crate::Result;

/// Resource source consumed by the discovery session layer
#[async_trait]
pub trait Cache: Send + Sync + 'static {
    /// Open a watch for the resource type named by `request`.
    ///
    /// Must be called from within a tokio runtime. Registration and task
    /// spawning happen synchronously; generation happens on the watch task.
    fn create_watch(
        &self,
        request: DiscoveryRequest,
    ) -> (WatchStream, WatchCancel);

    /// Generate a single snapshot without registering any state.
    ///
    /// # Returns
    /// - `Ok(Some(_))` with the snapshot
    /// - `Ok(None)` when the type has nothing to serve
    ///
    /// # Errors
    /// Returns the generation error if the snapshot could not be produced.
    async fn fetch(
        &self,
        request: DiscoveryRequest,
    ) -> Result<Option<Response>>;
}
