//! # voyager-xds
//!
//! A naive discovery cache and watch-dispatch engine for serving Envoy-style
//! xDS resources.
//!
//! ## Components
//!
//! - [`cache`]: resource generation, the watch registry and one periodic
//!   update task per watch
//! - [`server`]: turns discovery request streams into nonce-stamped response
//!   streams backed by a [`Cache`]
//! - [`access_log`]: buffered access log with a periodic dumper
//! - [`proto`]: wire messages and the [`proto::TypedPayload`] envelope
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use tokio_util::sync::CancellationToken;
//! use voyager_xds::{Cache, LoggingCallbacks, NaiveCache, Settings, DiscoveryServer};
//!
//! let settings = Settings::new()?.validate()?;
//! let shutdown = CancellationToken::new();
//! let cache = Arc::new(NaiveCache::new(&settings, shutdown.clone())?);
//! let server = DiscoveryServer::new(
//!     cache,
//!     Arc::new(LoggingCallbacks),
//!     settings.session.clone(),
//!     shutdown,
//! )?;
//! // hand `server.stream_aggregated(request_stream)?` back to tonic
//! ```
//!
//! The library never installs a tracing subscriber; that is left to the
//! embedding binary.

pub mod access_log;
pub mod cache;
mod config;
pub mod constants;
mod errors;
mod metrics;
pub mod proto;
pub mod server;

pub use access_log::*;
pub use cache::*;
pub use config::*;
pub use errors::*;
pub use metrics::*;
pub use server::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub(crate) mod test_utils;
