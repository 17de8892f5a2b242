//! Protocol Buffer message definitions for the discovery protocol.
//!
//! The messages mirror the subset of the Envoy v3 API that the cache serves.
//! They are declared directly with `prost` derives so that resources can be
//! encoded into the wire format and embedded into [`TypedPayload`] envelopes.

mod address;
mod any;
mod cluster;
mod discovery;
mod listener;
mod route;

pub use address::*;
pub use any::*;
pub use cluster::*;
pub use discovery::*;
pub use listener::*;
pub use route::*;
