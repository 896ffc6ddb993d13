//! The `client` module defines the pub/sub client capability the transport
//! talks to.
//!
//! It provides the `PubSubClient` trait with the wire-level message types, the
//! `ClientProvider` seam used to build an authenticated client from a service
//! account key, and `MemoryClient`, a client backed by the in-process
//! `Broker`.

pub mod credentials;
pub mod memory;
pub mod pubsub_client;

pub use credentials::ServiceAccountKey;
pub use memory::{MemoryClient, MemoryProvider};
pub use pubsub_client::{
    ClientProvider, OutboundMessage, PubSubClient, PublishResponse, WireMessage,
    subscription_path, topic_path,
};

#[cfg(test)]
pub(crate) mod recording;
