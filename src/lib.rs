//! # gps_transport
//!
//! `gps_transport` connects a message-dispatch framework to a Google Cloud
//! Pub/Sub style publish/subscribe service. Outgoing envelopes are published
//! to a topic; incoming ones are pulled from a subscription, acknowledged on
//! success and either consumed or redelivered through an ack deadline
//! extension on failure.
//!
//! ## Core Modules
//!
//! - `transport`: connection, sender, receiver, the `GpsTransport` facade and
//!   the DSN-driven factory.
//! - `config`: `gps://` DSN parsing and option defaults from file/environment.
//! - `client`: the `PubSubClient` capability, credentials and the in-memory
//!   client.
//! - `broker`: an in-process pub/sub service backing the in-memory client.
//! - `utils`: error types and logging bootstrap.

pub mod broker;
pub mod client;
pub mod config;
pub mod transport;
pub mod utils;

pub use transport::{Envelope, GpsTransport, GpsTransportFactory, JsonCodec, MessageTransport};
pub use utils::error::{Error, Result};
