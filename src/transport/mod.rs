//! The `transport` module adapts a message-dispatch framework to the pub/sub
//! service.
//!
//! Outbound: `GpsSender` encodes an envelope, publishes it through the
//! `Connection` and stamps the message id back. Inbound: `GpsReceiver` pulls,
//! decodes and stamps each envelope with the delivery it came from, which
//! `ack`/`reject` later use. `GpsTransport` composes both and
//! `GpsTransportFactory` builds one from a `gps://` DSN.

pub mod codec;
pub mod connection;
pub mod envelope;
pub mod factory;
pub mod gps_transport;
pub mod receiver;
pub mod sender;

pub use codec::{Codec, EncodedEnvelope, JsonCodec};
pub use connection::{Connection, DebugInfo};
pub use envelope::{
    Envelope, OrderingKeyStamp, ReceivedStamp, RedeliveryAsModifyAckDeadlineStamp,
    RedeliveryStamp, Stamps, TransportMessageIdStamp,
};
pub use factory::GpsTransportFactory;
pub use gps_transport::{GpsTransport, MessageTransport};
pub use receiver::GpsReceiver;
pub use sender::GpsSender;
