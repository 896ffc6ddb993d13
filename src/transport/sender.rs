//! Sender
//!
//! Encodes an envelope, publishes it through the connection and stamps the
//! returned message id back onto it.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use crate::transport::codec::Codec;
use crate::transport::connection::Connection;
use crate::transport::envelope::Envelope;
use crate::utils::error::Result;

pub struct GpsSender<M, C> {
    connection: Arc<Connection>,
    codec: Arc<C>,
    _marker: PhantomData<fn(M)>,
}

impl<M, C> GpsSender<M, C>
where
    C: Codec<M>,
{
    pub fn new(connection: Arc<Connection>, codec: Arc<C>) -> Self {
        Self {
            connection,
            codec,
            _marker: PhantomData,
        }
    }

    /// Publish `envelope` and return it with a `TransportMessageIdStamp`.
    ///
    /// A framework retry of an envelope marked for deadline redelivery is
    /// returned untouched: the original delivery is still leased and will
    /// come back on its own, so publishing would duplicate it.
    pub async fn send(&self, envelope: Envelope<M>) -> Result<Envelope<M>> {
        if envelope.is_deadline_redelivery() {
            debug!(
                topic = %self.connection.topic(),
                "retry handled by ack deadline extension, not publishing"
            );
            return Ok(envelope);
        }

        let encoded = self.codec.encode(&envelope)?;
        let ordering_key = envelope
            .stamps()
            .ordering_key
            .as_ref()
            .map(|stamp| stamp.ordering_key().to_string());

        let message_id = self
            .connection
            .publish(encoded.body, encoded.headers, ordering_key)
            .await?;

        Ok(envelope.with_transport_message_id(message_id))
    }
}
