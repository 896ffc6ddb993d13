//! Transport facade
//!
//! `GpsTransport` pairs one sender and one receiver over a shared connection
//! and is what a hosting worker loop talks to, usually through the
//! `MessageTransport` trait.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::transport::codec::{Codec, JsonCodec};
use crate::transport::connection::{Connection, DebugInfo};
use crate::transport::envelope::Envelope;
use crate::transport::receiver::GpsReceiver;
use crate::transport::sender::GpsSender;
use crate::utils::error::Result;

/// What a dispatch framework needs from a transport.
#[async_trait]
pub trait MessageTransport<M>: Send + Sync {
    /// Envelopes from one receive cycle.
    fn get(&self) -> BoxStream<'static, Result<Envelope<M>>>;

    async fn ack(&self, envelope: &Envelope<M>) -> Result<()>;

    async fn reject(&self, envelope: &Envelope<M>) -> Result<()>;

    async fn send(&self, envelope: Envelope<M>) -> Result<Envelope<M>>;
}

pub struct GpsTransport<M, C = JsonCodec<M>> {
    connection: Arc<Connection>,
    receiver: GpsReceiver<M, C>,
    sender: GpsSender<M, C>,
}

impl<M, C> GpsTransport<M, C>
where
    M: Send + Sync + 'static,
    C: Codec<M> + 'static,
{
    pub fn new(connection: Connection, codec: C) -> Self {
        let connection = Arc::new(connection);
        let codec = Arc::new(codec);
        Self {
            receiver: GpsReceiver::new(connection.clone(), codec.clone()),
            sender: GpsSender::new(connection.clone(), codec),
            connection,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn debug_info(&self) -> DebugInfo {
        self.connection.debug_info()
    }
}

#[async_trait]
impl<M, C> MessageTransport<M> for GpsTransport<M, C>
where
    M: Send + Sync + 'static,
    C: Codec<M> + 'static,
{
    fn get(&self) -> BoxStream<'static, Result<Envelope<M>>> {
        self.receiver.get()
    }

    async fn ack(&self, envelope: &Envelope<M>) -> Result<()> {
        self.receiver.ack(envelope).await
    }

    async fn reject(&self, envelope: &Envelope<M>) -> Result<()> {
        self.receiver.reject(envelope).await
    }

    async fn send(&self, envelope: Envelope<M>) -> Result<Envelope<M>> {
        self.sender.send(envelope).await
    }
}
