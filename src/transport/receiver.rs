//! Receiver
//!
//! Pulls wire messages, decodes them into envelopes and later acknowledges
//! or rejects them using the delivery recorded in the `ReceivedStamp`.

use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use tracing::warn;

use crate::client::WireMessage;
use crate::transport::codec::Codec;
use crate::transport::connection::Connection;
use crate::transport::envelope::Envelope;
use crate::utils::error::{Error, LogicError, Result};

pub struct GpsReceiver<M, C> {
    connection: Arc<Connection>,
    codec: Arc<C>,
    _marker: PhantomData<fn() -> M>,
}

/// State of one `get()` stream.
struct PullCycle<C> {
    connection: Arc<Connection>,
    codec: Arc<C>,
    pending: Option<VecDeque<WireMessage>>,
    finished: bool,
}

impl<C> PullCycle<C> {
    async fn decode<M>(&self, message: WireMessage) -> Result<Envelope<M>>
    where
        C: Codec<M>,
    {
        match self.codec.decode(&message) {
            Ok(envelope) => Ok(envelope.with_received(message)),
            Err(err) => {
                warn!(
                    subscription = %self.connection.subscription(),
                    message_id = %message.message_id,
                    error = %err,
                    "dropping message that could not be decoded"
                );
                // Consume it so an unparseable message is not redelivered forever
                self.connection.reject(&message).await?;
                Err(Error::Decoding(err))
            }
        }
    }
}

impl<M, C> GpsReceiver<M, C>
where
    M: Send + Sync + 'static,
    C: Codec<M> + 'static,
{
    pub fn new(connection: Arc<Connection>, codec: Arc<C>) -> Self {
        Self {
            connection,
            codec,
            _marker: PhantomData,
        }
    }

    /// Envelopes from one pull.
    ///
    /// Nothing is pulled until the stream is polled. The stream ends when the
    /// batch is drained or right after the first error; call `get` again for
    /// the next batch. Polling an ended stream keeps returning `None`.
    pub fn get(&self) -> BoxStream<'static, Result<Envelope<M>>> {
        let cycle = PullCycle {
            connection: self.connection.clone(),
            codec: self.codec.clone(),
            pending: None,
            finished: false,
        };

        stream::unfold(cycle, |mut cycle| async move {
            if cycle.finished {
                return None;
            }

            if cycle.pending.is_none() {
                match cycle.connection.pull().await {
                    Ok(messages) => cycle.pending = Some(messages.into()),
                    Err(err) => {
                        cycle.finished = true;
                        return Some((Err(err.into()), cycle));
                    }
                }
            }

            let message = cycle.pending.as_mut()?.pop_front()?;
            let item: Result<Envelope<M>> = cycle.decode(message).await;
            if item.is_err() {
                cycle.finished = true;
            }
            Some((item, cycle))
        })
        .fuse()
        .boxed()
    }

    pub async fn ack(&self, envelope: &Envelope<M>) -> Result<()> {
        let message = received_message(envelope)?;
        self.connection.acknowledge(message).await?;
        Ok(())
    }

    /// With a `RedeliveryAsModifyAckDeadlineStamp` the delivery stays leased
    /// and comes back after the stamp's delay. Otherwise the message is
    /// consumed and any retry has to be published anew.
    pub async fn reject(&self, envelope: &Envelope<M>) -> Result<()> {
        let message = received_message(envelope)?;
        match envelope.stamps().redelivery_as_modify_ack_deadline {
            Some(stamp) => {
                self.connection
                    .modify_ack_deadline(message, stamp.delay())
                    .await?
            }
            None => self.connection.acknowledge(message).await?,
        }
        Ok(())
    }
}

fn received_message<M>(envelope: &Envelope<M>) -> Result<&WireMessage, LogicError> {
    envelope
        .stamps()
        .received
        .as_ref()
        .map(|stamp| stamp.message())
        .ok_or(LogicError::MissingReceivedStamp)
}
