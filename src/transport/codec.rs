//! Codecs
//!
//! A `Codec` turns an envelope into a message body plus headers and back.
//! Headers are published as message attributes. `JsonCodec` is the default:
//! the message is serialized with `serde_json`, the headers travel untouched
//! and the framework redelivery stamp rides along in one extra attribute.

use std::collections::HashMap;
use std::marker::PhantomData;

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::client::WireMessage;
use crate::transport::envelope::{Envelope, RedeliveryStamp};
use crate::utils::error::{DecodingError, TransportError};

pub const REDELIVERY_COUNT_HEADER: &str = "x-message-redelivery-count";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedEnvelope {
    pub body: Bytes,
    pub headers: HashMap<String, String>,
}

pub trait Codec<M>: Send + Sync {
    fn encode(&self, envelope: &Envelope<M>) -> Result<EncodedEnvelope, TransportError>;

    /// Decode a pulled message. The returned envelope must not carry a
    /// received stamp; the receiver adds it.
    fn decode(&self, message: &WireMessage) -> Result<Envelope<M>, DecodingError>;
}

pub struct JsonCodec<M> {
    _marker: PhantomData<fn() -> M>,
}

impl<M> JsonCodec<M> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<M> Default for JsonCodec<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for JsonCodec<M> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<M> std::fmt::Debug for JsonCodec<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonCodec").finish()
    }
}

impl<M> Codec<M> for JsonCodec<M>
where
    M: Serialize + DeserializeOwned,
{
    fn encode(&self, envelope: &Envelope<M>) -> Result<EncodedEnvelope, TransportError> {
        let body = serde_json::to_vec(envelope.message())
            .map_err(|e| TransportError::Encoding(Box::new(e)))?;

        let mut headers = envelope.headers().clone();
        if let Some(redelivery) = envelope.stamps().redelivery {
            headers.insert(
                REDELIVERY_COUNT_HEADER.to_string(),
                redelivery.retry_count().to_string(),
            );
        }

        Ok(EncodedEnvelope {
            body: body.into(),
            headers,
        })
    }

    fn decode(&self, message: &WireMessage) -> Result<Envelope<M>, DecodingError> {
        let payload: M =
            serde_json::from_slice(&message.data).map_err(|e| DecodingError::Body(Box::new(e)))?;

        let mut headers = message.attributes.clone();
        let redelivery = headers
            .remove(REDELIVERY_COUNT_HEADER)
            .map(|value| {
                value
                    .parse::<u32>()
                    .map(RedeliveryStamp::new)
                    .map_err(|_| DecodingError::InvalidHeader {
                        name: REDELIVERY_COUNT_HEADER.to_string(),
                        value,
                    })
            })
            .transpose()?;

        let envelope = Envelope::new(payload).with_headers(headers);
        Ok(match redelivery {
            Some(stamp) => envelope.with_redelivery(stamp),
            None => envelope,
        })
    }
}
