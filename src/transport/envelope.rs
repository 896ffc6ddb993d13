//! Envelopes and stamps
//!
//! An `Envelope` is the dispatch framework's unit of work: a message, the
//! headers that travel with it, and a set of stamps. Each stamp kind has its
//! own slot in `Stamps`; adding a stamp of a kind replaces the previous one.
//!
//! Only the redelivery stamp and the headers are ever encoded. The others
//! are local to this process:
//! - `ReceivedStamp`: the delivery an inbound envelope was decoded from
//! - `OrderingKeyStamp`: ordering key to publish with
//! - `RedeliveryAsModifyAckDeadlineStamp`: retry by extending the ack
//!   deadline of the original delivery instead of publishing again
//! - `TransportMessageIdStamp`: message id assigned on publish

use std::collections::HashMap;

use crate::client::WireMessage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedStamp {
    message: WireMessage,
}

impl ReceivedStamp {
    pub fn new(message: WireMessage) -> Self {
        Self { message }
    }

    pub fn message(&self) -> &WireMessage {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingKeyStamp {
    ordering_key: String,
}

impl OrderingKeyStamp {
    pub fn new(ordering_key: impl Into<String>) -> Self {
        Self {
            ordering_key: ordering_key.into(),
        }
    }

    pub fn ordering_key(&self) -> &str {
        &self.ordering_key
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedeliveryAsModifyAckDeadlineStamp {
    delay: i64,
}

impl RedeliveryAsModifyAckDeadlineStamp {
    /// `delay` in seconds. Zero or less means "use the connection's
    /// redelivery ack deadline".
    pub fn new(delay: i64) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> i64 {
        self.delay
    }
}

/// Added by the framework when it retries an envelope that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedeliveryStamp {
    retry_count: u32,
}

impl RedeliveryStamp {
    pub fn new(retry_count: u32) -> Self {
        Self { retry_count }
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportMessageIdStamp {
    id: String,
}

impl TransportMessageIdStamp {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stamps {
    pub received: Option<ReceivedStamp>,
    pub ordering_key: Option<OrderingKeyStamp>,
    pub redelivery_as_modify_ack_deadline: Option<RedeliveryAsModifyAckDeadlineStamp>,
    pub redelivery: Option<RedeliveryStamp>,
    pub transport_message_id: Option<TransportMessageIdStamp>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<M> {
    message: M,
    headers: HashMap<String, String>,
    stamps: Stamps,
}

impl<M> Envelope<M> {
    pub fn new(message: M) -> Self {
        Self {
            message,
            headers: HashMap::new(),
            stamps: Stamps::default(),
        }
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_ordering_key(mut self, ordering_key: impl Into<String>) -> Self {
        self.stamps.ordering_key = Some(OrderingKeyStamp::new(ordering_key));
        self
    }

    pub fn with_redelivery(mut self, stamp: RedeliveryStamp) -> Self {
        self.stamps.redelivery = Some(stamp);
        self
    }

    pub fn with_redelivery_as_modify_ack_deadline(mut self, delay: i64) -> Self {
        self.stamps.redelivery_as_modify_ack_deadline =
            Some(RedeliveryAsModifyAckDeadlineStamp::new(delay));
        self
    }

    pub fn with_received(mut self, message: WireMessage) -> Self {
        self.stamps.received = Some(ReceivedStamp::new(message));
        self
    }

    pub fn with_transport_message_id(mut self, id: impl Into<String>) -> Self {
        self.stamps.transport_message_id = Some(TransportMessageIdStamp::new(id));
        self
    }

    pub fn message(&self) -> &M {
        &self.message
    }

    pub fn into_message(self) -> M {
        self.message
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn stamps(&self) -> &Stamps {
        &self.stamps
    }

    /// True when a framework retry should extend the ack deadline of the
    /// original delivery rather than publish a new message.
    pub fn is_deadline_redelivery(&self) -> bool {
        self.stamps.redelivery.is_some() && self.stamps.redelivery_as_modify_ack_deadline.is_some()
    }
}
