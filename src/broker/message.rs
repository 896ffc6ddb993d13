//! Messages as the broker stores them.
//!
//! - `sequence`: broker-wide publish order, used to put expired leases back
//!   in front of newer messages
//! - `delivery_attempt`: number of times the message has been handed out

use std::collections::HashMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct Message {
    pub message_id: String,
    pub sequence: u64,
    pub data: Bytes,
    pub attributes: HashMap<String, String>,
    pub ordering_key: Option<String>,
    pub publish_time: DateTime<Utc>,
    pub delivery_attempt: u32,
}

/// A message handed out by `pull` and not yet acknowledged.
#[derive(Debug, Clone)]
pub struct Lease {
    pub message: Message,
    /// Milliseconds since UNIX epoch after which the message is redelivered.
    pub deadline: i64,
}
