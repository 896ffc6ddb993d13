use serde::Deserialize;

/// Option defaults for a GPS transport.
///
/// Every field is optional: a value present in the DSN query string always
/// wins, and anything missing from both falls back to an empty name or `0`.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct TransportOptions {
    pub topic: Option<String>,
    pub subscription: Option<String>,
    /// Base64-encoded service account key JSON.
    pub key: Option<String>,
    pub pull_max_messages: Option<i64>,
    pub pull_ack_deadline: Option<i64>,
    pub redelivery_ack_deadline: Option<i64>,
}

/// Fully resolved connection configuration.
///
/// Numeric fields use `0` for "unset": no batch limit, no post-pull deadline
/// override, no redelivery default.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub topic: String,
    pub subscription: String,
    /// Decoded service account key JSON.
    pub key: String,
    pub pull_max_messages: i64,
    pub pull_ack_deadline: i64,
    pub redelivery_ack_deadline: i64,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("topic", &self.topic)
            .field("subscription", &self.subscription)
            .field("key", &"<redacted>")
            .field("pull_max_messages", &self.pull_max_messages)
            .field("pull_ack_deadline", &self.pull_ack_deadline)
            .field("redelivery_ack_deadline", &self.redelivery_ack_deadline)
            .finish()
    }
}
