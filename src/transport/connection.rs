//! Connection
//!
//! `Connection` is the only owner of the authenticated client handle. It is
//! built once per transport, never changes afterwards and is shared by the
//! sender and receiver behind an `Arc`.
//!
//! Every method is a single round trip to the service. Nothing is retried
//! here: failures are wrapped in `TransportError` and handed to the caller.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info};

use crate::client::{ClientProvider, OutboundMessage, PubSubClient, ServiceAccountKey, WireMessage};
use crate::config::{ConnectionConfig, TransportOptions};
use crate::utils::error::{ConfigurationError, TransportError};

/// Diagnostics snapshot. Best effort, not authoritative.
#[derive(Debug, Clone, Serialize)]
pub struct DebugInfo {
    pub client: serde_json::Value,
    pub subscription: serde_json::Value,
}

pub struct Connection {
    client: Arc<dyn PubSubClient>,
    topic: String,
    subscription: String,
    pull_max_messages: i64,
    pull_ack_deadline: i64,
    redelivery_ack_deadline: i64,
}

impl Connection {
    /// Wrap an already authenticated client. `config.key` is not used.
    pub fn new(client: Arc<dyn PubSubClient>, config: &ConnectionConfig) -> Self {
        Self {
            client,
            topic: config.topic.clone(),
            subscription: config.subscription.clone(),
            pull_max_messages: config.pull_max_messages,
            pull_ack_deadline: config.pull_ack_deadline,
            redelivery_ack_deadline: config.redelivery_ack_deadline,
        }
    }

    /// Parse the key and build the client. Any failure here means the
    /// connection is unusable and is returned as is.
    pub fn from_configuration(
        config: &ConnectionConfig,
        provider: &dyn ClientProvider,
    ) -> Result<Self, ConfigurationError> {
        let key = ServiceAccountKey::from_json(&config.key)?;
        let client = provider
            .create_client(&key)
            .map_err(ConfigurationError::Client)?;

        info!(
            project_id = %key.project_id,
            topic = %config.topic,
            subscription = %config.subscription,
            "Google Pub/Sub connection established"
        );

        Ok(Self::new(client, config))
    }

    pub fn from_dsn(
        dsn: &str,
        options: &TransportOptions,
        provider: &dyn ClientProvider,
    ) -> Result<Self, ConfigurationError> {
        let config = ConnectionConfig::from_dsn(dsn, options)?;
        Self::from_configuration(&config, provider)
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn subscription(&self) -> &str {
        &self.subscription
    }

    /// Publish one message to the topic and return its id.
    pub async fn publish(
        &self,
        body: Bytes,
        attributes: HashMap<String, String>,
        ordering_key: Option<String>,
    ) -> Result<String, TransportError> {
        let message = OutboundMessage::new(body)
            .with_attributes(attributes)
            .with_ordering_key(ordering_key);

        let response = self
            .client
            .publish(&self.topic, message)
            .await
            .map_err(TransportError::Publish)?;

        let message_id = response
            .message_ids
            .into_iter()
            .next()
            .ok_or(TransportError::MissingMessageId)?;

        debug!(topic = %self.topic, %message_id, "published message");
        Ok(message_id)
    }

    /// One pull cycle.
    ///
    /// When a post-pull ack deadline is configured, the whole batch is
    /// extended to it before anything is returned.
    pub async fn pull(&self) -> Result<Vec<WireMessage>, TransportError> {
        let max_messages = (self.pull_max_messages > 0)
            .then(|| u32::try_from(self.pull_max_messages).unwrap_or(u32::MAX));

        let messages = self
            .client
            .pull(&self.subscription, max_messages)
            .await
            .map_err(TransportError::Pull)?;

        debug!(
            subscription = %self.subscription,
            count = messages.len(),
            "pulled messages"
        );

        if self.pull_ack_deadline > 0 && !messages.is_empty() {
            self.modify_ack_deadline_batch(&messages, self.pull_ack_deadline)
                .await?;
        }

        Ok(messages)
    }

    pub async fn acknowledge(&self, message: &WireMessage) -> Result<(), TransportError> {
        self.client
            .acknowledge(&self.subscription, message)
            .await
            .map_err(TransportError::Acknowledge)?;

        debug!(
            subscription = %self.subscription,
            message_id = %message.message_id,
            "acknowledged message"
        );
        Ok(())
    }

    /// Same call as `acknowledge`.
    ///
    /// A rejected message is consumed; it is not nacked for immediate
    /// redelivery. Retries come either from the framework publishing a new
    /// message or from `modify_ack_deadline`, whose timing would change if
    /// this sent a negative acknowledgement instead.
    pub async fn reject(&self, message: &WireMessage) -> Result<(), TransportError> {
        self.acknowledge(message).await
    }

    /// Move the redelivery point of one delivery. Non-positive `seconds` use
    /// the configured redelivery ack deadline.
    pub async fn modify_ack_deadline(
        &self,
        message: &WireMessage,
        seconds: i64,
    ) -> Result<(), TransportError> {
        let seconds = if seconds > 0 {
            seconds
        } else {
            self.redelivery_ack_deadline
        };

        self.client
            .modify_ack_deadline(&self.subscription, message, seconds)
            .await
            .map_err(TransportError::ModifyAckDeadline)?;

        debug!(
            subscription = %self.subscription,
            message_id = %message.message_id,
            seconds,
            "modified ack deadline"
        );
        Ok(())
    }

    pub async fn modify_ack_deadline_batch(
        &self,
        messages: &[WireMessage],
        seconds: i64,
    ) -> Result<(), TransportError> {
        self.client
            .modify_ack_deadline_batch(&self.subscription, messages, seconds)
            .await
            .map_err(TransportError::ModifyAckDeadline)
    }

    pub fn debug_info(&self) -> DebugInfo {
        DebugInfo {
            client: self.client.client_info(),
            subscription: self.client.subscription_info(&self.subscription),
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("topic", &self.topic)
            .field("subscription", &self.subscription)
            .field("pull_max_messages", &self.pull_max_messages)
            .field("pull_ack_deadline", &self.pull_ack_deadline)
            .field("redelivery_ack_deadline", &self.redelivery_ack_deadline)
            .finish()
    }
}
