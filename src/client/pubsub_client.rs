//! Pub/sub client capability
//!
//! `PubSubClient` is the minimal surface the transport needs from a managed
//! publish/subscribe service: publish to a topic, pull from a subscription,
//! acknowledge a delivery and move its ack deadline. Deliveries are
//! at-least-once; a pulled message that is neither acknowledged nor extended
//! is redelivered once its ack deadline passes.
//!
//! Topic and subscription arguments are short names; implementations qualify
//! them with their project (see `topic_path` / `subscription_path`).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::client::credentials::ServiceAccountKey;
use crate::utils::error::ServiceError;

/// A message about to be published. It has no identifier until the service
/// accepts it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutboundMessage {
    pub data: Bytes,
    pub attributes: HashMap<String, String>,
    pub ordering_key: Option<String>,
}

impl OutboundMessage {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            ..Default::default()
        }
    }

    pub fn with_attributes(mut self, attributes: HashMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    /// An empty key means "no ordering" and is stored as `None`.
    pub fn with_ordering_key(mut self, ordering_key: Option<String>) -> Self {
        self.ordering_key = ordering_key.filter(|key| !key.is_empty());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResponse {
    pub message_ids: Vec<String>,
}

/// One delivery of a message pulled from a subscription.
///
/// `ack_id` identifies this delivery, not the message: a redelivered message
/// keeps its `message_id` but gets a new `ack_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireMessage {
    pub message_id: String,
    pub data: Bytes,
    pub attributes: HashMap<String, String>,
    pub ordering_key: Option<String>,
    pub publish_time: DateTime<Utc>,
    pub ack_id: String,
    pub delivery_attempt: u32,
}

#[async_trait]
pub trait PubSubClient: Send + Sync {
    async fn publish(
        &self,
        topic: &str,
        message: OutboundMessage,
    ) -> Result<PublishResponse, ServiceError>;

    /// Pull one batch. `None` lets the service pick the batch size.
    async fn pull(
        &self,
        subscription: &str,
        max_messages: Option<u32>,
    ) -> Result<Vec<WireMessage>, ServiceError>;

    async fn acknowledge(&self, subscription: &str, message: &WireMessage)
    -> Result<(), ServiceError>;

    async fn modify_ack_deadline(
        &self,
        subscription: &str,
        message: &WireMessage,
        seconds: i64,
    ) -> Result<(), ServiceError>;

    async fn modify_ack_deadline_batch(
        &self,
        subscription: &str,
        messages: &[WireMessage],
        seconds: i64,
    ) -> Result<(), ServiceError>;

    /// Best-effort introspection of the client itself.
    fn client_info(&self) -> serde_json::Value;

    /// Best-effort introspection of a subscription.
    fn subscription_info(&self, subscription: &str) -> serde_json::Value;
}

/// Builds an authenticated client from service account credentials.
pub trait ClientProvider: Send + Sync {
    fn create_client(&self, key: &ServiceAccountKey)
    -> Result<Arc<dyn PubSubClient>, ServiceError>;
}

/// `projects/{project}/topics/{name}`, unless `name` is already qualified.
pub fn topic_path(project_id: &str, name: &str) -> String {
    qualify(project_id, "topics", name)
}

/// `projects/{project}/subscriptions/{name}`, unless `name` is already qualified.
pub fn subscription_path(project_id: &str, name: &str) -> String {
    qualify(project_id, "subscriptions", name)
}

fn qualify(project_id: &str, collection: &str, name: &str) -> String {
    if name.starts_with("projects/") {
        name.to_string()
    } else {
        format!("projects/{project_id}/{collection}/{name}")
    }
}
