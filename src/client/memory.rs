//! In-memory client
//!
//! `MemoryClient` implements `PubSubClient` on top of a shared `Broker`. Each
//! client is bound to the project of the key it was created from, so short
//! topic/subscription names resolve the same way they would against the
//! managed service.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::json;

use crate::broker::Broker;
use crate::client::credentials::ServiceAccountKey;
use crate::client::pubsub_client::{
    ClientProvider, OutboundMessage, PubSubClient, PublishResponse, WireMessage,
    subscription_path, topic_path,
};
use crate::utils::error::ServiceError;

#[derive(Debug, Clone)]
pub struct MemoryClient {
    broker: Arc<Mutex<Broker>>,
    project_id: String,
    client_email: String,
}

impl MemoryClient {
    pub fn new(broker: Arc<Mutex<Broker>>, key: &ServiceAccountKey) -> Self {
        Self {
            broker,
            project_id: key.project_id.clone(),
            client_email: key.client_email.clone(),
        }
    }

    /// Resolve names against `project_id` instead of the key's project.
    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn lock(&self) -> Result<MutexGuard<'_, Broker>, ServiceError> {
        self.broker
            .lock()
            .map_err(|_| ServiceError::Unavailable("broker lock poisoned".to_string()))
    }
}

#[async_trait]
impl PubSubClient for MemoryClient {
    async fn publish(
        &self,
        topic: &str,
        message: OutboundMessage,
    ) -> Result<PublishResponse, ServiceError> {
        let topic = topic_path(&self.project_id, topic);
        let message_id = self.lock()?.publish(&topic, message)?;
        Ok(PublishResponse {
            message_ids: vec![message_id],
        })
    }

    async fn pull(
        &self,
        subscription: &str,
        max_messages: Option<u32>,
    ) -> Result<Vec<WireMessage>, ServiceError> {
        let subscription = subscription_path(&self.project_id, subscription);
        let max_messages = max_messages.map(|max| max as usize);
        self.lock()?.pull(&subscription, max_messages)
    }

    async fn acknowledge(
        &self,
        subscription: &str,
        message: &WireMessage,
    ) -> Result<(), ServiceError> {
        let subscription = subscription_path(&self.project_id, subscription);
        self.lock()?
            .acknowledge(&subscription, &[message.ack_id.as_str()])
    }

    async fn modify_ack_deadline(
        &self,
        subscription: &str,
        message: &WireMessage,
        seconds: i64,
    ) -> Result<(), ServiceError> {
        let subscription = subscription_path(&self.project_id, subscription);
        self.lock()?
            .modify_ack_deadline(&subscription, &[message.ack_id.as_str()], seconds)
    }

    async fn modify_ack_deadline_batch(
        &self,
        subscription: &str,
        messages: &[WireMessage],
        seconds: i64,
    ) -> Result<(), ServiceError> {
        let subscription = subscription_path(&self.project_id, subscription);
        let ack_ids: Vec<&str> = messages.iter().map(|m| m.ack_id.as_str()).collect();
        self.lock()?
            .modify_ack_deadline(&subscription, &ack_ids, seconds)
    }

    fn client_info(&self) -> serde_json::Value {
        json!({
            "backend": "memory",
            "project_id": self.project_id,
            "client_email": self.client_email,
        })
    }

    fn subscription_info(&self, subscription: &str) -> serde_json::Value {
        let name = subscription_path(&self.project_id, subscription);
        match self.lock() {
            Ok(broker) => broker
                .subscription(&name)
                .map(|sub| sub.info())
                .unwrap_or_else(|| json!({ "name": name, "exists": false })),
            Err(e) => json!({ "name": name, "error": e.to_string() }),
        }
    }
}

/// Hands out `MemoryClient`s sharing one broker.
///
/// Keys that name no project use the provider's default project, the way
/// the managed service falls back to the ambient project.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    broker: Arc<Mutex<Broker>>,
    default_project: Option<String>,
}

impl MemoryProvider {
    pub fn new(broker: Arc<Mutex<Broker>>) -> Self {
        Self {
            broker,
            default_project: None,
        }
    }

    pub fn with_default_project(mut self, project_id: impl Into<String>) -> Self {
        self.default_project = Some(project_id.into());
        self
    }

    pub fn broker(&self) -> Arc<Mutex<Broker>> {
        self.broker.clone()
    }
}

impl ClientProvider for MemoryProvider {
    fn create_client(
        &self,
        key: &ServiceAccountKey,
    ) -> Result<Arc<dyn PubSubClient>, ServiceError> {
        if !key.has_secret() {
            return Err(ServiceError::Unauthenticated(format!(
                "no private key or refresh token in {} credentials",
                key.key_type
            )));
        }

        let project_id = key
            .project_id()
            .or(self.default_project.as_deref())
            .ok_or_else(|| {
                ServiceError::InvalidArgument(
                    "the key names no project and no default project is set".to_string(),
                )
            })?;

        Ok(Arc::new(
            MemoryClient::new(self.broker.clone(), key).with_project(project_id),
        ))
    }
}
