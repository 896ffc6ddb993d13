//! Broker engine
//!
//! This module contains the in-memory pub/sub service responsible for:
//! - managing topics and the subscriptions attached to them
//! - fanning published messages out to every attached subscription
//! - leasing pulled messages for an ack deadline and redelivering them when
//!   the deadline passes without an acknowledgement
//!
//! Concurrency and usage notes:
//! - The API is synchronous and designed to be held behind a lock (for
//!   example `Arc<Mutex<Broker>>`) by `MemoryClient`.
//! - There is no background task: expired leases are returned to the backlog
//!   lazily, at the start of every pull.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::broker::message::Message;
use crate::broker::subscription::{Subscription, SubscriptionSettings};
use crate::broker::topic::Topic;
use crate::client::{OutboundMessage, WireMessage};
use crate::utils::error::ServiceError;

#[derive(Debug, Default)]
pub struct Broker {
    pub topics: HashMap<String, Topic>,
    pub subscriptions: HashMap<String, Subscription>,
    next_sequence: u64,
}

impl Broker {
    /// Batch size used when a pull does not ask for one.
    pub const DEFAULT_MAX_MESSAGES: usize = 100;

    /// Upper bound accepted for ack deadlines, in seconds.
    pub const MAX_ACK_DEADLINE_SECS: i64 = 600;
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_topic(&mut self, name: &str) -> Result<(), ServiceError> {
        if self.topics.contains_key(name) {
            return Err(ServiceError::AlreadyExists {
                resource: "topic",
                name: name.to_string(),
            });
        }
        self.topics.insert(name.to_string(), Topic::new(name));
        Ok(())
    }

    /// Create a subscription on an existing topic. Only messages published
    /// after this call are delivered to it.
    pub fn create_subscription(
        &mut self,
        name: &str,
        topic: &str,
        settings: SubscriptionSettings,
    ) -> Result<(), ServiceError> {
        if self.subscriptions.contains_key(name) {
            return Err(ServiceError::AlreadyExists {
                resource: "subscription",
                name: name.to_string(),
            });
        }
        if !(0..=Self::MAX_ACK_DEADLINE_SECS).contains(&settings.ack_deadline_seconds) {
            return Err(ServiceError::InvalidArgument(format!(
                "ack deadline must be between 0 and {} seconds, got {}",
                Self::MAX_ACK_DEADLINE_SECS,
                settings.ack_deadline_seconds
            )));
        }

        let topic_entry = self
            .topics
            .get_mut(topic)
            .ok_or_else(|| ServiceError::NotFound {
                resource: "topic",
                name: topic.to_string(),
            })?;
        topic_entry.attach(name.to_string());

        self.subscriptions
            .insert(name.to_string(), Subscription::new(name, topic, settings));
        Ok(())
    }

    pub fn subscription(&self, name: &str) -> Option<&Subscription> {
        self.subscriptions.get(name)
    }

    /// Publish a message and return the id the broker assigned to it.
    pub fn publish(
        &mut self,
        topic: &str,
        message: OutboundMessage,
    ) -> Result<String, ServiceError> {
        let subscriptions: Vec<String> = self
            .topics
            .get(topic)
            .ok_or_else(|| ServiceError::NotFound {
                resource: "topic",
                name: topic.to_string(),
            })?
            .subscriptions
            .iter()
            .cloned()
            .collect();

        self.next_sequence += 1;
        let stored = Message {
            message_id: Uuid::new_v4().to_string(),
            sequence: self.next_sequence,
            data: message.data,
            attributes: message.attributes,
            ordering_key: message.ordering_key.filter(|key| !key.is_empty()),
            publish_time: Utc::now(),
            delivery_attempt: 0,
        };

        for name in subscriptions {
            if let Some(subscription) = self.subscriptions.get_mut(&name) {
                subscription.enqueue(stored.clone());
            }
        }

        Ok(stored.message_id)
    }

    pub fn pull(
        &mut self,
        subscription: &str,
        max_messages: Option<usize>,
    ) -> Result<Vec<WireMessage>, ServiceError> {
        self.pull_at(subscription, max_messages, Utc::now().timestamp_millis())
    }

    pub(crate) fn pull_at(
        &mut self,
        subscription: &str,
        max_messages: Option<usize>,
        now: i64,
    ) -> Result<Vec<WireMessage>, ServiceError> {
        let max = max_messages
            .filter(|max| *max > 0)
            .unwrap_or(Self::DEFAULT_MAX_MESSAGES);

        let sub = self.subscription_mut(subscription)?;
        sub.expire_leases(now);

        let lease_ms = sub.settings.ack_deadline_seconds * 1000;
        let mut delivered = Vec::new();

        for mut message in sub.take_deliverable(max) {
            message.delivery_attempt += 1;
            let ack_id = Uuid::new_v4().to_string();
            delivered.push(WireMessage {
                message_id: message.message_id.clone(),
                data: message.data.clone(),
                attributes: message.attributes.clone(),
                ordering_key: message.ordering_key.clone(),
                publish_time: message.publish_time,
                ack_id: ack_id.clone(),
                delivery_attempt: message.delivery_attempt,
            });
            sub.lease(ack_id, message, now + lease_ms);
        }

        Ok(delivered)
    }

    /// Drop the leases for `ack_ids`. Unknown or expired ack ids are ignored.
    pub fn acknowledge(&mut self, subscription: &str, ack_ids: &[&str]) -> Result<(), ServiceError> {
        let sub = self.subscription_mut(subscription)?;
        for ack_id in ack_ids {
            sub.outstanding.remove(*ack_id);
        }
        Ok(())
    }

    pub fn modify_ack_deadline(
        &mut self,
        subscription: &str,
        ack_ids: &[&str],
        seconds: i64,
    ) -> Result<(), ServiceError> {
        self.modify_ack_deadline_at(subscription, ack_ids, seconds, Utc::now().timestamp_millis())
    }

    /// Move the deadline of each lease to `now + seconds`. Zero makes the
    /// messages eligible for redelivery right away.
    pub(crate) fn modify_ack_deadline_at(
        &mut self,
        subscription: &str,
        ack_ids: &[&str],
        seconds: i64,
        now: i64,
    ) -> Result<(), ServiceError> {
        if !(0..=Self::MAX_ACK_DEADLINE_SECS).contains(&seconds) {
            return Err(ServiceError::InvalidArgument(format!(
                "ack deadline must be between 0 and {} seconds, got {seconds}",
                Self::MAX_ACK_DEADLINE_SECS
            )));
        }

        let sub = self.subscription_mut(subscription)?;
        for ack_id in ack_ids {
            if let Some(lease) = sub.outstanding.get_mut(*ack_id) {
                lease.deadline = now + seconds * 1000;
            }
        }
        Ok(())
    }

    fn subscription_mut(&mut self, name: &str) -> Result<&mut Subscription, ServiceError> {
        self.subscriptions
            .get_mut(name)
            .ok_or_else(|| ServiceError::NotFound {
                resource: "subscription",
                name: name.to_string(),
            })
    }
}
