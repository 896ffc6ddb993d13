//! Subscription state
//!
//! A subscription keeps a backlog of messages waiting to be pulled and the
//! leases of messages that were pulled but not acknowledged yet. Callers must
//! synchronize access (the broker lock) when modifying it.

use std::collections::{HashMap, HashSet, VecDeque};

use serde_json::json;

use crate::broker::message::{Lease, Message};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionSettings {
    pub ack_deadline_seconds: i64,
    pub enable_message_ordering: bool,
}

impl Default for SubscriptionSettings {
    fn default() -> Self {
        Self {
            ack_deadline_seconds: 10,
            enable_message_ordering: false,
        }
    }
}

#[derive(Debug)]
pub struct Subscription {
    pub name: String,
    pub topic: String,
    pub settings: SubscriptionSettings,
    pub backlog: VecDeque<Message>,
    pub outstanding: HashMap<String, Lease>,
}

impl Subscription {
    pub fn new(name: &str, topic: &str, settings: SubscriptionSettings) -> Self {
        Self {
            name: name.to_string(),
            topic: topic.to_string(),
            settings,
            backlog: VecDeque::new(),
            outstanding: HashMap::new(),
        }
    }

    pub fn enqueue(&mut self, message: Message) {
        self.backlog.push_back(message);
    }

    /// Move every lease whose deadline has passed back into the backlog,
    /// keeping the backlog in publish order.
    pub fn expire_leases(&mut self, now: i64) {
        let expired: Vec<String> = self
            .outstanding
            .iter()
            .filter(|(_, lease)| lease.deadline <= now)
            .map(|(ack_id, _)| ack_id.clone())
            .collect();

        if expired.is_empty() {
            return;
        }

        for ack_id in expired {
            if let Some(lease) = self.outstanding.remove(&ack_id) {
                self.backlog.push_back(lease.message);
            }
        }
        self.backlog
            .make_contiguous()
            .sort_by_key(|message| message.sequence);
    }

    /// Take up to `max` messages that may be delivered now.
    ///
    /// With message ordering enabled, a message is held back while another
    /// message with the same ordering key is leased or was held back earlier
    /// in this scan, so a key is never delivered out of order.
    pub fn take_deliverable(&mut self, max: usize) -> Vec<Message> {
        let ordering = self.settings.enable_message_ordering;
        let mut blocked: HashSet<String> = if ordering {
            self.outstanding
                .values()
                .filter_map(|lease| lease.message.ordering_key.clone())
                .collect()
        } else {
            HashSet::new()
        };

        let mut taken = Vec::new();
        let mut held = VecDeque::new();

        while let Some(message) = self.backlog.pop_front() {
            let key_blocked = ordering
                && message
                    .ordering_key
                    .as_ref()
                    .is_some_and(|key| blocked.contains(key));

            if taken.len() >= max || key_blocked {
                if ordering {
                    if let Some(key) = &message.ordering_key {
                        blocked.insert(key.clone());
                    }
                }
                held.push_back(message);
            } else {
                taken.push(message);
            }
        }

        self.backlog = held;
        taken
    }

    pub fn lease(&mut self, ack_id: String, message: Message, deadline: i64) {
        self.outstanding.insert(ack_id, Lease { message, deadline });
    }

    pub fn info(&self) -> serde_json::Value {
        json!({
            "name": self.name,
            "topic": self.topic,
            "ack_deadline_seconds": self.settings.ack_deadline_seconds,
            "enable_message_ordering": self.settings.enable_message_ordering,
            "backlog": self.backlog.len(),
            "outstanding": self.outstanding.len(),
        })
    }
}
