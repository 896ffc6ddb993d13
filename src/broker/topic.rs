//! Topic management
//!
//! A `Topic` holds the names of the subscriptions attached to it. Attaching
//! the same subscription twice is a no-op.

use std::collections::HashSet;

pub type SubscriptionName = String;

#[derive(Debug, Default)]
pub struct Topic {
    pub name: String,
    pub subscriptions: HashSet<SubscriptionName>,
}

impl Topic {
    /// Create a new topic with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subscriptions: HashSet::new(),
        }
    }

    pub fn attach(&mut self, subscription: SubscriptionName) {
        self.subscriptions.insert(subscription);
    }
}
