//! The `broker` module is an in-process pub/sub service.
//!
//! It behaves like the managed service the transport is written against:
//! topics fan messages out to subscriptions, pulled messages are leased for
//! an ack deadline and redelivered when the lease runs out and ordering keys
//! are honored per subscription. It backs `client::MemoryClient` and is used
//! for local development and tests.

pub mod engine;
pub mod message;
pub mod subscription;
pub mod topic;

pub use engine::Broker;
pub use subscription::SubscriptionSettings;
