//! Local loopback demo: publishes a few messages through a GPS transport
//! backed by the in-memory broker, then receives and acknowledges them.
//!
//! Topic, subscription and pull settings come from `config/gps` and `GPS_*`
//! environment variables when present.

use std::sync::{Arc, Mutex};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures_util::StreamExt;
use serde_json::json;
use tracing::info;

use gps_transport::broker::{Broker, SubscriptionSettings};
use gps_transport::client::{MemoryProvider, ServiceAccountKey, subscription_path, topic_path};
use gps_transport::config::load_options;
use gps_transport::transport::{Envelope, GpsTransportFactory, JsonCodec, MessageTransport};
use gps_transport::utils::logging;

const DEMO_PROJECT: &str = "local-project";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init("info");

    let mut options = load_options()?;
    let topic = options.topic.get_or_insert_with(|| "demo".to_string()).clone();
    let subscription = options
        .subscription
        .get_or_insert_with(|| "demo-worker".to_string())
        .clone();

    let key = ServiceAccountKey {
        key_type: "service_account".to_string(),
        project_id: DEMO_PROJECT.to_string(),
        private_key: "local".to_string(),
        client_email: format!("demo@{DEMO_PROJECT}.iam.gserviceaccount.com"),
        ..Default::default()
    };
    options
        .key
        .get_or_insert(STANDARD.encode(serde_json::to_string(&key)?));

    let mut broker = Broker::new();
    broker.create_topic(&topic_path(DEMO_PROJECT, &topic))?;
    broker.create_subscription(
        &subscription_path(DEMO_PROJECT, &subscription),
        &topic_path(DEMO_PROJECT, &topic),
        SubscriptionSettings::default(),
    )?;

    let factory = GpsTransportFactory::new(MemoryProvider::new(Arc::new(Mutex::new(broker))));
    let transport = factory.create_transport::<serde_json::Value, _>(
        "gps://default",
        &options,
        JsonCodec::new(),
    )?;

    for n in 1..=3 {
        let sent = transport
            .send(Envelope::new(json!({ "n": n })).with_ordering_key("demo"))
            .await?;
        if let Some(stamp) = &sent.stamps().transport_message_id {
            info!(message_id = stamp.id(), "sent");
        }
    }

    let mut envelopes = transport.get();
    while let Some(envelope) = envelopes.next().await {
        let envelope = envelope?;
        info!(body = %envelope.message(), "received");
        transport.ack(&envelope).await?;
    }

    info!(debug = %serde_json::to_string(&transport.debug_info())?, "done");
    Ok(())
}
