use std::fs;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serial_test::serial;
use tempfile::TempDir;

use super::dsn::parse_leading_int;
use super::{ConnectionConfig, TransportOptions, load_options_from, supports};
use crate::utils::error::ConfigurationError;

const KEY_JSON: &str = r#"{"type":"service_account","project_id":"p"}"#;

fn encoded_key() -> String {
    STANDARD.encode(KEY_JSON)
}

#[test]
fn test_supports_gps_scheme_only() {
    assert!(supports("gps://default?topic=t"));
    assert!(supports("gps://"));
    assert!(!supports("amqp://localhost"));
    assert!(!supports("GPS://default"));
    assert!(!supports(" gps://default"));
}

#[test]
fn test_from_dsn_reads_query() {
    let dsn = format!(
        "gps://default?topic=orders&subscription=orders-worker&key={}&pull_max_messages=100&pull_ack_deadline=10&redelivery_ack_deadline=30",
        encoded_key()
    );
    let config = ConnectionConfig::from_dsn(&dsn, &TransportOptions::default()).unwrap();

    assert_eq!(config.topic, "orders");
    assert_eq!(config.subscription, "orders-worker");
    assert_eq!(config.key, KEY_JSON);
    assert_eq!(config.pull_max_messages, 100);
    assert_eq!(config.pull_ack_deadline, 10);
    assert_eq!(config.redelivery_ack_deadline, 30);
}

#[test]
fn test_from_dsn_falls_back_to_options() {
    let options = TransportOptions {
        topic: Some("opt-topic".into()),
        subscription: Some("opt-sub".into()),
        key: Some(encoded_key()),
        pull_max_messages: Some(5),
        pull_ack_deadline: Some(20),
        redelivery_ack_deadline: Some(40),
    };
    let config = ConnectionConfig::from_dsn("gps://default", &options).unwrap();

    assert_eq!(config.topic, "opt-topic");
    assert_eq!(config.subscription, "opt-sub");
    assert_eq!(config.key, KEY_JSON);
    assert_eq!(config.pull_max_messages, 5);
    assert_eq!(config.pull_ack_deadline, 20);
    assert_eq!(config.redelivery_ack_deadline, 40);
}

#[test]
fn test_query_wins_over_options() {
    let options = TransportOptions {
        topic: Some("opt-topic".into()),
        pull_ack_deadline: Some(20),
        ..Default::default()
    };
    let from_query =
        ConnectionConfig::from_dsn("gps://default?topic=q-topic&pull_ack_deadline=7", &options)
            .unwrap();
    assert_eq!(from_query.topic, "q-topic");
    assert_eq!(from_query.pull_ack_deadline, 7);

    // Same values supplied only through options derive the same config
    let from_options = ConnectionConfig::from_dsn(
        "gps://default",
        &TransportOptions {
            topic: Some("q-topic".into()),
            pull_ack_deadline: Some(7),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(from_query, from_options);
}

#[test]
fn test_missing_values_default_to_empty_and_zero() {
    let config = ConnectionConfig::from_dsn("gps://default", &TransportOptions::default()).unwrap();
    assert_eq!(config.topic, "");
    assert_eq!(config.subscription, "");
    assert_eq!(config.key, "");
    assert_eq!(config.pull_max_messages, 0);
    assert_eq!(config.pull_ack_deadline, 0);
    assert_eq!(config.redelivery_ack_deadline, 0);
}

#[test]
fn test_non_numeric_parameters_are_zero() {
    let config = ConnectionConfig::from_dsn(
        "gps://default?pull_max_messages=lots&pull_ack_deadline=15s&redelivery_ack_deadline=-3",
        &TransportOptions::default(),
    )
    .unwrap();
    assert_eq!(config.pull_max_messages, 0);
    assert_eq!(config.pull_ack_deadline, 15);
    assert_eq!(config.redelivery_ack_deadline, -3);
}

#[test]
fn test_parse_leading_int() {
    assert_eq!(parse_leading_int("42"), 42);
    assert_eq!(parse_leading_int("  42abc"), 42);
    assert_eq!(parse_leading_int("+7"), 7);
    assert_eq!(parse_leading_int("-7"), -7);
    assert_eq!(parse_leading_int("abc"), 0);
    assert_eq!(parse_leading_int(""), 0);
    assert_eq!(parse_leading_int("-"), 0);
}

#[test]
fn test_parse_leading_int_saturates() {
    assert_eq!(parse_leading_int("99999999999999999999"), i64::MAX);
    assert_eq!(parse_leading_int("-99999999999999999999"), i64::MIN);
    assert_eq!(parse_leading_int("-9223372036854775808"), i64::MIN);

    let config = ConnectionConfig::from_dsn(
        "gps://default?pull_ack_deadline=99999999999999999999s",
        &TransportOptions::default(),
    )
    .unwrap();
    assert_eq!(config.pull_ack_deadline, i64::MAX);
}

#[test]
fn test_key_without_padding() {
    let padded = encoded_key();
    let unpadded = padded.trim_end_matches('=');
    assert_ne!(padded, unpadded);

    let dsn = format!("gps://default?key={}", unpadded.replace('+', "%2B"));
    let config = ConnectionConfig::from_dsn(&dsn, &TransportOptions::default()).unwrap();
    assert_eq!(config.key, KEY_JSON);
}

#[test]
fn test_key_must_be_utf8() {
    // "//4" is 0xFF 0xFE
    let err = ConnectionConfig::from_dsn("gps://default?key=//4", &TransportOptions::default())
        .unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidKeyText(_)));
}

#[test]
fn test_key_with_unescaped_plus() {
    // "??>" encodes to "Pz8+" which an unescaped query turns into "Pz8 "
    let config =
        ConnectionConfig::from_dsn("gps://default?key=Pz8+", &TransportOptions::default()).unwrap();
    assert_eq!(config.key, "??>");

    let config =
        ConnectionConfig::from_dsn("gps://default?key=Pz8%2B", &TransportOptions::default())
            .unwrap();
    assert_eq!(config.key, "??>");
}

#[test]
fn test_invalid_dsn() {
    let err = ConnectionConfig::from_dsn("not a dsn", &TransportOptions::default()).unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidDsn { .. }));
    assert!(err.to_string().contains("not a dsn"));
}

#[test]
fn test_invalid_key_encoding() {
    let err = ConnectionConfig::from_dsn("gps://default?key=%%%", &TransportOptions::default())
        .unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidKeyEncoding(_)));
}

#[test]
fn test_debug_redacts_key() {
    let config = ConnectionConfig::from_dsn(
        &format!("gps://default?key={}", encoded_key()),
        &TransportOptions::default(),
    )
    .unwrap();
    let printed = format!("{config:?}");
    assert!(printed.contains("<redacted>"));
    assert!(!printed.contains("service_account"));
}

#[test]
#[serial]
fn test_load_options_from_file() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("gps.toml");
    fs::write(
        &path,
        r#"
            topic = "file-topic"
            subscription = "file-sub"
            pull_max_messages = 25
            redelivery_ack_deadline = 60
        "#,
    )
    .expect("write config file");

    let base = tmp.path().join("gps");
    let options = temp_env::with_vars_unset(
        ["GPS_TOPIC", "GPS_SUBSCRIPTION", "GPS_PULL_MAX_MESSAGES"],
        || load_options_from(base.to_str().unwrap()),
    )
    .expect("load options");

    assert_eq!(options.topic.as_deref(), Some("file-topic"));
    assert_eq!(options.subscription.as_deref(), Some("file-sub"));
    assert_eq!(options.pull_max_messages, Some(25));
    assert_eq!(options.redelivery_ack_deadline, Some(60));
    assert_eq!(options.pull_ack_deadline, None);
    assert_eq!(options.key, None);
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    let tmp = TempDir::new().expect("create tempdir");
    fs::write(tmp.path().join("gps.toml"), "topic = \"file-topic\"\n").expect("write");
    let base = tmp.path().join("gps");

    let options = temp_env::with_vars(
        [
            ("GPS_TOPIC", Some("env-topic")),
            ("GPS_PULL_ACK_DEADLINE", Some("15")),
        ],
        || load_options_from(base.to_str().unwrap()),
    )
    .expect("load options");

    assert_eq!(options.topic.as_deref(), Some("env-topic"));
    assert_eq!(options.pull_ack_deadline, Some(15));
}

#[test]
#[serial]
fn test_missing_file_is_not_an_error() {
    let tmp = TempDir::new().expect("create tempdir");
    let base = tmp.path().join("absent");
    let options = temp_env::with_vars_unset(
        ["GPS_TOPIC", "GPS_PULL_ACK_DEADLINE"],
        || load_options_from(base.to_str().unwrap()),
    )
    .expect("load options");
    assert_eq!(options.topic, None);
}
