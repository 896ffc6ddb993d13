//! DSN parsing
//!
//! `gps://<ignored-host>?topic=..&subscription=..&key=..&pull_max_messages=..
//! &pull_ack_deadline=..&redelivery_ack_deadline=..`
//!
//! Query parameters override the option defaults passed alongside the DSN.

use std::collections::HashMap;

use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{Engine, alphabet};
use url::Url;

use crate::config::settings::{ConnectionConfig, TransportOptions};
use crate::utils::error::ConfigurationError;

pub const SCHEME: &str = "gps://";

/// Standard alphabet, padding optional.
const KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// True when the DSN targets this transport.
pub fn supports(dsn: &str) -> bool {
    dsn.starts_with(SCHEME)
}

impl ConnectionConfig {
    pub fn from_dsn(dsn: &str, options: &TransportOptions) -> Result<Self, ConfigurationError> {
        let url = Url::parse(dsn).map_err(|source| ConfigurationError::InvalidDsn {
            dsn: dsn.to_string(),
            source,
        })?;

        // Repeated parameters: the last one wins
        let query: HashMap<String, String> = url.query_pairs().into_owned().collect();

        let text = |name: &str, fallback: &Option<String>| {
            query
                .get(name)
                .cloned()
                .or_else(|| fallback.clone())
                .unwrap_or_default()
        };
        let number = |name: &str, fallback: Option<i64>| {
            query
                .get(name)
                .map(|value| parse_leading_int(value))
                .or(fallback)
                .unwrap_or(0)
        };

        Ok(Self {
            topic: text("topic", &options.topic),
            subscription: text("subscription", &options.subscription),
            key: decode_key(&text("key", &options.key))?,
            pull_max_messages: number("pull_max_messages", options.pull_max_messages),
            pull_ack_deadline: number("pull_ack_deadline", options.pull_ack_deadline),
            redelivery_ack_deadline: number(
                "redelivery_ack_deadline",
                options.redelivery_ack_deadline,
            ),
        })
    }
}

/// Base64 key to JSON text. Form decoding turns an unescaped `+` into a
/// space, so spaces are mapped back before decoding. Trailing `=` padding
/// may be stripped.
fn decode_key(encoded: &str) -> Result<String, ConfigurationError> {
    let normalized = encoded.replace(' ', "+");
    let bytes = KEY_ENGINE.decode(normalized.trim())?;
    Ok(String::from_utf8(bytes)?)
}

/// Integer prefix of `value` (optional sign, then digits), `0` if there is
/// none. Out-of-range prefixes saturate.
pub(crate) fn parse_leading_int(value: &str) -> i64 {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    if end == 0 {
        return 0;
    }
    let magnitude = &digits[..end];
    if negative {
        format!("-{magnitude}").parse().unwrap_or(i64::MIN)
    } else {
        magnitude.parse().unwrap_or(i64::MAX)
    }
}
