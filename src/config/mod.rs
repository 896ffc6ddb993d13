//! The `config` module turns a DSN plus option defaults into the immutable
//! `ConnectionConfig` a connection is built from.
//!
//! Option defaults can be loaded from a `config/gps` file and `GPS_*`
//! environment variables; the DSN query string overrides them.

mod dsn;
mod settings;

use config::{Config, ConfigError, Environment, File};

pub use dsn::{SCHEME, supports};
pub use settings::{ConnectionConfig, TransportOptions};

/// Loads option defaults from `config/gps` and `GPS_*` environment variables.
pub fn load_options() -> Result<TransportOptions, ConfigError> {
    load_options_from("config/gps")
}

/// Loads option defaults from the file at `path` (extension optional, the
/// file may be missing) overlaid by `GPS_*` environment variables, e.g.
/// `GPS_TOPIC` or `GPS_PULL_ACK_DEADLINE`. A `.env` file is read first.
pub fn load_options_from(path: &str) -> Result<TransportOptions, ConfigError> {
    let _ = dotenvy::dotenv();

    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(Environment::with_prefix("GPS").try_parsing(true));

    builder.build()?.try_deserialize()
}

#[cfg(test)]
mod tests;
