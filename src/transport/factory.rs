//! Builds transports from `gps://` DSNs.

use crate::client::ClientProvider;
use crate::config::{self, TransportOptions};
use crate::transport::codec::Codec;
use crate::transport::connection::Connection;
use crate::transport::gps_transport::GpsTransport;
use crate::utils::error::ConfigurationError;

#[derive(Debug, Clone)]
pub struct GpsTransportFactory<P> {
    provider: P,
}

impl<P> GpsTransportFactory<P>
where
    P: ClientProvider,
{
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn create_transport<M, C>(
        &self,
        dsn: &str,
        options: &TransportOptions,
        codec: C,
    ) -> Result<GpsTransport<M, C>, ConfigurationError>
    where
        M: Send + Sync + 'static,
        C: Codec<M> + 'static,
    {
        let connection = Connection::from_dsn(dsn, options, &self.provider)?;
        Ok(GpsTransport::new(connection, codec))
    }

    pub fn supports(&self, dsn: &str, _options: &TransportOptions) -> bool {
        config::supports(dsn)
    }
}
