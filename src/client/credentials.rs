//! Credentials
//!
//! The key is a Google credentials JSON document: usually a service account
//! key, but `authorized_user` keys are accepted too. It is parsed once, when a
//! connection is built. Whether the credentials can actually authenticate is
//! up to the `ClientProvider`.

use serde::{Deserialize, Serialize};

use crate::utils::error::ConfigurationError;

#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: String,
    /// Empty when the key does not name a project; the provider then has to
    /// find one.
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub private_key_id: String,
    #[serde(default)]
    pub private_key: String,
    #[serde(default)]
    pub client_email: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub token_uri: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_secret: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub refresh_token: String,
}

impl ServiceAccountKey {
    /// Parse and validate a JSON key.
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let key: Self =
            serde_json::from_str(json).map_err(ConfigurationError::InvalidCredentials)?;
        key.validate()?;
        Ok(key)
    }

    /// Only the credential type is required.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.key_type.is_empty() {
            return Err(ConfigurationError::IncompleteCredentials(
                "missing credential type".to_string(),
            ));
        }
        Ok(())
    }

    pub fn project_id(&self) -> Option<&str> {
        Some(self.project_id.as_str()).filter(|id| !id.is_empty())
    }

    /// True when the key carries a secret a provider can sign in with.
    pub fn has_secret(&self) -> bool {
        !self.private_key.is_empty() || !self.refresh_token.is_empty()
    }
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("key_type", &self.key_type)
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .field("client_email", &self.client_email)
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}
