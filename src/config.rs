use secrecy::SecretString;
use std::{env, fmt};
use url::Url;

use crate::error::ConfigError;

/// The LINE Pay sandbox host.
pub const SANDBOX_HOST: &str = "https://sandbox-api-pay.line.me";

/// The LINE Pay production host.
pub const PRODUCTION_HOST: &str = "https://api-pay.line.me";

const CHANNEL_ID_ENV: &str = "LINE_PAY_CHANNEL_ID";
const CHANNEL_SECRET_ENV: &str = "LINE_PAY_CHANNEL_SECRET";
const API_HOST_ENV: &str = "LINE_PAY_API_HOST";

/// Everything needed to talk to LINE Pay on behalf of a channel.
#[derive(Clone)]
pub struct ClientConfig {
    pub channel_id: String,
    pub channel_secret: SecretString,
    pub api_host: String,
}

impl ClientConfig {
    /// A configuration pointing at the sandbox.
    pub fn sandbox(channel_id: impl Into<String>, channel_secret: impl Into<String>) -> Self {
        Self::new(channel_id, channel_secret, SANDBOX_HOST)
    }

    pub fn new(
        channel_id: impl Into<String>,
        channel_secret: impl Into<String>,
        api_host: impl Into<String>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            channel_secret: SecretString::from(channel_secret.into()),
            api_host: api_host.into(),
        }
    }

    /// Loads the configuration from `LINE_PAY_CHANNEL_ID`, `LINE_PAY_CHANNEL_SECRET` and
    /// the optional `LINE_PAY_API_HOST`, which defaults to the sandbox.
    pub fn from_env() -> Result<Self, ConfigError> {
        let channel_id = env::var(CHANNEL_ID_ENV).map_err(|_| ConfigError::MissingEnv(CHANNEL_ID_ENV))?;
        let channel_secret = env::var(CHANNEL_SECRET_ENV).map_err(|_| ConfigError::MissingEnv(CHANNEL_SECRET_ENV))?;
        let api_host = env::var(API_HOST_ENV).unwrap_or_else(|_| SANDBOX_HOST.to_string());
        Ok(Self::new(channel_id, channel_secret, api_host))
    }

    /// Parses the API host, stripping any trailing slash so paths can be appended.
    pub(crate) fn base_url(&self) -> Result<String, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidHost { reason };
        let url = Url::parse(&self.api_host).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("host must not carry a query or fragment".into()));
        }
        Ok(url.as_str().trim_end_matches('/').to_string())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("channel_id", &self.channel_id)
            .field("api_host", &self.api_host)
            .finish_non_exhaustive()
    }
}
