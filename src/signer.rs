use base64::{Engine, engine::general_purpose::STANDARD as b64};
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use std::fmt;

use crate::error::ConfigError;

type HmacSha256 = Hmac<Sha256>;

pub const CHANNEL_ID_HEADER: HeaderName = HeaderName::from_static("x-line-channelid");
pub const NONCE_HEADER: HeaderName = HeaderName::from_static("x-line-authorization-nonce");
pub const SIGNATURE_HEADER: HeaderName = HeaderName::from_static("x-line-authorization");

/// Signs LINE Pay requests with a channel's credentials.
///
/// The signature is `base64(HMAC-SHA256(secret, secret + uri + payload + nonce))` where the
/// payload is the JSON body of a POST request, or the query string (without `?`) of a GET
/// request.
#[derive(Clone)]
pub struct Signer {
    channel_id: String,
    channel_secret: SecretString,
    // Keyed with the channel secret.
    mac: HmacSha256,
}

impl Signer {
    pub fn new(channel_id: impl Into<String>, channel_secret: SecretString) -> Result<Self, ConfigError> {
        let channel_id = channel_id.into();
        if channel_id.trim().is_empty() {
            return Err(ConfigError::MissingChannelId);
        }
        if HeaderValue::from_str(&channel_id).is_err() {
            return Err(ConfigError::InvalidChannelId);
        }
        if channel_secret.expose_secret().is_empty() {
            return Err(ConfigError::MissingChannelSecret);
        }
        let mac = HmacSha256::new_from_slice(channel_secret.expose_secret().as_bytes())
            .map_err(|_| ConfigError::InvalidChannelSecret)?;
        Ok(Self { channel_id, channel_secret, mac })
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Signs a request using the given nonce.
    pub fn sign(&self, nonce: impl Into<String>, uri: &str, payload: &str) -> AuthHeaders {
        let nonce = nonce.into();
        let signature = self.signature(&nonce, uri, payload);
        AuthHeaders { channel_id: self.channel_id.clone(), nonce, signature }
    }

    /// Signs a request using a freshly generated nonce.
    pub fn sign_fresh(&self, uri: &str, payload: &str) -> AuthHeaders {
        self.sign(generate_nonce(), uri, payload)
    }

    fn signature(&self, nonce: &str, uri: &str, payload: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(self.channel_secret.expose_secret().as_bytes());
        mac.update(uri.as_bytes());
        mac.update(payload.as_bytes());
        mac.update(nonce.as_bytes());
        b64.encode(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer").field("channel_id", &self.channel_id).finish_non_exhaustive()
    }
}

/// The authentication headers for a single request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthHeaders {
    pub channel_id: String,
    pub nonce: String,
    pub signature: String,
}

impl AuthHeaders {
    pub fn to_header_map(&self) -> Result<HeaderMap, InvalidHeaderValue> {
        let mut headers = HeaderMap::with_capacity(3);
        headers.insert(CHANNEL_ID_HEADER, HeaderValue::from_str(&self.channel_id)?);
        headers.insert(NONCE_HEADER, HeaderValue::from_str(&self.nonce)?);
        let mut signature = HeaderValue::from_str(&self.signature)?;
        signature.set_sensitive(true);
        headers.insert(SIGNATURE_HEADER, signature);
        Ok(headers)
    }
}

/// Generates a random 128 bit nonce, hex encoded.
pub fn generate_nonce() -> String {
    let bytes: [u8; 16] = rand::random();
    hex::encode(bytes)
}
