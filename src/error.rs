use reqwest::{StatusCode, header::InvalidHeaderValue};

use crate::models::ReturnCode;

/// An error when building a client from its configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The channel id was empty.
    #[error("channel id is required")]
    MissingChannelId,

    /// The channel id cannot be sent as a header value.
    #[error("channel id contains characters not allowed in a header")]
    InvalidChannelId,

    /// The channel secret was empty.
    #[error("channel secret is required")]
    MissingChannelSecret,

    /// The channel secret cannot be used as an HMAC key.
    #[error("channel secret is not a valid signing key")]
    InvalidChannelSecret,

    /// The API host could not be parsed as an absolute http(s) URL.
    #[error("invalid api host: {reason}")]
    InvalidHost {
        /// Why it was rejected.
        reason: String,
    },

    /// A required environment variable was not set.
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    /// The default HTTP transport could not be built.
    #[error("building http transport: {0}")]
    Transport(#[from] reqwest::Error),
}

/// An error raised by an [`HttpTransport`](crate::transport::HttpTransport) while sending a request.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or its response could not be read.
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    /// The caller cancelled the call before a response arrived.
    #[error("request cancelled")]
    Cancelled,

    /// The caller's deadline passed before a response arrived.
    #[error("request deadline exceeded")]
    Timeout,
}

/// An error when performing a call against the LINE Pay API.
///
/// A response carrying a non-success return code is not an error at this level, see
/// [`ApiResponse::into_result`](crate::models::ApiResponse::into_result).
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    /// Failed to serialize the request body.
    #[error("serializing request: {0}")]
    Serialize(serde_json::Error),

    /// The authentication headers could not be built.
    #[error("building headers: {0}")]
    Header(#[from] InvalidHeaderValue),

    /// The request never produced a response.
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with a success status but the body did not match the expected shape.
    #[error("decoding response (status {status}): {source}")]
    Decode {
        /// The HTTP status of the response.
        status: StatusCode,
        /// The underlying decode failure.
        #[source]
        source: serde_json::Error,
    },

    /// The server answered with an error status and a body that could not be decoded.
    #[error("unexpected status {status}: {body}")]
    Status {
        /// The HTTP status of the response.
        status: StatusCode,
        /// The raw response body, lossily decoded.
        body: String,
    },
}

impl CallError {
    /// Whether this call was aborted by the caller's context.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Cancelled))
    }

    /// Whether this call was aborted because the caller's deadline passed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Timeout))
    }
}

/// A response that decoded fine but whose return code signals a failure.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("LINE Pay returned {return_code}: {return_message}")]
pub struct BusinessError {
    /// The return code sent by the API.
    pub return_code: ReturnCode,

    /// The return message sent by the API.
    pub return_message: String,
}
