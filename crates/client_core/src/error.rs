use shared::error::ApiException;
use thiserror::Error;

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Api(#[from] ApiException),
    #[error("malformed response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },
    #[error("request rejected: {0}")]
    Rejected(String),
}

impl GatewayError {
    /// Message the server attached to the failure, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            GatewayError::Api(err) => err.message.as_deref(),
            GatewayError::Rejected(message) if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}
