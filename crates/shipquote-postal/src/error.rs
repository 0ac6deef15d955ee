use thiserror::Error;

/// Errors returned by the postal-code resolution client.
#[derive(Debug, Error)]
pub enum PostalError {
    /// Network or TLS failure, or a non-2xx status from the service.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered but knows no address for this code.
    #[error("postal code {0} not found")]
    NotFound(String),

    /// The address record lacks the locality or state.
    #[error("postal code {0} resolved to an incomplete address")]
    Incomplete(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
