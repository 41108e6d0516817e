//! Transport-level error types.
//!
//! These errors describe failures talking to GraphQL endpoints: HTTP
//! failures, GraphQL error payloads, malformed responses, and endpoint pool
//! exhaustion.

/// Errors that can occur while sending a GraphQL request.
///
/// # Examples
///
/// ```rust
/// use ever_mailbox::TransportError;
///
/// let error = TransportError::NoEndpointAvailable { rounds: 5 };
/// assert_eq!(error.to_string(), "No endpoint available after 5 probing rounds");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP request itself failed (connection, timeout, TLS).
    #[error("HTTP request to {endpoint} failed")]
    Http {
        /// Endpoint the request was sent to
        endpoint: String,
        /// The underlying client error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The endpoint answered with a non-success HTTP status.
    #[error("Endpoint {endpoint} responded with status {status}")]
    Status {
        /// Endpoint the request was sent to
        endpoint: String,
        /// HTTP status code
        status: u16,
    },

    /// The endpoint answered with a GraphQL `errors` array.
    #[error("GraphQL error from {endpoint}: {message}")]
    Graphql {
        /// Endpoint the request was sent to
        endpoint: String,
        /// Concatenated error messages
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("Malformed response: {details}")]
    MalformedResponse {
        /// What was wrong with the response
        details: String,
    },

    /// Every probing round failed to find a live endpoint.
    #[error("No endpoint available after {rounds} probing rounds")]
    NoEndpointAvailable {
        /// Number of probing rounds attempted
        rounds: u32,
    },
}

impl TransportError {
    /// Helper to create an `Http` error from any error type.
    pub fn http(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        TransportError::Http {
            endpoint: endpoint.into(),
            source: Box::new(source),
        }
    }

    /// Create a `MalformedResponse` error with details.
    pub fn malformed(details: impl Into<String>) -> Self {
        TransportError::MalformedResponse {
            details: details.into(),
        }
    }
}
