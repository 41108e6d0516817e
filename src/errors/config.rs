//! Error types for configuration loading.

/// Errors that can occur while building a [`MailboxConfig`](crate::MailboxConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No GraphQL endpoint was configured.
    #[error("At least one GraphQL endpoint is required")]
    NoEndpoints,

    /// An endpoint could not be expanded into a URL.
    #[error("Invalid endpoint {endpoint}")]
    InvalidEndpoint {
        /// The endpoint as configured
        endpoint: String,
        /// The URL parser error
        #[source]
        source: url::ParseError,
    },

    /// An environment variable had an unparseable value.
    #[error("Invalid value for {var}: {details}")]
    InvalidEnvVar {
        /// Environment variable name
        var: &'static str,
        /// Details about what was wrong
        details: String,
    },

    /// The network name is not known.
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    /// Two contracts share the same id.
    #[error("Duplicate contract id {id}")]
    DuplicateContractId {
        /// The duplicated id
        id: u16,
    },

    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
}
