//! Configuration for ever-mailbox operations
//!
//! This module provides the configuration for endpoint selection, paging and
//! the contracts a reader knows about. Everything is passed as plain
//! structured options at construction time; nothing is persisted.
//!
//! # Example: Using defaults
//!
//! ```rust
//! use ever_mailbox::{MailboxConfig, Network};
//!
//! // Public mainnet endpoints, 60s latency threshold, 50-event pages
//! let config = MailboxConfig::for_network(Network::Mainnet);
//! assert_eq!(config.page_size, 50);
//! ```
//!
//! # Example: Custom configuration
//!
//! ```rust
//! use ever_mailbox::MailboxConfigBuilder;
//! use std::time::Duration;
//!
//! let config = MailboxConfigBuilder::new()
//!     .endpoint("localhost:8080")
//!     .max_latency(Duration::from_secs(5))
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::var;
use url::Url;

use crate::contracts::ContractDescriptor;
use crate::errors::ConfigError;

pub mod constants;

use constants::*;

/// Environment variable selecting the network preset.
pub const NETWORK_ENV_VAR: &str = "EVER_MAILBOX_NETWORK";
/// Environment variable overriding the endpoint list (comma separated).
pub const ENDPOINTS_ENV_VAR: &str = "EVER_MAILBOX_ENDPOINTS";
/// Environment variable overriding the latency threshold in milliseconds.
pub const MAX_LATENCY_ENV_VAR: &str = "EVER_MAILBOX_MAX_LATENCY_MS";
/// Environment variable overriding the latency detection interval in milliseconds.
pub const LATENCY_INTERVAL_ENV_VAR: &str = "EVER_MAILBOX_LATENCY_DETECTION_INTERVAL_MS";

/// Network preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    /// Production network
    #[default]
    Mainnet,
    /// Developer network
    Devnet,
}

impl Network {
    /// Public GraphQL endpoints for this network
    #[must_use]
    pub fn default_endpoints(&self) -> &'static [&'static str] {
        match self {
            Network::Mainnet => mainnet::ENDPOINTS,
            Network::Devnet => devnet::ENDPOINTS,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Devnet => write!(f, "devnet"),
        }
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "devnet" | "dev" => Ok(Network::Devnet),
            other => Err(ConfigError::UnknownNetwork(other.to_string())),
        }
    }
}

/// Configuration for a [`MailboxReader`](crate::MailboxReader)
///
/// Use [`MailboxConfigBuilder`] for a fluent API to construct instances.
#[derive(Debug, Clone)]
pub struct MailboxConfig {
    /// Network preset the endpoints belong to
    pub network: Network,

    /// GraphQL endpoints, either bare hosts or full URLs
    /// Default: the public endpoints of `network`
    pub endpoints: Vec<String>,

    /// Probe latency accepted without waiting for other probes
    /// Default: 60 seconds
    pub max_latency: Duration,

    /// How long a selected endpoint stays pinned
    /// Default: 60 seconds
    pub latency_detection_interval: Duration,

    /// Probing rounds before reporting no endpoint available
    /// Default: 5
    pub max_probe_rounds: u32,

    /// Linear backoff step between failed probing rounds
    /// Default: 100 ms
    pub probe_backoff_step: Duration,

    /// Cap for the backoff between failed probing rounds
    /// Default: 5 seconds
    pub probe_backoff_cap: Duration,

    /// Maximum events per GraphQL request (capped at 50)
    pub page_size: usize,

    /// Timeout for HTTP requests
    /// Default: 30 seconds
    pub http_timeout: Duration,

    /// Contracts this reader can resolve message ids against
    pub contracts: Vec<ContractDescriptor>,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self::for_network(Network::Mainnet)
    }
}

impl MailboxConfig {
    /// Create config with the public endpoints of `network` and default timings
    pub fn for_network(network: Network) -> Self {
        Self {
            network,
            endpoints: network
                .default_endpoints()
                .iter()
                .map(|e| e.to_string())
                .collect(),
            max_latency: DEFAULT_MAX_LATENCY,
            latency_detection_interval: DEFAULT_LATENCY_DETECTION_INTERVAL,
            max_probe_rounds: DEFAULT_MAX_PROBE_ROUNDS,
            probe_backoff_step: DEFAULT_PROBE_BACKOFF_STEP,
            probe_backoff_cap: DEFAULT_PROBE_BACKOFF_CAP,
            page_size: MAX_PAGE_SIZE,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            contracts: Vec::new(),
        }
    }

    /// Load configuration from the environment (and a `.env` file if present)
    ///
    /// Reads [`NETWORK_ENV_VAR`], [`ENDPOINTS_ENV_VAR`], [`MAX_LATENCY_ENV_VAR`]
    /// and [`LATENCY_INTERVAL_ENV_VAR`]. Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let network = match var(NETWORK_ENV_VAR) {
            Ok(value) => value.parse()?,
            Err(_) => Network::default(),
        };

        let mut config = Self::for_network(network);

        if let Ok(value) = var(ENDPOINTS_ENV_VAR) {
            config.endpoints = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(latency) = duration_from_env(MAX_LATENCY_ENV_VAR)? {
            config.max_latency = latency;
        }
        if let Some(interval) = duration_from_env(LATENCY_INTERVAL_ENV_VAR)? {
            config.latency_detection_interval = interval;
        }

        config.validate()?;
        Ok(config)
    }

    /// Effective page size, never above [`MAX_PAGE_SIZE`]
    #[must_use]
    pub fn effective_page_size(&self) -> usize {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Expand every configured endpoint into a GraphQL URL
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty or an entry is not a valid URL
    pub fn endpoint_urls(&self) -> Result<Vec<Url>, ConfigError> {
        if self.endpoints.is_empty() {
            return Err(ConfigError::NoEndpoints);
        }
        self.endpoints.iter().map(|e| expand_endpoint(e)).collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint_urls()?;

        let mut seen = std::collections::HashSet::new();
        for contract in &self.contracts {
            if !seen.insert(contract.id) {
                return Err(ConfigError::DuplicateContractId { id: contract.id });
            }
        }
        Ok(())
    }
}

fn duration_from_env(name: &'static str) -> Result<Option<Duration>, ConfigError> {
    match var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: name,
                details: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

/// Expand a configured endpoint into a full GraphQL URL
///
/// Bare hosts get `https://` (or `http://` for local hosts), and `/graphql` is
/// appended when the path does not already end with it.
///
/// # Example
///
/// ```rust
/// use ever_mailbox::config::expand_endpoint;
///
/// let url = expand_endpoint("mainnet.evercloud.dev/abc").unwrap();
/// assert_eq!(url.as_str(), "https://mainnet.evercloud.dev/abc/graphql");
/// ```
pub fn expand_endpoint(endpoint: &str) -> Result<Url, ConfigError> {
    let trimmed = endpoint.trim().trim_end_matches('/');

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else if is_local_host(trimmed) {
        format!("http://{trimmed}")
    } else {
        format!("https://{trimmed}")
    };

    let full = if with_scheme.ends_with("/graphql") {
        with_scheme
    } else {
        format!("{with_scheme}/graphql")
    };

    Url::parse(&full).map_err(|source| ConfigError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        source,
    })
}

fn is_local_host(endpoint: &str) -> bool {
    let host = endpoint.split(['/', ':']).next().unwrap_or_default();
    matches!(host, "localhost" | "127.0.0.1" | "0.0.0.0")
}

/// Builder for [`MailboxConfig`]
///
/// # Example
///
/// ```rust
/// use ever_mailbox::{MailboxConfigBuilder, Network};
/// use std::time::Duration;
///
/// let config = MailboxConfigBuilder::with_defaults(Network::Devnet)
///     .latency_detection_interval(Duration::from_secs(120))
///     .build()
///     .unwrap();
/// assert_eq!(config.network, Network::Devnet);
/// ```
pub struct MailboxConfigBuilder {
    config: MailboxConfig,
}

impl Default for MailboxConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MailboxConfigBuilder {
    /// Create a new builder with default timings and no endpoints
    pub fn new() -> Self {
        let mut config = MailboxConfig::for_network(Network::Mainnet);
        config.endpoints.clear();
        Self { config }
    }

    /// Start from the public endpoints of a network
    pub fn with_defaults(network: Network) -> Self {
        Self {
            config: MailboxConfig::for_network(network),
        }
    }

    /// Add a GraphQL endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoints.push(endpoint.into());
        self
    }

    /// Replace the endpoint list
    pub fn endpoints<I, S>(mut self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.endpoints = endpoints.into_iter().map(Into::into).collect();
        self
    }

    /// Set the latency accepted without waiting for slower probes
    pub fn max_latency(mut self, latency: Duration) -> Self {
        self.config.max_latency = latency;
        self
    }

    /// Set how long a selected endpoint stays pinned
    pub fn latency_detection_interval(mut self, interval: Duration) -> Self {
        self.config.latency_detection_interval = interval;
        self
    }

    /// Set the number of probing rounds
    pub fn max_probe_rounds(mut self, rounds: u32) -> Self {
        self.config.max_probe_rounds = rounds;
        self
    }

    /// Set the backoff step and cap between failed probing rounds
    pub fn probe_backoff(mut self, step: Duration, cap: Duration) -> Self {
        self.config.probe_backoff_step = step;
        self.config.probe_backoff_cap = cap;
        self
    }

    /// Set the page size (values above 50 are capped)
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.config.page_size = page_size;
        self
    }

    /// Set the HTTP request timeout
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    /// Register a contract for message-id resolution
    pub fn contract(mut self, contract: ContractDescriptor) -> Self {
        self.config.contracts.push(contract);
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if no endpoint is configured, an endpoint is not a
    /// valid URL, or two contracts share an id
    pub fn build(self) -> Result<MailboxConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
