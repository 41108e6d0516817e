// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Provider bindings
//!
//! A provider binding is one independent way of reaching the blockchain,
//! typically an [`EndpointSelector`] over one endpoint pool. The
//! [`QueryExecutor`](crate::QueryExecutor) tries bindings in order until one
//! answers, and contract bindings are cached per provider
//! [`identity`](ProviderBinding::identity).
//!
//! # Examples
//!
//! ## Bindings from configuration
//!
//! ```rust,ignore
//! use ever_mailbox::provider::GqlProvider;
//! use ever_mailbox::{MailboxConfig, Network};
//!
//! let config = MailboxConfig::for_network(Network::Mainnet);
//! let primary = GqlProvider::http("evercloud", &config)?;
//! ```
//!
//! ## Custom bindings
//!
//! ```rust,ignore
//! use ever_mailbox::provider::ProviderBinding;
//!
//! #[derive(Debug)]
//! struct Archive { /* ... */ }
//!
//! #[async_trait::async_trait]
//! impl ProviderBinding for Archive {
//!     fn identity(&self) -> &str { "archive" }
//!     async fn query(&self, request: &GqlRequest) -> Result<Value, TransportError> {
//!         /* ... */
//!     }
//! }
//! ```

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::MailboxConfig;
use crate::errors::{ConfigError, TransportError};
use crate::transport::{EndpointSelector, GqlRequest, GqlTransport, HttpTransport};

/// One way of reaching the blockchain
#[async_trait]
pub trait ProviderBinding: fmt::Debug + Send + Sync {
    /// Stable name, used as part of cache keys and in error reports
    fn identity(&self) -> &str;

    /// Run a GraphQL query and return its `data`
    async fn query(&self, request: &GqlRequest) -> Result<Value, TransportError>;
}

/// A named [`EndpointSelector`]
#[derive(Debug)]
pub struct GqlProvider<T> {
    name: String,
    selector: EndpointSelector<T>,
}

impl<T: GqlTransport> GqlProvider<T> {
    /// Bind `transport` to the endpoints of `config`
    ///
    /// # Errors
    ///
    /// Returns an error if no endpoint is configured or one is not a valid URL
    pub fn new(
        name: impl Into<String>,
        transport: T,
        config: &MailboxConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            name: name.into(),
            selector: EndpointSelector::new(transport, config)?,
        })
    }

    #[must_use]
    pub fn selector(&self) -> &EndpointSelector<T> {
        &self.selector
    }
}

impl GqlProvider<HttpTransport> {
    /// Provider over HTTP with the configured timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoints are invalid or the HTTP client
    /// cannot be built
    pub fn http(name: impl Into<String>, config: &MailboxConfig) -> Result<Self, ConfigError> {
        Self::new(name, HttpTransport::new(config)?, config)
    }
}

#[async_trait]
impl<T: GqlTransport + fmt::Debug> ProviderBinding for GqlProvider<T> {
    fn identity(&self) -> &str {
        &self.name
    }

    async fn query(&self, request: &GqlRequest) -> Result<Value, TransportError> {
        self.selector.send(request).await
    }
}
