// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! GraphQL transport and endpoint selection
//!
//! Every query goes through a [`GqlTransport`], which posts one request to
//! one endpoint. The production implementation is [`HttpTransport`]: a
//! `reqwest` client exposed as a Tower service and wrapped in a
//! [`LoggingLayer`]. [`EndpointSelector`] sits on top and decides which
//! endpoint each request goes to.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ever_mailbox::transport::{EndpointSelector, GqlRequest, HttpTransport};
//! use ever_mailbox::{MailboxConfig, Network};
//!
//! let config = MailboxConfig::for_network(Network::Mainnet);
//! let selector = EndpointSelector::new(HttpTransport::new(&config)?, &config)?;
//!
//! let data = selector
//!     .send(&GqlRequest::new("query { info { version } }"))
//!     .await?;
//! ```

mod http;
mod logging;
mod selector;

pub use http::{HttpService, HttpTransport};
pub use logging::{LoggingLayer, LoggingService};
pub use selector::{Endpoint, EndpointSelector};

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::errors::TransportError;

/// A GraphQL request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GqlRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub variables: Value,
}

impl GqlRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: Value::Null,
        }
    }

    #[must_use]
    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = variables;
        self
    }

    /// First selection of the query, for logs
    ///
    /// ```
    /// use ever_mailbox::transport::GqlRequest;
    ///
    /// let request = GqlRequest::new("query { messages(limit: 1) { id } }");
    /// assert_eq!(request.operation_name(), "messages");
    /// ```
    #[must_use]
    pub fn operation_name(&self) -> &str {
        let body = self
            .query
            .split_once('{')
            .map_or(self.query.as_str(), |(_, rest)| rest)
            .trim_start();
        let end = body
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(body.len());
        match &body[..end] {
            "" => "anonymous",
            name => name,
        }
    }
}

/// One request addressed to one endpoint; the unit Tower services handle
#[derive(Debug, Clone)]
pub struct GqlCall {
    pub endpoint: Url,
    pub request: GqlRequest,
}

/// Posts GraphQL requests
///
/// Implementations return the response's `data` member. GraphQL `errors`
/// and HTTP failures are reported as [`TransportError`].
#[async_trait]
pub trait GqlTransport: Send + Sync {
    async fn post(&self, endpoint: &Url, request: &GqlRequest) -> Result<Value, TransportError>;
}

#[async_trait]
impl<T: GqlTransport + ?Sized> GqlTransport for Arc<T> {
    async fn post(&self, endpoint: &Url, request: &GqlRequest) -> Result<Value, TransportError> {
        (**self).post(endpoint, request).await
    }
}
