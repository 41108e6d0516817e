// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP GraphQL transport over `reqwest`

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tower::{Layer, ServiceExt};
use url::Url;

use super::{GqlCall, GqlRequest, GqlTransport, LoggingLayer, LoggingService};
use crate::config::MailboxConfig;
use crate::errors::{ConfigError, TransportError};

#[derive(Debug, Deserialize)]
struct GqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GqlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GqlErrorEntry {
    message: String,
}

/// Tower service posting a [`GqlCall`] and yielding its `data`
#[derive(Clone, Debug)]
pub struct HttpService {
    client: reqwest::Client,
}

impl HttpService {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl tower::Service<GqlCall> for HttpService {
    type Response = Value;
    type Error = TransportError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, call: GqlCall) -> Self::Future {
        let client = self.client.clone();

        Box::pin(async move {
            let endpoint = call.endpoint.to_string();
            let response = client
                .post(call.endpoint)
                .json(&call.request)
                .send()
                .await
                .map_err(|e| TransportError::http(&endpoint, e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::Status {
                    endpoint,
                    status: status.as_u16(),
                });
            }

            let body: GqlResponse = response
                .json()
                .await
                .map_err(|e| TransportError::malformed(e.to_string()))?;

            if !body.errors.is_empty() {
                let message = body
                    .errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(TransportError::Graphql { endpoint, message });
            }

            body.data
                .filter(|data| !data.is_null())
                .ok_or_else(|| TransportError::malformed("response has no data"))
        })
    }
}

/// Production [`GqlTransport`]: [`HttpService`] behind a [`LoggingLayer`]
#[derive(Clone, Debug)]
pub struct HttpTransport {
    service: LoggingService<HttpService>,
}

impl HttpTransport {
    /// Build a client with the configured timeout
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the TLS backend cannot be initialised
    pub fn new(config: &MailboxConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(Self::with_client(client))
    }

    /// Use an existing client with default logging
    pub fn with_client(client: reqwest::Client) -> Self {
        Self::with_logging(client, LoggingLayer::new())
    }

    /// Use an existing client and logging configuration
    pub fn with_logging(client: reqwest::Client, logging: LoggingLayer) -> Self {
        Self {
            service: logging.layer(HttpService::new(client)),
        }
    }
}

#[async_trait]
impl GqlTransport for HttpTransport {
    async fn post(&self, endpoint: &Url, request: &GqlRequest) -> Result<Value, TransportError> {
        self.service
            .clone()
            .oneshot(GqlCall {
                endpoint: endpoint.clone(),
                request: request.clone(),
            })
            .await
    }
}
