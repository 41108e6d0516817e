// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tower-based logging layer for GraphQL calls.
//!
//! Wraps each call in a tracing span with the endpoint and operation name
//! and records timing and failures.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};

use serde_json::Value;
use tower::Layer;
use tracing::{debug, trace, warn, Instrument};

use super::GqlCall;
use crate::errors::TransportError;
use crate::spans;

/// A Tower layer that adds logging/tracing to GraphQL calls.
///
/// # Example
///
/// ```rust,ignore
/// use ever_mailbox::transport::{HttpService, LoggingLayer};
/// use tower::Layer;
///
/// let service = LoggingLayer::new().verbose().layer(HttpService::new(client));
/// ```
#[derive(Clone, Debug, Default)]
pub struct LoggingLayer {
    /// Whether to log query text and variables
    log_requests: bool,
    /// Whether to log response data (can be large)
    log_responses: bool,
}

impl LoggingLayer {
    /// By default only timing and errors are logged.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_logging(mut self) -> Self {
        self.log_requests = true;
        self
    }

    pub fn with_response_logging(mut self) -> Self {
        self.log_responses = true;
        self
    }

    pub fn verbose(mut self) -> Self {
        self.log_requests = true;
        self.log_responses = true;
        self
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = LoggingService<S>;

    fn layer(&self, service: S) -> Self::Service {
        LoggingService {
            service,
            log_requests: self.log_requests,
            log_responses: self.log_responses,
        }
    }
}

/// A Tower service that logs GraphQL calls and their outcome.
#[derive(Clone, Debug)]
pub struct LoggingService<S> {
    service: S,
    log_requests: bool,
    log_responses: bool,
}

impl<S> tower::Service<GqlCall> for LoggingService<S>
where
    S: tower::Service<GqlCall, Response = Value, Error = TransportError> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Value;
    type Error = TransportError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, call: GqlCall) -> Self::Future {
        let log_requests = self.log_requests;
        let log_responses = self.log_responses;
        // Take the service that was driven to readiness, leave a clone behind.
        let clone = self.service.clone();
        let mut service = std::mem::replace(&mut self.service, clone);

        let operation = call.request.operation_name().to_string();
        let span = spans::gql_call(call.endpoint.as_str(), &operation);

        Box::pin(
            async move {
                let start = Instant::now();

                if log_requests {
                    trace!(query = %call.request.query, variables = %call.request.variables, "GraphQL request");
                } else {
                    debug!("GraphQL request: {operation}");
                }

                let result = service.call(call).await;
                let duration = start.elapsed();
                tracing::Span::current().record("duration_ms", duration.as_millis() as u64);

                match &result {
                    Ok(data) => {
                        if log_responses {
                            trace!(data = %data, duration_ms = %duration.as_millis(), "GraphQL response");
                        } else {
                            debug!(duration_ms = %duration.as_millis(), "GraphQL response: {operation}");
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, duration_ms = %duration.as_millis(), "GraphQL error: {operation}");
                    }
                }

                result
            }
            .instrument(span),
        )
    }
}
