// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Latency-aware endpoint selection
//!
//! [`EndpointSelector`] pins one endpoint of a pool and sends every request
//! there. A pin is chosen by racing a cheap `info` probe against all
//! endpoints:
//!
//! - the first probe answering within `max_latency` wins immediately
//! - otherwise the lowest latency among the probes that answered wins
//! - if none answered, the round is repeated after a linear backoff
//!   (`step * round`, capped), up to `max_probe_rounds` rounds
//!
//! The pin expires after `latency_detection_interval` and is dropped when a
//! request sent to it fails, so the next request probes again. A pool of one
//! endpoint is pinned permanently without probing.
//!
//! Only one selection runs at a time; concurrent senders wait for it and
//! share its result.

use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, trace, warn, Instrument};
use url::Url;

use super::{GqlRequest, GqlTransport};
use crate::config::MailboxConfig;
use crate::errors::{ConfigError, TransportError};
use crate::spans;

const PROBE_QUERY: &str = "query { info { version time latency } }";

/// A GraphQL endpoint and its last measured latency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: Url,
    /// `None` when the endpoint was pinned without probing
    pub latency: Option<Duration>,
}

#[derive(Debug)]
struct Pin {
    endpoint: Endpoint,
    /// `None` for a pin that never expires
    refresh_at: Option<Instant>,
}

impl Pin {
    fn is_fresh(&self) -> bool {
        self.refresh_at.is_none_or(|at| Instant::now() < at)
    }
}

/// Sends requests to the best endpoint of a pool
#[derive(Debug)]
pub struct EndpointSelector<T> {
    transport: T,
    endpoints: Vec<Url>,
    max_latency: Duration,
    latency_detection_interval: Duration,
    max_probe_rounds: u32,
    backoff_step: Duration,
    backoff_cap: Duration,
    current: Mutex<Option<Pin>>,
}

impl<T: GqlTransport> EndpointSelector<T> {
    /// Create a selector over the configured endpoints
    ///
    /// # Errors
    ///
    /// Returns an error if no endpoint is configured or one is not a valid URL
    pub fn new(transport: T, config: &MailboxConfig) -> Result<Self, ConfigError> {
        let endpoints = config.endpoint_urls()?;
        info!(
            endpoints = endpoints.len(),
            max_latency_ms = config.max_latency.as_millis() as u64,
            "Created endpoint selector"
        );

        Ok(Self {
            transport,
            endpoints,
            max_latency: config.max_latency,
            latency_detection_interval: config.latency_detection_interval,
            max_probe_rounds: config.max_probe_rounds.max(1),
            backoff_step: config.probe_backoff_step,
            backoff_cap: config.probe_backoff_cap,
            current: Mutex::new(None),
        })
    }

    /// Expanded endpoint URLs, in configuration order
    #[must_use]
    pub fn endpoints(&self) -> &[Url] {
        &self.endpoints
    }

    /// The pinned endpoint, if any
    pub async fn current(&self) -> Option<Endpoint> {
        self.current.lock().await.as_ref().map(|pin| pin.endpoint.clone())
    }

    /// Send `request` to the pinned endpoint, selecting one first if needed
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NoEndpointAvailable`] if selection fails,
    /// otherwise the error of the request itself. Requests are not retried.
    pub async fn send(&self, request: &GqlRequest) -> Result<Value, TransportError> {
        let endpoint = self.endpoint().await?;

        match self.transport.post(&endpoint.url, request).await {
            Ok(data) => Ok(data),
            Err(e) => {
                if self.endpoints.len() > 1 {
                    self.unpin(&endpoint.url).await;
                }
                Err(e)
            }
        }
    }

    /// The endpoint requests currently go to, selecting one if the pin is
    /// missing or expired
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NoEndpointAvailable`] if every probing round fails
    pub async fn endpoint(&self) -> Result<Endpoint, TransportError> {
        // Held across selection: concurrent callers queue here instead of
        // starting a second selection.
        let mut current = self.current.lock().await;

        if let Some(pin) = current.as_ref().filter(|pin| pin.is_fresh()) {
            return Ok(pin.endpoint.clone());
        }

        if let [url] = self.endpoints.as_slice() {
            let endpoint = Endpoint {
                url: url.clone(),
                latency: None,
            };
            *current = Some(Pin {
                endpoint: endpoint.clone(),
                refresh_at: None,
            });
            return Ok(endpoint);
        }

        let endpoint = self
            .select()
            .instrument(spans::select_endpoint(self.endpoints.len()))
            .await?;
        *current = Some(Pin {
            endpoint: endpoint.clone(),
            refresh_at: Some(Instant::now() + self.latency_detection_interval),
        });
        Ok(endpoint)
    }

    async fn unpin(&self, url: &Url) {
        let mut current = self.current.lock().await;
        if current.as_ref().is_some_and(|pin| pin.endpoint.url == *url) {
            debug!(endpoint = %url, "Dropping endpoint pin after failed request");
            *current = None;
        }
    }

    async fn select(&self) -> Result<Endpoint, TransportError> {
        for round in 1..=self.max_probe_rounds {
            if let Some(endpoint) = self.probe_round(round).await {
                info!(
                    endpoint = %endpoint.url,
                    latency_ms = endpoint.latency.map(|l| l.as_millis() as u64),
                    round = round,
                    "Selected endpoint"
                );
                return Ok(endpoint);
            }

            if round < self.max_probe_rounds {
                let delay = probe_backoff(round, self.backoff_step, self.backoff_cap);
                warn!(
                    round = round,
                    delay_ms = delay.as_millis() as u64,
                    "No endpoint answered, retrying"
                );
                sleep(delay).await;
            }
        }

        Err(TransportError::NoEndpointAvailable {
            rounds: self.max_probe_rounds,
        })
    }

    /// Race probes against every endpoint. Remaining probes are dropped once
    /// one answers within `max_latency`.
    async fn probe_round(&self, round: u32) -> Option<Endpoint> {
        let mut probes: FuturesUnordered<_> = self
            .endpoints
            .iter()
            .map(|url| {
                self.probe(url)
                    .instrument(spans::probe_endpoint(url.as_str(), round))
            })
            .collect();

        let mut best: Option<Endpoint> = None;
        while let Some(result) = probes.next().await {
            match result {
                Ok(endpoint) => {
                    let latency = endpoint.latency.unwrap_or(Duration::MAX);
                    if latency <= self.max_latency {
                        return Some(endpoint);
                    }
                    let better = best
                        .as_ref()
                        .is_none_or(|b| latency < b.latency.unwrap_or(Duration::MAX));
                    if better {
                        best = Some(endpoint);
                    }
                }
                Err(e) => debug!(error = %e, "Probe failed"),
            }
        }
        best
    }

    async fn probe(&self, url: &Url) -> Result<Endpoint, TransportError> {
        let start = Instant::now();
        let data = self.transport.post(url, &GqlRequest::new(PROBE_QUERY)).await?;
        let round_trip = start.elapsed();

        let info = data
            .get("info")
            .filter(|info| info.is_object())
            .ok_or_else(|| TransportError::malformed("probe response has no info"))?;
        let reported = info
            .get("latency")
            .and_then(Value::as_u64)
            .map(Duration::from_millis)
            .unwrap_or_default();

        let latency = round_trip.max(reported);
        trace!(
            endpoint = %url,
            round_trip_ms = round_trip.as_millis() as u64,
            reported_ms = reported.as_millis() as u64,
            "Probe answered"
        );

        Ok(Endpoint {
            url: url.clone(),
            latency: Some(latency),
        })
    }
}

/// Delay before probing round `round + 1`: `step * round`, at most `cap`
pub(crate) fn probe_backoff(round: u32, step: Duration, cap: Duration) -> Duration {
    step.saturating_mul(round).min(cap)
}
