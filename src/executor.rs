// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Query execution across provider bindings
//!
//! [`QueryExecutor::operation`] runs a unit of work against the first
//! provider binding, falling through to the next one when the work fails
//! with [`AttemptError::Retryable`]. [`AttemptError::Fatal`] stops the
//! iteration: the failure would be the same on every binding.
//!
//! The decoding engine is loaded before the first attempt and handed to the
//! work together with the binding.
//!
//! # Example
//!
//! ```rust,ignore
//! use ever_mailbox::{AttemptError, QueryExecutor};
//!
//! let version = executor
//!     .operation(|attempt| async move {
//!         let data = attempt
//!             .binding
//!             .query(&GqlRequest::new("query { info { version } }"))
//!             .await
//!             .map_err(AttemptError::retryable)?;
//!         Ok(data["info"]["version"].to_string())
//!     })
//!     .await?;
//! ```

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn, Instrument};

use crate::decoder::{AbiDecoder, DecoderHandle};
use crate::errors::{AttemptError, BindingFailure, ExecutorError};
use crate::provider::ProviderBinding;
use crate::spans;

/// What one attempt of an operation works with
pub struct Attempt<D> {
    pub binding: Arc<dyn ProviderBinding>,
    pub decoder: Arc<D>,
}

/// Runs operations against an ordered list of provider bindings
#[derive(Debug)]
pub struct QueryExecutor<D> {
    bindings: Vec<Arc<dyn ProviderBinding>>,
    decoder: DecoderHandle<D>,
}

impl<D: AbiDecoder> QueryExecutor<D> {
    /// Create an executor; bindings are attempted in the given order
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::NoBindings`] if `bindings` is empty
    pub fn new(
        bindings: Vec<Arc<dyn ProviderBinding>>,
        decoder: DecoderHandle<D>,
    ) -> Result<Self, ExecutorError> {
        if bindings.is_empty() {
            return Err(ExecutorError::NoBindings);
        }
        Ok(Self { bindings, decoder })
    }

    #[must_use]
    pub fn bindings(&self) -> &[Arc<dyn ProviderBinding>] {
        &self.bindings
    }

    #[must_use]
    pub fn decoder(&self) -> &DecoderHandle<D> {
        &self.decoder
    }

    /// Run `work` against each binding in turn until it succeeds
    ///
    /// # Errors
    ///
    /// - [`ExecutorError::EngineInit`] if the decoding engine fails to load
    /// - [`ExecutorError::Exhausted`] with one entry per attempted binding if
    ///   every attempt failed or one failed fatally
    pub async fn operation<T, F, Fut>(&self, mut work: F) -> Result<T, ExecutorError>
    where
        F: FnMut(Attempt<D>) -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        async move {
            let decoder = self.decoder.init().await.map_err(ExecutorError::EngineInit)?;
            let mut failures = Vec::new();

            for binding in &self.bindings {
                let attempt = Attempt {
                    binding: binding.clone(),
                    decoder: decoder.clone(),
                };

                match work(attempt).await {
                    Ok(value) => {
                        if !failures.is_empty() {
                            debug!(
                                binding = binding.identity(),
                                failed = failures.len(),
                                "Operation succeeded after failover"
                            );
                        }
                        return Ok(value);
                    }
                    Err(e) => {
                        let fatal = e.is_fatal();
                        let error = e.into_inner();
                        warn!(
                            binding = binding.identity(),
                            fatal = fatal,
                            error = %error,
                            "Operation attempt failed"
                        );
                        failures.push(BindingFailure {
                            binding: binding.identity().to_string(),
                            fatal,
                            error,
                        });
                        if fatal {
                            break;
                        }
                    }
                }
            }

            Err(ExecutorError::Exhausted { failures })
        }
        .instrument(spans::executor_operation(self.bindings.len()))
        .await
    }
}
