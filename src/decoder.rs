// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! ABI decoding engine boundary
//!
//! Message bodies are decoded by an external engine (a nekoton-style ABI
//! decoder). The engine needs a one-time asynchronous load before its first
//! use; [`DecoderHandle`] makes that lifecycle explicit instead of relying on
//! a module-level singleton.
//!
//! # Example: Implementing AbiDecoder
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use ever_mailbox::{AbiDecoder, DecodeError};
//!
//! struct Nekoton;
//!
//! #[async_trait]
//! impl AbiDecoder for Nekoton {
//!     async fn load(&self) -> Result<(), DecodeError> {
//!         nekoton::ensure_loaded().await.map_err(|e| DecodeError::EngineUnavailable {
//!             details: e.to_string(),
//!         })
//!     }
//!
//!     fn decode_event(
//!         &self,
//!         body: &str,
//!         abi: &str,
//!         event_name: &str,
//!     ) -> Result<Option<serde_json::Value>, DecodeError> {
//!         nekoton::decode_event(body, abi, event_name)
//!             .map_err(|e| DecodeError::invalid_body(event_name, e.to_string()))
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::errors::DecodeError;

/// Decoded event fields, keyed by ABI parameter name
pub type DecodedFields = serde_json::Value;

/// External ABI decoding engine
///
/// Implementations must be cheap to call after [`AbiDecoder::load`] has
/// completed; decoding is synchronous.
#[async_trait]
pub trait AbiDecoder: Send + Sync {
    /// Prepare the engine for use. Called at most once per [`DecoderHandle`].
    async fn load(&self) -> Result<(), DecodeError>;

    /// Decode `body` as the event `event_name` of `abi`
    ///
    /// Returns `Ok(None)` if the body is a different event of the same ABI.
    fn decode_event(
        &self,
        body: &str,
        abi: &str,
        event_name: &str,
    ) -> Result<Option<DecodedFields>, DecodeError>;
}

/// Once-initialised handle around an [`AbiDecoder`]
///
/// [`DecoderHandle::init`] is idempotent and safe to call concurrently: the
/// engine's `load` runs once, later callers wait for it and then reuse it.
/// A failed load is not cached; the next `init` tries again.
#[derive(Debug)]
pub struct DecoderHandle<D> {
    decoder: Arc<D>,
    loaded: OnceCell<()>,
}

impl<D: AbiDecoder> DecoderHandle<D> {
    /// Wrap a decoder; nothing is loaded until [`DecoderHandle::init`]
    pub fn new(decoder: D) -> Self {
        Self {
            decoder: Arc::new(decoder),
            loaded: OnceCell::new(),
        }
    }

    /// Load the engine if needed and return it
    ///
    /// # Errors
    ///
    /// Returns the engine's load error
    pub async fn init(&self) -> Result<Arc<D>, DecodeError> {
        self.loaded
            .get_or_try_init(|| async {
                debug!("Loading ABI decoding engine");
                self.decoder.load().await?;
                info!("ABI decoding engine ready");
                Ok::<(), DecodeError>(())
            })
            .await?;
        Ok(self.decoder.clone())
    }

    /// True once the engine has been loaded
    #[must_use]
    pub fn ready(&self) -> bool {
        self.loaded.initialized()
    }
}
