//! Well-known endpoints and protocol constants
//!
//! This module centralizes the magic numbers and endpoint lists used
//! throughout the ever-mailbox crate.

use std::time::Duration;

/// Family tag written into every [`MsgId`](crate::MsgId) produced by this crate.
///
/// Ids carrying any other tag belong to another blockchain family and are
/// rejected by the decoder.
pub const EVERSCALE_FAMILY: u8 = 0b0010;

/// Maximum number of events requested from the log source in one page.
pub const MAX_PAGE_SIZE: usize = 50;

/// Message type of external outbound messages, which is how contracts emit events.
pub const EXT_OUT_MESSAGE_TYPE: u8 = 2;

/// Probes slower than this never win a selection outright.
pub const DEFAULT_MAX_LATENCY: Duration = Duration::from_millis(60_000);

/// How long a selected endpoint stays pinned before probing again.
pub const DEFAULT_LATENCY_DETECTION_INTERVAL: Duration = Duration::from_millis(60_000);

/// Number of probing rounds before giving up on every endpoint.
pub const DEFAULT_MAX_PROBE_ROUNDS: u32 = 5;

/// Linear backoff step between failed probing rounds.
pub const DEFAULT_PROBE_BACKOFF_STEP: Duration = Duration::from_millis(100);

/// Cap for the backoff between failed probing rounds.
pub const DEFAULT_PROBE_BACKOFF_CAP: Duration = Duration::from_millis(5_000);

/// Timeout applied to every HTTP request.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Public evercloud GraphQL endpoints for mainnet
pub mod mainnet {
    /// Hosts are expanded to `https://{host}/graphql`.
    pub const ENDPOINTS: &[&str] = &[
        "mainnet.evercloud.dev",
        "eri01.main.everos.dev",
        "gra01.main.everos.dev",
        "gra02.main.everos.dev",
        "lim01.main.everos.dev",
        "rbx01.main.everos.dev",
    ];
}

/// Public evercloud GraphQL endpoints for the developer network
pub mod devnet {
    /// Hosts are expanded to `https://{host}/graphql`.
    pub const ENDPOINTS: &[&str] = &[
        "devnet.evercloud.dev",
        "eri01.net.everos.dev",
        "rbx01.net.everos.dev",
        "gra01.net.everos.dev",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_fits_in_four_bits() {
        assert!(EVERSCALE_FAMILY < 16);
    }

    #[test]
    fn test_endpoint_lists_are_not_empty() {
        assert!(!mainnet::ENDPOINTS.is_empty());
        assert!(!devnet::ENDPOINTS.is_empty());
    }

    #[test]
    fn test_probe_backoff_cap_exceeds_step() {
        assert!(DEFAULT_PROBE_BACKOFF_CAP > DEFAULT_PROBE_BACKOFF_STEP);
    }
}
