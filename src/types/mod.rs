// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong types shared across ever-mailbox.
//!
//! This module provides:
//! - Raw wire events and their logical time
//! - Pagination direction, bounds and windows
//! - Decoded mailbox events

pub mod bound;
pub mod mail;
pub mod wire;

// Note: Public types are re-exported from lib.rs, not here
