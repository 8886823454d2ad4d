// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # DDS DataWriter
//!
//! The [`DataWriter`] serializes typed samples and publishes them over UDP.
//!
//! ## Fragmentation
//!
//! Samples that do not fit a single DATA submessage within the participant's
//! `message_size_max` are split into DATA_FRAG packets of
//! `message_size_max - 56` bytes of payload each.
//!
//! ## Fragment Repair (reliable QoS)
//!
//! ```text
//! Writer                                Reader
//!   ├──DATA_FRAG(1..9)──────────────────▶  (2 and 5 lost)
//!   ├──HEARTBEAT_FRAG(last=9) x3────────▶
//!   │                                    │
//!   ◀──────────NACK_FRAG(missing={2,5})──┤
//!   │                                    │
//!   ├──DATA_FRAG(2), DATA_FRAG(5)────────▶  pulled fragments
//! ```
//!
//! Every packet and byte involved is counted in [`DataWriterProtocolStatus`].

mod history;
mod nack;
mod runtime;
mod status;

pub use history::HistoryCache;
pub use runtime::DataWriter;
pub use status::DataWriterProtocolStatus;
