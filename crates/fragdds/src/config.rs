// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! fragdds global configuration.
//!
//! - **Static**: RTPS port mapping constants and protocol sizes.
//! - **Dynamic**: [`RuntimeConfig`], read from `FRAGDDS_*` environment variables.
//!
//! Builder calls on [`crate::ParticipantBuilder`] always win over the environment.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

// =======================================================================
// RTPS v2.5 Port Mapping (OMG DDS-RTPS Sec.9.6.1.1)
// =======================================================================

/// RTPS base port (IANA registered 7400-7469).
pub const PORT_BASE: u16 = 7400;

/// Maximum domain ID per DDS (0..=232).
pub const MAX_DOMAIN_ID: u32 = 232;

/// Domain gain: `PORT_BASE + DOMAIN_ID_GAIN x domain_id`.
pub const DOMAIN_ID_GAIN: u16 = 250;

/// Offset for user data multicast (d2 in the RTPS formula).
pub const USER_MULTICAST_OFFSET: u16 = 1;

/// Default multicast group for user traffic.
pub const MULTICAST_GROUP: Ipv4Addr = Ipv4Addr::new(239, 255, 0, 1);

/// Multicast TTL (stay on the local subnet).
pub const DEFAULT_MULTICAST_TTL: u32 = 1;

// =======================================================================
// Message sizing
// =======================================================================

/// Default maximum RTPS message size.
///
/// Kept small on purpose so an 8 KB sample needs several fragments.
pub const DEFAULT_MESSAGE_SIZE_MAX: usize = 1024;

/// Largest UDP/IPv4 datagram payload.
pub const MAX_UDP_PAYLOAD: usize = 65507;

/// Receive buffer for a single datagram.
pub const RECV_BUFFER_SIZE: usize = 65536;

// =======================================================================
// Reliability / reassembly defaults
// =======================================================================

/// Samples kept per writer for fragment repair.
pub const DEFAULT_HISTORY_DEPTH: usize = 8;

/// HEARTBEAT_FRAG packets sent after each fragmented sample.
pub const DEFAULT_HEARTBEAT_FRAG_REPEATS: u32 = 3;

/// Spacing between repeated HEARTBEAT_FRAGs.
pub const HEARTBEAT_FRAG_SPACING: Duration = Duration::from_millis(2);

/// Evict incomplete fragment sets after this long.
pub const FRAGMENT_TIMEOUT: Duration = Duration::from_secs(2);

/// Maximum incomplete sequences buffered per reader (LRU beyond this).
pub const MAX_PENDING_SEQUENCES: usize = 64;

/// Completed sequences remembered per reader to drop late repairs.
pub const COMPLETED_SEQUENCE_MEMORY: usize = 256;

/// Socket read timeout used by background threads to poll their stop flag.
pub const THREAD_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runtime overrides read from the environment.
///
/// | Variable                    | Meaning                              |
/// |-----------------------------|--------------------------------------|
/// | `FRAGDDS_MESSAGE_SIZE_MAX`  | maximum RTPS message size in bytes   |
/// | `FRAGDDS_PEERS`             | comma-separated `ip:port` locators   |
/// | `FRAGDDS_MULTICAST`         | `0` disables multicast               |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub message_size_max: usize,
    pub peers: Vec<SocketAddr>,
    pub multicast: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            message_size_max: DEFAULT_MESSAGE_SIZE_MAX,
            peers: Vec::new(),
            multicast: true,
        }
    }
}

impl RuntimeConfig {
    /// Read `FRAGDDS_*` variables on top of the defaults.
    ///
    /// Malformed values are logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(raw) = lookup("FRAGDDS_MESSAGE_SIZE_MAX") {
            match raw.trim().parse::<usize>() {
                Ok(size) => cfg.message_size_max = size,
                Err(_) => log::warn!("[config] ignoring FRAGDDS_MESSAGE_SIZE_MAX={:?}", raw),
            }
        }

        if let Some(raw) = lookup("FRAGDDS_PEERS") {
            cfg.peers = parse_peers(&raw);
        }

        if let Some(raw) = lookup("FRAGDDS_MULTICAST") {
            cfg.multicast = raw.trim() != "0";
        }

        cfg
    }
}

/// Parse a comma-separated locator list, skipping bad entries.
pub fn parse_peers(raw: &str) -> Vec<SocketAddr> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<SocketAddr>() {
            Ok(addr) => Some(addr),
            Err(_) => {
                log::warn!("[config] ignoring malformed peer locator {:?}", s);
                None
            }
        })
        .collect()
}
