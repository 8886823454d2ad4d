// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Endpoint QoS.
//!
//! Only the policies fragment repair depends on are modeled.

#[cfg(feature = "qos-loaders")]
pub mod loaders;

use crate::config::{DEFAULT_HEARTBEAT_FRAG_REPEATS, DEFAULT_HISTORY_DEPTH};
use crate::dds::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reliability {
    BestEffort,
    #[default]
    Reliable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum History {
    KeepLast(u32),
}

impl Default for History {
    fn default() -> Self {
        History::KeepLast(DEFAULT_HISTORY_DEPTH as u32)
    }
}

impl History {
    pub fn depth(&self) -> usize {
        match self {
            History::KeepLast(depth) => *depth as usize,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QoS {
    pub reliability: Reliability,
    pub history: History,
    /// HEARTBEAT_FRAG packets sent after each fragmented write (reliable only).
    pub heartbeat_frag_repeats: u32,
}

impl Default for QoS {
    fn default() -> Self {
        Self {
            reliability: Reliability::default(),
            history: History::default(),
            heartbeat_frag_repeats: DEFAULT_HEARTBEAT_FRAG_REPEATS,
        }
    }
}

impl QoS {
    #[must_use]
    pub fn reliable() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn best_effort() -> Self {
        Self {
            reliability: Reliability::BestEffort,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn keep_last(mut self, depth: u32) -> Self {
        self.history = History::KeepLast(depth);
        self
    }

    #[must_use]
    pub fn heartbeat_frag_repeats(mut self, repeats: u32) -> Self {
        self.heartbeat_frag_repeats = repeats;
        self
    }

    pub fn is_reliable(&self) -> bool {
        self.reliability == Reliability::Reliable
    }

    /// Reject combinations the writer/reader cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.history.depth() == 0 {
            return Err(Error::InvalidQos("history depth must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_reliable_keep_last() {
        let qos = QoS::default();
        assert!(qos.is_reliable());
        assert_eq!(qos.history.depth(), DEFAULT_HISTORY_DEPTH);
        assert_eq!(qos.heartbeat_frag_repeats, DEFAULT_HEARTBEAT_FRAG_REPEATS);
    }

    #[test]
    fn test_zero_depth_rejected() {
        assert!(QoS::best_effort().keep_last(0).validate().is_err());
        assert!(QoS::best_effort().keep_last(1).validate().is_ok());
    }
}
