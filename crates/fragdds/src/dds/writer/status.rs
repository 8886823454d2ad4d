// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a writer's fragment-level protocol counters.
///
/// Counters only grow for the lifetime of the writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataWriterProtocolStatus {
    /// Fragments sent as part of the initial write.
    pub pushed_fragment_count: u64,
    /// Payload bytes carried by those fragments.
    pub pushed_fragment_bytes: u64,
    /// Fragments re-sent because a reader asked for them.
    pub pulled_fragment_count: u64,
    /// Payload bytes carried by the re-sent fragments.
    pub pulled_fragment_bytes: u64,
    /// NACK_FRAG submessages addressed to this writer.
    pub received_nack_fragment_count: u64,
    /// Wire size of those NACK_FRAG submessages (header included).
    pub received_nack_fragment_bytes: u64,
    /// Samples written, fragmented or not.
    pub pushed_sample_count: u64,
    /// Serialized bytes of those samples.
    pub pushed_sample_bytes: u64,
}

/// Live counters shared between the write path and the NACK thread.
#[derive(Debug, Default)]
pub(crate) struct WriterProtocolCounters {
    pushed_fragment_count: AtomicU64,
    pushed_fragment_bytes: AtomicU64,
    pulled_fragment_count: AtomicU64,
    pulled_fragment_bytes: AtomicU64,
    received_nack_fragment_count: AtomicU64,
    received_nack_fragment_bytes: AtomicU64,
    pushed_sample_count: AtomicU64,
    pushed_sample_bytes: AtomicU64,
}

impl WriterProtocolCounters {
    pub(crate) fn record_pushed_fragment(&self, bytes: usize) {
        self.pushed_fragment_count.fetch_add(1, Ordering::Relaxed);
        self.pushed_fragment_bytes
            .fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_pulled_fragment(&self, bytes: usize) {
        self.pulled_fragment_count.fetch_add(1, Ordering::Relaxed);
        self.pulled_fragment_bytes
            .fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_nack_frag(&self, wire_len: usize) {
        self.received_nack_fragment_count
            .fetch_add(1, Ordering::Relaxed);
        self.received_nack_fragment_bytes
            .fetch_add(wire_len as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_sample(&self, bytes: usize) {
        self.pushed_sample_count.fetch_add(1, Ordering::Relaxed);
        self.pushed_sample_bytes
            .fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> DataWriterProtocolStatus {
        DataWriterProtocolStatus {
            pushed_fragment_count: self.pushed_fragment_count.load(Ordering::Relaxed),
            pushed_fragment_bytes: self.pushed_fragment_bytes.load(Ordering::Relaxed),
            pulled_fragment_count: self.pulled_fragment_count.load(Ordering::Relaxed),
            pulled_fragment_bytes: self.pulled_fragment_bytes.load(Ordering::Relaxed),
            received_nack_fragment_count: self
                .received_nack_fragment_count
                .load(Ordering::Relaxed),
            received_nack_fragment_bytes: self
                .received_nack_fragment_bytes
                .load(Ordering::Relaxed),
            pushed_sample_count: self.pushed_sample_count.load(Ordering::Relaxed),
            pushed_sample_bytes: self.pushed_sample_bytes.load(Ordering::Relaxed),
        }
    }
}
