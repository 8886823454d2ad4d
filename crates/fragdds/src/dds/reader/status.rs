// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a reader's fragment-level protocol counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataReaderProtocolStatus {
    /// Samples decoded and queued for `take`.
    pub received_sample_count: u64,
    /// DATA_FRAG fragments received for this topic, duplicates included.
    pub received_fragment_count: u64,
    /// Payload bytes of those fragments.
    pub received_fragment_bytes: u64,
    /// Samples rebuilt from fragments.
    pub reassembled_sample_count: u64,
    /// NACK_FRAG submessages sent to writers.
    pub sent_nack_fragment_count: u64,
    /// Wire size of those NACK_FRAG submessages (header included).
    pub sent_nack_fragment_bytes: u64,
    /// Fragments rejected, plus incomplete samples evicted by timeout or LRU.
    pub dropped_fragment_count: u64,
}

#[derive(Debug, Default)]
pub(crate) struct ReaderProtocolCounters {
    received_sample_count: AtomicU64,
    received_fragment_count: AtomicU64,
    received_fragment_bytes: AtomicU64,
    reassembled_sample_count: AtomicU64,
    sent_nack_fragment_count: AtomicU64,
    sent_nack_fragment_bytes: AtomicU64,
    dropped_fragment_count: AtomicU64,
}

impl ReaderProtocolCounters {
    pub(crate) fn record_sample(&self) {
        self.received_sample_count.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fragment(&self, bytes: usize) {
        self.received_fragment_count.fetch_add(1, Ordering::Relaxed);
        self.received_fragment_bytes
            .fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_reassembled(&self) {
        self.reassembled_sample_count
            .fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_nack_frag(&self, wire_len: usize) {
        self.sent_nack_fragment_count.fetch_add(1, Ordering::Relaxed);
        self.sent_nack_fragment_bytes
            .fetch_add(wire_len as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self, count: usize) {
        if count > 0 {
            self.dropped_fragment_count
                .fetch_add(count as u64, Ordering::Relaxed);
        }
    }

    pub(crate) fn snapshot(&self) -> DataReaderProtocolStatus {
        DataReaderProtocolStatus {
            received_sample_count: self.received_sample_count.load(Ordering::Relaxed),
            received_fragment_count: self.received_fragment_count.load(Ordering::Relaxed),
            received_fragment_bytes: self.received_fragment_bytes.load(Ordering::Relaxed),
            reassembled_sample_count: self.reassembled_sample_count.load(Ordering::Relaxed),
            sent_nack_fragment_count: self.sent_nack_fragment_count.load(Ordering::Relaxed),
            sent_nack_fragment_bytes: self.sent_nack_fragment_bytes.load(Ordering::Relaxed),
            dropped_fragment_count: self.dropped_fragment_count.load(Ordering::Relaxed),
        }
    }
}
