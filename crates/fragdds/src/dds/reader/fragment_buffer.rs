// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fragment reassembly buffer for RTPS DATA_FRAG submessages.
//
// Fragments may arrive out of order, duplicated, or not at all. The buffer:
//
// - reassembles out-of-order fragments per (writer GUID, sequence)
// - evicts incomplete sequences after a timeout
// - evicts the least recently updated sequence when full
// - remembers recently completed sequences so late repairs are dropped
//
// RTPS v2.3 Sec.8.3.7.4: DATA_FRAG Submessage

use crate::config::{COMPLETED_SEQUENCE_MEMORY, FRAGMENT_TIMEOUT, MAX_PENDING_SEQUENCES};
use crate::protocol::constants::MAX_NACK_FRAG_BITS;
use crate::protocol::Guid;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

/// Result of [`FragmentBuffer::insert_fragment`].
#[derive(Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Stored; more fragments needed.
    Incomplete { received: u32, total: u32 },
    /// Last missing fragment arrived; the reassembled sample.
    Complete(Vec<u8>),
    /// Fragment already held, or the sequence already completed.
    Duplicate,
    /// Fragment inconsistent with the sequence (bad number or sizes).
    Rejected,
}

/// Buffers DATA_FRAG fragments by (writer GUID, sequence) until complete.
///
/// # Memory Bound
///
/// Worst case: `max_pending x sample_size`.
pub struct FragmentBuffer {
    pending: HashMap<(Guid, u64), FragmentSet>,
    max_pending: usize,
    timeout: Duration,
    completed: VecDeque<(Guid, u64)>,
    completed_set: HashSet<(Guid, u64)>,
    lru_evictions: usize,
}

struct FragmentSet {
    /// 1-based fragment number -> data
    fragments: BTreeMap<u32, Vec<u8>>,
    total_fragments: u32,
    sample_size: usize,
    first_seen: Instant,
    last_updated: Instant,
}

impl Default for FragmentBuffer {
    fn default() -> Self {
        Self::new(MAX_PENDING_SEQUENCES, FRAGMENT_TIMEOUT)
    }
}

impl FragmentBuffer {
    #[must_use]
    pub fn new(max_pending: usize, timeout: Duration) -> Self {
        let max_pending = max_pending.max(1);
        Self {
            pending: HashMap::with_capacity(max_pending),
            max_pending,
            timeout,
            completed: VecDeque::with_capacity(COMPLETED_SEQUENCE_MEMORY),
            completed_set: HashSet::with_capacity(COMPLETED_SEQUENCE_MEMORY),
            lru_evictions: 0,
        }
    }

    /// Insert one fragment and attempt reassembly.
    ///
    /// `total_frags` and `sample_size` must agree with earlier fragments of
    /// the same sequence, otherwise the fragment is rejected.
    pub fn insert_fragment(
        &mut self,
        writer: Guid,
        seq_num: u64,
        frag_num: u32,
        total_frags: u32,
        sample_size: usize,
        data: &[u8],
    ) -> InsertOutcome {
        if total_frags == 0 || frag_num == 0 || frag_num > total_frags {
            log::debug!(
                "[fragment_buffer] rejected fragment {}/{} for seq {}",
                frag_num,
                total_frags,
                seq_num
            );
            return InsertOutcome::Rejected;
        }

        let key = (writer, seq_num);
        if self.completed_set.contains(&key) {
            return InsertOutcome::Duplicate;
        }

        let now = Instant::now();
        let set = self.pending.entry(key).or_insert_with(|| FragmentSet {
            fragments: BTreeMap::new(),
            total_fragments: total_frags,
            sample_size,
            first_seen: now,
            last_updated: now,
        });

        if set.total_fragments != total_frags || set.sample_size != sample_size {
            log::debug!(
                "[fragment_buffer] seq {} geometry changed ({} frags/{} bytes -> {}/{})",
                seq_num,
                set.total_fragments,
                set.sample_size,
                total_frags,
                sample_size
            );
            return InsertOutcome::Rejected;
        }
        if set.fragments.contains_key(&frag_num) {
            return InsertOutcome::Duplicate;
        }

        set.fragments.insert(frag_num, data.to_vec());
        set.last_updated = now;

        let received = set.fragments.len() as u32;
        if received < total_frags {
            if self.pending.len() > self.max_pending {
                self.evict_lru();
            }
            return InsertOutcome::Incomplete {
                received,
                total: total_frags,
            };
        }

        let Some(set) = self.pending.remove(&key) else {
            return InsertOutcome::Rejected;
        };
        let mut payload = Vec::with_capacity(set.sample_size);
        for data in set.fragments.into_values() {
            payload.extend_from_slice(&data);
        }
        if payload.len() != set.sample_size {
            log::debug!(
                "[fragment_buffer] seq {} reassembled {} bytes, expected {}",
                seq_num,
                payload.len(),
                set.sample_size
            );
            return InsertOutcome::Rejected;
        }

        self.mark_completed(key);
        log::trace!(
            "[fragment_buffer] seq {} complete ({} fragments, {} bytes)",
            seq_num,
            total_frags,
            payload.len()
        );
        InsertOutcome::Complete(payload)
    }

    /// Fragments still missing for `seq_num`, up to `last_fragment_num`.
    ///
    /// A sequence never seen is missing everything; a completed one returns
    /// `None`. At most one NACK_FRAG bitmap window (256 fragments from the
    /// first missing one) is reported.
    #[must_use]
    pub fn missing_fragments(
        &self,
        writer: &Guid,
        seq_num: u64,
        last_fragment_num: u32,
    ) -> Option<Vec<u32>> {
        let key = (*writer, seq_num);
        if self.completed_set.contains(&key) {
            return None;
        }
        let missing = match self.pending.get(&key) {
            Some(set) => nack_window(
                (1..=last_fragment_num.min(set.total_fragments))
                    .filter(|n| !set.fragments.contains_key(n)),
            ),
            None => nack_window(1..=last_fragment_num),
        };
        Some(missing)
    }

    /// Drop incomplete sequences older than the timeout.
    ///
    /// Returns the number of sequences evicted.
    pub fn evict_expired(&mut self) -> usize {
        let timeout = self.timeout;
        let before = self.pending.len();
        self.pending.retain(|(_, seq), set| {
            let keep = set.first_seen.elapsed() < timeout;
            if !keep {
                log::debug!(
                    "[fragment_buffer] seq {} timed out with {}/{} fragments",
                    seq,
                    set.fragments.len(),
                    set.total_fragments
                );
            }
            keep
        });
        before - self.pending.len()
    }

    /// Sequences dropped to stay within `max_pending` since the last call.
    pub fn take_lru_evictions(&mut self) -> usize {
        std::mem::take(&mut self.lru_evictions)
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_completed(&self, writer: &Guid, seq_num: u64) -> bool {
        self.completed_set.contains(&(*writer, seq_num))
    }

    fn evict_lru(&mut self) {
        let oldest = self
            .pending
            .iter()
            .min_by_key(|(_, set)| set.last_updated)
            .map(|(key, _)| *key);
        if let Some(key) = oldest {
            self.pending.remove(&key);
            self.lru_evictions += 1;
            log::debug!("[fragment_buffer] LRU evicted seq {}", key.1);
        }
    }

    fn mark_completed(&mut self, key: (Guid, u64)) {
        if self.completed_set.insert(key) {
            self.completed.push_back(key);
        }
        while self.completed.len() > COMPLETED_SEQUENCE_MEMORY {
            if let Some(old) = self.completed.pop_front() {
                self.completed_set.remove(&old);
            }
        }
    }
}

/// Missing fragment numbers that fit one NACK_FRAG bitmap starting at the first.
fn nack_window(mut missing: impl Iterator<Item = u32>) -> Vec<u32> {
    let Some(first) = missing.next() else {
        return Vec::new();
    };
    let end = first.saturating_add(MAX_NACK_FRAG_BITS);
    std::iter::once(first)
        .chain(missing.take_while(|n| *n < end))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer() -> Guid {
        Guid::new([7; 12], [1, 2, 3, 3])
    }

    fn chunks(payload: &[u8], size: usize) -> Vec<Vec<u8>> {
        payload.chunks(size).map(<[u8]>::to_vec).collect()
    }

    #[test]
    fn test_out_of_order_reassembly() {
        let payload: Vec<u8> = (0..250u32).map(|i| i as u8).collect();
        let frags = chunks(&payload, 100);
        let mut buffer = FragmentBuffer::default();

        assert_eq!(
            buffer.insert_fragment(writer(), 1, 3, 3, 250, &frags[2]),
            InsertOutcome::Incomplete {
                received: 1,
                total: 3
            }
        );
        assert!(matches!(
            buffer.insert_fragment(writer(), 1, 1, 3, 250, &frags[0]),
            InsertOutcome::Incomplete { received: 2, .. }
        ));
        assert_eq!(
            buffer.insert_fragment(writer(), 1, 2, 3, 250, &frags[1]),
            InsertOutcome::Complete(payload)
        );
        assert_eq!(buffer.pending_count(), 0);
        assert!(buffer.is_completed(&writer(), 1));
    }

    #[test]
    fn test_duplicates_and_late_repairs() {
        let mut buffer = FragmentBuffer::default();
        buffer.insert_fragment(writer(), 1, 1, 2, 4, &[1, 2]);
        assert_eq!(
            buffer.insert_fragment(writer(), 1, 1, 2, 4, &[9, 9]),
            InsertOutcome::Duplicate
        );
        assert_eq!(
            buffer.insert_fragment(writer(), 1, 2, 2, 4, &[3, 4]),
            InsertOutcome::Complete(vec![1, 2, 3, 4])
        );
        // repair arriving after completion
        assert_eq!(
            buffer.insert_fragment(writer(), 1, 2, 2, 4, &[3, 4]),
            InsertOutcome::Duplicate
        );
        assert_eq!(buffer.pending_count(), 0);
    }

    #[test]
    fn test_rejects_bad_fragments() {
        let mut buffer = FragmentBuffer::default();
        assert_eq!(
            buffer.insert_fragment(writer(), 1, 0, 2, 4, &[1]),
            InsertOutcome::Rejected
        );
        assert_eq!(
            buffer.insert_fragment(writer(), 1, 3, 2, 4, &[1]),
            InsertOutcome::Rejected
        );
        buffer.insert_fragment(writer(), 1, 1, 2, 4, &[1, 2]);
        assert_eq!(
            buffer.insert_fragment(writer(), 1, 2, 3, 4, &[3, 4]),
            InsertOutcome::Rejected
        );
        // wrong total length
        assert_eq!(
            buffer.insert_fragment(writer(), 1, 2, 2, 4, &[3]),
            InsertOutcome::Rejected
        );
    }

    #[test]
    fn test_missing_fragments() {
        let mut buffer = FragmentBuffer::default();
        assert_eq!(
            buffer.missing_fragments(&writer(), 5, 3),
            Some(vec![1, 2, 3])
        );
        buffer.insert_fragment(writer(), 5, 1, 6, 60, &[0; 10]);
        buffer.insert_fragment(writer(), 5, 3, 6, 60, &[0; 10]);
        buffer.insert_fragment(writer(), 5, 4, 6, 60, &[0; 10]);
        buffer.insert_fragment(writer(), 5, 6, 6, 60, &[0; 10]);
        assert_eq!(buffer.missing_fragments(&writer(), 5, 6), Some(vec![2, 5]));
        assert_eq!(buffer.missing_fragments(&writer(), 5, 4), Some(vec![2]));
        buffer.insert_fragment(writer(), 5, 2, 6, 60, &[0; 10]);
        buffer.insert_fragment(writer(), 5, 5, 6, 60, &[0; 10]);
        assert_eq!(buffer.missing_fragments(&writer(), 5, 6), None);
    }

    #[test]
    fn test_missing_fragments_bounded_by_nack_window() {
        let mut buffer = FragmentBuffer::default();
        let missing = buffer.missing_fragments(&writer(), 9, u32::MAX).unwrap();
        assert_eq!(missing.len(), MAX_NACK_FRAG_BITS as usize);
        assert_eq!(missing.first(), Some(&1));
        assert_eq!(missing.last(), Some(&256));

        // fragments 1..=3 held, window starts at 4
        for frag in 1..=3 {
            buffer.insert_fragment(writer(), 9, frag, 10_000_000, 20_000_000, &[0; 2]);
        }
        let missing = buffer
            .missing_fragments(&writer(), 9, 10_000_000)
            .unwrap();
        assert_eq!(missing.len(), MAX_NACK_FRAG_BITS as usize);
        assert_eq!(missing.first(), Some(&4));
        assert_eq!(missing.last(), Some(&259));
        assert_eq!(buffer.missing_fragments(&writer(), 9, 0), Some(vec![]));
    }

    #[test]
    fn test_timeout_eviction() {
        let mut buffer = FragmentBuffer::new(8, Duration::from_millis(10));
        buffer.insert_fragment(writer(), 1, 1, 2, 4, &[1, 2]);
        assert_eq!(buffer.evict_expired(), 0);
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(buffer.evict_expired(), 1);
        assert_eq!(buffer.pending_count(), 0);
    }

    #[test]
    fn test_lru_eviction() {
        let mut buffer = FragmentBuffer::new(2, FRAGMENT_TIMEOUT);
        buffer.insert_fragment(writer(), 1, 1, 2, 4, &[1, 2]);
        std::thread::sleep(Duration::from_millis(2));
        buffer.insert_fragment(writer(), 2, 1, 2, 4, &[1, 2]);
        std::thread::sleep(Duration::from_millis(2));
        buffer.insert_fragment(writer(), 3, 1, 2, 4, &[1, 2]);
        assert_eq!(buffer.pending_count(), 2);
        assert_eq!(buffer.take_lru_evictions(), 1);
        assert_eq!(buffer.take_lru_evictions(), 0);
        assert_eq!(
            buffer.missing_fragments(&writer(), 1, 2),
            Some(vec![1, 2])
        );
    }
}
