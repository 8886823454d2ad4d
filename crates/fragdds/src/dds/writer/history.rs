// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounded sample history used to answer NACK_FRAG requests.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Keep-last cache of serialized samples, keyed by sequence number.
///
/// Inserting beyond `depth` evicts the oldest sample.
pub struct HistoryCache {
    depth: usize,
    samples: Mutex<VecDeque<(u64, Arc<Vec<u8>>)>>,
}

impl HistoryCache {
    #[must_use]
    pub fn new(depth: usize) -> Self {
        Self {
            depth: depth.max(1),
            samples: Mutex::new(VecDeque::with_capacity(depth.max(1))),
        }
    }

    pub fn insert(&self, sequence: u64, payload: Arc<Vec<u8>>) {
        let mut samples = self.samples.lock();
        while samples.len() >= self.depth {
            if let Some((evicted, _)) = samples.pop_front() {
                log::trace!("[history] evicted seq {}", evicted);
            }
        }
        samples.push_back((sequence, payload));
    }

    #[must_use]
    pub fn get(&self, sequence: u64) -> Option<Arc<Vec<u8>>> {
        self.samples
            .lock()
            .iter()
            .find(|(seq, _)| *seq == sequence)
            .map(|(_, payload)| Arc::clone(payload))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keep_last_eviction() {
        let cache = HistoryCache::new(2);
        cache.insert(1, Arc::new(vec![1]));
        cache.insert(2, Arc::new(vec![2]));
        cache.insert(3, Arc::new(vec![3]));
        assert_eq!(cache.len(), 2);
        assert!(cache.get(1).is_none());
        assert_eq!(cache.get(3).unwrap().as_slice(), &[3]);
    }

    #[test]
    fn test_zero_depth_clamped() {
        let cache = HistoryCache::new(0);
        assert_eq!(cache.depth(), 1);
        assert!(cache.is_empty());
        cache.insert(7, Arc::new(vec![7]));
        assert!(cache.get(7).is_some());
    }
}
