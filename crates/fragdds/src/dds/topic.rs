// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed topic handle.

use crate::dds::DDS;
use std::fmt;
use std::marker::PhantomData;

/// A named, typed data stream.
///
/// Writers stamp the topic's 2-byte key into their entity id; readers only
/// accept DATA and DATA_FRAG from writers carrying the same key.
pub struct Topic<T: DDS> {
    name: String,
    type_name: String,
    key: [u8; 2],
    _phantom: PhantomData<fn() -> T>,
}

impl<T: DDS> Topic<T> {
    pub(crate) fn new(name: &str, type_name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            key: topic_key(name),
            _phantom: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn key(&self) -> [u8; 2] {
        self.key
    }
}

impl<T: DDS> Clone for Topic<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            type_name: self.type_name.clone(),
            key: self.key,
            _phantom: PhantomData,
        }
    }
}

impl<T: DDS> fmt::Debug for Topic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topic")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// FNV-1a over the topic name, folded to 16 bits.
pub(crate) fn topic_key(name: &str) -> [u8; 2] {
    const FNV_OFFSET: u32 = 0x811c_9dc5;
    const FNV_PRIME: u32 = 0x0100_0193;

    let hash = name.bytes().fold(FNV_OFFSET, |acc, b| {
        (acc ^ u32::from(b)).wrapping_mul(FNV_PRIME)
    });
    let folded = ((hash >> 16) ^ (hash & 0xFFFF)) as u16;
    folded.to_be_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_key_stable_and_distinct() {
        assert_eq!(topic_key("Example fragment"), topic_key("Example fragment"));
        assert_ne!(topic_key("Example fragment"), topic_key("Example fragments"));
        assert_ne!(topic_key("a"), topic_key("b"));
    }
}
