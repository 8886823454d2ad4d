// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Sample payload type.
//!
//! ```idl
//! struct fragment {
//!     long x;
//!     sequence<octet> data;
//! };
//! ```

use fragdds::ser::{Cursor, CursorMut, SerError, CDR_LE_HEADER};
use fragdds::{Result, DDS};

/// Topic both binaries use.
pub const TOPIC_NAME: &str = "Example fragment";

/// Payload size; larger than one 1024-byte RTPS message.
pub const FRAGMENT_DATA_SIZE: usize = 8000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub x: i32,
    pub data: Vec<u8>,
}

impl Fragment {
    /// A sample carrying `FRAGMENT_DATA_SIZE` zero bytes.
    #[must_use]
    pub fn preallocated() -> Self {
        Self {
            x: 0,
            data: vec![0u8; FRAGMENT_DATA_SIZE],
        }
    }
}

impl Default for Fragment {
    fn default() -> Self {
        Self::preallocated()
    }
}

impl DDS for Fragment {
    const TYPE_NAME: &'static str = "fragment";

    fn encoded_size_hint(&self) -> usize {
        CDR_LE_HEADER.len() + 4 + 4 + self.data.len()
    }

    fn encode_cdr2(&self, buf: &mut [u8]) -> Result<usize> {
        let len = u32::try_from(self.data.len()).map_err(|_| fragdds::Error::BufferTooSmall)?;
        let mut cursor = CursorMut::new(buf);
        cursor.write_bytes(&CDR_LE_HEADER)?;
        cursor.write_i32_le(self.x)?;
        cursor.write_u32_le(len)?;
        cursor.write_bytes(&self.data)?;
        Ok(cursor.offset())
    }

    fn decode_cdr2(buf: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(buf);
        if cursor.read_bytes(CDR_LE_HEADER.len())? != CDR_LE_HEADER {
            return Err(SerError::InvalidData {
                reason: "expected CDR_LE encapsulation".into(),
            }
            .into());
        }
        let x = cursor.read_i32_le()?;
        let len = cursor.read_u32_le()? as usize;
        let data = cursor.read_bytes(len)?.to_vec();
        Ok(Self { x, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(sample: &Fragment) -> Vec<u8> {
        let mut buf = vec![0u8; sample.encoded_size_hint()];
        let len = sample.encode_cdr2(&mut buf).unwrap();
        buf.truncate(len);
        buf
    }

    #[test]
    fn test_preallocated_sample_wire_size() {
        let sample = Fragment::preallocated();
        let bytes = encode(&sample);
        assert_eq!(bytes.len(), 8012);
        assert_eq!(&bytes[..4], &CDR_LE_HEADER);
        assert_eq!(&bytes[8..12], &8000u32.to_le_bytes());
    }

    #[test]
    fn test_decode_restores_counter_and_data() {
        let sample = Fragment {
            x: -7,
            data: vec![1, 2, 3, 4, 5],
        };
        assert_eq!(Fragment::decode_cdr2(&encode(&sample)).unwrap(), sample);
    }

    #[test]
    fn test_encode_into_small_buffer_fails() {
        let mut buf = [0u8; 16];
        assert!(matches!(
            Fragment::preallocated().encode_cdr2(&mut buf),
            Err(fragdds::Error::BufferTooSmall)
        ));
    }

    #[test]
    fn test_decode_rejects_bad_header_and_truncation() {
        let mut bytes = encode(&Fragment {
            x: 1,
            data: vec![9; 10],
        });
        assert!(matches!(
            Fragment::decode_cdr2(&bytes[..bytes.len() - 1]),
            Err(fragdds::Error::SerializationError)
        ));
        bytes[1] = 0x00; // CDR_BE
        assert!(matches!(
            Fragment::decode_cdr2(&bytes),
            Err(fragdds::Error::SerializationError)
        ));
    }
}
