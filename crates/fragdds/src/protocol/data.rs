// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DATA and DATA_FRAG submessage encoders (RTPS 2.3 Sec.8.3.7.2 / 8.3.7.3).

use super::constants::{
    DATA_BODY_HEADER_SIZE, DATA_FRAG_BODY_HEADER_SIZE, FLAG_DATA_PRESENT, FLAG_ENDIANNESS,
    RTPS_SUBMSG_DATA, RTPS_SUBMSG_DATA_FRAG,
};
use crate::dds::{Error, Result};

/// octetsToInlineQos for DATA: readerId + writerId + writerSN.
const DATA_OCTETS_TO_INLINE_QOS: u16 = 16;
/// octetsToInlineQos for DATA_FRAG: DATA fields + fragment fields.
const DATA_FRAG_OCTETS_TO_INLINE_QOS: u16 = 28;

fn submessage_len(body_len: usize) -> Result<u16> {
    u16::try_from(body_len).map_err(|_| Error::BufferTooSmall)
}

fn push_sequence_number(buf: &mut Vec<u8>, sequence_number: u64) {
    // SequenceNumber_t = high:i32 + low:u32
    let sn_high = (sequence_number >> 32) as i32;
    let sn_low = sequence_number as u32;
    buf.extend_from_slice(&sn_high.to_le_bytes());
    buf.extend_from_slice(&sn_low.to_le_bytes());
}

/// Encode a DATA submessage.
///
/// # Errors
///
/// `Error::BufferTooSmall` if the payload does not fit a 16-bit submessage length.
pub fn encode_data(
    reader_id: &[u8; 4],
    writer_id: &[u8; 4],
    sequence_number: u64,
    payload: &[u8],
) -> Result<Vec<u8>> {
    let submsg_len = submessage_len(DATA_BODY_HEADER_SIZE + payload.len())?;
    let mut buf = Vec::with_capacity(4 + submsg_len as usize);

    buf.push(RTPS_SUBMSG_DATA);
    buf.push(FLAG_ENDIANNESS | FLAG_DATA_PRESENT);
    buf.extend_from_slice(&submsg_len.to_le_bytes());

    buf.extend_from_slice(&0u16.to_le_bytes()); // extraFlags
    buf.extend_from_slice(&DATA_OCTETS_TO_INLINE_QOS.to_le_bytes());
    buf.extend_from_slice(reader_id);
    buf.extend_from_slice(writer_id);
    push_sequence_number(&mut buf, sequence_number);
    buf.extend_from_slice(payload);

    Ok(buf)
}

/// Encode a DATA_FRAG submessage carrying one or more consecutive fragments.
///
/// `fragment_starting_num` is 1-based; `data_size` is the size of the whole sample.
#[allow(clippy::too_many_arguments)] // RTPS DATA_FRAG wire fields
pub fn encode_data_frag(
    reader_id: &[u8; 4],
    writer_id: &[u8; 4],
    sequence_number: u64,
    fragment_starting_num: u32,
    fragments_in_submessage: u16,
    data_size: u32,
    fragment_size: u16,
    payload: &[u8],
) -> Result<Vec<u8>> {
    if fragment_starting_num == 0 || fragment_size == 0 {
        return Err(Error::InvalidState(
            "DATA_FRAG requires 1-based fragment numbers and non-zero fragment size".into(),
        ));
    }
    let submsg_len = submessage_len(DATA_FRAG_BODY_HEADER_SIZE + payload.len())?;
    let mut buf = Vec::with_capacity(4 + submsg_len as usize);

    buf.push(RTPS_SUBMSG_DATA_FRAG);
    buf.push(FLAG_ENDIANNESS);
    buf.extend_from_slice(&submsg_len.to_le_bytes());

    buf.extend_from_slice(&0u16.to_le_bytes());
    buf.extend_from_slice(&DATA_FRAG_OCTETS_TO_INLINE_QOS.to_le_bytes());
    buf.extend_from_slice(reader_id);
    buf.extend_from_slice(writer_id);
    push_sequence_number(&mut buf, sequence_number);
    buf.extend_from_slice(&fragment_starting_num.to_le_bytes());
    buf.extend_from_slice(&fragments_in_submessage.to_le_bytes());
    buf.extend_from_slice(&fragment_size.to_le_bytes());
    buf.extend_from_slice(&data_size.to_le_bytes());
    buf.extend_from_slice(payload);

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_encoding() {
        let writer_id = [0x00, 0x01, 0x02, 0x03];
        let buf = encode_data(&[0; 4], &writer_id, 1, b"Hello, DDS!").unwrap();
        assert_eq!(buf[0], 0x15);
        assert_eq!(buf[1], 0x05);
        assert_eq!(u16::from_le_bytes([buf[2], buf[3]]) as usize, 20 + 11);
        assert_eq!(&buf[12..16], &writer_id);
        assert_eq!(&buf[24..], b"Hello, DDS!");
    }

    #[test]
    fn test_data_frag_encoding() {
        let payload = vec![0xEEu8; 968];
        let buf = encode_data_frag(&[0; 4], &[0, 1, 2, 3], 7, 2, 1, 8012, 968, &payload).unwrap();
        assert_eq!(buf[0], 0x16);
        assert_eq!(buf.len(), 36 + 968);
        // fragmentStartingNum
        assert_eq!(u32::from_le_bytes([buf[24], buf[25], buf[26], buf[27]]), 2);
        // sampleSize
        assert_eq!(u32::from_le_bytes([buf[32], buf[33], buf[34], buf[35]]), 8012);
    }

    #[test]
    fn test_data_frag_rejects_zero_fragment_number() {
        assert!(encode_data_frag(&[0; 4], &[0; 4], 1, 0, 1, 10, 10, &[0; 10]).is_err());
    }

    #[test]
    fn test_oversized_data_rejected() {
        let payload = vec![0u8; 70_000];
        assert!(matches!(
            encode_data(&[0; 4], &[0; 4], 1, &payload),
            Err(Error::BufferTooSmall)
        ));
    }
}
