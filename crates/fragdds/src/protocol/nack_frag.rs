// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! NACK_FRAG builder for fragment-level retransmission requests.
//!
//! NACK_FRAG format (RTPS v2.3 Sec.8.3.7.5):
//! ```text
//! +------------------+
//! | readerEntityId   |  4 bytes
//! | writerEntityId   |  4 bytes
//! | writerSN         |  8 bytes
//! | bitmapBase       |  4 bytes (first fragment number)
//! | numBits          |  4 bytes
//! | bitmap[]         |  numBits / 32 words, MSB-first
//! | count            |  4 bytes
//! +------------------+
//! ```

use super::constants::{
    FLAG_ENDIANNESS, MAX_NACK_FRAG_BITS, RTPS_SUBMSG_INFO_DST, RTPS_SUBMSG_NACK_FRAG,
};
use super::packet::write_rtps_header;
use super::{EntityId, GuidPrefix};

/// Build a NACK_FRAG submessage for `missing_frags` (1-based fragment numbers).
///
/// Fragments further than 256 from the smallest missing number are left for a
/// later request.
pub fn build_nack_frag_submessage(
    reader_entity_id: EntityId,
    writer_entity_id: EntityId,
    writer_sn: u64,
    missing_frags: &[u32],
    count: u32,
) -> Vec<u8> {
    let frag_base = missing_frags.iter().min().copied().unwrap_or(1);
    let frag_max = missing_frags.iter().max().copied().unwrap_or(0);
    let num_bits = if frag_max >= frag_base {
        (frag_max - frag_base + 1).min(MAX_NACK_FRAG_BITS)
    } else {
        0
    };

    let bitmap_words = num_bits.div_ceil(32) as usize;
    let mut bitmap = vec![0u32; bitmap_words];
    for &frag_num in missing_frags {
        if frag_num >= frag_base && frag_num - frag_base < num_bits {
            let bit_pos = (frag_num - frag_base) as usize;
            bitmap[bit_pos / 32] |= 1u32 << (31 - (bit_pos % 32));
        }
    }

    let submsg_len = 4 + 4 + 8 + 4 + 4 + bitmap_words * 4 + 4;
    let mut buf = Vec::with_capacity(4 + submsg_len);

    buf.push(RTPS_SUBMSG_NACK_FRAG);
    buf.push(FLAG_ENDIANNESS);
    buf.extend_from_slice(&(submsg_len as u16).to_le_bytes());

    buf.extend_from_slice(&reader_entity_id);
    buf.extend_from_slice(&writer_entity_id);
    buf.extend_from_slice(&((writer_sn >> 32) as u32).to_le_bytes());
    buf.extend_from_slice(&(writer_sn as u32).to_le_bytes());
    buf.extend_from_slice(&frag_base.to_le_bytes());
    buf.extend_from_slice(&num_bits.to_le_bytes());
    for word in &bitmap {
        buf.extend_from_slice(&word.to_le_bytes());
    }
    buf.extend_from_slice(&count.to_le_bytes());

    buf
}

/// Build a complete RTPS packet: header + INFO_DST + NACK_FRAG.
#[allow(clippy::too_many_arguments)]
pub fn build_nack_frag_packet(
    our_guid_prefix: GuidPrefix,
    dest_guid_prefix: GuidPrefix,
    reader_entity_id: EntityId,
    writer_entity_id: EntityId,
    writer_sn: u64,
    missing_frags: &[u32],
    count: u32,
) -> Vec<u8> {
    let mut packet = Vec::with_capacity(128);
    write_rtps_header(&mut packet, &our_guid_prefix);

    packet.push(RTPS_SUBMSG_INFO_DST);
    packet.push(FLAG_ENDIANNESS);
    packet.extend_from_slice(&12u16.to_le_bytes());
    packet.extend_from_slice(&dest_guid_prefix);

    packet.extend_from_slice(&build_nack_frag_submessage(
        reader_entity_id,
        writer_entity_id,
        writer_sn,
        missing_frags,
        count,
    ));
    packet
}

/// Expand a FragmentNumberSet bitmap into fragment numbers.
///
/// Returns `None` when `num_bits` exceeds 256 or `words` is too short.
pub fn decode_fragment_bitmap(base: u32, num_bits: u32, words: &[u32]) -> Option<Vec<u32>> {
    if num_bits > MAX_NACK_FRAG_BITS || words.len() < num_bits.div_ceil(32) as usize {
        return None;
    }
    let mut frags = Vec::new();
    for bit_pos in 0..num_bits {
        let word = words[(bit_pos / 32) as usize];
        if word & (1u32 << (31 - (bit_pos % 32))) != 0 {
            frags.push(base.checked_add(bit_pos)?);
        }
    }
    Some(frags)
}
