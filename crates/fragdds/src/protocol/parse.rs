// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! RTPS packet parser for the submessages fragdds understands.
//!
//! Submessages without the little-endian flag, or with ids we do not handle,
//! come back as [`Submessage::Unknown`] so callers can skip them.

use super::constants::{
    DATA_FRAG_BODY_HEADER_SIZE, FLAG_ENDIANNESS, RTPS_HEADER_SIZE, RTPS_MAGIC,
    RTPS_SUBMSG_DATA, RTPS_SUBMSG_DATA_FRAG, RTPS_SUBMSG_HEADER_SIZE,
    RTPS_SUBMSG_HEARTBEAT_FRAG, RTPS_SUBMSG_INFO_DST, RTPS_SUBMSG_NACK_FRAG,
};
use super::nack_frag::decode_fragment_bitmap;
use super::{EntityId, GuidPrefix};
use crate::ser::{Cursor, SerResult};

/// A parsed RTPS packet.
#[derive(Debug)]
pub struct ParsedPacket<'a> {
    pub guid_prefix: GuidPrefix,
    pub submessages: Vec<Submessage<'a>>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Submessage<'a> {
    InfoDst {
        guid_prefix: GuidPrefix,
    },
    Data {
        reader_id: EntityId,
        writer_id: EntityId,
        writer_sn: u64,
        payload: &'a [u8],
    },
    DataFrag {
        reader_id: EntityId,
        writer_id: EntityId,
        writer_sn: u64,
        fragment_starting_num: u32,
        fragments_in_submessage: u16,
        fragment_size: u16,
        sample_size: u32,
        payload: &'a [u8],
    },
    HeartbeatFrag {
        reader_id: EntityId,
        writer_id: EntityId,
        writer_sn: u64,
        last_fragment_num: u32,
        count: u32,
    },
    NackFrag {
        reader_id: EntityId,
        writer_id: EntityId,
        writer_sn: u64,
        missing: Vec<u32>,
        count: u32,
        /// Submessage size including its 4-byte header.
        wire_len: usize,
    },
    Unknown {
        id: u8,
    },
}

/// Parse an RTPS packet.
///
/// Returns `None` for a bad header or a submessage whose length runs past
/// the end of the datagram.
pub fn parse_packet(buf: &[u8]) -> Option<ParsedPacket<'_>> {
    if buf.len() < RTPS_HEADER_SIZE || &buf[0..4] != RTPS_MAGIC {
        return None;
    }
    let mut guid_prefix = [0u8; 12];
    guid_prefix.copy_from_slice(&buf[8..20]);

    let mut submessages = Vec::new();
    let mut offset = RTPS_HEADER_SIZE;

    while offset + RTPS_SUBMSG_HEADER_SIZE <= buf.len() {
        let id = buf[offset];
        let flags = buf[offset + 1];
        let little_endian = flags & FLAG_ENDIANNESS != 0;
        let raw_len = if little_endian {
            u16::from_le_bytes([buf[offset + 2], buf[offset + 3]])
        } else {
            u16::from_be_bytes([buf[offset + 2], buf[offset + 3]])
        } as usize;

        let body_start = offset + RTPS_SUBMSG_HEADER_SIZE;
        // octetsToNextHeader == 0 means "rest of the packet" for the last submessage
        let body_end = if raw_len == 0 && id != RTPS_SUBMSG_INFO_DST {
            buf.len()
        } else {
            body_start + raw_len
        };
        if body_end > buf.len() {
            log::debug!(
                "[parse] submessage 0x{:02x} length {} overruns packet ({} bytes)",
                id,
                raw_len,
                buf.len()
            );
            return None;
        }

        let body = &buf[body_start..body_end];
        let submsg = if little_endian {
            match parse_submessage(id, body) {
                Ok(submsg) => submsg,
                Err(err) => {
                    log::debug!("[parse] malformed submessage 0x{:02x}: {}", id, err);
                    Submessage::Unknown { id }
                }
            }
        } else {
            Submessage::Unknown { id }
        };
        submessages.push(submsg);
        offset = body_end;
    }

    Some(ParsedPacket {
        guid_prefix,
        submessages,
    })
}

fn read_entity_id(cursor: &mut Cursor<'_>) -> SerResult<EntityId> {
    let mut id = [0u8; 4];
    id.copy_from_slice(cursor.read_bytes(4)?);
    Ok(id)
}

fn read_sequence_number(cursor: &mut Cursor<'_>) -> SerResult<u64> {
    let high = cursor.read_u32_le()? as u64;
    let low = cursor.read_u32_le()? as u64;
    Ok((high << 32) | low)
}

fn parse_submessage(id: u8, body: &[u8]) -> SerResult<Submessage<'_>> {
    let mut cursor = Cursor::new(body);
    let submsg = match id {
        RTPS_SUBMSG_INFO_DST => {
            let mut guid_prefix = [0u8; 12];
            guid_prefix.copy_from_slice(cursor.read_bytes(12)?);
            Submessage::InfoDst { guid_prefix }
        }
        RTPS_SUBMSG_DATA => {
            let _extra_flags = cursor.read_u16_le()?;
            let octets_to_inline_qos = cursor.read_u16_le()? as usize;
            let reader_id = read_entity_id(&mut cursor)?;
            let writer_id = read_entity_id(&mut cursor)?;
            let writer_sn = read_sequence_number(&mut cursor)?;
            // payload follows whatever octetsToInlineQos skips past (no inline QoS emitted)
            let payload_start = 4 + octets_to_inline_qos;
            let payload = body.get(payload_start..).unwrap_or(&[]);
            Submessage::Data {
                reader_id,
                writer_id,
                writer_sn,
                payload,
            }
        }
        RTPS_SUBMSG_DATA_FRAG => {
            let _extra_flags = cursor.read_u16_le()?;
            let _octets_to_inline_qos = cursor.read_u16_le()?;
            let reader_id = read_entity_id(&mut cursor)?;
            let writer_id = read_entity_id(&mut cursor)?;
            let writer_sn = read_sequence_number(&mut cursor)?;
            let fragment_starting_num = cursor.read_u32_le()?;
            let fragments_in_submessage = cursor.read_u16_le()?;
            let fragment_size = cursor.read_u16_le()?;
            let sample_size = cursor.read_u32_le()?;
            Submessage::DataFrag {
                reader_id,
                writer_id,
                writer_sn,
                fragment_starting_num,
                fragments_in_submessage,
                fragment_size,
                sample_size,
                payload: &body[DATA_FRAG_BODY_HEADER_SIZE..],
            }
        }
        RTPS_SUBMSG_HEARTBEAT_FRAG => Submessage::HeartbeatFrag {
            reader_id: read_entity_id(&mut cursor)?,
            writer_id: read_entity_id(&mut cursor)?,
            writer_sn: read_sequence_number(&mut cursor)?,
            last_fragment_num: cursor.read_u32_le()?,
            count: cursor.read_u32_le()?,
        },
        RTPS_SUBMSG_NACK_FRAG => {
            let reader_id = read_entity_id(&mut cursor)?;
            let writer_id = read_entity_id(&mut cursor)?;
            let writer_sn = read_sequence_number(&mut cursor)?;
            let base = cursor.read_u32_le()?;
            let num_bits = cursor.read_u32_le()?;
            let word_count = num_bits.div_ceil(32) as usize;
            let mut words = Vec::with_capacity(word_count.min(8));
            for _ in 0..word_count {
                words.push(cursor.read_u32_le()?);
            }
            let count = cursor.read_u32_le()?;
            let missing = decode_fragment_bitmap(base, num_bits, &words).ok_or_else(|| {
                crate::ser::SerError::InvalidData {
                    reason: format!("fragment bitmap numBits={} too large", num_bits),
                }
            })?;
            Submessage::NackFrag {
                reader_id,
                writer_id,
                writer_sn,
                missing,
                count,
                wire_len: RTPS_SUBMSG_HEADER_SIZE + body.len(),
            }
        }
        other => Submessage::Unknown { id: other },
    };
    Ok(submsg)
}
