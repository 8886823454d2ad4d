// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HEARTBEAT_FRAG builder (RTPS 2.3 Sec.8.3.7.6).
//!
//! Announces how many fragments of a sample the writer has made available,
//! giving readers a point at which to NACK_FRAG the gaps.

use super::constants::{FLAG_ENDIANNESS, RTPS_SUBMSG_HEARTBEAT_FRAG};
use super::packet::write_rtps_header;
use super::{EntityId, GuidPrefix};

/// HEARTBEAT_FRAG body length.
///
/// readerEntityId(4) + writerEntityId(4) + writerSN(8) + lastFragmentNum(4) + count(4)
pub const HEARTBEAT_FRAG_BODY_LEN: u16 = 24;

/// Build a HEARTBEAT_FRAG submessage including its submessage header.
pub fn build_heartbeat_frag_submessage(
    reader_entity_id: EntityId,
    writer_entity_id: EntityId,
    writer_sn: u64,
    last_fragment_num: u32,
    count: u32,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(4 + HEARTBEAT_FRAG_BODY_LEN as usize);

    buf.push(RTPS_SUBMSG_HEARTBEAT_FRAG);
    buf.push(FLAG_ENDIANNESS);
    buf.extend_from_slice(&HEARTBEAT_FRAG_BODY_LEN.to_le_bytes());

    buf.extend_from_slice(&reader_entity_id);
    buf.extend_from_slice(&writer_entity_id);
    buf.extend_from_slice(&((writer_sn >> 32) as u32).to_le_bytes());
    buf.extend_from_slice(&(writer_sn as u32).to_le_bytes());
    buf.extend_from_slice(&last_fragment_num.to_le_bytes());
    buf.extend_from_slice(&count.to_le_bytes());

    buf
}

/// Build a complete RTPS packet carrying one HEARTBEAT_FRAG.
pub fn build_heartbeat_frag_packet(
    our_guid_prefix: GuidPrefix,
    reader_entity_id: EntityId,
    writer_entity_id: EntityId,
    writer_sn: u64,
    last_fragment_num: u32,
    count: u32,
) -> Vec<u8> {
    let mut packet = Vec::with_capacity(20 + 4 + HEARTBEAT_FRAG_BODY_LEN as usize);
    write_rtps_header(&mut packet, &our_guid_prefix);
    packet.extend_from_slice(&build_heartbeat_frag_submessage(
        reader_entity_id,
        writer_entity_id,
        writer_sn,
        last_fragment_num,
        count,
    ));
    packet
}
