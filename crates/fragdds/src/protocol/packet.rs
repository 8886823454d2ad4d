// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! RTPS packet assembly and fragment sizing.

use super::constants::{
    DATA_FRAG_SUBMSG_OVERHEAD, DATA_SUBMSG_OVERHEAD, FRAGDDS_VENDOR_ID, RTPS_HEADER_SIZE,
    RTPS_MAGIC, RTPS_VERSION_MAJOR, RTPS_VERSION_MINOR,
};
use super::data::{encode_data, encode_data_frag};
use super::{EntityId, GuidPrefix};
use crate::dds::{Error, Result};
use std::ops::Range;

/// Addressing shared by every packet a writer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointContext {
    pub guid_prefix: GuidPrefix,
    pub reader_entity_id: EntityId,
    pub writer_entity_id: EntityId,
}

/// One DATA_FRAG packet plus the size of the fragment it carries.
#[derive(Debug, Clone)]
pub struct FragmentPacket {
    pub fragment_num: u32,
    pub fragment_len: usize,
    pub packet: Vec<u8>,
}

/// Append the 20-byte RTPS header.
pub fn write_rtps_header(packet: &mut Vec<u8>, guid_prefix: &GuidPrefix) {
    packet.extend_from_slice(RTPS_MAGIC);
    packet.extend_from_slice(&[RTPS_VERSION_MAJOR, RTPS_VERSION_MINOR]);
    packet.extend_from_slice(&FRAGDDS_VENDOR_ID);
    packet.extend_from_slice(guid_prefix);
}

/// Fragment payload size that keeps a DATA_FRAG packet within `message_size_max`.
///
/// `None` when the message size cannot carry even one byte of fragment data.
pub fn fragment_size_for(message_size_max: usize) -> Option<usize> {
    message_size_max
        .checked_sub(RTPS_HEADER_SIZE + DATA_FRAG_SUBMSG_OVERHEAD)
        .filter(|size| *size > 0)
        .map(|size| size.min(u16::MAX as usize))
}

/// True when `payload_len` can go out as a single DATA packet.
#[inline]
pub fn fits_unfragmented(payload_len: usize, message_size_max: usize) -> bool {
    RTPS_HEADER_SIZE + DATA_SUBMSG_OVERHEAD + payload_len <= message_size_max
}

/// Number of fragments needed for `sample_size` bytes.
#[inline]
pub fn fragment_count(sample_size: usize, fragment_size: usize) -> usize {
    if fragment_size == 0 {
        return 0;
    }
    sample_size.div_ceil(fragment_size)
}

/// Byte range of fragment `fragment_num` (1-based) within the sample.
pub fn fragment_range(
    sample_size: usize,
    fragment_size: usize,
    fragment_num: u32,
) -> Option<Range<usize>> {
    if fragment_num == 0 || fragment_size == 0 {
        return None;
    }
    let start = (fragment_num as usize - 1).checked_mul(fragment_size)?;
    if start >= sample_size {
        return None;
    }
    Some(start..(start + fragment_size).min(sample_size))
}

/// Build a single DATA packet.
pub fn build_data_packet(ctx: &EndpointContext, sequence: u64, payload: &[u8]) -> Result<Vec<u8>> {
    let submsg = encode_data(
        &ctx.reader_entity_id,
        &ctx.writer_entity_id,
        sequence,
        payload,
    )?;
    let mut packet = Vec::with_capacity(RTPS_HEADER_SIZE + submsg.len());
    write_rtps_header(&mut packet, &ctx.guid_prefix);
    packet.extend_from_slice(&submsg);
    Ok(packet)
}

/// Build the DATA_FRAG packet for one fragment of `payload`.
pub fn build_data_frag_packet(
    ctx: &EndpointContext,
    sequence: u64,
    payload: &[u8],
    fragment_size: usize,
    fragment_num: u32,
) -> Result<FragmentPacket> {
    let range = fragment_range(payload.len(), fragment_size, fragment_num).ok_or_else(|| {
        Error::InvalidState(format!(
            "fragment {} out of range for {} byte sample",
            fragment_num,
            payload.len()
        ))
    })?;
    let data_size = u32::try_from(payload.len()).map_err(|_| Error::BufferTooSmall)?;
    let fragment_size_u16 = u16::try_from(fragment_size).map_err(|_| Error::BufferTooSmall)?;
    let fragment_len = range.len();

    let submsg = encode_data_frag(
        &ctx.reader_entity_id,
        &ctx.writer_entity_id,
        sequence,
        fragment_num,
        1, // one fragment per packet
        data_size,
        fragment_size_u16,
        &payload[range],
    )?;

    let mut packet = Vec::with_capacity(RTPS_HEADER_SIZE + submsg.len());
    write_rtps_header(&mut packet, &ctx.guid_prefix);
    packet.extend_from_slice(&submsg);

    Ok(FragmentPacket {
        fragment_num,
        fragment_len,
        packet,
    })
}

/// Split `payload` into DATA_FRAG packets, fragment numbers starting at 1.
pub fn build_data_frag_packets(
    ctx: &EndpointContext,
    sequence: u64,
    payload: &[u8],
    fragment_size: usize,
) -> Result<Vec<FragmentPacket>> {
    let total = fragment_count(payload.len(), fragment_size);
    let total_u32 = u32::try_from(total).map_err(|_| Error::BufferTooSmall)?;
    (1..=total_u32)
        .map(|fragment_num| build_data_frag_packet(ctx, sequence, payload, fragment_size, fragment_num))
        .collect()
}
