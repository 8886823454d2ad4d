// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! RTPS protocol constants (DDS-RTPS v2.3 Sec.8.3 / Sec.9.4).

/// RTPS magic number "RTPS".
pub const RTPS_MAGIC: &[u8; 4] = b"RTPS";

pub const RTPS_VERSION_MAJOR: u8 = 0x02;
pub const RTPS_VERSION_MINOR: u8 = 0x03;

/// Vendor id placed in every RTPS header we emit.
pub const FRAGDDS_VENDOR_ID: [u8; 2] = [0x01, 0xFD];

/// RTPS header: magic(4) + version(2) + vendor(2) + guidPrefix(12).
pub const RTPS_HEADER_SIZE: usize = 20;

pub const RTPS_GUID_PREFIX_SIZE: usize = 12;

pub const RTPS_SUBMSG_HEADER_SIZE: usize = 4;

pub const RTPS_SUBMSG_INFO_DST: u8 = 0x0e;
pub const RTPS_SUBMSG_NACK_FRAG: u8 = 0x12;
pub const RTPS_SUBMSG_HEARTBEAT_FRAG: u8 = 0x13;
pub const RTPS_SUBMSG_DATA: u8 = 0x15;
pub const RTPS_SUBMSG_DATA_FRAG: u8 = 0x16;

/// Endianness flag (E=1 little-endian).
pub const FLAG_ENDIANNESS: u8 = 0x01;
/// DATA: serialized payload present.
pub const FLAG_DATA_PRESENT: u8 = 0x04;

/// DATA body before payload: extraFlags(2) + octetsToInlineQos(2) + readerId(4)
/// + writerId(4) + writerSN(8).
pub const DATA_BODY_HEADER_SIZE: usize = 20;

/// DATA_FRAG body before payload: DATA fields + fragmentStartingNum(4)
/// + fragmentsInSubmessage(2) + fragmentSize(2) + sampleSize(4).
pub const DATA_FRAG_BODY_HEADER_SIZE: usize = 32;

/// Bytes a DATA submessage adds around its payload.
pub const DATA_SUBMSG_OVERHEAD: usize = RTPS_SUBMSG_HEADER_SIZE + DATA_BODY_HEADER_SIZE;

/// Bytes a DATA_FRAG submessage adds around its fragment.
pub const DATA_FRAG_SUBMSG_OVERHEAD: usize = RTPS_SUBMSG_HEADER_SIZE + DATA_FRAG_BODY_HEADER_SIZE;

pub const ENTITYID_UNKNOWN: [u8; 4] = [0x00, 0x00, 0x00, 0x00];

/// User-defined writer, no key.
pub const ENTITY_KIND_USER_WRITER: u8 = 0x03;
/// User-defined reader, no key.
pub const ENTITY_KIND_USER_READER: u8 = 0x04;

/// Upper bound on FragmentNumberSet bits (RTPS Sec.9.4.2.8).
pub const MAX_NACK_FRAG_BITS: u32 = 256;
