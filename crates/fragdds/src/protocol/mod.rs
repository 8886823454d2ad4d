// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! RTPS message shapes used by fragdds.
//!
//! Only little-endian encoding is produced or accepted. Submessages:
//!
//! | Id   | Submessage      | Direction        |
//! |------|-----------------|------------------|
//! | 0x0e | INFO_DST        | reader -> writer |
//! | 0x12 | NACK_FRAG       | reader -> writer |
//! | 0x13 | HEARTBEAT_FRAG  | writer -> reader |
//! | 0x15 | DATA            | writer -> reader |
//! | 0x16 | DATA_FRAG       | writer -> reader |

pub mod constants;
pub mod data;
mod guid;
pub mod heartbeat_frag;
pub mod nack_frag;
mod packet;
pub mod parse;

pub use guid::{EntityId, Guid, GuidPrefix};
pub use heartbeat_frag::{build_heartbeat_frag_packet, build_heartbeat_frag_submessage};
pub use nack_frag::{build_nack_frag_packet, build_nack_frag_submessage, decode_fragment_bitmap};
pub use packet::{
    build_data_frag_packet, build_data_frag_packets, build_data_packet, fragment_count,
    fragment_range, fragment_size_for, fits_unfragmented, write_rtps_header, EndpointContext,
    FragmentPacket,
};
pub use parse::{parse_packet, ParsedPacket, Submessage};
