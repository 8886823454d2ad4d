// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # fragdds - DDS publish/subscribe with RTPS fragmentation statistics
//!
//! A small DDS-style middleware built to exercise one thing well: samples
//! larger than the transport's `message_size_max` are split into RTPS
//! DATA_FRAG submessages, reassembled by readers, and repaired on demand
//! through NACK_FRAG. Writers expose the resulting protocol counters.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fragdds::{Participant, QoS, Result};
//! # use fragdds::DDS;
//! # struct Blob(Vec<u8>);
//! # impl DDS for Blob {
//! #     const TYPE_NAME: &'static str = "blob";
//! #     fn encoded_size_hint(&self) -> usize { self.0.len() }
//! #     fn encode_cdr2(&self, buf: &mut [u8]) -> Result<usize> {
//! #         buf[..self.0.len()].copy_from_slice(&self.0); Ok(self.0.len())
//! #     }
//! #     fn decode_cdr2(buf: &[u8]) -> Result<Self> { Ok(Blob(buf.to_vec())) }
//! # }
//!
//! fn main() -> Result<()> {
//!     let participant = Participant::builder("blob_app").domain_id(0).build()?;
//!     let publisher = participant.create_publisher()?;
//!     participant.register_type::<Blob>(Blob::TYPE_NAME)?;
//!     let topic = participant.create_topic::<Blob>("blobs", Blob::TYPE_NAME)?;
//!     let writer = publisher.create_writer(&topic, QoS::reliable())?;
//!
//!     writer.write(&Blob(vec![0u8; 8000]))?;
//!     let status = writer.protocol_status();
//!     println!("pushed {} fragments", status.pushed_fragment_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------+
//! |  Participant -> Publisher/Subscriber -> DataWriter/DataReader |
//! +---------------------------------------------------------------+
//! |  HistoryCache | FragmentBuffer | protocol status counters      |
//! +---------------------------------------------------------------+
//! |  RTPS: DATA | DATA_FRAG | HEARTBEAT_FRAG | NACK_FRAG           |
//! +---------------------------------------------------------------+
//! |  UDP unicast / multicast (socket2)                            |
//! +---------------------------------------------------------------+
//! ```
//!
//! There is no discovery: writers send to the domain's multicast group and
//! to any static peers, readers match writers by topic key.

/// Global configuration (port mapping, sizes, runtime overrides).
pub mod config;
/// Core DDS API (Participant, Publisher, Subscriber, Topic, DataWriter, DataReader).
pub mod dds;
/// RTPS message builders and parser.
pub mod protocol;
/// Bounds-checked cursors for CDR encoding.
pub mod ser;
/// UDP transport and RTPS port mapping.
pub mod transport;

pub use config::RuntimeConfig;
pub use dds::{
    DataReader, DataReaderProtocolStatus, DataWriter, DataWriterProtocolStatus, Error,
    FragmentBuffer, History, HistoryCache, InsertOutcome, Participant, ParticipantBuilder,
    Publisher, QoS, Reliability, Result, Subscriber, Topic, TransportMode, DDS,
};
