// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # DDS DataReader
//!
//! The [`DataReader`] receives typed samples for one topic on a background
//! thread and queues them for [`DataReader::take`].
//!
//! DATA_FRAG fragments are reassembled in a [`FragmentBuffer`]. With reliable
//! QoS, each HEARTBEAT_FRAG is answered with a NACK_FRAG listing the
//! fragments still missing.

mod fragment_buffer;
mod runtime;
mod status;

pub use fragment_buffer::{FragmentBuffer, InsertOutcome};
pub use runtime::DataReader;
pub use status::DataReaderProtocolStatus;
