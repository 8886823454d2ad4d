// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared pieces of the fragmentation sample: the `Fragment` type, the
//! command-line/shutdown harness both binaries use, and the publisher loop.

pub mod fragment;
pub mod harness;
pub mod publish;

pub use fragment::{Fragment, FRAGMENT_DATA_SIZE, TOPIC_NAME};
pub use harness::{Args, ShutdownSignal};
pub use publish::{publish_fragments, write_statistics, PublishExit, SEND_PERIOD};
