// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # fragdds Sample: Fragmented Data Statistics (publisher)
//!
//! Writes an 8000-byte sample once per second. With the default 1024-byte
//! `message_size_max` every write is split into 9 DATA_FRAG packets, and the
//! writer's protocol status shows how many fragments were pushed, how many
//! were pulled again by readers through NACK_FRAG, and the NACK traffic that
//! caused it.
//!
//! ## Fragment Flow
//!
//! ```text
//! ┌─────────────┐   DATA_FRAG 1..9 + HEARTBEAT_FRAG   ┌─────────────┐
//! │  Publisher  │ ──────────────────────────────────▶ │  Subscriber │
//! │ (DataWriter)│ ◀────────── NACK_FRAG {missing} ─── │ (DataReader)│
//! └─────────────┘                                     └─────────────┘
//! ```
//!
//! ## Running the Sample
//!
//! ```bash
//! # Terminal 1
//! cargo run --bin fragment_subscriber
//!
//! # Terminal 2
//! cargo run --bin fragment_publisher -- --sample-count 10
//! ```
//!
//! ## Expected Output
//!
//! ```text
//! Writing fragment, count 0
//! Fragmented Data Statistics:
//!      pushed_fragment_count 9
//!      pushed_fragment_bytes 8012
//!      pulled_fragment_count 0
//!      pulled_fragment_bytes 0
//!      received_nack_fragment_count 0
//!      received_nack_fragment_bytes 0
//! ```

use clap::Parser;
use fragdds::DDS;
use fragdds_samples_fragmentation::{
    publish_fragments, Args, Fragment, PublishExit, ShutdownSignal, SEND_PERIOD, TOPIC_NAME,
};

fn run(args: &Args, shutdown: &ShutdownSignal) -> Result<(), Box<dyn std::error::Error>> {
    let participant = args.build_participant("fragment_publisher")?;
    let publisher = participant.create_publisher()?;
    participant.register_type::<Fragment>(Fragment::TYPE_NAME)?;
    let topic = participant.create_topic::<Fragment>(TOPIC_NAME, Fragment::TYPE_NAME)?;
    let writer = publisher.create_writer(&topic, args.qos()?)?;

    let exit = publish_fragments(
        &writer,
        args.sample_count,
        SEND_PERIOD,
        shutdown,
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    )?;
    if let PublishExit::CounterExhausted { samples } = exit {
        log::warn!("stopped after {} samples", samples);
    }

    // Delete all entities (DataWriter, Topic, Publisher), then the participant
    participant.delete_contained_entities();
    drop(writer);
    drop(publisher);
    drop(participant);
    Ok(())
}

fn main() {
    let args = Args::parse();
    args.init_logging();

    let shutdown = match ShutdownSignal::install() {
        Ok(signal) => signal,
        Err(e) => {
            eprintln!("Error: cannot install Ctrl-C handler: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&args, &shutdown) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
