// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # fragdds Sample: Fragmented Data Statistics (subscriber)
//!
//! Receives the publisher's 8000-byte samples. Each one arrives as DATA_FRAG
//! packets that the reader reassembles; with reliable QoS, fragments lost on
//! the way are requested again through NACK_FRAG.
//!
//! ## Running the Sample
//!
//! ```bash
//! cargo run --bin fragment_subscriber -- --sample-count 10
//! ```
//!
//! On exit the reader's protocol status is printed.

use clap::Parser;
use fragdds::{DataReaderProtocolStatus, DDS};
use fragdds_samples_fragmentation::{Args, Fragment, ShutdownSignal, TOPIC_NAME};
use std::time::Duration;

const POLL_PERIOD: Duration = Duration::from_millis(500);

fn print_statistics(status: &DataReaderProtocolStatus) {
    println!(
        "Fragmented Data Statistics:\n\
         \t received_sample_count {}\n\
         \t received_fragment_count {}\n\
         \t received_fragment_bytes {}\n\
         \t reassembled_sample_count {}\n\
         \t sent_nack_fragment_count {}\n\
         \t sent_nack_fragment_bytes {}\n\
         \t dropped_fragment_count {}",
        status.received_sample_count,
        status.received_fragment_count,
        status.received_fragment_bytes,
        status.reassembled_sample_count,
        status.sent_nack_fragment_count,
        status.sent_nack_fragment_bytes,
        status.dropped_fragment_count
    );
}

fn run(args: &Args, shutdown: &ShutdownSignal) -> Result<(), Box<dyn std::error::Error>> {
    let participant = args.build_participant("fragment_subscriber")?;
    let subscriber = participant.create_subscriber()?;
    participant.register_type::<Fragment>(Fragment::TYPE_NAME)?;
    let topic = participant.create_topic::<Fragment>(TOPIC_NAME, Fragment::TYPE_NAME)?;
    let reader = subscriber.create_reader(&topic, args.qos()?)?;

    println!("Waiting for fragments on '{}'...", TOPIC_NAME);

    let mut samples_read: u64 = 0;
    while !shutdown.is_triggered() && !args.reached(samples_read) {
        match reader.take_timeout(POLL_PERIOD)? {
            Some(sample) => {
                println!(
                    "Received fragment x={} ({} bytes)",
                    sample.x,
                    sample.data.len()
                );
                samples_read += 1;
            }
            None => log::trace!("no sample within {:?}", POLL_PERIOD),
        }
    }

    print_statistics(&reader.protocol_status());

    participant.delete_contained_entities();
    drop(reader);
    drop(subscriber);
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
