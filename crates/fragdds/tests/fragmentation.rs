// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! End-to-end fragmentation over loopback.
//!
//! - 8000-byte payloads split into 9 DATA_FRAGs at the default message size
//! - reassembly on the reader side
//! - small samples bypass fragmentation
//! - entities refuse use after `delete_contained_entities`

mod common;

use common::{loopback_participant, sink, Payload};
use fragdds::{Error, QoS, DDS};
use std::time::Duration;

const TOPIC: &str = "Example fragment";

#[test]
fn test_large_sample_is_fragmented_and_reassembled() {
    let sub_participant = loopback_participant("sub", &[]);
    sub_participant
        .register_type::<Payload>(Payload::TYPE_NAME)
        .unwrap();
    let sub_topic = sub_participant
        .create_topic::<Payload>(TOPIC, Payload::TYPE_NAME)
        .unwrap();
    let reader = sub_participant
        .create_subscriber()
        .unwrap()
        .create_reader(&sub_topic, QoS::reliable())
        .unwrap();
    let reader_addr = reader.local_addr().unwrap();

    let pub_participant = loopback_participant("pub", &[reader_addr]);
    pub_participant
        .register_type::<Payload>(Payload::TYPE_NAME)
        .unwrap();
    let pub_topic = pub_participant
        .create_topic::<Payload>(TOPIC, Payload::TYPE_NAME)
        .unwrap();
    let writer = pub_participant
        .create_publisher()
        .unwrap()
        .create_writer(&pub_topic, QoS::reliable())
        .unwrap();
    assert_eq!(writer.fragment_size(), 968);

    let sample = Payload::new(0, 8000);
    writer.write(&sample).unwrap();

    let status = writer.protocol_status();
    assert_eq!(status.pushed_fragment_count, 9);
    assert_eq!(status.pushed_fragment_bytes, 8012);
    assert_eq!(status.pushed_sample_count, 1);
    assert_eq!(status.pulled_fragment_count, 0);

    let received = reader
        .take_timeout(Duration::from_secs(3))
        .unwrap()
        .expect("reassembled sample");
    assert_eq!(received, sample);

    let reader_status = reader.protocol_status();
    assert_eq!(reader_status.reassembled_sample_count, 1);
    assert_eq!(reader_status.received_fragment_count, 9);
    assert_eq!(reader_status.received_fragment_bytes, 8012);
}

#[test]
fn test_counters_accumulate_across_writes() {
    let sink = sink();
    let participant = loopback_participant("pub", &[sink.local_addr().unwrap()]);
    participant
        .register_type::<Payload>(Payload::TYPE_NAME)
        .unwrap();
    let topic = participant
        .create_topic::<Payload>(TOPIC, Payload::TYPE_NAME)
        .unwrap();
    let writer = participant
        .create_publisher()
        .unwrap()
        .create_writer(&topic, QoS::best_effort())
        .unwrap();

    for count in 0..3 {
        writer.write(&Payload::new(count, 8000)).unwrap();
    }
    let status = writer.protocol_status();
    assert_eq!(status.pushed_fragment_count, 27);
    assert_eq!(status.pushed_fragment_bytes, 3 * 8012);
    assert_eq!(status.pushed_sample_count, 3);
}

#[test]
fn test_small_sample_is_not_fragmented() {
    let sub_participant = loopback_participant("sub", &[]);
    sub_participant
        .register_type::<Payload>(Payload::TYPE_NAME)
        .unwrap();
    let topic = sub_participant
        .create_topic::<Payload>(TOPIC, Payload::TYPE_NAME)
        .unwrap();
    let reader = sub_participant
        .create_subscriber()
        .unwrap()
        .create_reader(&topic, QoS::best_effort())
        .unwrap();

    let pub_participant = loopback_participant("pub", &[reader.local_addr().unwrap()]);
    pub_participant
        .register_type::<Payload>(Payload::TYPE_NAME)
        .unwrap();
    let topic = pub_participant
        .create_topic::<Payload>(TOPIC, Payload::TYPE_NAME)
        .unwrap();
    let writer = pub_participant
        .create_publisher()
        .unwrap()
        .create_writer(&topic, QoS::best_effort())
        .unwrap();

    let sample = Payload::new(7, 100);
    writer.write(&sample).unwrap();

    let status = writer.protocol_status();
    assert_eq!(status.pushed_fragment_count, 0);
    assert_eq!(status.pushed_fragment_bytes, 0);
    assert_eq!(status.pushed_sample_count, 1);
    assert_eq!(status.pushed_sample_bytes, 112);

    let received = reader.take_timeout(Duration::from_secs(3)).unwrap();
    assert_eq!(received, Some(sample));
    assert_eq!(reader.protocol_status().received_fragment_count, 0);
}

#[test]
fn test_reader_ignores_other_topics() {
    let sub_participant = loopback_participant("sub", &[]);
    sub_participant
        .register_type::<Payload>(Payload::TYPE_NAME)
        .unwrap();
    let topic = sub_participant
        .create_topic::<Payload>("other topic", Payload::TYPE_NAME)
        .unwrap();
    let reader = sub_participant
        .create_subscriber()
        .unwrap()
        .create_reader(&topic, QoS::best_effort())
        .unwrap();

    let pub_participant = loopback_participant("pub", &[reader.local_addr().unwrap()]);
    pub_participant
        .register_type::<Payload>(Payload::TYPE_NAME)
        .unwrap();
    let topic = pub_participant
        .create_topic::<Payload>(TOPIC, Payload::TYPE_NAME)
        .unwrap();
    let writer = pub_participant
        .create_publisher()
        .unwrap()
        .create_writer(&topic, QoS::best_effort())
        .unwrap();

    writer.write(&Payload::new(1, 8000)).unwrap();
    assert_eq!(reader.take_timeout(Duration::from_millis(300)).unwrap(), None);
    assert_eq!(reader.protocol_status().received_fragment_count, 0);
}

#[test]
fn test_delete_contained_entities_disables_endpoints() {
    let sink = sink();
    let participant = loopback_participant("pub", &[sink.local_addr().unwrap()]);
    participant
        .register_type::<Payload>(Payload::TYPE_NAME)
        .unwrap();
    let topic = participant
        .create_topic::<Payload>(TOPIC, Payload::TYPE_NAME)
        .unwrap();
    let writer = participant
        .create_publisher()
        .unwrap()
        .create_writer(&topic, QoS::reliable())
        .unwrap();
    let reader = participant
        .create_subscriber()
        .unwrap()
        .create_reader(&topic, QoS::reliable())
        .unwrap();

    writer.write(&Payload::new(0, 10)).unwrap();
    participant.delete_contained_entities();

    assert!(writer.is_deleted());
    assert!(matches!(
        writer.write(&Payload::new(1, 10)),
        Err(Error::InvalidState(_))
    ));
    assert!(matches!(reader.take(), Err(Error::InvalidState(_))));
    // the topic went with them
    assert!(matches!(
        participant
            .create_publisher()
            .unwrap()
            .create_writer(&topic, QoS::reliable()),
        Err(Error::InvalidState(_))
    ));
    // counters stay readable
    assert_eq!(writer.protocol_status().pushed_sample_count, 1);
}

#[test]
fn test_larger_message_size_means_fewer_fragments() {
    let sink = sink();
    let participant = fragdds::Participant::builder("pub")
        .runtime_config(fragdds::RuntimeConfig {
            multicast: false,
            ..fragdds::RuntimeConfig::default()
        })
        .with_transport(fragdds::TransportMode::UdpUnicast(
            "127.0.0.1:0".parse().unwrap(),
        ))
        .peer(sink.local_addr().unwrap())
        .message_size_max(4096)
        .build()
        .unwrap();
    participant
        .register_type::<Payload>(Payload::TYPE_NAME)
        .unwrap();
    let topic = participant
        .create_topic::<Payload>(TOPIC, Payload::TYPE_NAME)
        .unwrap();
    let writer = participant
        .create_publisher()
        .unwrap()
        .create_writer(&topic, QoS::best_effort())
        .unwrap();

    assert_eq!(writer.fragment_size(), 4040);
    writer.write(&Payload::new(0, 8000)).unwrap();
    let status = writer.protocol_status();
    assert_eq!(status.pushed_fragment_count, 2);
    assert_eq!(status.pushed_fragment_bytes, 8012);
}
