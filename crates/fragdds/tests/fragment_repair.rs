// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! NACK_FRAG fragment repair over loopback.
//!
//! A plain UDP socket plays the remote side so fragments can be withheld or
//! NACK_FRAGs injected:
//! - writer re-sends requested fragments and counts pulled/NACK statistics
//! - reliable reader requests the fragments it lacks after HEARTBEAT_FRAG
//! - best-effort reader never asks
//! - shuffled, duplicated delivery still reassembles exactly once

mod common;

use common::{loopback_participant, sink, wait_until, Payload};
use fragdds::protocol::{
    build_data_frag_packets, build_heartbeat_frag_packet, build_nack_frag_packet, parse_packet,
    EndpointContext, Guid, GuidPrefix, Submessage,
};
use fragdds::{DataReader, FragmentBuffer, InsertOutcome, QoS, DDS};
use std::net::UdpSocket;
use std::time::Duration;

const TOPIC: &str = "Example fragment";
const FRAGMENT_SIZE: usize = 968;

fn encode(sample: &Payload) -> Vec<u8> {
    let mut buf = vec![0u8; sample.encoded_size_hint()];
    let len = sample.encode_cdr2(&mut buf).unwrap();
    buf.truncate(len);
    buf
}

fn reader_with(qos: QoS) -> (DataReader<Payload>, [u8; 2], std::sync::Arc<fragdds::Participant>) {
    let participant = loopback_participant("sub", &[]);
    participant
        .register_type::<Payload>(Payload::TYPE_NAME)
        .unwrap();
    let topic = participant
        .create_topic::<Payload>(TOPIC, Payload::TYPE_NAME)
        .unwrap();
    let reader = participant
        .create_subscriber()
        .unwrap()
        .create_reader(&topic, qos)
        .unwrap();
    (reader, topic.key(), participant)
}

fn fake_writer_ctx(topic_key: [u8; 2]) -> EndpointContext {
    EndpointContext {
        guid_prefix: [0x05; 12],
        reader_entity_id: [0; 4],
        writer_entity_id: [topic_key[0], topic_key[1], 0x01, 0x03],
    }
}

/// Wait for the next NACK_FRAG on `sock`; returns its INFO_DST prefix and missing set.
fn recv_nack_frag(sock: &UdpSocket) -> Option<(Option<GuidPrefix>, Vec<u32>)> {
    let mut buf = [0u8; 2048];
    while let Ok((n, _)) = sock.recv_from(&mut buf) {
        let Some(parsed) = parse_packet(&buf[..n]) else {
            continue;
        };
        let mut dest = None;
        for submsg in parsed.submessages {
            match submsg {
                Submessage::InfoDst { guid_prefix } => dest = Some(guid_prefix),
                Submessage::NackFrag { missing, .. } => return Some((dest, missing)),
                _ => {}
            }
        }
    }
    None
}

#[test]
fn test_writer_answers_nack_frag() {
    let remote = sink();
    let participant = loopback_participant("pub", &[remote.local_addr().unwrap()]);
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

    writer.write(&Payload::new(0, 8000)).unwrap();

    let guid = writer.guid();
    let nack = build_nack_frag_packet(
        [0x09; 12],
        guid.prefix,
        [0, 0, 0x01, 0x04],
        guid.entity_id,
        1,
        &[2, 5],
        1,
    );
    remote.send_to(&nack, writer.local_addr().unwrap()).unwrap();

    assert!(wait_until(Duration::from_secs(3), || {
        writer.protocol_status().pulled_fragment_count == 2
    }));
    let status = writer.protocol_status();
    assert_eq!(status.pushed_fragment_count, 9);
    assert_eq!(status.pulled_fragment_bytes, 2 * FRAGMENT_SIZE as u64);
    assert_eq!(status.received_nack_fragment_count, 1);
    assert_eq!(status.received_nack_fragment_bytes, 36);

    // the original 9 fragments come first, then the repairs
    let writer_addr = writer.local_addr().unwrap();
    let mut buf = [0u8; 2048];
    let mut fragments = Vec::new();
    while fragments.len() < 11 {
        let (n, from) = remote.recv_from(&mut buf).expect("DATA_FRAG");
        if from != writer_addr {
            continue;
        }
        let Some(parsed) = parse_packet(&buf[..n]) else {
            continue;
        };
        for submsg in parsed.submessages {
            if let Submessage::DataFrag {
                fragment_starting_num,
                ..
            } = submsg
            {
                fragments.push(fragment_starting_num);
            }
        }
    }
    assert_eq!(fragments[..9], (1..=9).collect::<Vec<u32>>()[..]);
    let mut repaired = fragments[9..].to_vec();
    repaired.sort_unstable();
    assert_eq!(repaired, vec![2, 5]);
}

#[test]
fn test_nack_frag_for_unknown_sequence_is_counted_only() {
    let remote = sink();
    let participant = loopback_participant("pub", &[remote.local_addr().unwrap()]);
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

    let guid = writer.guid();
    let nack = build_nack_frag_packet([0x09; 12], guid.prefix, [0; 4], guid.entity_id, 42, &[1], 1);
    remote.send_to(&nack, writer.local_addr().unwrap()).unwrap();

    assert!(wait_until(Duration::from_secs(3), || {
        writer.protocol_status().received_nack_fragment_count == 1
    }));
    assert_eq!(writer.protocol_status().pulled_fragment_count, 0);
}

#[test]
fn test_reliable_reader_requests_missing_fragments() {
    let (reader, key, _participant) = reader_with(QoS::reliable());
    let reader_addr = reader.local_addr().unwrap();
    let remote = sink();
    let ctx = fake_writer_ctx(key);

    let sample = Payload::new(3, 8000);
    let frags = build_data_frag_packets(&ctx, 1, &encode(&sample), FRAGMENT_SIZE).unwrap();
    assert_eq!(frags.len(), 9);

    for frag in frags.iter().filter(|f| f.fragment_num != 2 && f.fragment_num != 5) {
        remote.send_to(&frag.packet, reader_addr).unwrap();
    }
    let heartbeat = build_heartbeat_frag_packet(ctx.guid_prefix, [0; 4], ctx.writer_entity_id, 1, 9, 1);
    remote.send_to(&heartbeat, reader_addr).unwrap();

    let (dest, missing) = recv_nack_frag(&remote).expect("NACK_FRAG from reader");
    assert_eq!(missing, vec![2, 5]);
    assert_eq!(dest, Some(ctx.guid_prefix));

    for frag in frags.iter().filter(|f| missing.contains(&f.fragment_num)) {
        remote.send_to(&frag.packet, reader_addr).unwrap();
    }

    let received = reader
        .take_timeout(Duration::from_secs(3))
        .unwrap()
        .expect("repaired sample");
    assert_eq!(received, sample);

    let status = reader.protocol_status();
    assert_eq!(status.sent_nack_fragment_count, 1);
    assert_eq!(status.sent_nack_fragment_bytes, 36);
    assert_eq!(status.reassembled_sample_count, 1);
    assert_eq!(status.received_fragment_count, 9);
}

#[test]
fn test_best_effort_reader_does_not_nack() {
    let (reader, key, _participant) = reader_with(QoS::best_effort());
    let reader_addr = reader.local_addr().unwrap();
    let remote = sink();
    remote
        .set_read_timeout(Some(Duration::from_millis(300)))
        .unwrap();
    let ctx = fake_writer_ctx(key);

    let frags =
        build_data_frag_packets(&ctx, 1, &encode(&Payload::new(0, 8000)), FRAGMENT_SIZE).unwrap();
    for frag in frags.iter().skip(1) {
        remote.send_to(&frag.packet, reader_addr).unwrap();
    }
    let heartbeat = build_heartbeat_frag_packet(ctx.guid_prefix, [0; 4], ctx.writer_entity_id, 1, 9, 1);
    remote.send_to(&heartbeat, reader_addr).unwrap();

    assert!(recv_nack_frag(&remote).is_none());
    assert_eq!(reader.take().unwrap(), None);
    assert!(wait_until(Duration::from_secs(2), || {
        reader.protocol_status().received_fragment_count == 8
    }));
    assert_eq!(reader.protocol_status().sent_nack_fragment_count, 0);
}

#[test]
fn test_shuffled_duplicated_fragments_reassemble_once() {
    let mut rng = fastrand::Rng::with_seed(0x5EED);
    let payload = encode(&Payload::new(9, 8000));
    let writer = Guid::new([0x07; 12], [0x10, 0x20, 0x01, 0x03]);
    let total = payload.len().div_ceil(FRAGMENT_SIZE) as u32;

    let mut order: Vec<u32> = (1..=total).collect();
    // every fragment twice
    order.extend(1..=total);
    rng.shuffle(&mut order);

    let mut buffer = FragmentBuffer::default();
    let mut completed = Vec::new();
    for frag_num in order {
        let start = (frag_num as usize - 1) * FRAGMENT_SIZE;
        let end = (start + FRAGMENT_SIZE).min(payload.len());
        match buffer.insert_fragment(writer, 1, frag_num, total, payload.len(), &payload[start..end]) {
            InsertOutcome::Complete(bytes) => completed.push(bytes),
            InsertOutcome::Rejected => panic!("fragment {} rejected", frag_num),
            InsertOutcome::Incomplete { .. } | InsertOutcome::Duplicate => {}
        }
    }

    assert_eq!(completed, vec![payload]);
    assert_eq!(buffer.pending_count(), 0);
    assert_eq!(buffer.missing_fragments(&writer, 1, total), None);
}
