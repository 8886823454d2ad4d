// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::fragment_buffer::{FragmentBuffer, InsertOutcome};
use super::status::{DataReaderProtocolStatus, ReaderProtocolCounters};
use crate::config::{RECV_BUFFER_SIZE, THREAD_POLL_INTERVAL};
use crate::dds::{Error, Participant, QoS, Result, Topic, DDS};
use crate::protocol::constants::{
    ENTITY_KIND_USER_READER, ENTITY_KIND_USER_WRITER, RTPS_GUID_PREFIX_SIZE, RTPS_HEADER_SIZE,
    RTPS_SUBMSG_HEADER_SIZE,
};
use crate::protocol::{
    build_nack_frag_packet, fragment_count, parse_packet, EntityId, Guid, GuidPrefix, Submessage,
};
use crate::transport::UdpTransport;
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// INFO_DST submessage preceding every NACK_FRAG we send.
const INFO_DST_LEN: usize = RTPS_SUBMSG_HEADER_SIZE + RTPS_GUID_PREFIX_SIZE;

/// Typed reader for one topic.
///
/// Samples are queued keep-last: once `history.depth()` samples wait
/// unread, the oldest is dropped.
pub struct DataReader<T: DDS> {
    topic: String,
    qos: QoS,
    guid: Guid,
    rx: Receiver<T>,
    transport: Arc<UdpTransport>,
    counters: Arc<ReaderProtocolCounters>,
    deleted: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl<T: DDS> DataReader<T> {
    pub(crate) fn new(participant: &Participant, topic: &Topic<T>, qos: QoS) -> Result<Self> {
        qos.validate()?;
        participant.ensure_topic(topic)?;

        let transport_cfg = participant.reader_transport_config();
        let transport = UdpTransport::for_reader(&transport_cfg).map_err(|e| {
            Error::BindFailed(format!("reader socket on {}: {}", transport_cfg.bind, e))
        })?;
        let transport = Arc::new(transport);

        let entity_id = participant.next_entity_id(topic.key(), ENTITY_KIND_USER_READER)?;
        let guid = Guid::new(participant.guid_prefix(), entity_id);
        let counters = Arc::new(ReaderProtocolCounters::default());
        let deleted = participant.track_entity();
        let (tx, rx) = channel::bounded(qos.history.depth().max(1));

        let runtime = ReaderRuntime::<T> {
            topic: topic.name().to_string(),
            topic_key: topic.key(),
            guid,
            reliable: qos.is_reliable(),
            transport: Arc::clone(&transport),
            buffer: FragmentBuffer::default(),
            tx,
            overflow: rx.clone(),
            counters: Arc::clone(&counters),
            nack_count: 0,
            stop: Arc::clone(&deleted),
        };
        let handle = thread::Builder::new()
            .name(format!("fragdds-reader-{}", topic.name()))
            .spawn(move || runtime.run())?;

        log::info!(
            "[reader] created guid={} topic={} type={} reliable={} bound={:?}",
            guid,
            topic.name(),
            topic.type_name(),
            qos.is_reliable(),
            transport.local_addr()
        );

        Ok(Self {
            topic: topic.name().to_string(),
            qos,
            guid,
            rx,
            transport,
            counters,
            deleted,
            handle: Some(handle),
        })
    }

    /// Take the oldest queued sample, if any.
    ///
    /// # Errors
    ///
    /// `Error::InvalidState` once the reader was deleted.
    pub fn take(&self) -> Result<Option<T>> {
        self.ensure_alive()?;
        match self.rx.try_recv() {
            Ok(sample) => Ok(Some(sample)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(self.stopped()),
        }
    }

    /// Wait up to `timeout` for a sample.
    pub fn take_timeout(&self, timeout: Duration) -> Result<Option<T>> {
        self.ensure_alive()?;
        match self.rx.recv_timeout(timeout) {
            Ok(sample) => Ok(Some(sample)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(self.stopped()),
        }
    }

    #[must_use]
    pub fn protocol_status(&self) -> DataReaderProtocolStatus {
        self.counters.snapshot()
    }

    #[must_use]
    pub fn topic_name(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn qos(&self) -> &QoS {
        &self.qos
    }

    #[must_use]
    pub fn guid(&self) -> Guid {
        self.guid
    }

    /// Address the reader socket is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.transport.local_addr()?)
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.deleted.load(Ordering::Acquire) {
            return Err(Error::InvalidState(format!(
                "reader on topic '{}' was deleted",
                self.topic
            )));
        }
        Ok(())
    }

    fn stopped(&self) -> Error {
        Error::InvalidState(format!("reader thread for '{}' stopped", self.topic))
    }
}

impl<T: DDS> Drop for DataReader<T> {
    fn drop(&mut self) {
        self.deleted.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("[reader] receive thread for {} panicked", self.topic);
            }
        }
    }
}

struct ReaderRuntime<T: DDS> {
    topic: String,
    topic_key: [u8; 2],
    guid: Guid,
    reliable: bool,
    transport: Arc<UdpTransport>,
    buffer: FragmentBuffer,
    tx: Sender<T>,
    /// Receiver clone used to drop the oldest sample when the queue is full.
    overflow: Receiver<T>,
    counters: Arc<ReaderProtocolCounters>,
    nack_count: u32,
    stop: Arc<AtomicBool>,
}

impl<T: DDS> ReaderRuntime<T> {
    fn run(mut self) {
        let mut buf = vec![0u8; RECV_BUFFER_SIZE];
        while !self.stop.load(Ordering::Acquire) {
            match self.transport.recv_from(&mut buf) {
                Ok(Some((len, src))) => self.on_packet(&buf[..len], src),
                Ok(None) => {}
                Err(e) => {
                    log::debug!("[reader] recv on {} failed: {}", self.topic, e);
                    thread::sleep(THREAD_POLL_INTERVAL);
                }
            }
            let evicted = self.buffer.evict_expired() + self.buffer.take_lru_evictions();
            self.counters.record_dropped(evicted);
        }
        log::debug!("[reader] receive thread for {} stopped", self.topic);
    }

    fn matches_topic(&self, writer_id: &EntityId) -> bool {
        writer_id[3] == ENTITY_KIND_USER_WRITER && writer_id[..2] == self.topic_key
    }

    fn on_packet(&mut self, buf: &[u8], src: SocketAddr) {
        let Some(parsed) = parse_packet(buf) else {
            log::trace!("[reader] ignoring non-RTPS datagram from {}", src);
            return;
        };
        let writer_prefix = parsed.guid_prefix;

        for submsg in parsed.submessages {
            match submsg {
                Submessage::Data {
                    writer_id, payload, ..
                } if self.matches_topic(&writer_id) => self.deliver(payload),
                Submessage::DataFrag {
                    writer_id,
                    writer_sn,
                    fragment_starting_num,
                    fragments_in_submessage,
                    fragment_size,
                    sample_size,
                    payload,
                    ..
                } if self.matches_topic(&writer_id) => {
                    let writer = Guid::new(writer_prefix, writer_id);
                    self.on_data_frag(
                        writer,
                        writer_sn,
                        fragment_starting_num,
                        fragments_in_submessage,
                        fragment_size as usize,
                        sample_size as usize,
                        payload,
                    );
                }
                Submessage::HeartbeatFrag {
                    writer_id,
                    writer_sn,
                    last_fragment_num,
                    ..
                } if self.reliable && self.matches_topic(&writer_id) => {
                    self.on_heartbeat_frag(writer_prefix, writer_id, writer_sn, last_fragment_num, src);
                }
                _ => {}
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn on_data_frag(
        &mut self,
        writer: Guid,
        writer_sn: u64,
        starting_num: u32,
        fragments_in_submessage: u16,
        fragment_size: usize,
        sample_size: usize,
        payload: &[u8],
    ) {
        if fragment_size == 0 || fragments_in_submessage == 0 {
            self.counters.record_dropped(1);
            return;
        }
        let total = fragment_count(sample_size, fragment_size);
        let Ok(total) = u32::try_from(total) else {
            self.counters.record_dropped(1);
            return;
        };

        for (i, chunk) in payload
            .chunks(fragment_size)
            .take(fragments_in_submessage as usize)
            .enumerate()
        {
            let frag_num = starting_num.saturating_add(i as u32);
            self.counters.record_fragment(chunk.len());
            match self
                .buffer
                .insert_fragment(writer, writer_sn, frag_num, total, sample_size, chunk)
            {
                InsertOutcome::Complete(sample) => {
                    self.counters.record_reassembled();
                    self.deliver(&sample);
                }
                InsertOutcome::Rejected => self.counters.record_dropped(1),
                InsertOutcome::Incomplete { .. } | InsertOutcome::Duplicate => {}
            }
        }
    }

    fn on_heartbeat_frag(
        &mut self,
        writer_prefix: GuidPrefix,
        writer_id: EntityId,
        writer_sn: u64,
        last_fragment_num: u32,
        src: SocketAddr,
    ) {
        let writer = Guid::new(writer_prefix, writer_id);
        let missing = match self
            .buffer
            .missing_fragments(&writer, writer_sn, last_fragment_num)
        {
            Some(missing) if !missing.is_empty() => missing,
            _ => return,
        };

        self.nack_count = self.nack_count.wrapping_add(1);
        let packet = build_nack_frag_packet(
            self.guid.prefix,
            writer_prefix,
            self.guid.entity_id,
            writer_id,
            writer_sn,
            &missing,
            self.nack_count,
        );
        match self.transport.send_to(&packet, src) {
            Ok(()) => {
                self.counters
                    .record_nack_frag(packet.len() - RTPS_HEADER_SIZE - INFO_DST_LEN);
                log::debug!(
                    "[reader] NACK_FRAG to {} seq={} missing={:?}",
                    src,
                    writer_sn,
                    missing
                );
            }
            Err(e) => log::debug!("[reader] NACK_FRAG to {} failed: {}", src, e),
        }
    }

    fn deliver(&self, payload: &[u8]) {
        let sample = match T::decode_cdr2(payload) {
            Ok(sample) => sample,
            Err(e) => {
                log::debug!(
                    "[reader] topic={} dropped undecodable sample ({} bytes): {}",
                    self.topic,
                    payload.len(),
                    e
                );
                return;
            }
        };
        self.counters.record_sample();

        let mut pending = sample;
        loop {
            match self.tx.try_send(pending) {
                Ok(()) => return,
                Err(TrySendError::Full(back)) => {
                    // keep-last: drop the oldest queued sample
                    let _ = self.overflow.try_recv();
                    pending = back;
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }
}
