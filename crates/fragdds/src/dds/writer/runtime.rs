// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::history::HistoryCache;
use super::nack::{NackListener, WriterNackFragHandler};
use super::status::{DataWriterProtocolStatus, WriterProtocolCounters};
use crate::config::HEARTBEAT_FRAG_SPACING;
use crate::dds::{Error, Participant, QoS, Result, Topic, DDS};
use crate::protocol::constants::{ENTITYID_UNKNOWN, ENTITY_KIND_USER_WRITER};
use crate::protocol::{
    build_data_frag_packets, build_data_packet, build_heartbeat_frag_packet, fits_unfragmented,
    fragment_size_for, EndpointContext, Guid,
};
use crate::transport::UdpTransport;
use std::marker::PhantomData;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

/// Typed writer for one topic.
///
/// Dropping the writer stops its NACK thread.
pub struct DataWriter<T: DDS> {
    topic: String,
    qos: QoS,
    guid: Guid,
    ctx: EndpointContext,
    message_size_max: usize,
    fragment_size: usize,
    transport: Arc<UdpTransport>,
    cache: Option<Arc<HistoryCache>>,
    counters: Arc<WriterProtocolCounters>,
    next_sequence: AtomicU64,
    heartbeat_frag_count: AtomicU32,
    deleted: Arc<AtomicBool>,
    _nack_listener: Option<NackListener>,
    _phantom: PhantomData<fn(&T)>,
}

impl<T: DDS> DataWriter<T> {
    pub(crate) fn new(participant: &Participant, topic: &Topic<T>, qos: QoS) -> Result<Self> {
        qos.validate()?;
        participant.ensure_topic(topic)?;

        let message_size_max = participant.message_size_max();
        let fragment_size = fragment_size_for(message_size_max).ok_or_else(|| {
            Error::InvalidQos(format!("message_size_max {} too small", message_size_max))
        })?;

        let transport_cfg = participant.writer_transport_config();
        let transport = UdpTransport::for_writer(&transport_cfg).map_err(|e| {
            Error::BindFailed(format!("writer socket on {}: {}", transport_cfg.bind, e))
        })?;
        if transport.destinations().is_empty() {
            log::warn!(
                "[writer] topic={} has no destinations (multicast disabled and no peers)",
                topic.name()
            );
        }
        let transport = Arc::new(transport);

        let entity_id = participant.next_entity_id(topic.key(), ENTITY_KIND_USER_WRITER)?;
        let guid = Guid::new(participant.guid_prefix(), entity_id);
        let ctx = EndpointContext {
            guid_prefix: participant.guid_prefix(),
            reader_entity_id: ENTITYID_UNKNOWN,
            writer_entity_id: entity_id,
        };

        let counters = Arc::new(WriterProtocolCounters::default());
        let deleted = participant.track_entity();

        let (cache, nack_listener) = if qos.is_reliable() {
            let cache = Arc::new(HistoryCache::new(qos.history.depth()));
            let handler = WriterNackFragHandler::new(
                topic.name().to_string(),
                ctx,
                fragment_size,
                Arc::clone(&cache),
                Arc::clone(&transport),
                Arc::clone(&counters),
            );
            let listener =
                NackListener::spawn(handler, Arc::clone(&transport), Arc::clone(&deleted))?;
            (Some(cache), Some(listener))
        } else {
            (None, None)
        };

        log::info!(
            "[writer] created guid={} topic={} type={} reliable={} fragment_size={}",
            guid,
            topic.name(),
            topic.type_name(),
            qos.is_reliable(),
            fragment_size
        );

        Ok(Self {
            topic: topic.name().to_string(),
            qos,
            guid,
            ctx,
            message_size_max,
            fragment_size,
            transport,
            cache,
            counters,
            next_sequence: AtomicU64::new(1),
            heartbeat_frag_count: AtomicU32::new(0),
            deleted,
            _nack_listener: nack_listener,
            _phantom: PhantomData,
        })
    }

    /// Serialize and publish one sample.
    ///
    /// Samples larger than a single DATA submessage go out as DATA_FRAG
    /// packets; with reliable QoS they are kept for repair and announced with
    /// HEARTBEAT_FRAG.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidState` after `delete_contained_entities`
    /// - `Error::BufferTooSmall` if the type's size hint is wrong
    /// - `Error::IoError` if an unfragmented sample could not be sent
    pub fn write(&self, sample: &T) -> Result<()> {
        if self.deleted.load(Ordering::Acquire) {
            return Err(Error::InvalidState(format!(
                "writer on topic '{}' was deleted",
                self.topic
            )));
        }

        let mut buf = vec![0u8; sample.encoded_size_hint()];
        let len = sample.encode_cdr2(&mut buf)?;
        buf.truncate(len);
        let payload = Arc::new(buf);

        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        // cache before sending so an early NACK_FRAG finds the sample
        if let Some(cache) = &self.cache {
            cache.insert(sequence, Arc::clone(&payload));
        }

        if fits_unfragmented(payload.len(), self.message_size_max) {
            let packet = build_data_packet(&self.ctx, sequence, &payload)?;
            self.transport.send(&packet)?;
            log::trace!(
                "[writer] topic={} seq={} sent {} bytes unfragmented",
                self.topic,
                sequence,
                payload.len()
            );
        } else {
            self.write_fragmented(sequence, &payload)?;
        }

        self.counters.record_sample(payload.len());
        Ok(())
    }

    fn write_fragmented(&self, sequence: u64, payload: &[u8]) -> Result<()> {
        let fragments = build_data_frag_packets(&self.ctx, sequence, payload, self.fragment_size)?;
        let total = fragments.len() as u32;

        for frag in &fragments {
            match self.transport.send(&frag.packet) {
                Ok(()) => self.counters.record_pushed_fragment(frag.fragment_len),
                Err(e) => log::debug!(
                    "[writer] topic={} seq={} fragment {}/{} send failed: {}",
                    self.topic,
                    sequence,
                    frag.fragment_num,
                    total,
                    e
                ),
            }
        }
        log::debug!(
            "[writer] topic={} seq={} sent {} bytes in {} fragments",
            self.topic,
            sequence,
            payload.len(),
            total
        );

        if self.qos.is_reliable() {
            self.announce_fragments(sequence, total);
        }
        Ok(())
    }

    fn announce_fragments(&self, sequence: u64, last_fragment_num: u32) {
        let repeats = self.qos.heartbeat_frag_repeats;
        for i in 0..repeats {
            let count = self.heartbeat_frag_count.fetch_add(1, Ordering::Relaxed) + 1;
            let packet = build_heartbeat_frag_packet(
                self.ctx.guid_prefix,
                ENTITYID_UNKNOWN,
                self.ctx.writer_entity_id,
                sequence,
                last_fragment_num,
                count,
            );
            if let Err(e) = self.transport.send(&packet) {
                log::debug!("[writer] HEARTBEAT_FRAG send failed: {}", e);
            }
            if i + 1 < repeats {
                std::thread::sleep(HEARTBEAT_FRAG_SPACING);
            }
        }
    }

    /// Current fragment-level protocol counters.
    #[must_use]
    pub fn protocol_status(&self) -> DataWriterProtocolStatus {
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

    /// Payload bytes carried by each DATA_FRAG.
    #[must_use]
    pub fn fragment_size(&self) -> usize {
        self.fragment_size
    }

    /// Address of the writer socket; NACK_FRAGs sent here are answered.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.transport.local_addr()?)
    }

    /// True once the owning participant deleted this writer.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::Acquire)
    }
}

impl<T: DDS> Drop for DataWriter<T> {
    fn drop(&mut self) {
        log::debug!("[writer] dropping guid={} topic={}", self.guid, self.topic);
    }
}
