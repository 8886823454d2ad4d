// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! NACK_FRAG processing for DataWriter.
//!
//! A background thread reads the writer socket; NACK_FRAGs addressed to this
//! writer trigger re-sends of the missing fragments from the history cache,
//! unicast back to the requesting reader.

use super::history::HistoryCache;
use super::status::WriterProtocolCounters;
use crate::config::RECV_BUFFER_SIZE;
use crate::dds::Result;
use crate::protocol::{build_data_frag_packet, parse_packet, EndpointContext, Submessage};
use crate::transport::UdpTransport;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub(super) struct WriterNackFragHandler {
    topic: String,
    ctx: EndpointContext,
    fragment_size: usize,
    cache: Arc<HistoryCache>,
    transport: Arc<UdpTransport>,
    counters: Arc<WriterProtocolCounters>,
}

impl WriterNackFragHandler {
    pub fn new(
        topic: String,
        ctx: EndpointContext,
        fragment_size: usize,
        cache: Arc<HistoryCache>,
        transport: Arc<UdpTransport>,
        counters: Arc<WriterProtocolCounters>,
    ) -> Self {
        Self {
            topic,
            ctx,
            fragment_size,
            cache,
            transport,
            counters,
        }
    }

    /// Handle one datagram received on the writer socket.
    pub fn on_packet(&self, buf: &[u8], src: SocketAddr) {
        let Some(parsed) = parse_packet(buf) else {
            log::debug!("[writer] ignoring non-RTPS datagram from {} ({} bytes)", src, buf.len());
            return;
        };

        let mut dest_prefix = None;
        for submsg in parsed.submessages {
            match submsg {
                Submessage::InfoDst { guid_prefix } => dest_prefix = Some(guid_prefix),
                Submessage::NackFrag {
                    writer_id,
                    writer_sn,
                    missing,
                    wire_len,
                    ..
                } => {
                    if dest_prefix.is_some_and(|prefix| prefix != self.ctx.guid_prefix) {
                        continue;
                    }
                    if writer_id != self.ctx.writer_entity_id {
                        log::debug!(
                            "[writer] NACK_FRAG ignored: entity_id mismatch (got {:02x?}, want {:02x?})",
                            writer_id,
                            self.ctx.writer_entity_id
                        );
                        continue;
                    }
                    self.on_nack_frag(writer_sn, &missing, wire_len, src);
                }
                _ => {}
            }
        }
    }

    fn on_nack_frag(&self, writer_sn: u64, missing: &[u32], wire_len: usize, src: SocketAddr) {
        self.counters.record_nack_frag(wire_len);
        log::debug!(
            "[writer] NACK_FRAG for topic={} seq={} missing_frags={:?} from {}",
            self.topic,
            writer_sn,
            missing,
            src
        );

        let Some(payload) = self.cache.get(writer_sn) else {
            log::debug!(
                "[writer] NACK_FRAG: seq {} not in cache (expired or never existed)",
                writer_sn
            );
            return;
        };

        for &fragment_num in missing {
            let frag = match build_data_frag_packet(
                &self.ctx,
                writer_sn,
                &payload,
                self.fragment_size,
                fragment_num,
            ) {
                Ok(frag) => frag,
                Err(e) => {
                    log::debug!(
                        "[writer] NACK_FRAG: cannot rebuild fragment {} of seq {}: {}",
                        fragment_num,
                        writer_sn,
                        e
                    );
                    continue;
                }
            };
            match self.transport.send_to(&frag.packet, src) {
                Ok(()) => self.counters.record_pulled_fragment(frag.fragment_len),
                Err(e) => log::debug!(
                    "[writer] re-send of fragment {} to {} failed: {}",
                    fragment_num,
                    src,
                    e
                ),
            }
        }
    }
}

/// Owns the NACK thread; stops and joins it on drop.
pub(super) struct NackListener {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl NackListener {
    pub fn spawn(
        handler: WriterNackFragHandler,
        transport: Arc<UdpTransport>,
        stop: Arc<AtomicBool>,
    ) -> Result<Self> {
        let thread_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name(format!("fragdds-nack-{}", handler.topic))
            .spawn(move || run(&handler, &transport, &thread_stop))?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }
}

impl Drop for NackListener {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("[writer] NACK thread panicked");
            }
        }
    }
}

fn run(handler: &WriterNackFragHandler, transport: &UdpTransport, stop: &AtomicBool) {
    let mut buf = vec![0u8; RECV_BUFFER_SIZE];
    while !stop.load(Ordering::Acquire) {
        match transport.recv_from(&mut buf) {
            Ok(Some((len, src))) => handler.on_packet(&buf[..len], src),
            Ok(None) => {}
            Err(e) => {
                log::debug!("[writer] recv on {} failed: {}", handler.topic, e);
                thread::sleep(crate::config::THREAD_POLL_INTERVAL);
            }
        }
    }
    log::debug!("[writer] NACK thread for {} stopped", handler.topic);
}
