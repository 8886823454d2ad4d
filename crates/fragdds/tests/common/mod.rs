// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared fixtures for integration tests.

#![allow(dead_code)]

use fragdds::{Error, Participant, Result, RuntimeConfig, TransportMode, DDS};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Same wire layout as the fragmentation sample: CDR header, i32, sequence<octet>.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub x: i32,
    pub data: Vec<u8>,
}

impl Payload {
    pub fn new(x: i32, size: usize) -> Self {
        Self {
            x,
            data: (0..size).map(|i| (i % 251) as u8).collect(),
        }
    }
}

impl DDS for Payload {
    const TYPE_NAME: &'static str = "test::Payload";

    fn encoded_size_hint(&self) -> usize {
        12 + self.data.len()
    }

    fn encode_cdr2(&self, buf: &mut [u8]) -> Result<usize> {
        let len = self.encoded_size_hint();
        if buf.len() < len {
            return Err(Error::BufferTooSmall);
        }
        buf[0..4].copy_from_slice(&[0x00, 0x01, 0x00, 0x00]);
        buf[4..8].copy_from_slice(&self.x.to_le_bytes());
        buf[8..12].copy_from_slice(&(self.data.len() as u32).to_le_bytes());
        buf[12..len].copy_from_slice(&self.data);
        Ok(len)
    }

    fn decode_cdr2(buf: &[u8]) -> Result<Self> {
        if buf.len() < 12 {
            return Err(Error::SerializationError);
        }
        let x = i32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
        let len = u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]) as usize;
        let data = buf
            .get(12..12 + len)
            .ok_or(Error::SerializationError)?
            .to_vec();
        Ok(Self { x, data })
    }
}

/// Participant on 127.0.0.1 without multicast, sending to `peers`.
pub fn loopback_participant(name: &str, peers: &[SocketAddr]) -> Arc<Participant> {
    Participant::builder(name)
        .runtime_config(RuntimeConfig {
            multicast: false,
            ..RuntimeConfig::default()
        })
        .with_transport(TransportMode::UdpUnicast(SocketAddrV4::new(
            Ipv4Addr::LOCALHOST,
            0,
        )))
        .peers(peers.iter().copied())
        .build()
        .expect("participant")
}

/// Bound socket standing in for a remote endpoint.
pub fn sink() -> UdpSocket {
    let sock = UdpSocket::bind("127.0.0.1:0").expect("bind sink");
    sock.set_read_timeout(Some(Duration::from_secs(2)))
        .expect("read timeout");
    sock
}

/// Poll `cond` until it holds or `timeout` elapses.
pub fn wait_until<F: FnMut() -> bool>(timeout: Duration, mut cond: F) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}
