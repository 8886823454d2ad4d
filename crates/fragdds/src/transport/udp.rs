// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! UDP transport for RTPS send/receive.
//!
//! One socket per endpoint. Writers send DATA/DATA_FRAG/HEARTBEAT_FRAG from
//! it and receive NACK_FRAG on it; readers receive on it and answer NACK_FRAG
//! to the datagram's source address.

use crate::config::{DEFAULT_MULTICAST_TTL, MULTICAST_GROUP, THREAD_POLL_INTERVAL};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};

/// How an endpoint's socket is bound and where it sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdpTransportConfig {
    /// Local bind address.
    pub bind: SocketAddr,
    /// Join `MULTICAST_GROUP` on the bound port (readers) or send to it (writers).
    pub multicast: Option<SocketAddrV4>,
    /// Static unicast destinations.
    pub peers: Vec<SocketAddr>,
}

impl UdpTransportConfig {
    /// Writer socket: ephemeral port, sends to the group (if any) plus peers.
    pub fn writer(bind_ip: Ipv4Addr, multicast_port: Option<u16>, peers: Vec<SocketAddr>) -> Self {
        Self {
            bind: SocketAddr::V4(SocketAddrV4::new(bind_ip, 0)),
            multicast: multicast_port.map(|port| SocketAddrV4::new(MULTICAST_GROUP, port)),
            peers,
        }
    }

    /// Reader socket bound to the domain's multicast port.
    pub fn multicast_reader(port: u16) -> Self {
        Self {
            bind: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port)),
            multicast: Some(SocketAddrV4::new(MULTICAST_GROUP, port)),
            peers: Vec::new(),
        }
    }

    /// Reader socket bound to an explicit unicast locator.
    pub fn unicast_reader(bind: SocketAddr) -> Self {
        Self {
            bind,
            multicast: None,
            peers: Vec::new(),
        }
    }
}

#[allow(clippy::module_name_repetitions)]
pub struct UdpTransport {
    socket: UdpSocket,
    destinations: Vec<SocketAddr>,
}

impl UdpTransport {
    /// Bind a writer socket.
    pub fn for_writer(cfg: &UdpTransportConfig) -> io::Result<Self> {
        let socket = new_socket(cfg.bind)?;
        if cfg.multicast.is_some() {
            socket.set_multicast_ttl_v4(DEFAULT_MULTICAST_TTL)?;
            socket.set_multicast_loop_v4(true)?;
        }
        let socket: UdpSocket = socket.into();
        socket.set_read_timeout(Some(THREAD_POLL_INTERVAL))?;

        let mut destinations = Vec::with_capacity(cfg.peers.len() + 1);
        if let Some(group) = cfg.multicast {
            destinations.push(SocketAddr::V4(group));
        }
        destinations.extend(cfg.peers.iter().copied());

        log::debug!(
            "[UDP] writer socket bound to {:?}, destinations={:?}",
            socket.local_addr(),
            destinations
        );
        Ok(Self {
            socket,
            destinations,
        })
    }

    /// Bind a reader socket, joining the multicast group when configured.
    pub fn for_reader(cfg: &UdpTransportConfig) -> io::Result<Self> {
        let socket = new_socket(cfg.bind)?;
        let socket: UdpSocket = socket.into();
        if let Some(group) = cfg.multicast {
            socket.join_multicast_v4(group.ip(), &Ipv4Addr::UNSPECIFIED)?;
            log::debug!("[UDP] joined multicast {} on port {}", group.ip(), group.port());
        }
        socket.set_read_timeout(Some(THREAD_POLL_INTERVAL))?;
        log::debug!("[UDP] reader socket bound to {:?}", socket.local_addr());
        Ok(Self {
            socket,
            destinations: Vec::new(),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn destinations(&self) -> &[SocketAddr] {
        &self.destinations
    }

    /// Send to every configured destination.
    ///
    /// Succeeds if at least one destination accepted the datagram.
    pub fn send(&self, packet: &[u8]) -> io::Result<()> {
        if self.destinations.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "no destinations configured",
            ));
        }
        let mut last_err = None;
        let mut delivered = false;
        for dest in &self.destinations {
            match self.socket.send_to(packet, dest) {
                Ok(_) => delivered = true,
                Err(e) => {
                    log::debug!("[UDP] send_to {} failed: {}", dest, e);
                    last_err = Some(e);
                }
            }
        }
        match (delivered, last_err) {
            (false, Some(e)) => Err(e),
            _ => Ok(()),
        }
    }

    pub fn send_to(&self, packet: &[u8], dest: SocketAddr) -> io::Result<()> {
        self.socket.send_to(packet, dest).map(|_| ())
    }

    /// Receive one datagram; `Ok(None)` when the poll interval elapses.
    pub fn recv_from(&self, buf: &mut [u8]) -> io::Result<Option<(usize, SocketAddr)>> {
        match self.socket.recv_from(buf) {
            Ok(received) => Ok(Some(received)),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

fn new_socket(bind: SocketAddr) -> io::Result<Socket> {
    let domain = if bind.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&bind.into())?;
    Ok(socket)
}
