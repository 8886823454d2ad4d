// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! UDP transport and RTPS port mapping.

mod ports;
mod udp;

pub use ports::PortMapping;
pub use udp::{UdpTransport, UdpTransportConfig};
