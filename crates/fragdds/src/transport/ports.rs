// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! RTPS v2.5 port mapping (OMG DDS-RTPS Sec.9.6.1.1), user multicast only.

use crate::config::{DOMAIN_ID_GAIN, MAX_DOMAIN_ID, PORT_BASE, USER_MULTICAST_OFFSET};
use crate::dds::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortMapping {
    /// `PORT_BASE + DOMAIN_ID_GAIN x domain + d2`
    pub user_multicast: u16,
}

impl PortMapping {
    pub fn calculate(domain_id: u32) -> Result<Self, Error> {
        if domain_id > MAX_DOMAIN_ID {
            return Err(Error::InvalidDomainId(domain_id));
        }
        let domain = u16::try_from(domain_id).map_err(|_| Error::InvalidDomainId(domain_id))?;
        Ok(Self {
            user_multicast: PORT_BASE + DOMAIN_ID_GAIN * domain + USER_MULTICAST_OFFSET,
        })
    }
}
