// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Domain participant: entity factory, type registry and transport settings.

use crate::config::{RuntimeConfig, MAX_DOMAIN_ID, MAX_UDP_PAYLOAD};
use crate::dds::{Error, Publisher, Result, Subscriber, Topic, DDS};
use crate::protocol::constants::FRAGDDS_VENDOR_ID;
use crate::protocol::{fragment_size_for, EntityId, GuidPrefix};
use crate::transport::{PortMapping, UdpTransportConfig};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::any::TypeId;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Where endpoints bind and send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// Writers send to `239.255.0.1:<user port>` (plus static peers);
    /// readers bind the domain's user port and join the group.
    UdpMulticast,
    /// Static peers only. Readers bind this address (port 0 = ephemeral),
    /// writers bind its IP on an ephemeral port.
    UdpUnicast(SocketAddrV4),
}

/// Builder for [`Participant`].
///
/// Defaults come from [`RuntimeConfig::from_env`]; builder calls override them.
pub struct ParticipantBuilder {
    name: String,
    domain_id: u32,
    transport: Option<TransportMode>,
    message_size_max: Option<usize>,
    multicast: Option<bool>,
    peers: Vec<SocketAddr>,
    runtime: RuntimeConfig,
}

impl ParticipantBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            domain_id: 0,
            transport: None,
            message_size_max: None,
            multicast: None,
            peers: Vec::new(),
            runtime: RuntimeConfig::from_env(),
        }
    }

    #[must_use]
    pub fn domain_id(mut self, domain_id: u32) -> Self {
        self.domain_id = domain_id;
        self
    }

    #[must_use]
    pub fn with_transport(mut self, mode: TransportMode) -> Self {
        self.transport = Some(mode);
        self
    }

    /// Maximum RTPS message size; larger samples are fragmented.
    #[must_use]
    pub fn message_size_max(mut self, bytes: usize) -> Self {
        self.message_size_max = Some(bytes);
        self
    }

    /// Enable or disable the multicast transport.
    ///
    /// Ignored when [`with_transport`](Self::with_transport) picks a mode.
    #[must_use]
    pub fn multicast(mut self, enabled: bool) -> Self {
        self.multicast = Some(enabled);
        self
    }

    /// Add a static unicast locator that writers send to.
    #[must_use]
    pub fn peer(mut self, addr: SocketAddr) -> Self {
        self.peers.push(addr);
        self
    }

    #[must_use]
    pub fn peers<I: IntoIterator<Item = SocketAddr>>(mut self, addrs: I) -> Self {
        self.peers.extend(addrs);
        self
    }

    /// Replace the environment-derived defaults.
    #[must_use]
    pub fn runtime_config(mut self, runtime: RuntimeConfig) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn build(self) -> Result<Arc<Participant>> {
        if self.domain_id > MAX_DOMAIN_ID {
            return Err(Error::InvalidDomainId(self.domain_id));
        }
        let port_mapping = PortMapping::calculate(self.domain_id)?;

        let message_size_max = self.message_size_max.unwrap_or(self.runtime.message_size_max);
        if message_size_max > MAX_UDP_PAYLOAD || fragment_size_for(message_size_max).is_none() {
            return Err(Error::InvalidQos(format!(
                "message_size_max {} must be between 57 and {} bytes",
                message_size_max, MAX_UDP_PAYLOAD
            )));
        }

        let multicast = self.multicast.unwrap_or(self.runtime.multicast);
        let transport_mode = self.transport.unwrap_or(if multicast {
            TransportMode::UdpMulticast
        } else {
            TransportMode::UdpUnicast(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))
        });

        let peers = if self.peers.is_empty() {
            self.runtime.peers
        } else {
            self.peers
        };

        let participant = Participant {
            name: self.name,
            domain_id: self.domain_id,
            guid_prefix: generate_guid_prefix(),
            transport_mode,
            port_mapping,
            message_size_max,
            peers,
            types: DashMap::new(),
            topics: DashMap::new(),
            next_entity_key: AtomicU32::new(1),
            entities: Mutex::new(Vec::new()),
        };

        log::info!(
            "[participant] '{}' domain={} guid_prefix={:02x?} transport={:?} message_size_max={}",
            participant.name,
            participant.domain_id,
            participant.guid_prefix,
            participant.transport_mode,
            participant.message_size_max
        );
        Ok(Arc::new(participant))
    }
}

/// Entry point to a DDS domain and factory for every other entity.
pub struct Participant {
    name: String,
    domain_id: u32,
    guid_prefix: GuidPrefix,
    transport_mode: TransportMode,
    port_mapping: PortMapping,
    message_size_max: usize,
    peers: Vec<SocketAddr>,
    /// type name -> Rust type registered under it
    types: DashMap<String, TypeId>,
    /// topic name -> type name
    topics: DashMap<String, String>,
    next_entity_key: AtomicU32,
    /// Deletion flags of every writer/reader created through this participant.
    entities: Mutex<Vec<Arc<AtomicBool>>>,
}

impl Participant {
    #[must_use]
    pub fn builder(name: &str) -> ParticipantBuilder {
        ParticipantBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain_id(&self) -> u32 {
        self.domain_id
    }

    pub fn guid_prefix(&self) -> GuidPrefix {
        self.guid_prefix
    }

    pub fn message_size_max(&self) -> usize {
        self.message_size_max
    }

    pub fn transport_mode(&self) -> TransportMode {
        self.transport_mode
    }

    pub fn create_publisher(self: &Arc<Self>) -> Result<Publisher> {
        Ok(Publisher::new(Arc::clone(self)))
    }

    pub fn create_subscriber(self: &Arc<Self>) -> Result<Subscriber> {
        Ok(Subscriber::new(Arc::clone(self)))
    }

    /// Register `T` under `type_name`.
    ///
    /// Registering the same pair twice is a no-op; reusing a name for a
    /// different Rust type fails with `Error::TypeMismatch`.
    pub fn register_type<T: DDS>(&self, type_name: &str) -> Result<()> {
        let type_id = TypeId::of::<T>();
        let existing = *self
            .types
            .entry(type_name.to_string())
            .or_insert(type_id)
            .value();
        if existing != type_id {
            return Err(Error::TypeMismatch(format!(
                "type name '{}' already registered for another type",
                type_name
            )));
        }
        log::debug!("[participant] registered type '{}'", type_name);
        Ok(())
    }

    /// Create (or look up) the topic `topic_name` carrying `type_name`.
    pub fn create_topic<T: DDS>(&self, topic_name: &str, type_name: &str) -> Result<Topic<T>> {
        match self.types.get(type_name) {
            None => return Err(Error::RegistrationFailed(type_name.to_string())),
            Some(entry) if *entry.value() != TypeId::of::<T>() => {
                return Err(Error::TypeMismatch(format!(
                    "type name '{}' is registered for another type",
                    type_name
                )))
            }
            Some(_) => {}
        }

        let existing = self
            .topics
            .entry(topic_name.to_string())
            .or_insert_with(|| type_name.to_string())
            .value()
            .clone();
        if existing != type_name {
            return Err(Error::TypeMismatch(format!(
                "topic '{}' already exists with type '{}'",
                topic_name, existing
            )));
        }

        log::debug!(
            "[participant] topic '{}' type '{}'",
            topic_name,
            type_name
        );
        Ok(Topic::new(topic_name, type_name))
    }

    /// Delete every writer, reader and topic created through this participant.
    ///
    /// Deleted endpoints stop their background threads and refuse further use.
    /// Registered types survive.
    pub fn delete_contained_entities(&self) {
        let flags: Vec<_> = std::mem::take(&mut *self.entities.lock());
        for flag in &flags {
            flag.store(true, Ordering::Release);
        }
        self.topics.clear();
        log::debug!(
            "[participant] '{}' deleted {} contained endpoint(s)",
            self.name,
            flags.len()
        );
    }

    pub(crate) fn ensure_topic<T: DDS>(&self, topic: &Topic<T>) -> Result<()> {
        match self.topics.get(topic.name()) {
            Some(entry) if entry.value() == topic.type_name() => Ok(()),
            _ => Err(Error::InvalidState(format!(
                "topic '{}' does not belong to participant '{}' (deleted?)",
                topic.name(),
                self.name
            ))),
        }
    }

    /// Allocate an entity id: topic key (2 bytes) + per-participant key + kind.
    ///
    /// The per-participant key is one byte, so a participant hands out at most
    /// 255 endpoint ids. Keys are never reused.
    pub(crate) fn next_entity_id(&self, topic_key: [u8; 2], kind: u8) -> Result<EntityId> {
        let key = self
            .next_entity_key
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |key| {
                (key <= u32::from(u8::MAX)).then_some(key + 1)
            })
            .map_err(|_| {
                Error::InvalidState(format!(
                    "participant {} ran out of endpoint ids ({} max)",
                    self.name,
                    u8::MAX
                ))
            })?;
        Ok([topic_key[0], topic_key[1], key as u8, kind])
    }

    /// Track a new endpoint; the returned flag flips on deletion.
    pub(crate) fn track_entity(&self) -> Arc<AtomicBool> {
        let flag = Arc::new(AtomicBool::new(false));
        let mut entities = self.entities.lock();
        // forget endpoints that were dropped
        entities.retain(|f| Arc::strong_count(f) > 1);
        entities.push(Arc::clone(&flag));
        flag
    }

    pub(crate) fn writer_transport_config(&self) -> UdpTransportConfig {
        match self.transport_mode {
            TransportMode::UdpMulticast => UdpTransportConfig::writer(
                Ipv4Addr::UNSPECIFIED,
                Some(self.port_mapping.user_multicast),
                self.peers.clone(),
            ),
            TransportMode::UdpUnicast(bind) => {
                UdpTransportConfig::writer(*bind.ip(), None, self.peers.clone())
            }
        }
    }

    pub(crate) fn reader_transport_config(&self) -> UdpTransportConfig {
        match self.transport_mode {
            TransportMode::UdpMulticast => {
                UdpTransportConfig::multicast_reader(self.port_mapping.user_multicast)
            }
            TransportMode::UdpUnicast(bind) => {
                UdpTransportConfig::unicast_reader(SocketAddr::V4(bind))
            }
        }
    }
}

impl Drop for Participant {
    fn drop(&mut self) {
        self.delete_contained_entities();
    }
}

fn generate_guid_prefix() -> GuidPrefix {
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed) as u16;

    let mut prefix = [0u8; 12];
    prefix[0..2].copy_from_slice(&FRAGDDS_VENDOR_ID);
    prefix[2..6].copy_from_slice(&std::process::id().to_le_bytes());
    prefix[6..10].copy_from_slice(&nanos.to_le_bytes());
    prefix[10..12].copy_from_slice(&counter.to_le_bytes());
    prefix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::{ENTITY_KIND_USER_READER, ENTITY_KIND_USER_WRITER};

    struct Alpha;
    struct Beta;

    macro_rules! impl_dummy_dds {
        ($ty:ident, $name:expr) => {
            impl DDS for $ty {
                const TYPE_NAME: &'static str = $name;
                fn encoded_size_hint(&self) -> usize {
                    0
                }
                fn encode_cdr2(&self, _buf: &mut [u8]) -> Result<usize> {
                    Ok(0)
                }
                fn decode_cdr2(_buf: &[u8]) -> Result<Self> {
                    Ok($ty)
                }
            }
        };
    }
    impl_dummy_dds!(Alpha, "alpha");
    impl_dummy_dds!(Beta, "beta");

    fn participant() -> Arc<Participant> {
        Participant::builder("test")
            .runtime_config(RuntimeConfig::default())
            .with_transport(TransportMode::UdpUnicast(SocketAddrV4::new(
                Ipv4Addr::LOCALHOST,
                0,
            )))
            .build()
            .unwrap()
    }

    #[test]
    fn test_invalid_domain_and_message_size() {
        assert!(matches!(
            Participant::builder("x").domain_id(233).build(),
            Err(Error::InvalidDomainId(233))
        ));
        assert!(matches!(
            Participant::builder("x").message_size_max(40).build(),
            Err(Error::InvalidQos(_))
        ));
        assert!(matches!(
            Participant::builder("x").message_size_max(70_000).build(),
            Err(Error::InvalidQos(_))
        ));
    }

    #[test]
    fn test_multicast_toggle_selects_transport() {
        let unicast = Participant::builder("x")
            .runtime_config(RuntimeConfig::default())
            .multicast(false)
            .build()
            .unwrap();
        assert_eq!(
            unicast.transport_mode(),
            TransportMode::UdpUnicast(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))
        );
        let multicast = Participant::builder("x")
            .runtime_config(RuntimeConfig::default())
            .build()
            .unwrap();
        assert_eq!(multicast.transport_mode(), TransportMode::UdpMulticast);
    }

    #[test]
    fn test_guid_prefixes_unique() {
        let a = participant();
        let b = participant();
        assert_ne!(a.guid_prefix(), b.guid_prefix());
        assert_eq!(&a.guid_prefix()[0..2], &FRAGDDS_VENDOR_ID);
    }

    #[test]
    fn test_topic_requires_registered_type() {
        let p = participant();
        assert!(matches!(
            p.create_topic::<Alpha>("t", "alpha"),
            Err(Error::RegistrationFailed(_))
        ));
        p.register_type::<Alpha>("alpha").unwrap();
        p.register_type::<Alpha>("alpha").unwrap();
        assert!(matches!(
            p.register_type::<Beta>("alpha"),
            Err(Error::TypeMismatch(_))
        ));
        assert!(matches!(
            p.create_topic::<Beta>("t", "alpha"),
            Err(Error::TypeMismatch(_))
        ));
        let topic = p.create_topic::<Alpha>("t", "alpha").unwrap();
        assert_eq!(topic.name(), "t");
    }

    #[test]
    fn test_topic_name_reuse_checks_type_name() {
        let p = participant();
        p.register_type::<Alpha>("alpha").unwrap();
        p.register_type::<Beta>("beta").unwrap();
        let first = p.create_topic::<Alpha>("shared", "alpha").unwrap();
        let again = p.create_topic::<Alpha>("shared", "alpha").unwrap();
        assert_eq!(first.key(), again.key());
        assert!(matches!(
            p.create_topic::<Beta>("shared", "beta"),
            Err(Error::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_entity_ids_increment() {
        let p = participant();
        let a = p.next_entity_id([1, 2], ENTITY_KIND_USER_WRITER).unwrap();
        let b = p.next_entity_id([1, 2], ENTITY_KIND_USER_WRITER).unwrap();
        assert_eq!(a[..2], [1, 2]);
        assert_eq!(a[3], ENTITY_KIND_USER_WRITER);
        assert_ne!(a[2], b[2]);
    }

    #[test]
    fn test_entity_ids_exhausted_after_255() {
        let p = participant();
        let keys: Vec<u8> = (0..255)
            .map(|_| p.next_entity_id([1, 2], ENTITY_KIND_USER_WRITER).unwrap()[2])
            .collect();
        assert_eq!(keys.first(), Some(&1));
        assert_eq!(keys.last(), Some(&255));
        assert!(matches!(
            p.next_entity_id([1, 2], ENTITY_KIND_USER_WRITER),
            Err(Error::InvalidState(_))
        ));
        // stays exhausted rather than wrapping onto key 0 or 1
        assert!(p.next_entity_id([3, 4], ENTITY_KIND_USER_READER).is_err());
    }

    #[test]
    fn test_delete_contained_entities_flips_flags_and_clears_topics() {
        let p = participant();
        p.register_type::<Alpha>("alpha").unwrap();
        let topic = p.create_topic::<Alpha>("t", "alpha").unwrap();
        let flag = p.track_entity();
        p.delete_contained_entities();
        assert!(flag.load(Ordering::Acquire));
        assert!(p.ensure_topic(&topic).is_err());
        // types survive deletion
        assert!(p.create_topic::<Alpha>("t", "alpha").is_ok());
    }
}
