// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Core DDS API.
//!
//! Entity creation mirrors the classic DDS sequence:
//!
//! ```text
//! Participant ──┬── Publisher  ── DataWriter<T> ──┐
//!               ├── register_type::<T>()           ├── Topic<T>
//!               └── Subscriber ── DataReader<T> ──┘
//! ```

mod participant;
mod publisher;
pub mod qos;
mod reader;
mod subscriber;
mod topic;
mod writer;

pub use participant::{Participant, ParticipantBuilder, TransportMode};
pub use publisher::Publisher;
pub use qos::{History, QoS, Reliability};
pub use reader::{DataReader, DataReaderProtocolStatus, FragmentBuffer, InsertOutcome};
pub use subscriber::Subscriber;
pub use topic::Topic;
pub use writer::{DataWriter, DataWriterProtocolStatus, HistoryCache};

/// Errors returned by the fragdds API.
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// QoS policy or transport setting is invalid.
    InvalidQos(String),
    /// Configuration file not found at specified path.
    ConfigFileNotFound(String),
    /// Configuration file could not be parsed.
    ConfigParse(String),

    // ========================================================================
    // Entity Errors
    // ========================================================================
    /// Domain ID out of range (0-232).
    InvalidDomainId(u32),
    /// Type name not registered with the participant.
    RegistrationFailed(String),
    /// Entity was deleted or is otherwise unusable.
    InvalidState(String),

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// I/O error with underlying cause.
    IoError(std::io::Error),
    /// Failed to bind socket to address.
    BindFailed(String),

    // ========================================================================
    // Data Errors
    // ========================================================================
    /// Type name or Rust type differs from the registered one.
    TypeMismatch(String),
    /// CDR decoding failed (truncated or invalid data).
    SerializationError,
    /// Buffer too small for encoding.
    BufferTooSmall,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidQos(msg) => write!(f, "Invalid QoS: {}", msg),
            Error::ConfigFileNotFound(path) => write!(f, "Config file not found: {}", path),
            Error::ConfigParse(msg) => write!(f, "Config parse error: {}", msg),
            Error::InvalidDomainId(id) => write!(f, "Invalid domain_id: {} (must be 0-232)", id),
            Error::RegistrationFailed(name) => write!(f, "Type not registered: {}", name),
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Error::IoError(e) => write!(f, "I/O error: {}", e),
            Error::BindFailed(msg) => write!(f, "Bind failed: {}", msg),
            Error::TypeMismatch(msg) => write!(f, "Type mismatch: {}", msg),
            Error::SerializationError => write!(f, "CDR serialization failed"),
            Error::BufferTooSmall => write!(f, "Buffer too small for encoding"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e)
    }
}

/// Convenient alias for API results using the public `Error` type.
pub type Result<T> = core::result::Result<T, Error>;

/// Encode/decode contract for topic types.
///
/// Encodings are CDR little-endian including the 4-byte encapsulation header.
pub trait DDS: Sized + Send + Sync + 'static {
    /// Default type name used with `register_type`.
    const TYPE_NAME: &'static str;

    /// Upper bound on the encoded size, used to size the write buffer.
    fn encoded_size_hint(&self) -> usize;

    /// Encode into `buf`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// `Error::BufferTooSmall` if `buf` cannot hold the encoding.
    fn encode_cdr2(&self, buf: &mut [u8]) -> Result<usize>;

    /// Decode from a complete serialized sample.
    ///
    /// # Errors
    ///
    /// `Error::SerializationError` if the buffer is truncated or malformed.
    fn decode_cdr2(buf: &[u8]) -> Result<Self>;
}
