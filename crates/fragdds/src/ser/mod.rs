// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CDR serialization helpers for sample payloads.

pub mod cursor;

pub use cursor::{Cursor, CursorMut};

use std::fmt;

/// CDR little-endian encapsulation header (`CDR_LE`, options 0).
pub const CDR_LE_HEADER: [u8; 4] = [0x00, 0x01, 0x00, 0x00];

/// Serialization error used within `ser`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerError {
    WriteFailed { offset: usize, reason: String },
    ReadFailed { offset: usize, reason: String },
    InvalidData { reason: String },
}

impl fmt::Display for SerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerError::WriteFailed { offset, reason } => {
                write!(f, "write failed at offset {}: {}", offset, reason)
            }
            SerError::ReadFailed { offset, reason } => {
                write!(f, "read failed at offset {}: {}", offset, reason)
            }
            SerError::InvalidData { reason } => write!(f, "invalid data: {}", reason),
        }
    }
}

impl std::error::Error for SerError {}

/// Result alias for cursor operations.
pub type SerResult<T> = Result<T, SerError>;

impl From<SerError> for crate::dds::Error {
    fn from(err: SerError) -> Self {
        match err {
            SerError::WriteFailed { .. } => crate::dds::Error::BufferTooSmall,
            SerError::ReadFailed { .. } | SerError::InvalidData { .. } => {
                log::debug!("[ser] decode failed: {}", err);
                crate::dds::Error::SerializationError
            }
        }
    }
}
