// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use crate::dds::{DataWriter, Participant, QoS, Result, Topic, DDS};
use std::sync::Arc;

/// Factory for [`DataWriter`]s.
pub struct Publisher {
    participant: Arc<Participant>,
}

impl Publisher {
    pub(crate) fn new(participant: Arc<Participant>) -> Self {
        Self { participant }
    }

    /// Create a writer on `topic`.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidQos` if `qos` is inconsistent
    /// - `Error::InvalidState` if the topic was deleted
    /// - `Error::BindFailed` if the writer socket cannot be opened
    pub fn create_writer<T: DDS>(&self, topic: &Topic<T>, qos: QoS) -> Result<DataWriter<T>> {
        DataWriter::new(&self.participant, topic, qos)
    }

    pub fn participant(&self) -> &Arc<Participant> {
        &self.participant
    }
}
