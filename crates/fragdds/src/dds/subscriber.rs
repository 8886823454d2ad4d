// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use crate::dds::{DataReader, Participant, QoS, Result, Topic, DDS};
use std::sync::Arc;

/// Factory for [`DataReader`]s.
pub struct Subscriber {
    participant: Arc<Participant>,
}

impl Subscriber {
    pub(crate) fn new(participant: Arc<Participant>) -> Self {
        Self { participant }
    }

    /// Create a reader on `topic`. Its receive thread starts immediately.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidQos` if `qos` is inconsistent
    /// - `Error::InvalidState` if the topic was deleted
    /// - `Error::BindFailed` if the reader socket cannot be opened
    pub fn create_reader<T: DDS>(&self, topic: &Topic<T>, qos: QoS) -> Result<DataReader<T>> {
        DataReader::new(&self.participant, topic, qos)
    }

    pub fn participant(&self) -> &Arc<Participant> {
        &self.participant
    }
}
