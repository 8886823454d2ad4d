// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML QoS profile loader.
//!
//! ```yaml
//! default_profile: fragment_reliable
//! profiles:
//!   fragment_reliable:
//!     reliability: RELIABLE
//!     history:
//!       depth: 16
//!     heartbeat_frag_repeats: 3
//!   fragment_fast:
//!     reliability: BEST_EFFORT
//! ```

use crate::dds::qos::{History, QoS, Reliability};
use crate::dds::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

pub struct YamlLoader;

#[derive(Debug, Deserialize)]
pub struct YamlQosDocument {
    #[serde(default)]
    pub profiles: HashMap<String, YamlQosProfile>,

    #[serde(default)]
    pub default_profile: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct YamlQosProfile {
    /// RELIABLE or BEST_EFFORT
    pub reliability: Option<String>,
    pub history: Option<YamlHistory>,
    pub heartbeat_frag_repeats: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct YamlHistory {
    pub depth: u32,
}

impl YamlLoader {
    /// Load `profile` (or the document's `default_profile` when `None`) from a file.
    pub fn load_profile<P: AsRef<Path>>(path: P, profile: Option<&str>) -> Result<QoS> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::ConfigFileNotFound(path.display().to_string()),
            _ => Error::IoError(e),
        })?;
        Self::parse_profile(&content, profile)
    }

    /// Same as [`YamlLoader::load_profile`] on in-memory YAML.
    pub fn parse_profile(content: &str, profile: Option<&str>) -> Result<QoS> {
        let doc: YamlQosDocument =
            serde_yaml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?;

        let name = profile
            .map(str::to_string)
            .or_else(|| doc.default_profile.clone())
            .ok_or_else(|| Error::InvalidQos("no profile requested and no default_profile".into()))?;

        let yaml = doc
            .profiles
            .get(&name)
            .ok_or_else(|| Error::InvalidQos(format!("unknown QoS profile '{}'", name)))?;

        let qos = Self::convert(yaml)?;
        log::debug!("[qos] loaded profile '{}': {:?}", name, qos);
        Ok(qos)
    }

    fn convert(yaml: &YamlQosProfile) -> Result<QoS> {
        let mut qos = QoS::default();

        if let Some(reliability) = &yaml.reliability {
            qos.reliability = match reliability.to_uppercase().as_str() {
                "RELIABLE" => Reliability::Reliable,
                "BEST_EFFORT" => Reliability::BestEffort,
                other => {
                    return Err(Error::InvalidQos(format!(
                        "unknown reliability kind '{}'",
                        other
                    )))
                }
            };
        }
        if let Some(history) = &yaml.history {
            qos.history = History::KeepLast(history.depth);
        }
        if let Some(repeats) = yaml.heartbeat_frag_repeats {
            qos.heartbeat_frag_repeats = repeats;
        }

        qos.validate()?;
        Ok(qos)
    }
}
