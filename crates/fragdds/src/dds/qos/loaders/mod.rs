// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! QoS profile loaders.

mod yaml;

pub use yaml::{YamlHistory, YamlLoader, YamlQosDocument, YamlQosProfile};
