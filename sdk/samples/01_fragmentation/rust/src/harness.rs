// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Command line and shutdown handling shared by the sample binaries.

use clap::Parser;
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use fragdds::dds::qos::loaders::YamlLoader;
use fragdds::{Participant, QoS};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Fragmented data statistics sample
#[derive(Parser, Debug, Clone)]
#[command(version)]
#[command(about = "Write or read 8000-byte samples that force RTPS fragmentation")]
pub struct Args {
    /// DDS domain ID
    #[arg(short, long, default_value = "0")]
    pub domain: u32,

    /// Number of samples to write/read (unlimited if omitted)
    #[arg(short, long)]
    pub sample_count: Option<u64>,

    /// Log verbosity: 0 = warn, 1 = info, 2 = debug, 3 = trace
    #[arg(short, long, default_value = "0", value_parser = clap::value_parser!(u8).range(0..=3))]
    pub verbosity: u8,

    /// Maximum RTPS message size in bytes (default 1024)
    #[arg(long)]
    pub message_size_max: Option<usize>,

    /// Static unicast locator to send to (repeatable)
    #[arg(long = "peer", value_name = "IP:PORT")]
    pub peers: Vec<SocketAddr>,

    /// YAML file with QoS profiles
    #[arg(long)]
    pub qos_file: Option<PathBuf>,

    /// Profile to use from --qos-file (default_profile if omitted)
    #[arg(long, requires = "qos_file")]
    pub qos_profile: Option<String>,
}

impl Args {
    /// Install `env_logger` at the level picked by `-v`; `RUST_LOG` still wins.
    pub fn init_logging(&self) {
        let level = match self.verbosity {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .init();
    }

    /// True once `samples` reached `--sample-count`.
    #[must_use]
    pub fn reached(&self, samples: u64) -> bool {
        self.sample_count.is_some_and(|limit| samples >= limit)
    }

    pub fn build_participant(&self, name: &str) -> fragdds::Result<Arc<Participant>> {
        let mut builder = Participant::builder(name)
            .domain_id(self.domain)
            .peers(self.peers.iter().copied());
        if let Some(size) = self.message_size_max {
            builder = builder.message_size_max(size);
        }
        builder.build()
    }

    /// Endpoint QoS: the selected YAML profile, or reliable defaults.
    pub fn qos(&self) -> fragdds::Result<QoS> {
        match &self.qos_file {
            Some(path) => YamlLoader::load_profile(path, self.qos_profile.as_deref()),
            None => Ok(QoS::reliable()),
        }
    }
}

/// Ctrl-C flag plus a wake-up channel so timed pauses end early.
pub struct ShutdownSignal {
    flag: Arc<AtomicBool>,
    tx: Sender<()>,
    rx: Receiver<()>,
}

impl ShutdownSignal {
    /// A signal only [`trigger`](Self::trigger) can fire.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = channel::bounded(1);
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            tx,
            rx,
        }
    }

    /// A signal fired by Ctrl-C. Call at most once per process.
    pub fn install() -> Result<Self, ctrlc::Error> {
        let signal = Self::new();
        let flag = Arc::clone(&signal.flag);
        let tx = signal.tx.clone();
        ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
            let _ = tx.try_send(());
        })?;
        Ok(signal)
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
        let _ = self.tx.try_send(());
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Sleep for `duration`; returns `true` if shutdown interrupted the pause.
    #[must_use]
    pub fn pause(&self, duration: Duration) -> bool {
        if self.is_triggered() {
            return true;
        }
        if let Err(RecvTimeoutError::Disconnected) = self.rx.recv_timeout(duration) {
            log::debug!("[shutdown] wake-up channel closed");
        }
        self.is_triggered()
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ShutdownSignal {
    fn clone(&self) -> Self {
        Self {
            flag: Arc::clone(&self.flag),
            tx: self.tx.clone(),
            rx: self.rx.clone(),
        }
    }
}
