// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The publisher's write/pause/report loop.

use crate::fragment::Fragment;
use crate::harness::ShutdownSignal;
use fragdds::{DataWriter, DataWriterProtocolStatus};
use std::io::{self, Write};
use std::time::Duration;

/// Pause between two writes.
pub const SEND_PERIOD: Duration = Duration::from_secs(1);

/// Why [`publish_fragments`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishExit {
    /// Sample count reached, or shutdown seen before the next write.
    Completed { samples: u64 },
    /// Shutdown arrived during the pause after a write.
    Interrupted { samples: u64 },
    /// The counter no longer fits the sample's `x` field.
    CounterExhausted { samples: u64 },
}

/// Print the six writer counters in the sample's report format.
pub fn write_statistics<W: Write>(out: &mut W, status: &DataWriterProtocolStatus) -> io::Result<()> {
    writeln!(out, "Fragmented Data Statistics:")?;
    writeln!(out, "\t pushed_fragment_count {}", status.pushed_fragment_count)?;
    writeln!(out, "\t pushed_fragment_bytes {}", status.pushed_fragment_bytes)?;
    writeln!(out, "\t pulled_fragment_count {}", status.pulled_fragment_count)?;
    writeln!(out, "\t pulled_fragment_bytes {}", status.pulled_fragment_bytes)?;
    writeln!(
        out,
        "\t received_nack_fragment_count {}",
        status.received_nack_fragment_count
    )?;
    writeln!(
        out,
        "\t received_nack_fragment_bytes {}",
        status.received_nack_fragment_bytes
    )
}

/// The `x` value carried by sample number `samples_written`, if it fits.
#[must_use]
pub fn sample_x(samples_written: u64) -> Option<i32> {
    i32::try_from(samples_written).ok()
}

/// Write `Fragment` samples until `sample_count` is reached or shutdown fires.
///
/// Each iteration announces the write on `out`, writes, pauses for `period`
/// and then prints the writer statistics. A shutdown during the pause prints
/// `INTERRUPTED` on `err` and returns before the statistics. Write failures
/// are logged and the loop continues.
pub fn publish_fragments<O: Write, E: Write>(
    writer: &DataWriter<Fragment>,
    sample_count: Option<u64>,
    period: Duration,
    shutdown: &ShutdownSignal,
    out: &mut O,
    err: &mut E,
) -> io::Result<PublishExit> {
    // larger than message_size_max, so every write fragments
    let mut data = Fragment::preallocated();

    let mut samples_written: u64 = 0;
    while !shutdown.is_triggered() && !sample_count.is_some_and(|limit| samples_written >= limit) {
        let Some(x) = sample_x(samples_written) else {
            log::warn!("sample counter {} exceeds i32 range, stopping", samples_written);
            return Ok(PublishExit::CounterExhausted {
                samples: samples_written,
            });
        };
        data.x = x;
        writeln!(out, "Writing fragment, count {}", samples_written)?;

        if let Err(e) = writer.write(&data) {
            log::warn!("write of sample {} failed: {}", samples_written, e);
        }

        if shutdown.pause(period) {
            writeln!(err, "INTERRUPTED")?;
            return Ok(PublishExit::Interrupted {
                samples: samples_written,
            });
        }

        write_statistics(out, &writer.protocol_status())?;
        samples_written += 1;
    }

    Ok(PublishExit::Completed {
        samples: samples_written,
    })
}
