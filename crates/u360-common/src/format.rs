//! Human-readable formatting for progress and summary log lines.

use byte_unit::{Byte, UnitType};
use std::time::Duration;

/// Format a byte count using binary units, e.g. `1.50 KiB`.
pub fn format_bytes(bytes: u64) -> String {
    let adjusted = Byte::from_u64(bytes).get_appropriate_unit(UnitType::Binary);
    format!("{adjusted:.2}")
}

/// Per-second rate of `amount` over `elapsed`; zero when no time has passed.
pub fn per_second(amount: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        amount as f64 / secs
    } else {
        0.0
    }
}

/// Format a byte throughput, e.g. `12.00 MiB/s`.
pub fn format_byte_rate(bytes: u64, elapsed: Duration) -> String {
    format!("{}/s", format_bytes(per_second(bytes, elapsed) as u64))
}
