//! Character-count accounting for cost estimation.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Price per input character in USD.
pub const INPUT_CHAR_PRICE_USD: f64 = 0.0000007 / 1000.0;

/// Price per output character in USD.
pub const OUTPUT_CHAR_PRICE_USD: f64 = 0.0000021 / 1000.0;

/// Monotonically increasing input/output character counters for one
/// project session.
///
/// Counters are atomic so independent persona interviews can be metered
/// concurrently. They are never reset for the lifetime of the session.
#[derive(Debug, Default)]
pub struct UsageMeter {
    input_chars: AtomicU64,
    output_chars: AtomicU64,
}

/// A point-in-time copy of the usage counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub input_chars: u64,
    pub output_chars: u64,
    pub estimated_cost_usd: f64,
}

impl UsageMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one successful provider round-trip.
    pub fn record(&self, input_chars: u64, output_chars: u64) {
        self.input_chars.fetch_add(input_chars, Ordering::Relaxed);
        self.output_chars.fetch_add(output_chars, Ordering::Relaxed);
    }

    /// Returns the current counters and the linear cost estimate
    /// `input × price_in + output × price_out`.
    pub fn snapshot(&self) -> UsageSnapshot {
        let input = self.input_chars.load(Ordering::Relaxed);
        let output = self.output_chars.load(Ordering::Relaxed);
        UsageSnapshot {
            input_chars: input,
            output_chars: output,
            estimated_cost_usd: input as f64 * INPUT_CHAR_PRICE_USD
                + output as f64 * OUTPUT_CHAR_PRICE_USD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_and_never_decrease() {
        let meter = UsageMeter::new();
        let mut last_in = 0;
        let mut last_out = 0;

        for (input, output) in [(120, 450), (0, 0), (33, 1), (900, 12)] {
            meter.record(input, output);
            let snap = meter.snapshot();
            assert!(snap.input_chars >= last_in);
            assert!(snap.output_chars >= last_out);
            last_in = snap.input_chars;
            last_out = snap.output_chars;
        }

        assert_eq!(last_in, 1053);
        assert_eq!(last_out, 463);
    }

    #[test]
    fn cost_estimate_is_exactly_linear() {
        let meter = UsageMeter::new();
        meter.record(10_000, 5_000);
        let snap = meter.snapshot();

        let expected = 10_000.0 * INPUT_CHAR_PRICE_USD + 5_000.0 * OUTPUT_CHAR_PRICE_USD;
        assert_eq!(snap.estimated_cost_usd, expected);
    }
}
