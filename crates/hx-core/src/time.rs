//! Simulation time helpers.
//!
//! # Design
//!
//! Event times are absolute seconds since the start of the simulated run,
//! stored as `f64` exactly as the simulator writes them.  Simulators emit
//! whole seconds in practice, so every product and difference used by the
//! exposure integrals is exact.
//!
//! Temperature profiles are diurnal: a time `t` falls in bucket
//! `floor(t · S / 86 400)` of an `S`-sample day.  Bucket indices are kept
//! *unwrapped* (day 2 continues counting past `S`) and reduced modulo `S`
//! only when a sample is read, so multi-day spans need no special case.

use std::fmt;

/// Seconds in one simulated day.
pub const DAY_SECS: f64 = 86_400.0;

/// Unwrapped bucket index of `time` in a day split into `steps` buckets.
///
/// Multiplies before dividing so that times on a bucket boundary land
/// exactly on it (`21_600 · 4 / 86_400 == 1.0`, with no rounding residue).
#[inline]
pub fn bucket(time: f64, steps: usize) -> i64 {
    (time * steps as f64 / DAY_SECS).floor() as i64
}

/// Width of one bucket in seconds.
#[inline]
pub fn bucket_width(steps: usize) -> f64 {
    DAY_SECS / steps as f64
}

/// Start of unwrapped bucket `b`, in seconds.
#[inline]
pub fn bucket_start(b: i64, steps: usize) -> f64 {
    b as f64 * DAY_SECS / steps as f64
}

/// Reduce an unwrapped bucket index into `0..steps`.
#[inline]
pub fn wrap(b: i64, steps: usize) -> usize {
    b.rem_euclid(steps as i64) as usize
}

// ── Hms ───────────────────────────────────────────────────────────────────────

/// `HH:MM:SS` rendering of a run time, for log lines.
///
/// Hours keep counting past 24 (`25:30:00` is 01:30 on day two), which is
/// how simulators print times in their own logs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hms(pub f64);

impl fmt::Display for Hms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.0.max(0.0).floor() as u64;
        let h = total / 3_600;
        let m = (total % 3_600) / 60;
        let s = total % 60;
        write!(f, "{h:02}:{m:02}:{s:02}")
    }
}
