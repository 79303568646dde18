//! Diurnal temperature profiles and their exact step-function integral.
//!
//! A profile holds `S` samples; sample `k` is the temperature throughout the
//! `k`-th bucket of every day (`[k·w, (k+1)·w)` with `w = 86 400 / S`).  The
//! temperature is therefore a step function of time, and its integral over
//! any interval is a finite sum:
//!
//! ```text
//! b0 = bucket(start), b1 = bucket(stop)          (unwrapped indices)
//!
//! b0 == b1:  (stop − start) · T[b0]
//! b0 <  b1:  ((b0+1)·w − start) · T[b0]
//!          + Σ_{k=b0+1}^{b1−1} w · T[k mod S]
//!          + (stop − b1·w) · T[b1]
//! ```
//!
//! Whole days inside the middle sum collapse to `days · day_total`, so a
//! span of any length costs at most `S` additions.

use hx_core::time::{bucket, bucket_start, bucket_width, wrap};

use crate::{SpatialError, SpatialResult};

/// A per-location discretized diurnal temperature curve.  Immutable.
#[derive(Clone, Debug, PartialEq)]
pub struct TemperatureProfile {
    name:      String,
    samples:   Vec<f64>,
    /// `Σ w · T[k]` over one day, precomputed for multi-day spans.
    day_total: f64,
}

impl TemperatureProfile {
    /// Build a profile from its ordered samples.
    ///
    /// # Errors
    /// [`SpatialError::InvalidProfile`] if `samples` is empty or holds a
    /// non-finite value.
    pub fn new(name: impl Into<String>, samples: Vec<f64>) -> SpatialResult<Self> {
        let name = name.into();
        if samples.is_empty() {
            return Err(SpatialError::InvalidProfile { name, reason: "no samples".into() });
        }
        if let Some(step) = samples.iter().position(|t| !t.is_finite()) {
            return Err(SpatialError::InvalidProfile {
                name,
                reason: format!("sample {step} is not finite"),
            });
        }
        let w = bucket_width(samples.len());
        let day_total = samples.iter().map(|t| w * t).sum();
        Ok(Self { name, samples, day_total })
    }

    /// A profile with the same temperature all day.
    pub fn constant(name: impl Into<String>, temperature: f64) -> SpatialResult<Self> {
        Self::new(name, vec![temperature])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of samples per day (`S`).
    pub fn steps(&self) -> usize {
        self.samples.len()
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    #[inline]
    fn at(&self, b: i64) -> f64 {
        self.samples[wrap(b, self.samples.len())]
    }

    /// Temperature in effect at run time `time`.
    #[inline]
    pub fn temperature(&self, time: f64) -> f64 {
        self.at(bucket(time, self.samples.len()))
    }

    /// Time integral of the temperature over `[start, stop]`, in degree-seconds.
    ///
    /// Returns `0.0` for an empty interval.  Additive: for any
    /// `start ≤ m ≤ stop`, `exposure(start, stop) == exposure(start, m) +
    /// exposure(m, stop)` up to floating-point summation order.
    pub fn exposure(&self, start: f64, stop: f64) -> f64 {
        debug_assert!(start <= stop, "exposure interval reversed: {start} > {stop}");
        if stop <= start {
            return 0.0;
        }
        let s = self.samples.len();
        let b0 = bucket(start, s);
        let b1 = bucket(stop, s);
        if b0 == b1 {
            return (stop - start) * self.at(b0);
        }

        let mut total = (bucket_start(b0 + 1, s) - start) * self.at(b0);

        let inner = b1 - b0 - 1;
        let days = inner / s as i64;
        total += days as f64 * self.day_total;

        let w = bucket_width(s);
        for k in (b0 + 1 + days * s as i64)..b1 {
            total += w * self.at(k);
        }

        total + (stop - bucket_start(b1, s)) * self.at(b1)
    }
}
