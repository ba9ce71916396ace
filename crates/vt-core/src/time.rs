//! Virtual time model.
//!
//! # Design
//!
//! Virtual time is a continuous `f64` wrapped in [`SimTime`].  Event-driven
//! universes jump straight to the next due time; the fixed-tick universe maps
//! times onto integer [`Tick`] buckets relative to the window start:
//!
//!   tick = ceil(time - window.start)
//!
//! A behavior's cached due time is a [`Scheduled`] value rather than a
//! magic maximum time, so no arithmetic is ever performed on "never".
//!
//! `SimTime` keeps IEEE comparison semantics on purpose: a `NaN` due time
//! compares false against everything and is therefore never "later" than the
//! current time, which makes the reschedule rule disable the behavior.

use std::cmp::Ordering;
use std::fmt;

use crate::{CoreError, CoreResult};

// ── SimTime ───────────────────────────────────────────────────────────────────

/// A point on the virtual time line.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Total order used by queue structures.  Only finite times are ever
    /// queued, so this agrees with `PartialOrd` wherever both are defined.
    #[inline]
    pub fn total_cmp(&self, other: &SimTime) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for SimTime {
    #[inline]
    fn from(t: f64) -> Self {
        SimTime(t)
    }
}

impl std::ops::Add<f64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: f64) -> SimTime {
        SimTime(self.0 + rhs)
    }
}

impl std::ops::Sub for SimTime {
    type Output = f64;
    #[inline]
    fn sub(self, rhs: SimTime) -> f64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.3}", self.0)
    }
}

// ── Scheduled ─────────────────────────────────────────────────────────────────

/// The cached result of the last reschedule of a behavior.
///
/// `At` values are always finite.  `Never` sorts after every `At`.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub enum Scheduled {
    At(SimTime),
    #[default]
    Never,
}

impl Scheduled {
    /// The due time, if any.
    #[inline]
    pub fn time(self) -> Option<SimTime> {
        match self {
            Scheduled::At(t) => Some(t),
            Scheduled::Never => None,
        }
    }

    #[inline]
    pub fn is_never(self) -> bool {
        matches!(self, Scheduled::Never)
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Scheduled::At(a), Scheduled::At(b)) => a.partial_cmp(b),
            (Scheduled::At(_), Scheduled::Never) => Some(Ordering::Less),
            (Scheduled::Never, Scheduled::At(_)) => Some(Ordering::Greater),
            (Scheduled::Never, Scheduled::Never) => Some(Ordering::Equal),
        }
    }
}

impl fmt::Display for Scheduled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheduled::At(t) => write!(f, "{t}"),
            Scheduled::Never => f.write_str("never"),
        }
    }
}

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An integer tick index, counted from the start of the simulation window.
///
/// Used only by the fixed-tick universe.  Stored as `u64` so a run never
/// overflows the index.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Parking bucket for entries that can never run: due past the window
    /// end, or too far out to index.  No step ever reaches it.
    pub const BEYOND: Tick = Tick(u64::MAX);

    /// The bucket holding a behavior due `offset` time units after the
    /// window start: `ceil(offset)`.
    ///
    /// Returns `None` for negative or non-finite offsets, and for offsets too
    /// large to index.
    pub fn ceil_of(offset: f64) -> Option<Tick> {
        if !offset.is_finite() || offset < 0.0 {
            return None;
        }
        let ceiled = offset.ceil();
        if ceiled >= u64::MAX as f64 {
            return None;
        }
        Some(Tick(ceiled as u64))
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── TimeWindow ────────────────────────────────────────────────────────────────

/// The `[start, end]` virtual-time window of one simulation run.
///
/// Both bounds are inclusive: a behavior due exactly at `end` still runs.
/// `end` may be `+∞` for runs that only terminate by exhaustion.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeWindow {
    pub start: SimTime,
    pub end:   SimTime,
}

impl TimeWindow {
    /// Validate and build a window.
    pub fn new(start: impl Into<SimTime>, end: impl Into<SimTime>) -> CoreResult<Self> {
        let window = Self { start: start.into(), end: end.into() };
        window.validate()?;
        Ok(window)
    }

    /// `start` must be finite and `end` must not precede it (NaN rejected).
    pub fn validate(&self) -> CoreResult<()> {
        // `!(end >= start)` also catches a NaN end.
        if !self.start.is_finite() || !(self.end >= self.start) {
            return Err(CoreError::InvalidWindow {
                start: self.start.0,
                end:   self.end.0,
            });
        }
        Ok(())
    }

    /// Length of the window in virtual time units.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// The bucket index of `t` relative to this window's start.
    #[inline]
    pub fn tick_of(&self, t: SimTime) -> Option<Tick> {
        Tick::ceil_of(t - self.start)
    }

    /// The bucket a behavior due at `t` is queued in.
    ///
    /// Times at or before `start` land in tick 0.  Times past `end`, and
    /// times whose tick does not fit in a `u64`, land in [`Tick::BEYOND`].
    pub fn bucket_of(&self, t: SimTime) -> Tick {
        if t <= self.start {
            return Tick::ZERO;
        }
        if t > self.end {
            return Tick::BEYOND;
        }
        self.tick_of(t).unwrap_or(Tick::BEYOND)
    }

    /// The virtual time at which bucket `tick` executes.
    #[inline]
    pub fn time_of(&self, tick: Tick) -> SimTime {
        self.start + tick.0 as f64
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self { start: SimTime::ZERO, end: SimTime::ZERO }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.3}, {:.3}]", self.start.0, self.end.0)
    }
}
