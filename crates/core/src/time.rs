use chrono::{DateTime, Duration, Utc};

/// A simple clock abstraction for deterministic time in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Wall-clock delta rounded to whole seconds, as reported for answer timing.
///
/// Half a second rounds up; a backwards delta (clock skew) reports `0`.
#[must_use]
pub fn elapsed_whole_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
    let millis = end.signed_duration_since(start).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    let rounded = (millis + 500) / 1000;
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_rounds_to_nearest_second() {
        let start = fixed_now();
        assert_eq!(elapsed_whole_seconds(start, start), 0);
        assert_eq!(elapsed_whole_seconds(start, start + Duration::milliseconds(499)), 0);
        assert_eq!(elapsed_whole_seconds(start, start + Duration::milliseconds(500)), 1);
        assert_eq!(elapsed_whole_seconds(start, start + Duration::milliseconds(7_400)), 7);
    }

    #[test]
    fn elapsed_never_negative() {
        let start = fixed_now();
        assert_eq!(elapsed_whole_seconds(start, start - Duration::seconds(3)), 0);
    }

    #[test]
    fn fixed_clock_advances() {
        let mut clock = Clock::fixed(fixed_now());
        clock.advance(Duration::seconds(4));
        assert_eq!(clock.now(), fixed_now() + Duration::seconds(4));
    }
}
