//! Per-event ordering of raw result values.
//!
//! Every raw value maps to a [`PerformanceKey`] whose ordering puts the better
//! performance first. Timed events compare on two keys (implements completed,
//! then elapsed time); every other kind compares one number, higher first.

use std::cmp::Ordering;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::models::EventKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceKey {
    Timed { implements: u32, seconds: Decimal },
    Measured(Decimal),
    /// Empty, unparseable, or a literal zero on a measured event.
    NoScore,
}

impl PerformanceKey {
    pub fn is_scored(&self) -> bool {
        !matches!(self, Self::NoScore)
    }
}

impl Ord for PerformanceKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (
                Self::Timed {
                    implements: a_impl,
                    seconds: a_secs,
                },
                Self::Timed {
                    implements: b_impl,
                    seconds: b_secs,
                },
            ) => b_impl.cmp(a_impl).then_with(|| a_secs.cmp(b_secs)),
            (Self::Measured(a), Self::Measured(b)) => b.cmp(a),
            (Self::NoScore, Self::NoScore) => Ordering::Equal,
            (Self::NoScore, _) => Ordering::Greater,
            (_, Self::NoScore) => Ordering::Less,
            // One event never mixes kinds.
            (Self::Timed { .. }, Self::Measured(_)) => Ordering::Less,
            (Self::Measured(_), Self::Timed { .. }) => Ordering::Greater,
        }
    }
}

impl PartialOrd for PerformanceKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub fn performance_key(kind: EventKind, raw: &str) -> PerformanceKey {
    let raw = raw.trim();
    if raw.is_empty() {
        return PerformanceKey::NoScore;
    }

    let key = match kind {
        EventKind::Time => parse_timed(raw),
        EventKind::Reps | EventKind::Distance | EventKind::Height | EventKind::Max => {
            parse_measured(raw)
        }
    };

    key.unwrap_or(PerformanceKey::NoScore)
}

/// `<implements>+HH:MM:SS`, seconds may carry a fraction.
fn parse_timed(raw: &str) -> Option<PerformanceKey> {
    let (implements, clock) = raw.split_once('+')?;
    let implements: u32 = implements.trim().parse().ok()?;

    let mut parts = clock.trim().split(':');
    let hours: u32 = parts.next()?.parse().ok()?;
    let minutes: u32 = parts.next()?.parse().ok()?;
    let seconds = Decimal::from_str(parts.next()?).ok()?;
    if parts.next().is_some() || seconds.is_sign_negative() {
        return None;
    }

    let total = Decimal::from(hours) * Decimal::from(3600)
        + Decimal::from(minutes) * Decimal::from(60)
        + seconds;
    Some(PerformanceKey::Timed {
        implements,
        seconds: total,
    })
}

fn parse_measured(raw: &str) -> Option<PerformanceKey> {
    let value = Decimal::from_str(raw).ok()?;
    if value.is_zero() {
        return None;
    }
    Some(PerformanceKey::Measured(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(kind: EventKind, raw: &str) -> PerformanceKey {
        performance_key(kind, raw)
    }

    #[test]
    fn test_more_implements_beats_faster_time() {
        let two_slow = key(EventKind::Time, "2+00:01:30");
        let one_fast = key(EventKind::Time, "1+00:01:20");
        assert!(two_slow < one_fast);
    }

    #[test]
    fn test_same_implements_faster_wins() {
        let fast = key(EventKind::Time, "3+00:00:45.20");
        let slow = key(EventKind::Time, "3+00:00:47");
        assert!(fast < slow);
        assert_eq!(
            fast,
            PerformanceKey::Timed {
                implements: 3,
                seconds: Decimal::new(4520, 2)
            }
        );
    }

    #[test]
    fn test_malformed_time_is_no_score() {
        assert_eq!(key(EventKind::Time, ""), PerformanceKey::NoScore);
        assert_eq!(key(EventKind::Time, "00:01:30"), PerformanceKey::NoScore);
        assert_eq!(key(EventKind::Time, "x+00:01:30"), PerformanceKey::NoScore);
        assert_eq!(key(EventKind::Time, "2+01:30"), PerformanceKey::NoScore);
        assert_eq!(key(EventKind::Time, "2+00:01:30:00"), PerformanceKey::NoScore);
        assert!(key(EventKind::Time, "0+00:09:59") < key(EventKind::Time, "bogus"));
    }

    #[test]
    fn test_huge_clock_fields_do_not_overflow() {
        let long = key(EventKind::Time, "1+0:99999999:00");
        assert_eq!(
            long,
            PerformanceKey::Timed {
                implements: 1,
                seconds: Decimal::from(5_999_999_940u64)
            }
        );
        assert!(key(EventKind::Time, "1+4294967295:4294967295:00").is_scored());
        assert!(key(EventKind::Time, "1+00:01:00") < long);
    }

    #[test]
    fn test_measured_higher_is_better() {
        assert!(key(EventKind::Reps, "12") < key(EventKind::Reps, "8"));
        assert!(key(EventKind::Distance, "20.5") < key(EventKind::Distance, "20.25"));
        assert!(key(EventKind::Max, "180") < key(EventKind::Max, "170"));
        assert_eq!(key(EventKind::Height, "10"), key(EventKind::Height, "10.0"));
    }

    #[test]
    fn test_zero_and_garbage_are_no_score() {
        assert_eq!(key(EventKind::Reps, "0"), PerformanceKey::NoScore);
        assert_eq!(key(EventKind::Distance, "0.0"), PerformanceKey::NoScore);
        assert_eq!(key(EventKind::Max, "DNF"), PerformanceKey::NoScore);
        assert_eq!(key(EventKind::Max, "   "), PerformanceKey::NoScore);
        assert!(key(EventKind::Reps, "1") < key(EventKind::Reps, "0"));
    }
}
