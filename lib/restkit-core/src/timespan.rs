//! Signed time span with a fixed textual wire format.
//!
//! The layout is `[-][d.]hh:mm:ss[.fffffff]`: the day component only appears
//! when it is non-zero and the fraction, in 100 ns ticks, only when it is
//! non-zero. Sixteen and a bit seconds read `00:00:16.8253204`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use derive_more::{Display, Error};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const TICKS_PER_SECOND: i64 = 10_000_000;
const TICKS_PER_MINUTE: i64 = TICKS_PER_SECOND * 60;
const TICKS_PER_HOUR: i64 = TICKS_PER_MINUTE * 60;
const TICKS_PER_DAY: i64 = TICKS_PER_HOUR * 24;
const FRACTION_DIGITS: usize = 7;

/// A signed duration with 100 ns resolution.
///
/// # Example
///
/// ```
/// use restkit_core::TimeSpan;
///
/// let span: TimeSpan = "1.02:03:04.5".parse().expect("valid");
/// assert_eq!(span.to_string(), "1.02:03:04.5000000");
/// assert_eq!(TimeSpan::from_ticks(168_253_204).to_string(), "00:00:16.8253204");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeSpan(i64);

/// Error returned when text is not a valid [`TimeSpan`], or a span has no
/// [`Duration`] equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("invalid time span `{input}`: {reason}")]
pub struct TimeSpanError {
    input: String,
    reason: &'static str,
}

impl TimeSpan {
    /// The empty span.
    pub const ZERO: Self = Self(0);

    /// Span of `ticks` 100 ns units.
    #[must_use]
    pub const fn from_ticks(ticks: i64) -> Self {
        Self(ticks)
    }

    /// Span of whole seconds.
    #[must_use]
    pub const fn from_secs(seconds: i64) -> Self {
        Self(seconds.saturating_mul(TICKS_PER_SECOND))
    }

    /// Span of whole milliseconds.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(TICKS_PER_SECOND / 1_000))
    }

    /// Span built from its components, all of the same sign.
    #[must_use]
    pub const fn new(days: i64, hours: i64, minutes: i64, seconds: i64) -> Self {
        Self(
            days.saturating_mul(TICKS_PER_DAY)
                .saturating_add(hours.saturating_mul(TICKS_PER_HOUR))
                .saturating_add(minutes.saturating_mul(TICKS_PER_MINUTE))
                .saturating_add(seconds.saturating_mul(TICKS_PER_SECOND)),
        )
    }

    /// Number of 100 ns ticks.
    #[must_use]
    pub const fn ticks(&self) -> i64 {
        self.0
    }

    /// Returns `true` for spans below zero.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// The span with its sign flipped.
    #[must_use]
    pub const fn negate(&self) -> Self {
        Self(self.0.saturating_neg())
    }

    /// Total length in seconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / TICKS_PER_SECOND as f64
    }
}

impl From<Duration> for TimeSpan {
    /// Sub-tick precision is truncated; spans beyond `i64::MAX` ticks saturate.
    fn from(duration: Duration) -> Self {
        let ticks = duration.as_nanos() / 100;
        Self(i64::try_from(ticks).unwrap_or(i64::MAX))
    }
}

impl TryFrom<TimeSpan> for Duration {
    type Error = TimeSpanError;

    fn try_from(span: TimeSpan) -> Result<Self, Self::Error> {
        let ticks = u64::try_from(span.0).map_err(|_| TimeSpanError {
            input: span.to_string(),
            reason: "negative spans have no `Duration` equivalent",
        })?;
        Ok(Self::from_nanos(ticks.saturating_mul(100)))
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ticks = self.0.unsigned_abs();
        let per_day = TICKS_PER_DAY.unsigned_abs();
        let per_hour = TICKS_PER_HOUR.unsigned_abs();
        let per_minute = TICKS_PER_MINUTE.unsigned_abs();
        let per_second = TICKS_PER_SECOND.unsigned_abs();

        let days = ticks / per_day;
        let hours = ticks % per_day / per_hour;
        let minutes = ticks % per_hour / per_minute;
        let seconds = ticks % per_minute / per_second;
        let fraction = ticks % per_second;

        if self.is_negative() {
            f.write_str("-")?;
        }
        if days > 0 {
            write!(f, "{days}.")?;
        }
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}")?;
        if fraction > 0 {
            write!(f, ".{fraction:0width$}", width = FRACTION_DIGITS)?;
        }
        Ok(())
    }
}

impl FromStr for TimeSpan {
    type Err = TimeSpanError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let fail = |reason| TimeSpanError {
            input: input.to_string(),
            reason,
        };

        let (negative, body) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input),
        };

        let mut parts = body.split(':');
        let (Some(head), Some(minutes), Some(tail), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(fail("expected `hh:mm:ss`"));
        };

        let (days, hours) = match head.split_once('.') {
            Some((days, hours)) => (number(days).ok_or_else(|| fail("bad days"))?, hours),
            None => (0, head),
        };
        let (seconds, fraction) = match tail.split_once('.') {
            Some((seconds, fraction)) => (seconds, Some(fraction)),
            None => (tail, None),
        };

        let hours = two_digits(hours)
            .filter(|h| *h < 24)
            .ok_or_else(|| fail("bad hours"))?;
        let minutes = two_digits(minutes)
            .filter(|m| *m < 60)
            .ok_or_else(|| fail("bad minutes"))?;
        let seconds = two_digits(seconds)
            .filter(|s| *s < 60)
            .ok_or_else(|| fail("bad seconds"))?;
        let fraction = match fraction {
            None => 0,
            Some(digits) if (1..=FRACTION_DIGITS).contains(&digits.len()) => {
                let padded = format!("{digits:0<width$}", width = FRACTION_DIGITS);
                number(&padded).ok_or_else(|| fail("bad fraction"))?
            }
            Some(_) => return Err(fail("fraction takes one to seven digits")),
        };

        let ticks = days
            .checked_mul(TICKS_PER_DAY)
            .and_then(|t| t.checked_add(hours * TICKS_PER_HOUR))
            .and_then(|t| t.checked_add(minutes * TICKS_PER_MINUTE))
            .and_then(|t| t.checked_add(seconds * TICKS_PER_SECOND))
            .and_then(|t| t.checked_add(fraction))
            .ok_or_else(|| fail("out of range"))?;

        Ok(Self(if negative { -ticks } else { ticks }))
    }
}

fn number(digits: &str) -> Option<i64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn two_digits(digits: &str) -> Option<i64> {
    (digits.len() == 2).then(|| number(digits)).flatten()
}

impl Serialize for TimeSpan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeSpan {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TimeSpanVisitor;

        impl Visitor<'_> for TimeSpanVisitor {
            type Value = TimeSpan;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a time span formatted as `[-][d.]hh:mm:ss[.fffffff]`")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<TimeSpan, E> {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(TimeSpanVisitor)
    }
}

impl From<TimeSpan> for crate::QueryValue {
    fn from(span: TimeSpan) -> Self {
        Self::Scalar(span.to_string())
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;

    use super::*;

    #[test]
    fn formats_seconds_with_fraction() {
        check!(TimeSpan::from_ticks(168_253_204).to_string() == "00:00:16.8253204");
    }

    #[test]
    fn formats_whole_values_without_fraction() {
        check!(TimeSpan::ZERO.to_string() == "00:00:00");
        check!(TimeSpan::new(0, 1, 2, 3).to_string() == "01:02:03");
        check!(TimeSpan::new(3, 4, 5, 6).to_string() == "3.04:05:06");
    }

    #[test]
    fn formats_negative_spans() {
        check!(TimeSpan::new(1, 0, 0, 1).negate().to_string() == "-1.00:00:01");
        check!(TimeSpan::from_millis(-1).to_string() == "-00:00:00.0010000");
    }

    #[test]
    fn parses_every_layout() {
        check!("00:00:16.8253204".parse::<TimeSpan>() == Ok(TimeSpan::from_ticks(168_253_204)));
        check!("3.04:05:06".parse::<TimeSpan>() == Ok(TimeSpan::new(3, 4, 5, 6)));
        check!("-00:00:01.5".parse::<TimeSpan>() == Ok(TimeSpan::from_millis(-1_500)));
        check!("10675199.02:48:05.4775807".parse::<TimeSpan>() == Ok(TimeSpan::from_ticks(i64::MAX)));
    }

    #[test]
    fn rejects_malformed_input() {
        for input in [
            "",
            "16",
            "00:16",
            "0:00:16",
            "24:00:00",
            "00:60:00",
            "00:00:60",
            "00:00:01.12345678",
            "00:00:01.",
            "x.00:00:01",
            "00:00:00:00",
        ] {
            check!(input.parse::<TimeSpan>().is_err(), "{input} should not parse");
        }
    }

    #[test]
    fn serde_round_trip_is_exact() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Measurement {
            name: String,
            elapsed: TimeSpan,
        }

        let original = Measurement {
            name: "import".to_string(),
            elapsed: TimeSpan::from_ticks(168_253_204),
        };
        let json = serde_json::to_string(&original).expect("serialize");
        check!(json == r#"{"name":"import","elapsed":"00:00:16.8253204"}"#);

        let back: Measurement = serde_json::from_str(&json).expect("deserialize");
        check!(back == original);
    }

    #[test]
    fn duration_conversions() {
        let span = TimeSpan::from(Duration::from_nanos(16_825_320_450));
        check!(span == TimeSpan::from_ticks(168_253_204));
        check!(Duration::try_from(span) == Ok(Duration::from_nanos(16_825_320_400)));
        check!(Duration::try_from(span.negate()).is_err());
    }
}
