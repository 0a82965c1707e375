//! Prometheus duration to ISO-8601 conversion
//!
//! Prometheus writes durations as a concatenation of unit-suffixed integers
//! (`1h30m`, `2w`, `500ms`). Azure expects ISO-8601 durations (`PT1H30M`).
//! Units must appear in the fixed order `y w d h m s ms` and none may repeat.
//!
//! The rendering matches what common ISO-8601 duration libraries produce:
//! years are kept as `Y`, weeks are folded into days, hours are never folded
//! into days, and milliseconds become fractional seconds.

use std::fmt::Write as _;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use crate::error::ConvertError;

/// Grammar every Prometheus duration must fully match
pub const DURATION_GRAMMAR: &str =
    r"^(([0-9]+)y)?(([0-9]+)w)?(([0-9]+)d)?(([0-9]+)h)?(([0-9]+)m)?(([0-9]+)s)?(([0-9]+)ms)?$";

const MILLISECOND: u64 = 1;
const SECOND: u64 = 1000 * MILLISECOND;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;
/// A Prometheus year, approximated as 356 days
const YEAR: u64 = 356 * DAY;

fn duration_regex() -> &'static Regex {
    static DURATION_RE: OnceLock<Regex> = OnceLock::new();
    DURATION_RE.get_or_init(|| Regex::new(DURATION_GRAMMAR).expect("invalid duration regex"))
}

/// Parsed Prometheus duration, one field per unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromDuration {
    pub years: u64,
    pub weeks: u64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub millis: u64,
}

impl PromDuration {
    /// Parse a Prometheus duration string
    ///
    /// The whole string must match [`DURATION_GRAMMAR`]. The empty string
    /// matches and yields a zero duration; callers that need a non-empty
    /// value must reject it themselves.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::DurationFormat` when the string does not match,
    /// or when a component does not fit in a `u64`.
    pub fn parse(input: &str) -> Result<Self, ConvertError> {
        let format_error = || ConvertError::DurationFormat {
            input: input.to_string(),
            grammar: DURATION_GRAMMAR,
        };

        let caps = duration_regex().captures(input).ok_or_else(format_error)?;
        let component = |group: usize| -> Result<u64, ConvertError> {
            match caps.get(group) {
                Some(m) => m.as_str().parse::<u64>().map_err(|_| format_error()),
                None => Ok(0),
            }
        };

        Ok(Self {
            years: component(2)?,
            weeks: component(4)?,
            days: component(6)?,
            hours: component(8)?,
            minutes: component(10)?,
            seconds: component(12)?,
            millis: component(14)?,
        })
    }

    /// Whether every component is zero
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Total length, counting a year as 356 days and a week as 7 days
    ///
    /// Returns `None` on overflow.
    pub fn as_std_duration(&self) -> Option<Duration> {
        let parts = [
            (self.years, YEAR),
            (self.weeks, WEEK),
            (self.days, DAY),
            (self.hours, HOUR),
            (self.minutes, MINUTE),
            (self.seconds, SECOND),
            (self.millis, MILLISECOND),
        ];
        let mut total: u64 = 0;
        for (count, unit) in parts {
            total = total.checked_add(count.checked_mul(unit)?)?;
        }
        Some(Duration::from_millis(total))
    }

    /// Render as an ISO-8601 duration string
    ///
    /// Returns `None` if the time-of-day part overflows.
    pub fn to_iso8601(&self) -> Option<String> {
        if self.is_zero() {
            return Some("P0D".to_string());
        }

        let days = self.weeks.checked_mul(7)?.checked_add(self.days)?;
        let time_millis = [
            (self.hours, HOUR),
            (self.minutes, MINUTE),
            (self.seconds, SECOND),
            (self.millis, MILLISECOND),
        ]
        .into_iter()
        .try_fold(0u64, |acc, (count, unit)| {
            acc.checked_add(count.checked_mul(unit)?)
        })?;

        let hours = time_millis / HOUR;
        let minutes = (time_millis % HOUR) / MINUTE;
        let second_millis = time_millis % MINUTE;

        let mut out = String::from("P");
        if self.years > 0 {
            let _ = write!(out, "{}Y", self.years);
        }
        if days > 0 {
            let _ = write!(out, "{}D", days);
        }
        if time_millis > 0 {
            out.push('T');
            if hours > 0 {
                let _ = write!(out, "{}H", hours);
            }
            if minutes > 0 {
                let _ = write!(out, "{}M", minutes);
            }
            if second_millis > 0 {
                let _ = write!(out, "{}S", format_seconds(second_millis));
            }
        }
        Some(out)
    }
}

/// Format milliseconds as seconds with at most three decimals, trailing zeros trimmed
fn format_seconds(millis: u64) -> String {
    let whole = millis / SECOND;
    let fraction = millis % SECOND;
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:03}", fraction);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

/// Convert a Prometheus duration string to ISO-8601
///
/// ```
/// use az_prom_rules_converter::duration::prom_duration_to_iso8601;
///
/// assert_eq!(prom_duration_to_iso8601("1h2m").unwrap(), "PT1H2M");
/// assert_eq!(prom_duration_to_iso8601("2w").unwrap(), "P14D");
/// assert!(prom_duration_to_iso8601("PT1M").is_err());
/// ```
pub fn prom_duration_to_iso8601(input: &str) -> Result<String, ConvertError> {
    let parsed = PromDuration::parse(input)?;
    parsed.to_iso8601().ok_or_else(|| ConvertError::DurationFormat {
        input: input.to_string(),
        grammar: DURATION_GRAMMAR,
    })
}

/// Check an operator supplied interval, such as a default scrape interval
///
/// Same full-match rule as conversion, but the empty string is rejected.
pub fn is_valid_prom_duration(input: &str) -> bool {
    !input.is_empty() && PromDuration::parse(input).is_ok()
}
