//! Civil time normalization for the time-travel form.
//!
//! Operators enter a calendar date, a 12-hour `HH:MM` wall-clock time, and
//! AM/PM. That civil timestamp is interpreted in one fixed, configured
//! offset and converted to UTC before it ever reaches the wire. The
//! conversion is deterministic: the same input always yields the same
//! instant, and projecting the instant back into the input offset
//! reproduces the civil fields.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Timelike, Utc};

use crate::error::InvalidInput;
use crate::types::LogWindow;

/// Default minutes covered by a derived comparison window.
pub const CRASH_WINDOW_MINUTES: i64 = 7;

/// Half of the day, as entered on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Meridiem::Am => "AM",
            Meridiem::Pm => "PM",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Meridiem::Am => Meridiem::Pm,
            Meridiem::Pm => Meridiem::Am,
        }
    }
}

impl std::str::FromStr for Meridiem {
    type Err = InvalidInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AM" => Ok(Meridiem::Am),
            "PM" => Ok(Meridiem::Pm),
            other => Err(InvalidInput(format!("meridiem must be AM or PM, got '{other}'"))),
        }
    }
}

/// Parse a `HH:MM` 12-hour clock string into `(hour, minute)`.
///
/// Hour must be in 1..=12 and minute in 0..=59; anything else is rejected
/// before submission.
fn parse_clock(time: &str) -> Result<(u32, u32), InvalidInput> {
    let (h, m) = time
        .split_once(':')
        .ok_or_else(|| InvalidInput(format!("time '{time}' does not match HH:MM")))?;
    let hour: u32 = h
        .trim()
        .parse()
        .map_err(|_| InvalidInput(format!("time '{time}' does not match HH:MM")))?;
    let minute: u32 = m
        .trim()
        .parse()
        .map_err(|_| InvalidInput(format!("time '{time}' does not match HH:MM")))?;
    if !(1..=12).contains(&hour) {
        return Err(InvalidInput(format!("hour {hour} out of range 1-12")));
    }
    if minute > 59 {
        return Err(InvalidInput(format!("minute {minute} out of range 0-59")));
    }
    Ok((hour, minute))
}

/// 12-hour + meridiem to 24-hour. `12 AM` is midnight and `12 PM` is noon;
/// neither is adjusted twice.
fn to_24h(hour: u32, meridiem: Meridiem) -> u32 {
    match (meridiem, hour) {
        (Meridiem::Am, 12) => 0,
        (Meridiem::Pm, 12) => 12,
        (Meridiem::Pm, h) => h + 12,
        (Meridiem::Am, h) => h,
    }
}

/// Convert civil `(date, "HH:MM", meridiem)` in the given fixed offset to
/// an absolute UTC instant.
pub fn to_absolute_instant(
    zone: FixedOffset,
    date: NaiveDate,
    time: &str,
    meridiem: Meridiem,
) -> Result<DateTime<Utc>, InvalidInput> {
    let (hour, minute) = parse_clock(time)?;
    let naive = date
        .and_hms_opt(to_24h(hour, meridiem), minute, 0)
        .ok_or_else(|| InvalidInput(format!("time '{time}' is not a valid wall-clock time")))?;
    let local = zone
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| InvalidInput(format!("time '{time}' is ambiguous in the input zone")))?;
    Ok(local.with_timezone(&Utc))
}

/// Bounded window starting at `instant` and extending `minutes` forward.
/// `minutes` must be non-negative so `from <= to` holds.
pub fn derive_window(
    instant: DateTime<Utc>,
    minutes: i64,
    label: Option<String>,
) -> Result<LogWindow, InvalidInput> {
    if minutes < 0 {
        return Err(InvalidInput(format!("window length {minutes} is negative")));
    }
    Ok(LogWindow {
        from: instant,
        to: instant + Duration::minutes(minutes),
        label,
    })
}

/// Project an instant back into the input offset as `(date, "HH:MM",
/// meridiem)`, the inverse of [`to_absolute_instant`].
pub fn to_civil(zone: FixedOffset, instant: DateTime<Utc>) -> (NaiveDate, String, Meridiem) {
    let local = instant.with_timezone(&zone);
    let (is_pm, hour12) = local.hour12();
    let meridiem = if is_pm { Meridiem::Pm } else { Meridiem::Am };
    (
        local.date_naive(),
        format!("{:02}:{:02}", hour12, local.minute()),
        meridiem,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 1800).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn twelve_am_is_midnight() {
        let t = to_absolute_instant(ist(), date(2026, 2, 1), "12:00", Meridiem::Am).unwrap();
        let local = t.with_timezone(&ist());
        assert_eq!(local.hour(), 0);
        assert_eq!(local.minute(), 0);
    }

    #[test]
    fn twelve_pm_is_noon() {
        let t = to_absolute_instant(ist(), date(2026, 2, 1), "12:00", Meridiem::Pm).unwrap();
        assert_eq!(t.with_timezone(&ist()).hour(), 12);
    }

    #[test]
    fn pm_adds_twelve() {
        let t = to_absolute_instant(ist(), date(2026, 2, 1), "09:22", Meridiem::Pm).unwrap();
        assert_eq!(t.with_timezone(&ist()).hour(), 21);
    }

    #[test]
    fn malformed_time_is_invalid_input() {
        assert!(to_absolute_instant(ist(), date(2026, 2, 1), "9.22", Meridiem::Am).is_err());
        assert!(to_absolute_instant(ist(), date(2026, 2, 1), "13:00", Meridiem::Am).is_err());
        assert!(to_absolute_instant(ist(), date(2026, 2, 1), "0:15", Meridiem::Am).is_err());
        assert!(to_absolute_instant(ist(), date(2026, 2, 1), "11:60", Meridiem::Pm).is_err());
    }

    #[test]
    fn round_trips_through_the_input_zone() {
        for (time, meridiem) in [
            ("12:00", Meridiem::Am),
            ("12:30", Meridiem::Pm),
            ("01:05", Meridiem::Am),
            ("11:59", Meridiem::Pm),
            ("06:45", Meridiem::Pm),
        ] {
            let d = date(2026, 2, 1);
            let instant = to_absolute_instant(ist(), d, time, meridiem).unwrap();
            let (back_date, back_time, back_meridiem) = to_civil(ist(), instant);
            assert_eq!(back_date, d);
            assert_eq!(back_time, time);
            assert_eq!(back_meridiem, meridiem);
        }
    }

    #[test]
    fn derive_window_spans_requested_minutes() {
        let t = Utc::now();
        let w = derive_window(t, CRASH_WINDOW_MINUTES, Some("Crash Period".into())).unwrap();
        assert_eq!(w.from, t);
        assert_eq!(w.to - w.from, Duration::minutes(7));
        assert!(w.from <= w.to);
    }

    #[test]
    fn zero_length_window_is_allowed_negative_is_not() {
        let t = Utc::now();
        let w = derive_window(t, 0, None).unwrap();
        assert_eq!(w.from, w.to);
        assert!(derive_window(t, -1, None).is_err());
    }
}
