//! Value parsers for the raw strings of a scraped bestlist.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Performance value of a result that could not be parsed. Fails validation.
pub const UNPARSABLE_PERFORMANCE: i32 = -1;

const HOURS_TO_HUNDREDTHS: i64 = 100 * 60 * 60;
const MINUTES_TO_HUNDREDTHS: i64 = 100 * 60;
const SECONDS_TO_HUNDREDTHS: i64 = 100;

lazy_static! {
    // H:M:S.hh with minutes and seconds below 60, or plain S.hh below 60
    static ref CLOCK_FORMAT: Regex =
        Regex::new(r"^(?:(?:(\d+):)?([0-5]?\d):)?([0-5]?\d)(?:\.(\d{1,2}))?$").unwrap();
    // M:S.hh with unbounded minutes
    static ref MINUTES_FORMAT: Regex = Regex::new(r"^(\d+):([0-5]?\d)(?:\.(\d{1,2}))?$").unwrap();
    // S.hh with unbounded seconds, also used for distances and heights
    static ref SECONDS_FORMAT: Regex = Regex::new(r"^(\d+)(?:\.(\d{1,2}))?$").unwrap();
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Parses a time, distance or height into hundredths.
///
/// Annotations such as `10.43_SR_U18` or a trailing second line are dropped before parsing.
/// Returns [`UNPARSABLE_PERFORMANCE`] for anything else.
pub fn parse_performance(value: &str) -> i32 {
    let value = value
        .split('\n')
        .next()
        .unwrap_or_default()
        .split('_')
        .next()
        .unwrap_or_default()
        .trim();

    let parts = if let Some(caps) = CLOCK_FORMAT.captures(value) {
        [group(&caps, 1), group(&caps, 2), group(&caps, 3), group(&caps, 4)]
    } else if let Some(caps) = MINUTES_FORMAT.captures(value) {
        [None, group(&caps, 1), group(&caps, 2), group(&caps, 3)]
    } else if let Some(caps) = SECONDS_FORMAT.captures(value) {
        [None, None, group(&caps, 1), group(&caps, 2)]
    } else {
        return UNPARSABLE_PERFORMANCE;
    };

    hundredths(parts).unwrap_or(UNPARSABLE_PERFORMANCE)
}

fn group<'t>(caps: &Captures<'t>, index: usize) -> Option<&'t str> {
    caps.get(index).map(|m| m.as_str())
}

fn hundredths([hours, minutes, seconds, fraction]: [Option<&str>; 4]) -> Option<i32> {
    let number = |part: Option<&str>| -> Option<i64> {
        match part {
            Some(digits) => digits.parse::<i64>().ok(),
            None => Some(0),
        }
    };

    // "5" means 50 hundredths
    let fraction = fraction.map(|digits| format!("{digits:0<2}"));

    let total = number(fraction.as_deref())?
        .checked_add(number(seconds)?.checked_mul(SECONDS_TO_HUNDREDTHS)?)?
        .checked_add(number(minutes)?.checked_mul(MINUTES_TO_HUNDREDTHS)?)?
        .checked_add(number(hours)?.checked_mul(HOURS_TO_HUNDREDTHS)?)?;

    i32::try_from(total).ok()
}

/// Empty wind means the discipline has no wind measurement. Garbage becomes NaN so that the
/// record is rejected by validation rather than silently treated as wind-less.
pub fn parse_wind(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.parse::<f64>().unwrap_or(f64::NAN))
}

pub fn parse_not_homologated(value: &str) -> bool {
    value.trim() == "X"
}
