//! Reading and writing `createdAt` instants.
//!
//! Written instants use the browser `toISOString` form: UTC, millisecond
//! precision, `Z`. Years outside 0000..=9999 use the signed six digit
//! expanded form (`+010000-01-01T00:00:00.000Z`, `-000001-...`), and the
//! parser accepts that form back so every written instant reloads.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use regex::{Captures, Regex};

static EXPANDED_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([+-])([0-9]{4,6})-([0-9]{2})-([0-9]{2})T([0-9]{2}):([0-9]{2}):([0-9]{2})(?:\.([0-9]{1,9}))?(Z|[+-][0-9]{2}:?[0-9]{2})$",
    )
    .expect("valid regex")
});

static YEAR_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4})(?:-([0-9]{2}))?$").expect("valid regex"));

/// Offset-less date-time forms, read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Date-time forms carrying an offset with or without a colon.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Render an instant the way browsers do.
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    let year = instant.year();
    if (0..=9999).contains(&year) {
        return instant.to_rfc3339_opts(SecondsFormat::Millis, true);
    }
    let sign = if year < 0 { '-' } else { '+' };
    format!(
        "{sign}{:06}{}",
        year.unsigned_abs(),
        instant.format("-%m-%dT%H:%M:%S%.3fZ")
    )
}

/// Parse the instant forms found in stored data.
///
/// Accepted: RFC 3339, RFC 2822 (`toUTCString`), ISO date-times with a
/// `T` or space separator and an optional `+hhmm`/`+hh:mm` offset, signed
/// expanded years, `YYYY-MM-DD`, `YYYY-MM` and `YYYY`. Forms without an
/// offset are read as UTC.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    if let Some(caps) = EXPANDED_YEAR.captures(raw) {
        return parse_expanded(&caps);
    }
    for format in OFFSET_FORMATS {
        if let Ok(instant) = DateTime::parse_from_str(raw, format) {
            return Some(instant.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return utc_midnight(date);
    }
    if let Some(caps) = YEAR_MONTH.captures(raw) {
        let year = caps[1].parse().ok()?;
        let month = match caps.get(2) {
            Some(m) => m.as_str().parse().ok()?,
            None => 1,
        };
        return utc_midnight(NaiveDate::from_ymd_opt(year, month, 1)?);
    }
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|instant| instant.with_timezone(&Utc))
}

fn utc_midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn parse_expanded(caps: &Captures<'_>) -> Option<DateTime<Utc>> {
    let magnitude: i32 = caps[2].parse().ok()?;
    let year = if &caps[1] == "-" { -magnitude } else { magnitude };
    let number = |i: usize| caps[i].parse::<u32>().ok();

    let nanos = match caps.get(8) {
        Some(frac) => format!("{:0<9}", frac.as_str()).parse::<u32>().ok()?,
        None => 0,
    };
    let naive = NaiveDate::from_ymd_opt(year, number(3)?, number(4)?)?
        .and_hms_nano_opt(number(5)?, number(6)?, number(7)?, nanos)?;

    let offset = match &caps[9] {
        "Z" => 0,
        zone => {
            let digits = zone[1..].replace(':', "");
            let hours: i32 = digits[..2].parse().ok()?;
            let minutes: i32 = digits[2..].parse().ok()?;
            let seconds = hours * 3600 + minutes * 60;
            if zone.starts_with('-') {
                -seconds
            } else {
                seconds
            }
        }
    };
    FixedOffset::east_opt(offset)?
        .from_local_datetime(&naive)
        .single()
        .map(|instant| instant.with_timezone(&Utc))
}
