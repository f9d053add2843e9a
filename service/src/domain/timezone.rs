use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

/// Wall-clock layout used in forms; `T` is accepted in place of the space.
pub const LOCAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const SHORT_LOCAL_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimezoneError {
    #[error("unknown time zone '{0}'")]
    UnknownZone(String),
    #[error("Enter a valid date/time.")]
    Unparsable(String),
    #[error("{local} does not exist in {zone}")]
    Nonexistent { local: NaiveDateTime, zone: Tz },
    #[error("offset {offset} does not apply to {local} in {zone}")]
    OffsetMismatch {
        local: NaiveDateTime,
        offset: FixedOffset,
        zone: Tz,
    },
}

pub fn zone(name: &str) -> Result<Tz, TimezoneError> {
    name.parse::<Tz>()
        .map_err(|_| TimezoneError::UnknownZone(name.to_string()))
}

pub fn to_local(instant: DateTime<Utc>, zone: Tz) -> DateTime<Tz> {
    instant.with_timezone(&zone)
}

/// Interprets a wall-clock time in `zone`.
/// A repeated hour resolves to its first occurrence; a skipped hour is an error.
pub fn from_local(local: NaiveDateTime, zone: Tz) -> Result<DateTime<Utc>, TimezoneError> {
    match zone.from_local_datetime(&local) {
        LocalResult::Single(instant) => Ok(instant.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(TimezoneError::Nonexistent { local, zone }),
    }
}

/// Form value of `instant` in `zone`.
/// The UTC offset is appended only when the wall-clock time occurs twice,
/// so [`parse_local`] always gets the same instant back.
pub fn format_local(instant: DateTime<Utc>, zone: Tz) -> String {
    let local = to_local(instant, zone);
    let naive = local.naive_local();
    let text = naive.format(LOCAL_FORMAT).to_string();
    match zone.from_local_datetime(&naive) {
        LocalResult::Ambiguous(..) => format!("{}{}", text, local.format("%:z")),
        _ => text,
    }
}

/// Human readable local time with the zone abbreviation, e.g. `2014-01-01 12:00 PST`
pub fn display_local(instant: DateTime<Utc>, zone: Tz) -> String {
    to_local(instant, zone).format("%Y-%m-%d %H:%M %Z").to_string()
}

/// Parses a form value in `zone`: `YYYY-MM-DD HH:MM[:SS[.f]]`, optionally
/// followed by `Z` or `±HH:MM`. A given offset must be one the zone uses at
/// that wall-clock time.
pub fn parse_local(value: &str, zone: Tz) -> Result<DateTime<Utc>, TimezoneError> {
    let value = value.trim();
    let (text, offset) = split_offset(value)?;
    let local = parse_naive(text).ok_or_else(|| TimezoneError::Unparsable(value.to_string()))?;

    let Some(offset) = offset else {
        return from_local(local, zone);
    };

    let candidates = zone.from_local_datetime(&local);
    [candidates.earliest(), candidates.latest()]
        .into_iter()
        .flatten()
        .find(|candidate| candidate.offset().fix() == offset)
        .map(|candidate| candidate.with_timezone(&Utc))
        .ok_or(TimezoneError::OffsetMismatch {
            local,
            offset,
            zone,
        })
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    let normalized = text.trim().replacen('T', " ", 1);
    [LOCAL_FORMAT, SHORT_LOCAL_FORMAT]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&normalized, format).ok())
}

fn split_offset(value: &str) -> Result<(&str, Option<FixedOffset>), TimezoneError> {
    if let Some(text) = value.strip_suffix('Z') {
        return Ok((text, FixedOffset::east_opt(0)));
    }
    if value.len() <= 6 || !value.is_char_boundary(value.len() - 6) {
        return Ok((value, None));
    }

    let (text, tail) = value.split_at(value.len() - 6);
    let bytes = tail.as_bytes();
    let sign = match bytes[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return Ok((value, None)),
    };
    if bytes[3] != b':' {
        return Ok((value, None));
    }

    let unparsable = || TimezoneError::Unparsable(value.to_string());
    let hours: i32 = tail[1..3].parse().map_err(|_| unparsable())?;
    let minutes: i32 = tail[4..6].parse().map_err(|_| unparsable())?;
    let offset = FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(unparsable)?;
    Ok((text, Some(offset)))
}
