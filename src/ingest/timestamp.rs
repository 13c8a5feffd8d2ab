// src/ingest/timestamp.rs
use chrono::{DateTime, Utc};
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

/// Parse an RSS (RFC 2822) or Atom (RFC 3339) timestamp into UTC.
///
/// `time` handles the strict forms; chrono's RFC 2822 parser picks up the
/// legacy zone names (`GMT`, `EST`, ...) that many feeds still emit.
pub fn parse_feed_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339).or_else(|_| OffsetDateTime::parse(s, &Rfc2822))
    {
        return DateTime::<Utc>::from_timestamp(dt.unix_timestamp(), dt.nanosecond());
    }

    DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rfc2822_with_numeric_offset() {
        let got = parse_feed_timestamp("Mon, 19 Oct 2026 08:30:00 +0000").unwrap();
        assert_eq!(got, Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap());
    }

    #[test]
    fn rfc2822_with_zone_name() {
        let got = parse_feed_timestamp("Mon, 19 Oct 2026 08:30:00 GMT").unwrap();
        assert_eq!(got, Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap());
    }

    #[test]
    fn rfc3339_is_converted_to_utc() {
        let got = parse_feed_timestamp(" 2026-10-19T08:30:00+02:00 ").unwrap();
        assert_eq!(got, Utc.with_ymd_and_hms(2026, 10, 19, 6, 30, 0).unwrap());
    }

    #[test]
    fn garbage_and_blank_are_rejected() {
        assert!(parse_feed_timestamp("").is_none());
        assert!(parse_feed_timestamp("yesterday-ish").is_none());
    }
}
