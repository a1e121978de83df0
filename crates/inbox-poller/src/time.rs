use chrono::{DateTime, NaiveDateTime, Utc};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a server timestamp. Offsets are honoured; naive timestamps are
/// taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Human "time ago" label, falling back to a plain date after a week.
pub fn format_relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return ago(minutes, "minute");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return ago(hours, "hour");
    }

    let days = hours / 24;
    if days < 7 {
        return ago(days, "day");
    }

    then.format("%Y-%m-%d").to_string()
}

fn ago(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let ts = parse_timestamp("2024-05-01T14:00:00+02:00").unwrap();
        assert_eq!(ts, base());
    }

    #[test]
    fn naive_timestamps_are_utc() {
        assert_eq!(parse_timestamp("2024-05-01T12:00:00").unwrap(), base());
        assert_eq!(parse_timestamp("2024-05-01 12:00:00.000").unwrap(), base());
    }

    #[test]
    fn garbage_does_not_parse() {
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn relative_time_buckets() {
        let now = base();
        assert_eq!(format_relative_time(now - Duration::seconds(59), now), "just now");
        assert_eq!(format_relative_time(now - Duration::seconds(60), now), "1 minute ago");
        assert_eq!(format_relative_time(now - Duration::minutes(45), now), "45 minutes ago");
        assert_eq!(format_relative_time(now - Duration::hours(1), now), "1 hour ago");
        assert_eq!(format_relative_time(now - Duration::hours(23), now), "23 hours ago");
        assert_eq!(format_relative_time(now - Duration::days(1), now), "1 day ago");
        assert_eq!(format_relative_time(now - Duration::days(6), now), "6 days ago");
        assert_eq!(format_relative_time(now - Duration::days(8), now), "2024-04-23");
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        let now = base();
        assert_eq!(format_relative_time(now + Duration::minutes(5), now), "just now");
    }
}
