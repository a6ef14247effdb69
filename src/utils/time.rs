use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Current time rendered the way stored deadlines are, e.g. `2024-05-01T12:00:00.000Z`,
/// so lexical comparison agrees with chronological order.
pub fn time_now() -> String {
    iso_timestamp(Utc::now())
}

pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Reads an RFC 3339 timestamp with any offset, or a bare date taken as
/// midnight UTC.
pub fn parse_deadline(deadline: &str) -> Option<DateTime<Utc>> {
    let deadline = deadline.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(deadline) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(deadline, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn renders_like_javascript_iso_strings() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(iso_timestamp(at), "2024-05-01T12:00:00.000Z");
    }

    #[test]
    fn deadlines_are_read_as_utc_instants() {
        let offset = parse_deadline("2030-01-31T10:00:00+06:00").map(iso_timestamp);
        assert_eq!(offset.as_deref(), Some("2030-01-31T04:00:00.000Z"));

        let date = parse_deadline("2030-01-31").map(iso_timestamp);
        assert_eq!(date.as_deref(), Some("2030-01-31T00:00:00.000Z"));

        assert!(parse_deadline("31/01/2030").is_none());
    }
}
