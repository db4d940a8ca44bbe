use crate::when::{parse_date, parse_time, parse_when};
use chrono::{Duration, Local, NaiveDateTime};

const RESERVATION_MINUTES: i64 = 90;

/// A calendar entry for a confirmed reservation. Building one has no
/// network or state effects; it only formats an external link.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// True when the date/time strings could not be parsed and the start
    /// was substituted with the current time. Surfaces as a warning.
    pub approximate: bool,
}

impl CalendarEvent {
    pub fn google_url(&self) -> String {
        let fmt = "%Y%m%dT%H%M%S";
        format!(
            "https://calendar.google.com/calendar/render?action=TEMPLATE&text={}&dates={}/{}&details={}&location={}",
            urlencoding::encode(&self.title),
            self.start.format(fmt),
            self.end.format(fmt),
            urlencoding::encode(&self.description),
            urlencoding::encode(&self.location),
        )
    }
}

/// Derive the event start from the reservation's date and time strings.
///
/// Accepts ISO dates as well as the human-readable forms older records
/// carry. A parseable time with an unparseable date lands on today; when
/// nothing parses the start is simply now. Never fails.
pub fn calendar_event(
    restaurant_name: &str,
    location: &str,
    date: &str,
    time: &str,
    people: u32,
) -> CalendarEvent {
    let now = Local::now().naive_local();

    let (start, approximate) = match parse_when(date, time) {
        Some(start) => (start, false),
        None => match (parse_date(date), parse_time(time)) {
            (None, Some(t)) => (now.date().and_time(t), true),
            _ => (now, true),
        },
    };

    let end = start + Duration::minutes(RESERVATION_MINUTES);

    CalendarEvent {
        title: format!("Reservation at {}", restaurant_name),
        description: format!("Table for {} people", people),
        location: location.to_string(),
        start,
        end,
        approximate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_date_time_produces_exact_window() {
        let event = calendar_event("Trattoria", "1 Main St", "2025-05-04", "19:00", 2);

        assert!(!event.approximate);
        assert_eq!(event.start.to_string(), "2025-05-04 19:00:00");
        assert_eq!(event.end.to_string(), "2025-05-04 20:30:00");
    }

    #[test]
    fn test_human_readable_date() {
        let event = calendar_event("Trattoria", "", "May 4, 2025", "19:00", 4);
        assert!(!event.approximate);
        assert_eq!(event.start.to_string(), "2025-05-04 19:00:00");
    }

    #[test]
    fn test_unparseable_date_falls_back_to_now() {
        let event = calendar_event("Trattoria", "", "not a date", "not a time", 2);

        assert!(event.approximate);
        assert_eq!(event.end - event.start, Duration::minutes(90));
        // The link is still well-formed
        let url = event.google_url();
        assert!(url.starts_with("https://calendar.google.com/calendar/render?action=TEMPLATE"));
        assert!(url.contains("&dates="));
    }

    #[test]
    fn test_google_url_encodes_fields() {
        let event = calendar_event("Fish & Chips", "12 Pier Rd, San Jose", "2025-05-04", "19:00", 2);
        let url = event.google_url();

        assert!(url.contains("text=Reservation%20at%20Fish%20%26%20Chips"));
        assert!(url.contains("dates=20250504T190000/20250504T203000"));
        assert!(url.contains("location=12%20Pier%20Rd%2C%20San%20Jose"));
    }
}
