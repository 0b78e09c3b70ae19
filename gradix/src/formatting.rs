use time::format_description::well_known;
use time::OffsetDateTime;

/// Formats a number of seconds as "h:mm:ss".
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours}:{minutes:02}:{secs:02}")
}

/// Formats a distance in metres as km with 2 decimal places.
pub fn format_km(metres: f64) -> String {
    format!("{:.2} km", metres / 1000.0)
}

/// Formats a speed in m/s as km/h with 1 decimal place.
pub fn format_kmh(metres_per_second: f64) -> String {
    format!("{:.1} km/h", metres_per_second * 3.6)
}

/// Formats 'date' into a string like "2024-09-01T05:10:44Z".
/// This is the format that GPX files contain.
pub fn format_utc_date(date: &OffsetDateTime) -> String {
    date.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| date.to_string())
}

/// Formats an optional value, showing "-" when it is absent.
pub fn or_dash<T>(value: Option<T>, f: impl FnOnce(T) -> String) -> String {
    value.map(f).unwrap_or_else(|| "-".to_owned())
}
