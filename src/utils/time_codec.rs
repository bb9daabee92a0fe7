//! Conversions between hour/minute selections, milliseconds and clock strings

const MILLIS_PER_SECOND: u64 = 1_000;
const MILLIS_PER_MINUTE: u64 = 60_000;
const MILLIS_PER_HOUR: u64 = 3_600_000;

/// Convert an hour/minute selection into a duration in milliseconds.
///
/// Values outside 0-23 / 0-59 are not rejected; they scale arithmetically.
pub fn to_millis(hour: u32, minute: u32) -> u64 {
    u64::from(hour) * MILLIS_PER_HOUR + u64::from(minute) * MILLIS_PER_MINUTE
}

/// Split a duration into whole hours and the remaining whole minutes.
pub fn from_millis(millis: u64) -> (u32, u32) {
    let hour = millis / MILLIS_PER_HOUR;
    let minute = (millis % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE;
    (u32::try_from(hour).unwrap_or(u32::MAX), minute as u32)
}

/// Render milliseconds as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_clock(millis: u64) -> String {
    let hours = millis / MILLIS_PER_HOUR;
    let minutes = (millis % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE;
    let seconds = (millis % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Parse `MM:SS` or `HH:MM:SS` into milliseconds.
///
/// Anything else, including non-numeric parts, yields 0.
pub fn parse_clock(text: &str) -> u64 {
    let parts: Option<Vec<u64>> = text
        .trim()
        .split(':')
        .map(|part| part.trim().parse::<u64>().ok())
        .collect();

    match parts.as_deref() {
        Some([minutes, seconds]) => minutes * MILLIS_PER_MINUTE + seconds * MILLIS_PER_SECOND,
        Some([hours, minutes, seconds]) => {
            hours * MILLIS_PER_HOUR + minutes * MILLIS_PER_MINUTE + seconds * MILLIS_PER_SECOND
        }
        _ => 0,
    }
}
