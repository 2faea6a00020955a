//! Clip duration labels.

/// Milliseconds in one minute.
const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// Formats a clip length as `minutes:seconds`.
///
/// Minutes are rounded to the nearest whole minute and seconds are the
/// rounded remainder against that value, so a clip in the second half of
/// a minute yields a negative seconds part (`50_000` becomes `"1:0-10"`).
/// Seconds below ten get a leading zero. Rounding is half-up, matching the
/// labels already stored by earlier releases.
pub fn format_duration(millis: u64) -> String {
    let minutes = millis as f64 / MILLIS_PER_MINUTE;
    let minutes_display = round_half_up(minutes);
    let seconds = round_half_up((minutes - minutes_display as f64) * 60.0);

    if seconds < 10 {
        format!("{minutes_display}:0{seconds}")
    } else {
        format!("{minutes_display}:{seconds}")
    }
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
