/// Formats a duration using its largest whole units: `"2h 5min"` from one
/// hour upwards, `"12min"` from one minute upwards, `"42s"` below.
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;

    if hours > 0 {
        format!("{}h {}min", hours, minutes)
    } else if minutes > 0 {
        format!("{}min", minutes)
    } else {
        format!("{}s", total_seconds)
    }
}

/// Formats meters as kilometers with one decimal place.
pub fn format_distance(meters: f64) -> String {
    format!("{:.1} km", meters / 1000.0)
}
