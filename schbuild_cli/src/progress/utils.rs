//! Formatting helpers shared by progress and report output

use std::time::Duration;

/// Format a duration as a short human-readable string
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        return format!("{millis}ms");
    }

    let seconds = duration.as_secs();
    if seconds < 60 {
        format!("{:.1}s", duration.as_secs_f64())
    } else if seconds < 3600 {
        let minutes = seconds / 60;
        match seconds % 60 {
            0 => format!("{minutes}m"),
            rest => format!("{minutes}m {rest}s"),
        }
    } else {
        let hours = seconds / 3600;
        match (seconds % 3600) / 60 {
            0 => format!("{hours}h"),
            minutes => format!("{hours}h {minutes}m"),
        }
    }
}
