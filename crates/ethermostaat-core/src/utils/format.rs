use chrono::Duration;

/// Format a temperature for display, e.g. `21.5 °C`
pub fn format_celsius(value: f64) -> String {
    format!("{:.1} °C", value)
}

/// Human readable age of a cached reading
pub fn format_age(age: Duration) -> String {
    let seconds = age.num_seconds();
    if seconds < 1 {
        // Also covers clock skew
        "just now".to_string()
    } else if seconds < 60 {
        format!("{}s ago", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s ago", seconds / 60, seconds % 60)
    } else {
        format!("{}h ago", seconds / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_celsius() {
        assert_eq!(format_celsius(21.5), "21.5 °C");
        assert_eq!(format_celsius(5.0), "5.0 °C");
        assert_eq!(format_celsius(19.24), "19.2 °C");
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::seconds(-4)), "just now");
        assert_eq!(format_age(Duration::zero()), "just now");
        assert_eq!(format_age(Duration::seconds(42)), "42s ago");
        assert_eq!(format_age(Duration::seconds(125)), "2m 5s ago");
        assert_eq!(format_age(Duration::seconds(7300)), "2h ago");
    }
}
