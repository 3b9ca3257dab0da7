use chrono_tz::Tz;
use std::str::FromStr;

fn is_known(timezone: &str) -> bool {
    !timezone.is_empty() && Tz::from_str(timezone).is_ok()
}

/// Detects the system timezone, falling back to UTC if detection fails
pub fn detect_system_timezone() -> String {
    if let Ok(tz) = std::env::var("TZ") {
        if is_known(&tz) {
            return tz;
        }
    }

    if let Ok(tz) = iana_time_zone::get_timezone() {
        if is_known(&tz) {
            return tz;
        }
    }

    tracing::debug!("could not detect the system timezone, using UTC");
    "UTC".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detected_timezone_is_valid() {
        let tz = detect_system_timezone();
        assert!(Tz::from_str(&tz).is_ok());
    }
}
