//! Time and timestamp helpers.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// UTC timestamp used for cycle instants and lockout expiry.
pub type Timestamp = DateTime<Utc>;

/// Wall-clock time in the controller's configured zone.
pub type LocalTime = DateTime<Tz>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Project a UTC instant onto the wall clock of `tz`.
#[must_use]
pub fn to_local(ts: Timestamp, tz: Tz) -> LocalTime {
    ts.with_timezone(&tz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_project_onto_madrid_wall_clock_in_winter() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 15, 5, 45, 0).unwrap();
        let local = to_local(ts, chrono_tz::Europe::Madrid);
        assert_eq!(local.hour(), 6);
        assert_eq!(local.minute(), 45);
    }

    #[test]
    fn should_project_onto_madrid_wall_clock_in_summer() {
        let ts = Utc.with_ymd_and_hms(2025, 7, 15, 5, 45, 0).unwrap();
        let local = to_local(ts, chrono_tz::Europe::Madrid);
        assert_eq!(local.hour(), 7);
    }
}
