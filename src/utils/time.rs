use chrono::{DateTime, Duration, Utc};

/// Assumed when a provider omits or garbles a TTL.
pub const DEFAULT_TTL_SECONDS: i64 = 3600;

/// Longest provider TTL taken at face value.
const MAX_TTL_SECONDS: i64 = 366 * 24 * 3600;

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Absolute instant `seconds` from `from`, as reported by a provider TTL.
/// A negative or implausibly long TTL counts as the default one.
pub fn expires_after(from: DateTime<Utc>, seconds: i64) -> DateTime<Utc> {
    let seconds = if (0..=MAX_TTL_SECONDS).contains(&seconds) {
        seconds
    } else {
        DEFAULT_TTL_SECONDS
    };
    from.checked_add_signed(Duration::seconds(seconds)).unwrap_or(from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn provider_ttl_is_added_to_now() {
        assert_eq!(expires_after(noon(), 3599), noon() + Duration::seconds(3599));
        assert_eq!(expires_after(noon(), 0), noon());
    }

    #[test]
    fn absurd_ttl_falls_back_to_default() {
        let fallback = noon() + Duration::seconds(DEFAULT_TTL_SECONDS);
        assert_eq!(expires_after(noon(), i64::MAX), fallback);
        assert_eq!(expires_after(noon(), i64::MIN), fallback);
        assert_eq!(expires_after(noon(), -30), fallback);
    }

    #[test]
    fn ttl_past_the_calendar_end_does_not_panic() {
        assert_eq!(expires_after(DateTime::<Utc>::MAX_UTC, 60), DateTime::<Utc>::MAX_UTC);
    }
}
