//! Wall-clock formatting for chat-log timestamps.
//!
//! The format is a user-visible contract shared with the web clients:
//! 12-hour clock in a fixed UTC-4 offset, no leading zero on hours,
//! two-digit minutes, lowercase `am`/`pm` with no space, e.g. `3:07pm`.

use time::{OffsetDateTime, UtcOffset};

/// Chat timestamps are pinned to UTC-4 regardless of server locale.
const CHAT_OFFSET: UtcOffset = match UtcOffset::from_hms(-4, 0, 0) {
    Ok(offset) => offset,
    Err(_) => panic!("constant offset is in range"),
};

/// Format an instant as a chat-log timestamp.
pub fn clock_time(now: OffsetDateTime) -> String {
    let local = now.to_offset(CHAT_OFFSET);
    let hour = local.hour();
    let twelve = match hour % 12 {
        0 => 12,
        h => h,
    };
    let suffix = if hour < 12 { "am" } else { "pm" };
    format!("{}:{:02}{}", twelve, local.minute(), suffix)
}

/// [`clock_time`] for the current instant.
pub fn current_clock_time() -> String {
    clock_time(OffsetDateTime::now_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_utc(hour: i64, minute: i64) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(hour * 3600 + minute * 60).expect("valid timestamp")
    }

    #[test]
    fn afternoon_has_no_leading_hour_zero() {
        // 19:07 UTC is 3:07pm at UTC-4.
        assert_eq!(clock_time(at_utc(19, 7)), "3:07pm");
    }

    #[test]
    fn minutes_are_zero_padded() {
        assert_eq!(clock_time(at_utc(13, 5)), "9:05am");
    }

    #[test]
    fn midnight_and_noon_render_as_twelve() {
        // 04:00 UTC is midnight at UTC-4.
        assert_eq!(clock_time(at_utc(4, 0)), "12:00am");
        // 16:00 UTC is noon at UTC-4.
        assert_eq!(clock_time(at_utc(16, 0)), "12:00pm");
    }

    #[test]
    fn offset_wraps_across_the_date_line() {
        // 01:30 UTC is 9:30pm the previous day at UTC-4.
        assert_eq!(clock_time(at_utc(1, 30)), "9:30pm");
    }
}
