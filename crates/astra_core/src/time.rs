//! Timestamp representation shared by every subsystem.
//!
//! Time enters the engine only as explicit arguments. Nothing in this
//! crate reads a clock; callers pass the authoritative "now" and the
//! engine advances state up to it.

/// Milliseconds since the Unix epoch.
///
/// Matches the persisted representation, so loaded state and fresh
/// state compare directly.
pub type Timestamp = i64;

/// Milliseconds per second.
pub const MS_PER_SECOND: i64 = 1_000;
/// Milliseconds per minute.
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
/// Milliseconds per hour.
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
/// Milliseconds per day.
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_compose() {
        assert_eq!(MS_PER_HOUR, 3_600_000);
        assert_eq!(MS_PER_DAY, 86_400_000);
    }
}
