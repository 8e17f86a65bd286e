use chrono::{DateTime, Duration, Utc};

/// Sequential fixed-length interview slots starting at the requested time.
///
/// The cursor only advances when a slot is actually consumed: a candidate
/// whose event creation fails does not leave a hole in the schedule, and
/// the next candidate gets the same window.
#[derive(Debug)]
pub struct SlotCursor {
    next_start: DateTime<Utc>,
    length: Duration,
}

impl SlotCursor {
    pub fn new(start: DateTime<Utc>, slot_minutes: i64) -> Self {
        Self {
            next_start: start,
            length: Duration::minutes(slot_minutes.max(1)),
        }
    }

    /// The window the next interview would occupy.
    pub fn current(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.next_start, self.next_start + self.length)
    }

    /// Consumes the current slot.
    pub fn advance(&mut self) {
        self.next_start += self.length;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_slots_are_sequential() {
        let mut cursor = SlotCursor::new(start(), 30);

        let (s1, e1) = cursor.current();
        cursor.advance();
        let (s2, e2) = cursor.current();

        assert_eq!(s1, start());
        assert_eq!(e1, s2);
        assert_eq!(e2 - s2, Duration::minutes(30));
    }

    #[test]
    fn test_failed_candidate_reuses_window() {
        let cursor = SlotCursor::new(start(), 30);

        // No advance between reads; a failure keeps the window available.
        let first = cursor.current();
        let second = cursor.current();
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_slot_length() {
        let cursor = SlotCursor::new(start(), 45);
        let (s, e) = cursor.current();
        assert_eq!(e - s, Duration::minutes(45));
    }

    #[test]
    fn test_zero_length_clamped() {
        let cursor = SlotCursor::new(start(), 0);
        let (s, e) = cursor.current();
        assert!(e > s);
    }
}
