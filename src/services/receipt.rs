use chrono::{Datelike, Utc};

/// How many fresh candidates `create` tries before giving up. The unique
/// index on `receipt` is the actual correctness mechanism; the count-based
/// sequence below is only a numbering convention.
pub const MAX_ALLOCATION_ATTEMPTS: usize = 3;

pub fn current_year() -> i32 {
    Utc::now().year()
}

/// Builds `<PREFIX>-<YEAR>-<SEQ>` with SEQ zero-padded to 4 digits, e.g.
/// `LW-2025-0001`. SEQ derives from the all-time invoice count, so numbers
/// do not restart each year and two racing creations can produce the same
/// candidate; callers must treat a unique violation on insert as a signal
/// to retry with a bumped sequence.
pub fn candidate(prefix: &str, year: i32, sequence: i64) -> String {
    format!("{}-{}-{:04}", prefix, year, sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_the_receipt_number() {
        assert_eq!(candidate("LW", 2025, 1), "LW-2025-0001");
        assert_eq!(candidate("LW", 2025, 42), "LW-2025-0042");
        assert_eq!(candidate("LW", 2026, 9999), "LW-2026-9999");
    }

    #[test]
    fn sequence_widens_past_four_digits_instead_of_wrapping() {
        assert_eq!(candidate("LW", 2025, 10001), "LW-2025-10001");
    }

    #[test]
    fn matches_the_public_receipt_shape() {
        let receipt = candidate("LW", current_year(), 7);
        let parts: Vec<&str> = receipt.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "LW");
        assert_eq!(parts[2].len(), 4);
    }
}
