use chrono::Utc;
use sha2::{Digest, Sha256};

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Scales a major-unit decimal amount to whole minor units.
/// `f64::round` rounds half away from zero, matching how the admin
/// form has always converted entered amounts.
pub fn to_paise(amount_major: f64) -> i64 {
    (amount_major * 100.0).round() as i64
}

pub fn format_major(amount_in_paise: i64) -> String {
    format!("{:.2}", amount_in_paise as f64 / 100.0)
}

pub fn sha256_hex(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_major_units_to_paise() {
        assert_eq!(to_paise(100.0), 10000);
        assert_eq!(to_paise(0.0), 0);
        assert_eq!(to_paise(1.5), 150);
        assert_eq!(to_paise(99.99), 9999);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        // 10.125 is exactly representable, so the product lands on a true .5
        assert_eq!(to_paise(10.125), 1013);
        assert_eq!(to_paise(-10.125), -1013);
        assert_eq!(to_paise(10.124), 1012);
    }

    #[test]
    fn formats_paise_back_to_major_units() {
        assert_eq!(format_major(10000), "100.00");
        assert_eq!(format_major(9999), "99.99");
        assert_eq!(format_major(5), "0.05");
    }

    #[test]
    fn conversion_round_trips_for_two_decimal_inputs() {
        for cents in [0i64, 1, 99, 100, 12345, 49999999] {
            let major = cents as f64 / 100.0;
            assert_eq!(to_paise(major), cents);
            assert_eq!(format_major(cents), format!("{:.2}", major));
        }
    }

    #[test]
    fn hashes_to_lowercase_hex() {
        let digest = sha256_hex("hunter2");
        assert_eq!(digest.len(), 64);
        assert_eq!(
            digest,
            "f52fbd32b2b3b86ff88ef6c490628285f482af15ddcb29541f94bcf526a3f6c7"
        );
    }
}
