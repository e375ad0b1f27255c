// Identifier generation
//
// Opaque ids are uuid-based. Reference ids are the short codes a bettor
// reads back to support: PP-<UTC date>-<6 uppercase base36 chars>.

use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

/// Prefix shared by every bet reference code
pub const REFERENCE_PREFIX: &str = "PP";

const REFERENCE_SUFFIX_LEN: usize = 6;
const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Opaque id for selections, bets, transactions, notifications and messages
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn generate_reference_id() -> String {
    reference_id_at(Utc::now(), &mut rand::thread_rng())
}

pub fn reference_id_at<R: Rng + ?Sized>(at: DateTime<Utc>, rng: &mut R) -> String {
    let suffix: String = (0..REFERENCE_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}-{}-{}", REFERENCE_PREFIX, at.format("%Y%m%d"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_reference_id_format() {
        let at = Utc.with_ymd_and_hms(2026, 3, 9, 18, 30, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let reference = reference_id_at(at, &mut rng);

        let parts: Vec<&str> = reference.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "PP");
        assert_eq!(parts[1], "20260309");
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }
}
