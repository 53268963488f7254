/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: random (4096 values per ms)
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    let rand_bits: i64 = rand::thread_rng().gen_range(0..0x1000); // 12 bits
    (ts << 12) | rand_bits
}

/// Generate a human-readable order number: `LL-<year>-<6 random digits>`.
///
/// The random part is a display convenience, not a uniqueness guarantee;
/// the order repository verifies against the UNIQUE index and regenerates
/// on collision.
pub fn order_number() -> String {
    use chrono::Datelike;
    use rand::Rng;
    let year = chrono::Utc::now().year();
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("LL-{year}-{n:06}")
}

/// Mint a single-use guest lookup token (32 hex chars)
pub fn guest_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_number_format() {
        let n = order_number();
        let parts: Vec<&str> = n.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "LL");
        assert_eq!(parts[1].len(), 4);
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_guest_token_length() {
        let t = guest_token();
        assert_eq!(t.len(), 32);
        assert_ne!(t, guest_token());
    }
}
