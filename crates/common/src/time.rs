//! Wall-clock helpers. All persisted timestamps are UTC epoch milliseconds.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as UTC epoch milliseconds.
#[must_use]
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_ms_is_recent() {
        // 2020-01-01 in epoch millis; anything running this test is later.
        assert!(now_ms() > 1_577_836_800_000);
    }
}
