//! Timestamp-suffixed throwaway values.
//!
//! Two calls within the same millisecond return the same value.

/// Value for `kind` stamped with the current Unix time in milliseconds
#[must_use]
pub fn generate_test_data(kind: &str) -> String {
    generate_test_data_at(kind, chrono::Utc::now().timestamp_millis())
}

/// Value for `kind` stamped with `ts_ms`
#[must_use]
pub fn generate_test_data_at(kind: &str, ts_ms: i64) -> String {
    match kind {
        "username" => format!("testuser_{ts_ms}"),
        "password" => format!("testpass_{ts_ms}"),
        "email" => format!("test_{ts_ms}@example.com"),
        _ => format!("testdata_{ts_ms}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_kinds() {
        assert_eq!(generate_test_data_at("username", 1700000000000), "testuser_1700000000000");
        assert_eq!(generate_test_data_at("password", 1), "testpass_1");
        assert_eq!(generate_test_data_at("email", 42), "test_42@example.com");
    }

    #[test]
    fn test_unknown_kind_falls_back() {
        assert_eq!(generate_test_data_at("phone", 7), "testdata_7");
        assert_eq!(generate_test_data_at("", 7), "testdata_7");
    }

    #[test]
    fn test_same_timestamp_collides() {
        assert_eq!(generate_test_data_at("email", 5), generate_test_data_at("email", 5));
    }

    proptest! {
        #[test]
        fn prop_email_shape(ts in 0i64..=i64::MAX) {
            let email = generate_test_data_at("email", ts);
            let re = regex::Regex::new(r"^test_\d+@example\.com$").unwrap();
            prop_assert!(re.is_match(&email));
        }

        #[test]
        fn prop_suffix_is_timestamp(kind in "[a-z]{0,10}", ts in 0i64..=i64::MAX) {
            let value = generate_test_data_at(&kind, ts);
            let expected_suffix = format!("_{ts}");
            prop_assert!(value.starts_with("test"));
            prop_assert!(value.contains(&expected_suffix));
        }
    }
}
