use std::time::Duration;

use proptest::prelude::*;

use souk_api::auth::password_policy::PasswordPolicy;
use souk_api::auth::UserRole;
use souk_api::events::outbox::backoff_delay;
use souk_api::handlers::common::{PaginationMeta, PaginationParams, MAX_PAGE_SIZE};

fn page_strategy() -> impl Strategy<Value = (u64, u64)> {
    (1u64..10_000, 1u64..=MAX_PAGE_SIZE)
}

// Property: pagination math never loses or invents items
proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn total_pages_covers_exactly_the_total((page_index, page_size) in page_strategy(), total in 0u64..1_000_000) {
        let meta = PaginationMeta::new(page_index, page_size, total);
        // Enough pages to hold every item
        prop_assert!(meta.total_pages * page_size >= total);
        // But not a whole spare page
        if meta.total_pages > 0 {
            prop_assert!((meta.total_pages - 1) * page_size < total);
        } else {
            prop_assert_eq!(total, 0);
        }
    }

    #[test]
    fn in_range_paging_is_accepted((page_index, page_size) in page_strategy()) {
        let params = PaginationParams {
            page_index: Some(page_index),
            page_size: Some(page_size),
        };
        prop_assert_eq!(params.require().ok(), Some((page_index, page_size)));
    }

    #[test]
    fn oversized_pages_are_rejected(page_size in (MAX_PAGE_SIZE + 1)..1_000_000) {
        let params = PaginationParams {
            page_index: Some(1),
            page_size: Some(page_size),
        };
        prop_assert!(params.require().is_err(), "page size {} should fail", page_size);
    }
}

// Property: role codes round-trip and unknown codes are refused
proptest! {
    #[test]
    fn role_codes_round_trip(code in 1i16..=3) {
        let role = UserRole::from_code(code);
        prop_assert_eq!(role.map(UserRole::code), Some(code));
    }

    #[test]
    fn unknown_role_codes_are_refused(code in 4i16..1000) {
        prop_assert!(UserRole::from_code(code).is_none());
        prop_assert!(UserRole::from_code(-code).is_none());
    }
}

// Property: retry backoff stays inside its envelope and never shrinks
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn backoff_is_bounded(attempts in 1i32..1000) {
        let delay = backoff_delay(attempts);
        prop_assert!(delay >= Duration::from_secs(2));
        // 300s cap plus up to a second of jitter
        prop_assert!(delay < Duration::from_secs(301));
    }

    #[test]
    fn backoff_grows_with_attempts(attempts in 1i32..16) {
        let earlier = backoff_delay(attempts);
        let later = backoff_delay(attempts + 1);
        // Jitter is under a second, the doubling dominates until the cap
        if earlier < Duration::from_secs(300) {
            prop_assert!(later + Duration::from_secs(1) > earlier);
        }
    }
}

// Property: the password policy never accepts what it must reject
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn short_passwords_always_fail(password in "[a-z0-9]{1,7}") {
        let policy = PasswordPolicy::default();
        prop_assert!(policy.validate(&password, None).is_err());
    }

    #[test]
    fn digitless_passwords_always_fail(password in "[a-zA-Z]{8,32}") {
        let policy = PasswordPolicy::default();
        prop_assert!(policy.validate(&password, None).is_err());
    }

    #[test]
    fn passwords_containing_the_username_fail(username in "[a-z]{4,12}") {
        let policy = PasswordPolicy::default();
        let password = format!("x1{username}x1");
        prop_assert!(policy.validate(&password, Some(&username)).is_err());
    }

    #[test]
    fn letter_and_digit_mixes_of_length_pass(head in "[a-z]{6,20}", digit in 0u8..10) {
        let policy = PasswordPolicy::default();
        let password = format!("{head}-{digit}{digit}");
        // Not short, has a letter and a number, cannot be a common password
        if !password.contains("password") {
            prop_assert!(policy.validate(&password, None).is_ok());
        }
    }
}
