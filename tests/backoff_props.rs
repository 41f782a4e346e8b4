//! Property tests for the reconnect backoff.

use std::time::Duration;

use logstash_shipper::{
    BackoffPolicy,
    shipper::{BackoffState, MAX_BACKOFF_CEILING, MIN_BACKOFF_FLOOR},
};
use proptest::prelude::*;

fn policy() -> impl Strategy<Value = BackoffPolicy> {
    (10u64..5_000, 10u64..120_000).prop_map(|(floor, ceiling)| BackoffPolicy {
        floor: Duration::from_millis(floor),
        ceiling: Duration::from_millis(ceiling.max(floor)),
    })
}

proptest! {
    #[test]
    fn delay_stays_within_bounds_and_never_shrinks(policy in policy(), failures in 1usize..64) {
        let mut backoff = BackoffState::new(policy);
        let mut previous = Duration::ZERO;
        for _ in 0..failures {
            let wait = backoff.on_dial_failure();
            prop_assert!(wait >= previous);
            prop_assert!(wait >= policy.floor);
            prop_assert!(wait <= policy.ceiling);
            prop_assert!(backoff.current() <= policy.ceiling);
            previous = wait;
        }
    }

    #[test]
    fn success_always_returns_to_floor(policy in policy(), failures in 0usize..64) {
        let mut backoff = BackoffState::new(policy);
        for _ in 0..failures {
            backoff.on_dial_failure();
        }
        backoff.on_write_success();
        prop_assert_eq!(backoff.current(), policy.floor);
        prop_assert_eq!(backoff.on_dial_failure(), policy.floor);
    }

    #[test]
    fn any_policy_is_normalised(floor in any::<u64>(), ceiling in any::<u64>(), failures in 0usize..128) {
        let mut backoff = BackoffState::new(BackoffPolicy {
            floor: Duration::from_nanos(floor),
            ceiling: Duration::from_nanos(ceiling),
        });
        for _ in 0..failures {
            let wait = backoff.on_dial_failure();
            prop_assert!(wait >= MIN_BACKOFF_FLOOR);
            prop_assert!(wait <= MAX_BACKOFF_CEILING);
        }
    }
}
