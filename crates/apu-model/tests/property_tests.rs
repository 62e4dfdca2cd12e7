use apu_model::{round2, truncate4};
use proptest::prelude::*;

proptest! {
    #[test]
    fn truncate4_never_moves_away_from_zero(x in -1.0e6f64..1.0e6) {
        let t = truncate4(x);
        // Invariant 1: magnitude never grows beyond float noise
        prop_assert!(t.abs() <= x.abs() + 1e-9);
        // Invariant 2: result is within one quantity step of the input
        prop_assert!((x - t).abs() < 1e-4 + 1e-9);
    }

    #[test]
    fn truncate4_is_idempotent(x in -1.0e6f64..1.0e6) {
        let once = truncate4(x);
        prop_assert_eq!(truncate4(once), once);
    }

    #[test]
    fn round2_stays_within_half_a_cent(x in -1.0e6f64..1.0e6) {
        let r = round2(x);
        prop_assert!((x - r).abs() <= 0.005 + 1e-9);
        prop_assert_eq!(round2(r), r);
    }

    #[test]
    fn round2_is_symmetric(x in 0.0f64..1.0e6) {
        prop_assert_eq!(round2(-x), -round2(x));
    }
}
