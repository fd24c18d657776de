//! Property-based tests for entropy calculation and engine totality

use proptest::prelude::*;
use leakwatch_secrets::{Entropy, ScanEngine};

proptest! {
    #[test]
    fn entropy_stays_in_byte_range(s in "[ -~]{0,200}") {
        let entropy = Entropy::shannon_entropy(&s);
        prop_assert!(entropy >= 0.0);
        prop_assert!(entropy <= 8.0);
    }

    #[test]
    fn entropy_is_deterministic(s in "[a-zA-Z0-9+/=]{20,100}") {
        prop_assert_eq!(
            Entropy::shannon_entropy(&s),
            Entropy::shannon_entropy(&s)
        );
    }

    #[test]
    fn repeated_characters_have_zero_entropy(c in "[a-z]", n in 1usize..200) {
        let s = c.repeat(n);
        prop_assert_eq!(Entropy::shannon_entropy(&s), 0.0);
    }

    #[test]
    fn scan_never_panics_on_arbitrary_text(content in ".{0,500}") {
        let engine = ScanEngine::with_defaults();
        // Worst case for any input is zero findings, never a failure
        let _ = engine.scan(&content, "fuzz.txt");
    }
}
