//! Gate-exponent canonicalization.

/// Canonicalize a gate exponent into the half-open window
/// `(-period / 2, period / 2]`.
///
/// Power gates are periodic in their exponent, so any value outside the
/// window names the same unitary as one inside it. Keeping exponents
/// canonical avoids feeding the optimizer redundant coordinates.
pub fn canonicalize_exponent(value: f64, period: f64) -> f64 {
    let half = period / 2.0;
    value - period * ((value - half) / period).ceil()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_window_edges() {
        // Upper edge is included, lower edge wraps to the upper edge.
        assert_eq!(canonicalize_exponent(1.0, 2.0), 1.0);
        assert_eq!(canonicalize_exponent(-1.0, 2.0), 1.0);
        assert_eq!(canonicalize_exponent(0.0, 2.0), 0.0);
    }

    #[test]
    fn test_wraps_multiples() {
        assert!((canonicalize_exponent(2.5, 2.0) - 0.5).abs() < 1e-12);
        assert!((canonicalize_exponent(-2.5, 2.0) + 0.5).abs() < 1e-12);
        assert!((canonicalize_exponent(13.0, 2.0) - 1.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_result_in_window(value in -1e6f64..1e6, period in 1e-3f64..1e3) {
            let c = canonicalize_exponent(value, period);
            prop_assert!(c > -period / 2.0 - 1e-9 * period);
            prop_assert!(c <= period / 2.0 + 1e-9 * period);
        }

        #[test]
        fn prop_idempotent(value in -100.0f64..100.0, period in 0.1f64..10.0) {
            let once = canonicalize_exponent(value, period);
            let twice = canonicalize_exponent(once, period);
            prop_assert!((once - twice).abs() < 1e-9 * period.max(1.0));
        }

        #[test]
        fn prop_shift_by_period_is_identity(value in -100.0f64..100.0, period in 0.1f64..10.0) {
            let a = canonicalize_exponent(value, period);
            let b = canonicalize_exponent(value + period, period);
            prop_assert!((a - b).abs() < 1e-9 * period.max(1.0));
        }
    }
}
