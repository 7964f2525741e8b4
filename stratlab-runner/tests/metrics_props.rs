//! Property tests for the performance metrics.

use proptest::prelude::*;

use stratlab_runner::metrics::{bar_returns, max_drawdown_pct, sharpe_ratio, total_return};

fn arb_equity() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0..1_000_000.0_f64, 0..200)
}

proptest! {
    #[test]
    fn drawdown_is_a_percentage(curve in arb_equity()) {
        let dd = max_drawdown_pct(&curve);
        prop_assert!((0.0..=100.0).contains(&dd), "drawdown {dd} out of range");
    }

    #[test]
    fn rising_curve_has_no_drawdown(start in 1.0..1_000.0_f64, steps in prop::collection::vec(0.0..10.0_f64, 1..100)) {
        let mut curve = vec![start];
        for step in steps {
            let last = curve[curve.len() - 1];
            curve.push(last + step);
        }
        prop_assert_eq!(max_drawdown_pct(&curve), 0.0);
    }

    #[test]
    fn returns_have_one_less_point(curve in arb_equity()) {
        prop_assert_eq!(bar_returns(&curve).len(), curve.len().saturating_sub(1));
    }

    #[test]
    fn sharpe_is_finite_when_defined(curve in prop::collection::vec(1.0..1_000.0_f64, 0..100)) {
        if let Some(s) = sharpe_ratio(&curve) {
            prop_assert!(s.is_finite());
        }
    }

    #[test]
    fn total_return_sign_follows_equity(initial in 1.0..1e6_f64, final_equity in 0.0..2e6_f64) {
        prop_assume!((final_equity - initial).abs() > 1e-6 * initial);
        let r = total_return(initial, final_equity);
        prop_assert_eq!(r > 0.0, final_equity > initial);
    }
}
