//! Property-based tests for hotfire-core using proptest.
//!
//! Covers: throttle profile continuity and tolerance band, Gaussian smoothing
//! bounds, Simpson exactness, spline interpolation.

use hotfire_core::profile::ThrottleProfile;
use hotfire_core::smoothing::gaussian_filter;
use hotfire_core::spline::CubicSpline;
use hotfire_core::{simpson, Phase};
use proptest::prelude::*;

fn arb_profile() -> impl Strategy<Value = ThrottleProfile> {
    (
        1000.0f64..5000.0,
        0.05f64..0.4,
        1.0f64..10.0,
        20.0f64..80.0,
        500.0f64..5000.0,
        200.0f64..3000.0,
        (0.1f64..2.0, 0.5f64..6.0, 0.5f64..5.0),
    )
        .prop_map(
            |(nominal, startup_frac, tol, low_pct, g1, g, (t_start, t_high, t_low))| {
                ThrottleProfile {
                    nominal_thrust: nominal,
                    startup_thrust: nominal * startup_frac,
                    tolerance_percent: tol,
                    low_throttle_percent: low_pct,
                    throttle_up_1_gradient: g1,
                    throttle_gradient: g,
                    startup_duration: t_start,
                    high_thrust_duration: t_high,
                    low_thrust_duration: t_low,
                    duration: 30.0,
                    dt: 0.01,
                }
            },
        )
}

// ── Throttle Profile Properties ──────────────────────────────────────

proptest! {
    /// The commanded trace has no jumps at phase boundaries.
    #[test]
    fn profile_continuous_at_boundaries(p in arb_profile()) {
        let eps = 1e-7;
        let max_grad = p.throttle_up_1_gradient.max(p.throttle_gradient);
        for b in p.schedule().boundaries() {
            let jump = (p.thrust_at(b + eps) - p.thrust_at(b - eps)).abs();
            prop_assert!(jump <= 2.0 * eps * max_grad + 1e-6,
                "jump {} at boundary {}", jump, b);
        }
    }

    /// Startup level at t = 0, nominal after the last ramp.
    #[test]
    fn profile_endpoints(p in arb_profile()) {
        prop_assert_eq!(p.thrust_at(0.0), p.startup_thrust);
        prop_assert_eq!(p.phase_at(p.schedule().throttle_up_2_end + 1e-6), Phase::Nominal);
        prop_assert_eq!(p.thrust_at(p.schedule().throttle_up_2_end + 1.0), p.nominal_thrust);
    }

    /// T_max - T_min = 2 * tolerance at every sample.
    #[test]
    fn tolerance_band_width(p in arb_profile()) {
        let trace = p.trace();
        let width = 2.0 * p.tolerance();
        for (hi, lo) in trace.upper.iter().zip(trace.lower.iter()) {
            prop_assert!((hi - lo - width).abs() < 1e-9);
        }
    }

    /// The commanded thrust never leaves [min(startup, low), nominal].
    #[test]
    fn profile_bounded(p in arb_profile()) {
        let floor = p.startup_thrust.min(p.low_thrust());
        for f in p.trace().nominal {
            prop_assert!(f >= floor - 1e-9 && f <= p.nominal_thrust + 1e-9);
        }
    }
}

// ── Smoothing Properties ─────────────────────────────────────────────

proptest! {
    /// Output is a convex combination of inputs.
    #[test]
    fn gaussian_within_input_range(
        signal in prop::collection::vec(-1000.0f64..1000.0, 1..200),
        sigma in 0.5f64..8.0,
    ) {
        let out = gaussian_filter(&signal, sigma).unwrap();
        let lo = signal.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = signal.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assert_eq!(out.len(), signal.len());
        for v in out {
            prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9);
        }
    }
}

// ── Integration & Spline Properties ──────────────────────────────────

proptest! {
    /// Simpson integrates quadratics exactly on any increasing grid.
    #[test]
    fn simpson_exact_for_quadratics(
        steps in prop::collection::vec(0.05f64..1.0, 2..40),
        c0 in -5.0f64..5.0, c1 in -5.0f64..5.0, c2 in -5.0f64..5.0,
    ) {
        let mut x = vec![0.0];
        for s in &steps {
            let last = *x.last().unwrap();
            x.push(last + s);
        }
        let y: Vec<f64> = x.iter().map(|t| c0 + c1 * t + c2 * t * t).collect();
        let b = *x.last().unwrap();
        let exact = c0 * b + 0.5 * c1 * b * b + c2 * b * b * b / 3.0;
        let val = simpson(&y, &x).unwrap();
        prop_assert!((val - exact).abs() < 1e-8 * (1.0 + exact.abs()),
            "simpson {} vs exact {}", val, exact);
    }

    /// A spline passes through every knot.
    #[test]
    fn spline_hits_knots(
        steps in prop::collection::vec(0.01f64..1.0, 1..50),
        values in prop::collection::vec(-100.0f64..100.0, 51),
    ) {
        let mut x = vec![0.0];
        for s in &steps {
            let last = *x.last().unwrap();
            x.push(last + s);
        }
        let y = &values[..x.len()];
        let spline = CubicSpline::clamped(&x, y).unwrap();
        for (xi, yi) in x.iter().zip(y.iter()) {
            prop_assert!((spline.eval(*xi) - yi).abs() < 1e-8);
        }
    }
}
