//! Parameter bounds and test-stand constants.

use crate::error::{AnalysisError, AnalysisResult};

/// Parameter specification with accepted bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    /// Config field name.
    pub name: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
}

impl ParamSpec {
    /// Create a new parameter specification.
    pub const fn new(name: &'static str, label: &'static str, min: f64, max: f64) -> Self {
        Self {
            name,
            label,
            min,
            max,
        }
    }

    /// Pass `value` through if it lies inside the bounds.
    pub fn check(&self, value: f64) -> AnalysisResult<f64> {
        if value.is_finite() && value >= self.min && value <= self.max {
            Ok(value)
        } else {
            Err(AnalysisError::InvalidParam {
                name: self.name,
                label: self.label,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Commanded throttle profile.
pub mod profile {
    use super::ParamSpec;

    pub const NOMINAL_THRUST: ParamSpec =
        ParamSpec::new("nominal_thrust", "Nominal Thrust (N)", 1.0, 1.0e6);
    pub const TOLERANCE_PERCENT: ParamSpec =
        ParamSpec::new("tolerance_percent", "Tolerance (%)", 0.0, 50.0);
    pub const LOW_THROTTLE_PERCENT: ParamSpec =
        ParamSpec::new("low_throttle_percent", "Low Throttle (%)", 0.0, 100.0);
    pub const DURATION: ParamSpec = ParamSpec::new("duration", "Trace Duration (s)", 0.0, 600.0);
    pub const DT: ParamSpec = ParamSpec::new("dt", "Trace Step (s)", 1e-3, 1.0);
}

/// Signal reduction.
pub mod calibration {
    use super::ParamSpec;

    pub const SIGMA: ParamSpec = ParamSpec::new("sigma", "Smoothing Sigma (samples)", 0.0, 500.0);
    pub const GRAVITY: ParamSpec = ParamSpec::new("gravity", "Gravity (m/s²)", 1.0, 15.0);
    pub const FUEL_DENSITY: ParamSpec =
        ParamSpec::new("fuel_density", "Fuel Density (kg/m³)", 100.0, 2000.0);
    pub const DERIVATIVE_STEP: ParamSpec =
        ParamSpec::new("derivative_step", "Derivative Step (s)", 1e-6, 10.0);
}

/// Synthetic log generation.
pub mod synth {
    use super::ParamSpec;

    pub const SAMPLE_RATE_HZ: ParamSpec =
        ParamSpec::new("sample_rate_hz", "Sample Rate (Hz)", 1.0, 10_000.0);
    pub const NOISE_SCALE: ParamSpec = ParamSpec::new("noise_scale", "Noise Scale", 0.0, 100.0);
    pub const MIXTURE_RATIO: ParamSpec =
        ParamSpec::new("mixture_ratio", "Mixture Ratio", 0.1, 20.0);
    pub const DESIGN_ISP: ParamSpec = ParamSpec::new("design_isp", "Design Isp (s)", 1.0, 500.0);
}

/// Name of the test the defaults describe.
pub const DEFAULT_TEST_NAME: &str = "20240210_THANOS-A_HOT-FIRE_1_A";

/// Suffix appended to the test name to find its raw backend log.
pub const RAW_LOG_SUFFIX: &str = "_RAW-DATA-BACKEND.csv";

/// Engine design specific impulse (s).
pub const DESIGN_ISP: f64 = 190.0;

/// Maximum nitrous load of the oxidizer tank (kg).
pub const OX_CAPACITY_KG: f64 = 7.5;

/// Fuel density (kg/m³).
pub const FUEL_DENSITY: f64 = 786.0;

/// Load-cell reading with an empty oxidizer tank (N).
pub const LOAD_CELL_TARE_N: f64 = 120.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_spec_check() {
        let spec = ParamSpec::new("test", "Test", 0.0, 100.0);
        assert_eq!(spec.check(50.0).unwrap(), 50.0);
        assert_eq!(spec.check(0.0).unwrap(), 0.0);
        assert!(spec.check(100.1).is_err());
        assert!(spec.check(f64::NAN).is_err());
    }

    #[test]
    fn test_invalid_param_message() {
        let err = profile::TOLERANCE_PERCENT.check(75.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Tolerance (%) = 75 outside [0, 50] (tolerance_percent)"
        );
    }

    #[test]
    fn test_trace_step_bounds_cap_samples() {
        let worst = profile::DURATION.max / profile::DT.min;
        assert!(worst <= hotfire_core::profile::MAX_TRACE_SAMPLES as f64);
        assert!(profile::DT.check(1e-5).is_err());
    }
}
