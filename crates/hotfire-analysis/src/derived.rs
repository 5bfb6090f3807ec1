use crate::channel::Channel;
use crate::error::{AnalysisError, AnalysisResult};
use crate::params;
use crate::sensor::SensorRecord;
use hotfire_core::{gaussian_filter, simpson, trapezoid, CubicSpline, ThrottleProfile, G0};
use serde::{Deserialize, Serialize};

/// Test-stand calibration and smoothing settings.
///
/// The load cells read negative under load, hence the signs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub thrust_sign: f64,
    pub mass_sign: f64,
    /// Rocket-mass load cell reading with an empty tank (N).
    pub load_cell_tare: f64,
    pub gravity: f64,
    /// kg/m³
    pub fuel_density: f64,
    pub thrust_sigma: f64,
    pub ox_mass_sigma: f64,
    pub flow_sigma: f64,
    /// Central difference step for the oxidizer mass derivative (s).
    pub derivative_step: f64,
    /// Smoothed thrust above which a sample counts as burning (N).
    pub burn_thrust_threshold: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            thrust_sign: -1.0,
            mass_sign: -1.0,
            load_cell_tare: params::LOAD_CELL_TARE_N,
            gravity: G0,
            fuel_density: params::FUEL_DENSITY,
            thrust_sigma: 4.0,
            ox_mass_sigma: 5.0,
            flow_sigma: 2.0,
            derivative_step: 1.0,
            burn_thrust_threshold: 100.0,
        }
    }
}

impl Calibration {
    pub fn validate(&self) -> AnalysisResult<()> {
        use params::calibration::*;
        for sigma in [self.thrust_sigma, self.ox_mass_sigma, self.flow_sigma] {
            SIGMA.check(sigma)?;
        }
        GRAVITY.check(self.gravity)?;
        FUEL_DENSITY.check(self.fuel_density)?;
        DERIVATIVE_STEP.check(self.derivative_step)?;
        for (name, sign) in [("thrust_sign", self.thrust_sign), ("mass_sign", self.mass_sign)] {
            if sign != 1.0 && sign != -1.0 {
                return Err(AnalysisError::Config(format!("{name} must be 1 or -1, got {sign}")));
            }
        }
        Ok(())
    }
}

/// Per-sample reduced quantities, aligned with the record's time axis.
#[derive(Debug, Clone, Serialize)]
pub struct DerivedSeries {
    pub time: Vec<f64>,
    pub thrust_raw: Vec<f64>,
    pub thrust_smoothed: Vec<f64>,
    pub ox_mass: Vec<f64>,
    pub ox_mass_smoothed: Vec<f64>,
    /// L/s
    pub fuel_flow: Vec<f64>,
    pub fuel_flow_smoothed: Vec<f64>,
    pub m_dot_ox: Vec<f64>,
    pub m_dot_fuel: Vec<f64>,
    pub mixture_ratio: Vec<f64>,
    pub isp: Vec<f64>,
}

impl DerivedSeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Column names and values in export order.
    pub fn columns(&self) -> [(&'static str, &[f64]); 11] {
        [
            ("time", self.time.as_slice()),
            ("thrust_raw", self.thrust_raw.as_slice()),
            ("thrust_smoothed", self.thrust_smoothed.as_slice()),
            ("ox_mass", self.ox_mass.as_slice()),
            ("ox_mass_smoothed", self.ox_mass_smoothed.as_slice()),
            ("fuel_flow", self.fuel_flow.as_slice()),
            ("fuel_flow_smoothed", self.fuel_flow_smoothed.as_slice()),
            ("m_dot_ox", self.m_dot_ox.as_slice()),
            ("m_dot_fuel", self.m_dot_fuel.as_slice()),
            ("mixture_ratio", self.mixture_ratio.as_slice()),
            ("isp", self.isp.as_slice()),
        ]
    }
}

/// Measured thrust against the commanded tolerance band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandCompliance {
    /// Samples inside the commanded trace's time support.
    pub samples: usize,
    pub within: usize,
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    /// N·s
    pub total_impulse: f64,
    pub peak_thrust: f64,
    pub burn_time: f64,
    pub ox_consumed: f64,
    pub fuel_consumed: f64,
    pub mean_mixture_ratio: Option<f64>,
    pub mean_isp: Option<f64>,
    pub compliance: Option<BandCompliance>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HotFireReport {
    pub series: DerivedSeries,
    pub summary: ReportSummary,
}

// ---------------------------------------------------------------------------
// Reduction
// ---------------------------------------------------------------------------

/// Smooth the raw channels and derive mass flows, mixture ratio and Isp.
pub fn reduce(record: &SensorRecord, cal: &Calibration) -> AnalysisResult<DerivedSeries> {
    cal.validate()?;
    record.check_lengths()?;
    let time = record.time.clone();

    let thrust_raw: Vec<f64> = record
        .channel(Channel::Thrust)?
        .iter()
        .map(|f| cal.thrust_sign * f)
        .collect();
    let thrust_smoothed = gaussian_filter(&thrust_raw, cal.thrust_sigma)?;

    let ox_mass: Vec<f64> = record
        .channel(Channel::RocketMass)?
        .iter()
        .map(|w| (cal.mass_sign * w - cal.load_cell_tare) / cal.gravity)
        .collect();
    let ox_mass_smoothed = gaussian_filter(&ox_mass, cal.ox_mass_sigma)?;

    let fuel_flow = record.channel(Channel::FuelFlowRate)?.to_vec();
    let fuel_flow_smoothed = gaussian_filter(&fuel_flow, cal.flow_sigma)?;

    // Tank drains, so the flow is the negated slope
    let spline = CubicSpline::clamped(&time, &ox_mass_smoothed)?;
    let m_dot_ox: Vec<f64> = time
        .iter()
        .map(|&t| -spline.central_difference(t, cal.derivative_step))
        .collect();

    let m_dot_fuel: Vec<f64> = fuel_flow_smoothed
        .iter()
        .map(|q| q / 1000.0 * cal.fuel_density)
        .collect();

    let mixture_ratio = m_dot_ox
        .iter()
        .zip(&m_dot_fuel)
        .map(|(&ox, &fuel)| if fuel == 0.0 { f64::NAN } else { ox / fuel })
        .collect();

    let isp = thrust_smoothed
        .iter()
        .zip(m_dot_ox.iter().zip(&m_dot_fuel))
        .map(|(&f, (&ox, &fuel))| {
            if fuel == 0.0 {
                f64::NAN
            } else {
                f / (cal.gravity * (ox + fuel))
            }
        })
        .collect();

    tracing::debug!("Reduced {} samples", time.len());

    Ok(DerivedSeries {
        time,
        thrust_raw,
        thrust_smoothed,
        ox_mass,
        ox_mass_smoothed,
        fuel_flow,
        fuel_flow_smoothed,
        m_dot_ox,
        m_dot_fuel,
        mixture_ratio,
        isp,
    })
}

/// Full reduction plus scalar summary. With `profile`, the smoothed thrust is
/// also scored against the commanded tolerance band.
pub fn analyze(
    record: &SensorRecord,
    cal: &Calibration,
    profile: Option<&ThrottleProfile>,
) -> AnalysisResult<HotFireReport> {
    let series = reduce(record, cal)?;

    let total_impulse = simpson(&series.thrust_raw, &series.time)?;
    let peak_thrust = series
        .thrust_smoothed
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);

    let burning: Vec<usize> = series
        .thrust_smoothed
        .iter()
        .enumerate()
        .filter(|(_, f)| **f > cal.burn_thrust_threshold)
        .map(|(i, _)| i)
        .collect();

    let (burn_time, ox_consumed, fuel_consumed) = match (burning.first(), burning.last()) {
        (Some(&first), Some(&last)) if last > first => {
            let span = first..=last;
            (
                series.time[last] - series.time[first],
                series.ox_mass_smoothed[first] - series.ox_mass_smoothed[last],
                trapezoid(&series.m_dot_fuel[span.clone()], &series.time[span])?,
            )
        }
        _ => (0.0, 0.0, 0.0),
    };

    let compliance = match profile {
        Some(p) => band_compliance(&series, p)?,
        None => None,
    };

    let summary = ReportSummary {
        total_impulse,
        peak_thrust,
        burn_time,
        ox_consumed,
        fuel_consumed,
        mean_mixture_ratio: finite_mean(burning.iter().map(|&i| series.mixture_ratio[i])),
        mean_isp: finite_mean(burning.iter().map(|&i| series.isp[i])),
        compliance,
    };

    tracing::info!(
        "Total impulse {:.1} N·s, peak thrust {:.1} N over {:.2} s burn",
        summary.total_impulse,
        summary.peak_thrust,
        summary.burn_time
    );

    Ok(HotFireReport { series, summary })
}

fn band_compliance(
    series: &DerivedSeries,
    profile: &ThrottleProfile,
) -> AnalysisResult<Option<BandCompliance>> {
    profile.validate()?;
    let tol = profile.tolerance();
    let end = profile.duration + 0.5 * profile.dt;
    let (samples, within) = series
        .time
        .iter()
        .zip(&series.thrust_smoothed)
        .filter(|(t, _)| **t >= 0.0 && **t <= end)
        .fold((0, 0), |(n, k), (&t, &f)| {
            let target = profile.thrust_at(t);
            let inside = f >= target - tol && f <= target + tol;
            (n + 1, k + usize::from(inside))
        });

    if samples == 0 {
        tracing::warn!("No measured samples overlap the commanded profile");
        return Ok(None);
    }
    Ok(Some(BandCompliance {
        samples,
        within,
        fraction: within as f64 / samples as f64,
    }))
}

fn finite_mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}
