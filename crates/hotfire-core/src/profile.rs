use crate::error::{CoreError, CoreResult};
use crate::integrate::simpson;
use crate::G0;
use serde::{Deserialize, Serialize};

/// Upper bound on `duration / dt` for a sampled trace.
pub const MAX_TRACE_SAMPLES: usize = 1_000_000;

// ---------------------------------------------------------------------------
// Enums & Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Phase {
    Startup = 0,
    ThrottleUp1 = 1,  // Startup -> nominal ramp
    HighThrust = 2,   // Nominal hold
    ThrottleDown = 3, // Nominal -> low ramp
    LowThrust = 4,    // Low hold
    ThrottleUp2 = 5,  // Low -> nominal ramp
    Nominal = 6,      // Hold until end of trace
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Self::Startup,
        Self::ThrottleUp1,
        Self::HighThrust,
        Self::ThrottleDown,
        Self::LowThrust,
        Self::ThrottleUp2,
        Self::Nominal,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Startup => "Startup",
            Self::ThrottleUp1 => "Throttle Up 1",
            Self::HighThrust => "High Thrust",
            Self::ThrottleDown => "Throttle Down",
            Self::LowThrust => "Low Thrust",
            Self::ThrottleUp2 => "Throttle Up 2",
            Self::Nominal => "Nominal",
        }
    }

    pub fn is_ramp(self) -> bool {
        matches!(
            self,
            Self::ThrottleUp1 | Self::ThrottleDown | Self::ThrottleUp2
        )
    }
}

/// Commanded throttle profile of a hot-fire test.
///
/// Thrusts are in newtons, gradients in N/s and durations in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleProfile {
    pub nominal_thrust: f64,
    pub startup_thrust: f64,
    pub tolerance_percent: f64,
    pub low_throttle_percent: f64,
    pub throttle_up_1_gradient: f64,
    pub throttle_gradient: f64,
    pub startup_duration: f64,
    pub high_thrust_duration: f64,
    pub low_thrust_duration: f64,
    pub duration: f64,
    pub dt: f64,
}

impl Default for ThrottleProfile {
    fn default() -> Self {
        Self {
            nominal_thrust: 2400.0,
            startup_thrust: 500.0,
            tolerance_percent: 5.0,
            low_throttle_percent: 40.0,
            throttle_up_1_gradient: 3000.0,
            throttle_gradient: 1500.0,
            startup_duration: 0.5,
            high_thrust_duration: 4.4,
            low_thrust_duration: 3.0,
            duration: 12.0,
            dt: 0.01,
        }
    }
}

/// Phase boundary times derived from a [`ThrottleProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseSchedule {
    pub throttle_up_1_start: f64,
    pub throttle_up_1_end: f64,
    pub throttle_down_start: f64,
    pub throttle_down_end: f64,
    pub throttle_up_2_start: f64,
    pub throttle_up_2_end: f64,
}

impl PhaseSchedule {
    /// Boundaries in the order they are compared.
    pub fn boundaries(&self) -> [f64; 6] {
        [
            self.throttle_up_1_start,
            self.throttle_up_1_end,
            self.throttle_down_start,
            self.throttle_down_end,
            self.throttle_up_2_start,
            self.throttle_up_2_end,
        ]
    }

    /// First phase whose upper boundary lies beyond `t`.
    pub fn phase_at(&self, t: f64) -> Phase {
        let bounds = self.boundaries();
        for (phase, bound) in Phase::ALL.iter().zip(bounds.iter()) {
            if t < *bound {
                return *phase;
            }
        }
        Phase::Nominal
    }

    /// `(phase, start, end)` spans clipped to `[0, duration]`.
    pub fn spans(&self, duration: f64) -> Vec<(Phase, f64, f64)> {
        let mut edges = vec![0.0];
        edges.extend(self.boundaries());
        edges.push(duration.max(self.throttle_up_2_end));

        let mut spans = Vec::with_capacity(Phase::ALL.len());
        for (i, phase) in Phase::ALL.iter().enumerate() {
            let start = edges[i].clamp(0.0, duration);
            let end = edges[i + 1].clamp(0.0, duration);
            spans.push((*phase, start, end.max(start)));
        }
        spans
    }
}

/// Sampled commanded trace with its tolerance band.
#[derive(Debug, Clone, Serialize)]
pub struct ThrustTrace {
    pub time: Vec<f64>,
    pub nominal: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

impl ThrustTrace {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Budget figures for a commanded profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub total_impulse: f64,
    pub duration: f64,
    pub design_isp: f64,
    pub propellant_mass: f64,
}

// ---------------------------------------------------------------------------
// Profile evaluation
// ---------------------------------------------------------------------------

impl ThrottleProfile {
    pub fn validate(&self) -> CoreResult<()> {
        let fields = [
            ("nominal_thrust", self.nominal_thrust),
            ("startup_thrust", self.startup_thrust),
            ("tolerance_percent", self.tolerance_percent),
            ("low_throttle_percent", self.low_throttle_percent),
            ("throttle_up_1_gradient", self.throttle_up_1_gradient),
            ("throttle_gradient", self.throttle_gradient),
            ("startup_duration", self.startup_duration),
            ("high_thrust_duration", self.high_thrust_duration),
            ("low_thrust_duration", self.low_thrust_duration),
            ("duration", self.duration),
            ("dt", self.dt),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::InvalidProfile(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if self.throttle_up_1_gradient == 0.0 || self.throttle_gradient == 0.0 {
            return Err(CoreError::InvalidProfile(
                "throttle gradients must be non-zero".into(),
            ));
        }
        if self.dt == 0.0 {
            return Err(CoreError::InvalidProfile("dt must be non-zero".into()));
        }
        if self.duration / self.dt > MAX_TRACE_SAMPLES as f64 {
            return Err(CoreError::InvalidProfile(format!(
                "duration {} s at dt {} s exceeds {MAX_TRACE_SAMPLES} samples",
                self.duration, self.dt
            )));
        }
        if self.startup_thrust > self.nominal_thrust {
            return Err(CoreError::InvalidProfile(format!(
                "startup thrust {} exceeds nominal thrust {}",
                self.startup_thrust, self.nominal_thrust
            )));
        }
        Ok(())
    }

    /// Half-width of the tolerance band (N).
    pub fn tolerance(&self) -> f64 {
        self.nominal_thrust * (self.tolerance_percent / 100.0)
    }

    /// Low-throttle hold level: the low percentage of the lower band edge,
    /// minus the tolerance again.
    pub fn low_thrust(&self) -> f64 {
        let tol = self.tolerance();
        (self.nominal_thrust - tol) * (self.low_throttle_percent / 100.0) - tol
    }

    pub fn schedule(&self) -> PhaseSchedule {
        let ramp_up_1 = (self.nominal_thrust - self.startup_thrust) / self.throttle_up_1_gradient;
        let ramp_low = (self.nominal_thrust - self.low_thrust()) / self.throttle_gradient;

        let throttle_up_1_start = self.startup_duration;
        let throttle_up_1_end = throttle_up_1_start + ramp_up_1;
        let throttle_down_start = throttle_up_1_end + self.high_thrust_duration;
        let throttle_down_end = throttle_down_start + ramp_low;
        let throttle_up_2_start = throttle_down_end + self.low_thrust_duration;
        let throttle_up_2_end = throttle_up_2_start + ramp_low;

        PhaseSchedule {
            throttle_up_1_start,
            throttle_up_1_end,
            throttle_down_start,
            throttle_down_end,
            throttle_up_2_start,
            throttle_up_2_end,
        }
    }

    pub fn phase_at(&self, t: f64) -> Phase {
        self.schedule().phase_at(t)
    }

    pub fn thrust_at(&self, t: f64) -> f64 {
        self.thrust_with(&self.schedule(), t)
    }

    fn thrust_with(&self, s: &PhaseSchedule, t: f64) -> f64 {
        match s.phase_at(t) {
            Phase::Startup => self.startup_thrust,
            Phase::ThrottleUp1 => {
                self.startup_thrust + self.throttle_up_1_gradient * (t - s.throttle_up_1_start)
            }
            Phase::HighThrust => self.nominal_thrust,
            Phase::ThrottleDown => {
                self.nominal_thrust - (t - s.throttle_down_start) * self.throttle_gradient
            }
            Phase::LowThrust => self.low_thrust(),
            Phase::ThrottleUp2 => {
                self.low_thrust() + self.throttle_gradient * (t - s.throttle_up_2_start)
            }
            Phase::Nominal => self.nominal_thrust,
        }
    }

    /// Sample times `0, dt, 2dt, ..., duration`.
    pub fn sample_times(&self) -> Vec<f64> {
        let steps = (self.duration / self.dt).round() as usize;
        (0..=steps).map(|i| i as f64 * self.dt).collect()
    }

    pub fn trace(&self) -> ThrustTrace {
        let schedule = self.schedule();
        let tol = self.tolerance();
        let time = self.sample_times();
        let nominal: Vec<f64> = time.iter().map(|&t| self.thrust_with(&schedule, t)).collect();
        let upper = nominal.iter().map(|f| f + tol).collect();
        let lower = nominal.iter().map(|f| f - tol).collect();

        ThrustTrace {
            time,
            nominal,
            upper,
            lower,
        }
    }

    /// Ideal impulse of the sampled trace and the propellant it would burn at
    /// `design_isp` seconds.
    pub fn summary(&self, design_isp: f64) -> CoreResult<ProfileSummary> {
        let trace = self.trace();
        let total_impulse = simpson(&trace.nominal, &trace.time)?;
        Ok(ProfileSummary {
            total_impulse,
            duration: self.duration,
            design_isp,
            propellant_mass: total_impulse / (G0 * design_isp),
        })
    }
}
