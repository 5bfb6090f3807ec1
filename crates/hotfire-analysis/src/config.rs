use crate::channel::{Channel, ChannelMap};
use crate::derived::Calibration;
use crate::error::{AnalysisError, AnalysisResult};
use crate::params;
use crate::sensor::{LoadOptions, TestWindow};
use hotfire_core::ThrottleProfile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Everything needed to reduce one hot-fire test.
///
/// Every field has a default, so a JSON config only needs the values that
/// differ from the 2024-02-10 test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    pub test_name: String,
    /// Raw log; `<test_name>_RAW-DATA-BACKEND.csv` when unset.
    pub input: Option<PathBuf>,
    pub window: TestWindow,
    pub profile: ThrottleProfile,
    pub calibration: Calibration,
    /// Raw column ids that differ from the backend defaults.
    pub channels: BTreeMap<Channel, String>,
    pub index_column: Option<usize>,
    pub time_scale: f64,
    pub design_isp: f64,
    /// Oxidizer tank capacity (kg).
    pub ox_capacity: f64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            test_name: params::DEFAULT_TEST_NAME.to_string(),
            input: None,
            window: TestWindow::default(),
            profile: ThrottleProfile::default(),
            calibration: Calibration::default(),
            channels: BTreeMap::new(),
            index_column: Some(1),
            time_scale: 1000.0,
            design_isp: params::DESIGN_ISP,
            ox_capacity: params::OX_CAPACITY_KG,
        }
    }
}

impl TestConfig {
    pub fn from_json_str(json: &str) -> AnalysisResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> AnalysisResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!("Loaded test config {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> AnalysisResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn input_path(&self) -> PathBuf {
        self.input
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}{}", self.test_name, params::RAW_LOG_SUFFIX)))
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            channels: ChannelMap::with_overrides(&self.channels),
            index_column: self.index_column,
            time_scale: self.time_scale,
        }
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        if self.test_name.trim().is_empty() {
            return Err(AnalysisError::Config("test_name must not be empty".into()));
        }
        if !(self.time_scale.is_finite() && self.time_scale > 0.0) {
            return Err(AnalysisError::Config(format!(
                "time_scale must be positive, got {}",
                self.time_scale
            )));
        }
        self.window.validate()?;

        use params::profile::*;
        NOMINAL_THRUST.check(self.profile.nominal_thrust)?;
        TOLERANCE_PERCENT.check(self.profile.tolerance_percent)?;
        LOW_THROTTLE_PERCENT.check(self.profile.low_throttle_percent)?;
        DURATION.check(self.profile.duration)?;
        DT.check(self.profile.dt)?;
        self.profile.validate()?;

        self.calibration.validate()?;
        params::synth::DESIGN_ISP.check(self.design_isp)?;
        if !(self.ox_capacity.is_finite() && self.ox_capacity > 0.0) {
            return Err(AnalysisError::Config(format!(
                "ox_capacity must be positive, got {}",
                self.ox_capacity
            )));
        }
        Ok(())
    }
}
