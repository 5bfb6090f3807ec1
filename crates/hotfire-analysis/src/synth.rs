use crate::channel::Channel;
use crate::config::TestConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::params;
use hotfire_core::{simpson, G0};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::io::Write;
use std::path::Path;

/// Synthetic hot-fire log settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    pub seed: u64,
    pub noise_scale: f64,
    pub sample_rate_hz: f64,
    pub thrust_noise_std: f64,      // N
    pub mass_noise_std: f64,        // N
    pub pressure_noise_std: f64,    // bar
    pub flow_noise_std: f64,        // L/s
    pub temperature_noise_std: f64, // °C
    /// Oxidizer / fuel mass flow.
    pub mixture_ratio: f64,
    /// Backend clock at the first sample (ms).
    pub epoch_ms: f64,
    /// Logging continues this long past the test window (s).
    pub tail: f64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            noise_scale: 1.0,
            sample_rate_hz: 100.0,
            thrust_noise_std: 15.0,
            mass_noise_std: 2.0,
            pressure_noise_std: 0.3,
            flow_noise_std: 0.005,
            temperature_noise_std: 0.2,
            mixture_ratio: 2.0,
            epoch_ms: 1_707_570_000_000.0,
            tail: 2.0,
        }
    }
}

impl SynthConfig {
    pub fn validate(&self) -> AnalysisResult<()> {
        use params::synth::*;
        SAMPLE_RATE_HZ.check(self.sample_rate_hz)?;
        NOISE_SCALE.check(self.noise_scale)?;
        MIXTURE_RATIO.check(self.mixture_ratio)?;
        if !(self.tail.is_finite() && self.tail >= 0.0) {
            return Err(AnalysisError::Synth(format!("tail must be non-negative, got {}", self.tail)));
        }
        Ok(())
    }
}

/// Raw backend log in memory, plus the noise-free quantities it was built from.
#[derive(Debug, Clone)]
pub struct SyntheticLog {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<f64>>,
    /// Impulse of the clean thrust (N·s).
    pub total_impulse: f64,
    /// Clean oxidizer mass burned (kg).
    pub ox_consumed: f64,
}

impl SyntheticLog {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> AnalysisResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(|v| v.to_string()))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_csv_bytes(&self) -> AnalysisResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(buf)
    }

    pub fn write_path<P: AsRef<Path>>(&self, path: P) -> AnalysisResult<()> {
        let file = std::fs::File::create(path.as_ref())?;
        self.write_csv(std::io::BufWriter::new(file))?;
        tracing::info!("Wrote {} synthetic samples to {}", self.len(), path.as_ref().display());
        Ok(())
    }
}

/// Column layout written by the test-stand backend.
pub fn backend_headers() -> Vec<String> {
    let mut headers = vec!["timestamp".to_string(), "index".to_string()];
    headers.extend((0..14).map(|i| format!("ch{i}sens")));
    headers.extend((0..4).map(|i| format!("temp{i}")));
    headers.push("system_time".to_string());
    headers
}

// Noise-free plant state at one sample
struct Clean {
    thrust: f64,
    ox_mass: f64,
    m_dot_fuel: f64,
    throttle: f64,
    burned: f64,
}

/// Generate a raw log whose reduction reproduces `test`'s commanded profile.
///
/// Sensor readings are inverted through the configured calibration and
/// channel map, so the log loads with `test.load_options()`.
pub fn generate_log(cfg: &SynthConfig, test: &TestConfig) -> AnalysisResult<SyntheticLog> {
    cfg.validate()?;
    test.validate()?;

    let headers = backend_headers();
    let map = test.load_options().channels;
    let col = |channel: Channel| -> AnalysisResult<usize> {
        let raw = map.raw_id(channel);
        headers.iter().position(|h| h == raw).ok_or_else(|| {
            AnalysisError::Synth(format!(
                "raw column '{raw}' for {channel} is not in the backend schema"
            ))
        })
    };
    let thrust_col = col(Channel::Thrust)?;
    let mass_col = col(Channel::RocketMass)?;
    let flow_col = col(Channel::FuelFlowRate)?;
    let time_col = col(Channel::Time)?;
    let pressure_cols = [
        (col(Channel::PN2Tank)?, Channel::PN2Tank),
        (col(Channel::POxTank)?, Channel::POxTank),
        (col(Channel::PFuelTank)?, Channel::PFuelTank),
        (col(Channel::PFuelInlet)?, Channel::PFuelInlet),
        (col(Channel::PFuelInjector)?, Channel::PFuelInjector),
        (col(Channel::PChamber)?, Channel::PChamber),
    ];
    let tc_cols = [col(Channel::Tc1)?, col(Channel::Tc2)?, col(Channel::Tc3)?];
    let index_col = test.index_column.filter(|&i| i < headers.len());
    if let Some(ic) = index_col {
        if let Some(channel) = Channel::ALL.into_iter().find(|c| col(*c).ok() == Some(ic)) {
            return Err(AnalysisError::Synth(format!(
                "index column {ic} ('{}') is also mapped to {channel}",
                headers[ic]
            )));
        }
    }

    let noise = |std: f64| {
        Normal::new(0.0, cfg.noise_scale * std).map_err(|e| AnalysisError::Synth(e.to_string()))
    };
    let d_thrust = noise(cfg.thrust_noise_std)?;
    let d_mass = noise(cfg.mass_noise_std)?;
    let d_pressure = noise(cfg.pressure_noise_std)?;
    let d_flow = noise(cfg.flow_noise_std)?;
    let d_temp = noise(cfg.temperature_noise_std)?;
    let mut rng = StdRng::seed_from_u64(cfg.seed);

    let cal = &test.calibration;
    let profile = &test.profile;
    let dt = 1.0 / cfg.sample_rate_hz;
    let n = ((test.window.end + cfg.tail) * cfg.sample_rate_hz).round() as usize + 1;
    let isp = test.design_isp;
    let ox_share = cfg.mixture_ratio / (1.0 + cfg.mixture_ratio);

    // Clean plant trajectory
    let mut clean = Vec::with_capacity(n);
    let mut ox_mass = test.ox_capacity;
    let mut burned = 0.0;
    for i in 0..n {
        let t = i as f64 * dt;
        let rel = t - test.window.ignition;
        let commanded = if rel >= 0.0 && rel <= profile.duration {
            profile.thrust_at(rel)
        } else {
            0.0
        };
        // Shut down when the tank runs dry
        let thrust = if ox_mass > 0.0 { commanded } else { 0.0 };
        let m_dot = thrust / (G0 * isp);
        clean.push(Clean {
            thrust,
            ox_mass,
            m_dot_fuel: m_dot * (1.0 - ox_share),
            throttle: thrust / profile.nominal_thrust,
            burned,
        });
        let drained = (m_dot * ox_share * dt).min(ox_mass);
        ox_mass -= drained;
        burned += drained;
    }

    let mut rows = Vec::with_capacity(n);
    for (i, c) in clean.iter().enumerate() {
        let t = i as f64 * dt;
        let mut row = vec![0.0; headers.len()];
        let clock_ms = cfg.epoch_ms + (t * 1000.0).round();
        row[0] = clock_ms / 1000.0;
        if let Some(ic) = index_col {
            row[ic] = i as f64;
        }

        let thrust = c.thrust + d_thrust.sample(&mut rng);
        row[thrust_col] = thrust / cal.thrust_sign;
        let weight = c.ox_mass * cal.gravity + cal.load_cell_tare + d_mass.sample(&mut rng);
        row[mass_col] = weight / cal.mass_sign;
        let flow = c.m_dot_fuel / cal.fuel_density * 1000.0 + d_flow.sample(&mut rng);
        row[flow_col] = flow.max(0.0);

        for (pc, channel) in pressure_cols {
            row[pc] = pressure(channel, c, test.ox_capacity) + d_pressure.sample(&mut rng);
        }
        for (k, tc) in tc_cols.iter().enumerate() {
            let rise = 40.0 * (k as f64 + 1.0) * c.burned / test.ox_capacity;
            row[*tc] = 18.0 + rise + d_temp.sample(&mut rng);
        }
        row[time_col] = clock_ms;
        rows.push(row);
    }

    let time: Vec<f64> = (0..n).map(|i| i as f64 * dt).collect();
    let thrust: Vec<f64> = clean.iter().map(|c| c.thrust).collect();
    let total_impulse = simpson(&thrust, &time)?;
    let ox_consumed = test.ox_capacity - ox_mass;

    tracing::info!(
        "Generated {} samples at {} Hz (seed {}), clean impulse {:.1} N·s",
        n,
        cfg.sample_rate_hz,
        cfg.seed,
        total_impulse
    );

    Ok(SyntheticLog {
        headers,
        rows,
        total_impulse,
        ox_consumed,
    })
}

// Feed-system pressures (bar)
fn pressure(channel: Channel, c: &Clean, ox_capacity: f64) -> f64 {
    let chamber = 20.0 * c.throttle;
    let blowdown = c.burned / ox_capacity;
    match channel {
        Channel::PN2Tank => 200.0 - 30.0 * blowdown,
        Channel::POxTank => 48.0 - 12.0 * blowdown - 2.0 * c.throttle,
        Channel::PFuelTank => 35.0 - 1.5 * c.throttle,
        Channel::PFuelInlet => chamber + 9.0 * c.throttle,
        Channel::PFuelInjector => chamber + 6.0 * c.throttle * c.throttle,
        Channel::PChamber => chamber,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::load_csv;

    #[test]
    fn test_header_layout() {
        let h = backend_headers();
        assert_eq!(h.len(), 21);
        assert_eq!(h[1], "index");
        assert_eq!(h[9], "ch7sens");
        assert_eq!(h[18], "temp2");
        assert_eq!(h[20], "system_time");
    }

    #[test]
    fn test_seeded_output_is_reproducible() {
        let test = TestConfig::default();
        let a = generate_log(&SynthConfig::default(), &test).unwrap();
        let b = generate_log(&SynthConfig::default(), &test).unwrap();
        assert_eq!(a.rows, b.rows);
        let c = generate_log(
            &SynthConfig {
                seed: 7,
                ..SynthConfig::default()
            },
            &test,
        )
        .unwrap();
        assert_ne!(a.rows, c.rows);
    }

    #[test]
    fn test_clean_log_inverts_calibration() {
        let cfg = SynthConfig {
            noise_scale: 0.0,
            ..SynthConfig::default()
        };
        let test = TestConfig::default();
        let log = generate_log(&cfg, &test).unwrap();
        let rec = load_csv(log.to_csv_bytes().unwrap().as_slice(), &test.load_options()).unwrap();
        assert_eq!(rec.len(), log.len());

        // One second after ignition the profile is ramping up at 3000 N/s
        let i = ((test.window.ignition + 1.0) * cfg.sample_rate_hz).round() as usize;
        let expected = test.profile.thrust_at(rec.time[i] - rec.time[0] - test.window.ignition);
        let measured = -rec.channel(Channel::Thrust).unwrap()[i];
        assert!((measured - expected).abs() < 1e-2, "{measured} vs {expected}");

        let ox_before = (-rec.channel(Channel::RocketMass).unwrap()[0] - 120.0) / 9.81;
        assert!((ox_before - test.ox_capacity).abs() < 1e-9);
        assert!(log.ox_consumed > 0.0 && log.ox_consumed < test.ox_capacity);
    }

    #[test]
    fn test_unknown_raw_column() {
        let mut test = TestConfig::default();
        test.channels.insert(Channel::Thrust, "load_cell_7".to_string());
        let err = generate_log(&SynthConfig::default(), &test).unwrap_err();
        assert!(matches!(err, AnalysisError::Synth(_)), "{err}");
    }

    #[test]
    fn test_index_column_collides_with_channel() {
        // Column 9 is ch7sens, the thrust channel
        let test = TestConfig {
            index_column: Some(9),
            ..TestConfig::default()
        };
        let err = generate_log(&SynthConfig::default(), &test).unwrap_err();
        match err {
            AnalysisError::Synth(msg) => assert!(msg.contains("ch7sens"), "{msg}"),
            other => panic!("unexpected error {other}"),
        }

        let test = TestConfig {
            index_column: None,
            ..TestConfig::default()
        };
        assert!(generate_log(&SynthConfig::default(), &test).is_ok());
    }
}
