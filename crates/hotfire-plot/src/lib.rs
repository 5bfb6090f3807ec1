//! Hotfire Plot - PNG figures for a reduced hot-fire test
//!
//! Figures:
//! - Measured vs commanded thrust with tolerance band
//! - Oxidizer tank mass
//! - Feed pressures (high and low range)
//! - Fuel flow against feed pressures
//! - Propellant mass flow
//! - Mixture ratio and specific impulse

pub mod chart;

use anyhow::{Context, Result};
use chart::{Axis, ChartSpec, Trace, ORANGE, TAB10};
use hotfire_analysis::{Channel, HotFireReport, SensorRecord};
use hotfire_core::ThrustTrace;
use plotters::prelude::{BLACK, BLUE, GREEN, RED};
use std::path::{Path, PathBuf};

/// One output figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Figure {
    ThrustComparison,
    OxTankMass,
    HighPressures,
    LowPressures,
    FlowRateVsPressure,
    PropMassFlow,
    EngineOfIsp,
}

impl Figure {
    pub const ALL: [Figure; 7] = [
        Self::ThrustComparison,
        Self::OxTankMass,
        Self::HighPressures,
        Self::LowPressures,
        Self::FlowRateVsPressure,
        Self::PropMassFlow,
        Self::EngineOfIsp,
    ];

    /// File name suffix, without extension.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::ThrustComparison => "Thrust-Curve-Comparison",
            Self::OxTankMass => "Ox-Tank-Mass",
            Self::HighPressures => "High-Pressures",
            Self::LowPressures => "Low-Pressures",
            Self::FlowRateVsPressure => "Flow-Rate-vs-Pressure",
            Self::PropMassFlow => "Prop-Mass-Flow",
            Self::EngineOfIsp => "Engine-OF-&-Isp",
        }
    }

    pub fn title(self, test_name: &str) -> String {
        let suffix = match self {
            Self::ThrustComparison => "Thrust-Curve",
            other => other.suffix(),
        };
        format!("{test_name}_{suffix}")
    }

    pub fn file_name(self, test_name: &str) -> String {
        format!("{test_name}_{}.png", self.suffix())
    }
}

/// Everything the figures draw from.
#[derive(Debug, Clone, Copy)]
pub struct PlotData<'a> {
    pub test_name: &'a str,
    /// Aligned sensor record.
    pub record: &'a SensorRecord,
    pub report: &'a HotFireReport,
    /// Commanded trace on the same time axis.
    pub trace: &'a ThrustTrace,
}

const PRESSURES: [(Channel, &str); 6] = [
    (Channel::PN2Tank, "N2 Tank"),
    (Channel::POxTank, "Ox Tank"),
    (Channel::PFuelTank, "Fuel Tank"),
    (Channel::PFuelInlet, "Ox Injector"),
    (Channel::PFuelInjector, "Fuel Injector"),
    (Channel::PChamber, "Chamber"),
];

fn pressure_traces<'a>(
    record: &'a SensorRecord,
    channels: &[(Channel, &'static str)],
) -> Result<Vec<Trace<'a>>> {
    channels
        .iter()
        .enumerate()
        .map(|(i, &(channel, label))| -> Result<Trace<'a>> {
            let y = record.channel(channel)?;
            Ok(Trace::line(label, &record.time, y, TAB10[i % TAB10.len()]))
        })
        .collect()
}

/// Chart layout for `figure`.
pub fn figure_spec<'a>(figure: Figure, data: &PlotData<'a>) -> Result<ChartSpec<'a>> {
    let s = &data.report.series;
    let t = s.time.as_slice();
    let title = figure.title(data.test_name);
    let time = "Time [s]";

    let spec = match figure {
        Figure::ThrustComparison => ChartSpec {
            title,
            x: Axis::fixed(time, 1.5..11.6),
            y: Axis::auto("Thrust [N]"),
            traces: vec![
                Trace::line("Smoothed_Thrust", t, &s.thrust_smoothed, BLACK),
                Trace::dots("Raw Thrust", t, &s.thrust_raw, RED),
                Trace::line("Nominal_Thrust_Trace", &data.trace.time, &data.trace.nominal, BLUE),
                Trace::line("Max_Thrust_Trace", &data.trace.time, &data.trace.upper, ORANGE),
                Trace::line("Min_Thrust_Trace", &data.trace.time, &data.trace.lower, GREEN),
            ],
            secondary: None,
        },
        Figure::OxTankMass => ChartSpec {
            title,
            x: Axis::auto(time),
            y: Axis::auto("Mass [kg]"),
            traces: vec![
                Trace::line("Smoothed Ox Mass", t, &s.ox_mass_smoothed, TAB10[0]),
                Trace::dots("Ox Mass", t, &s.ox_mass, RED),
            ],
            secondary: None,
        },
        Figure::HighPressures => ChartSpec {
            title,
            x: Axis::auto(time),
            y: Axis::auto("Pressure [bar]"),
            traces: pressure_traces(data.record, &PRESSURES)?,
            secondary: None,
        },
        Figure::LowPressures => ChartSpec {
            title,
            x: Axis::auto(time),
            y: Axis::auto("Pressure [bar]"),
            traces: pressure_traces(data.record, &PRESSURES[1..])?,
            secondary: None,
        },
        Figure::FlowRateVsPressure => ChartSpec {
            title,
            x: Axis::auto(time),
            y: Axis::auto("Pressure [bar]"),
            traces: pressure_traces(
                data.record,
                &[
                    (Channel::PFuelTank, "Fuel Tank"),
                    (Channel::PFuelInjector, "Fuel Injector"),
                    (Channel::PChamber, "Chamber"),
                ],
            )?,
            secondary: Some((
                Axis::fixed("Volumetric Flow Rate [L/s]", 0.0..1.0),
                vec![
                    Trace::line("Smoothed Fuel Flow Rate", t, &s.fuel_flow_smoothed, BLACK),
                    Trace::dots("Fuel Flow Rate", t, &s.fuel_flow, RED),
                ],
            )),
        },
        Figure::PropMassFlow => ChartSpec {
            title,
            x: Axis::fixed(time, 0.0..15.0),
            y: Axis::fixed("Mass Flow Rate [kg/s]", 0.0..1.0),
            traces: vec![
                Trace::line("m_dot_ox", t, &s.m_dot_ox, TAB10[0]),
                Trace::line("m_dot_fuel", t, &s.m_dot_fuel, TAB10[1]),
            ],
            secondary: None,
        },
        Figure::EngineOfIsp => ChartSpec {
            title,
            x: Axis::fixed(time, 0.0..15.0),
            y: Axis::fixed("Estimated OF Ratio", 0.0..3.0),
            traces: vec![Trace::line("OF Ratio", t, &s.mixture_ratio, BLACK)],
            secondary: Some((
                Axis::fixed("Estimated Isp [s]", 0.0..250.0),
                vec![Trace::line("Isp", t, &s.isp, RED)],
            )),
        },
    };
    Ok(spec)
}

/// Render one figure into `out_dir`, returning the written path.
pub fn render(figure: Figure, data: &PlotData, out_dir: &Path) -> Result<PathBuf> {
    let path = out_dir.join(figure.file_name(data.test_name));
    figure_spec(figure, data)?
        .draw(&path)
        .with_context(|| format!("Failed to render {}", path.display()))?;
    tracing::debug!("Rendered {}", path.display());
    Ok(path)
}

/// Render every figure into `out_dir`.
pub fn render_all(data: &PlotData, out_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let paths = Figure::ALL
        .iter()
        .map(|f| render(*f, data, out_dir))
        .collect::<Result<Vec<_>>>()?;
    tracing::info!("Wrote {} figures to {}", paths.len(), out_dir.display());
    Ok(paths)
}
