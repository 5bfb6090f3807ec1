//! Hotfire CLI - Command line interface for hot-fire test reduction.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use hotfire_analysis::{analyze, load_path, HotFireReport, TestConfig};
use hotfire_plot::{render_all, PlotData};
use std::path::{Path, PathBuf};

/// Public function that can be called from the main binary
pub fn run_cli_main(args: &[&str]) -> Result<()> {
    let args = Args::try_parse_from(args)?;
    run(args)
}

#[derive(Parser, Debug)]
#[command(name = "hotfire-cli")]
#[command(about = "Reduce a hot-fire test log to thrust, impulse, mass flow and Isp")]
#[command(version)]
pub struct Args {
    /// Raw backend log (default: <test name>_RAW-DATA-BACKEND.csv)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// JSON test config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Derived series export format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    #[arg(short, long)]
    test_name: Option<String>,

    // ── Test window (s after the first sample) ─────────────────
    #[arg(long)]
    t_start: Option<f64>,

    #[arg(long)]
    t_ignition: Option<f64>,

    #[arg(long)]
    t_end: Option<f64>,

    // ── Outputs ────────────────────────────────────────────────
    #[arg(long)]
    no_plots: bool,

    #[arg(long)]
    no_export: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

pub fn run(args: Args) -> Result<()> {
    println!("Hotfire Test Analysis");
    println!("=====================\n");

    let config = build_config(&args)?;
    run_analysis(&args, &config)
}

/// Config file (or defaults) with command line overrides applied.
pub fn build_config(args: &Args) -> Result<TestConfig> {
    let mut config = match &args.config {
        Some(path) => TestConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TestConfig::default(),
    };

    if let Some(name) = &args.test_name {
        config.test_name = name.clone();
    }
    if let Some(input) = &args.input {
        config.input = Some(input.clone());
    }
    if let Some(t) = args.t_start {
        config.window.start = t;
    }
    if let Some(t) = args.t_ignition {
        config.window.ignition = t;
    }
    if let Some(t) = args.t_end {
        config.window.end = t;
    }

    config.validate()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Analysis Run
// ---------------------------------------------------------------------------
fn run_analysis(args: &Args, config: &TestConfig) -> Result<()> {
    let input = config.input_path();
    println!("Test:  {}", config.test_name);
    println!("Input: {}", input.display());

    // 1. Load & align
    let record = load_path(&input, &config.load_options())
        .with_context(|| format!("Failed to load {}", input.display()))?;
    let aligned = record.align(&config.window)?;

    // 2. Reduce
    let report = analyze(&aligned, &config.calibration, Some(&config.profile))?;
    print_report_stats(&report);

    // 3. Export
    if !args.no_export {
        let path = write_output(&args.output_dir, args.format, config, &report)?;
        println!("Derived series written to {:?}", path);
    }

    // 4. Plot
    if !args.no_plots {
        let trace = config.profile.trace();
        let data = PlotData {
            test_name: &config.test_name,
            record: &aligned,
            report: &report,
            trace: &trace,
        };
        let figures = render_all(&data, &args.output_dir)?;
        for f in &figures {
            println!("  {}", f.display());
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn print_report_stats(report: &HotFireReport) {
    let s = &report.summary;
    println!("\nTotal Impulse: {} Ns", s.total_impulse);
    println!("  Samples:       {}", report.series.len());
    println!("  Peak Thrust:   {:.1} N", s.peak_thrust);
    println!("  Burn Time:     {:.2} s", s.burn_time);
    println!("  Ox Consumed:   {:.3} kg", s.ox_consumed);
    println!("  Fuel Consumed: {:.3} kg", s.fuel_consumed);
    if let Some(of) = s.mean_mixture_ratio {
        println!("  Mean OF:       {:.2}", of);
    }
    if let Some(isp) = s.mean_isp {
        println!("  Mean Isp:      {:.1} s", isp);
    }
    if let Some(c) = &s.compliance {
        println!(
            "  In Tolerance:  {:.1} % ({}/{} samples)",
            100.0 * c.fraction,
            c.within,
            c.samples
        );
    }
    println!("-----------------------------");
}

/// Write the derived series to `<out_dir>/<test>_Derived.<ext>`.
pub fn write_output(
    out_dir: &Path,
    format: OutputFormat,
    config: &TestConfig,
    report: &HotFireReport,
) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(format!("{}_Derived.{}", config.test_name, format.extension()));

    match format {
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_path(&path)?;
            let columns = report.series.columns();
            wtr.write_record(columns.iter().map(|(name, _)| *name))?;
            for i in 0..report.series.len() {
                wtr.write_record(columns.iter().map(|(_, values)| format!("{:.6}", values[i])))?;
            }
            wtr.flush()?;
        }
        OutputFormat::Json => {
            let doc = serde_json::json!({
                "test_name": config.test_name,
                "window": config.window,
                "summary": report.summary,
                "series": report.series,
            });
            std::fs::write(&path, serde_json::to_string_pretty(&doc)?)?;
        }
    }
    tracing::debug!("Exported {} rows to {}", report.series.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotfire_analysis::{generate_log, SynthConfig};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hotfire-cli-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_overrides_apply_on_top_of_defaults() {
        let args = Args::parse_from([
            "hotfire-cli",
            "--test-name",
            "T2",
            "--t-start",
            "10",
            "--t-ignition",
            "12",
            "--t-end",
            "30",
            "--format",
            "json",
        ]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.test_name, "T2");
        assert_eq!(config.window.start, 10.0);
        assert_eq!(config.window.ignition, 12.0);
        assert_eq!(config.window.end, 30.0);
        assert_eq!(config.input_path(), PathBuf::from("T2_RAW-DATA-BACKEND.csv"));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_inverted_window_rejected() {
        let args = Args::parse_from(["hotfire-cli", "--t-start", "50", "--t-end", "40"]);
        assert!(build_config(&args).is_err());
        assert!(run_cli_main(&["hotfire-cli", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_analysis_exports_series() {
        let dir = scratch_dir("export");
        let config = TestConfig::default();
        let log = generate_log(&SynthConfig::default(), &config).unwrap();
        let input = dir.join("log.csv");
        log.write_path(&input).unwrap();

        let input_arg = input.to_string_lossy().to_string();
        let out_arg = dir.to_string_lossy().to_string();
        run_cli_main(&[
            "hotfire-cli",
            "--input",
            &input_arg,
            "--output-dir",
            &out_arg,
            "--no-plots",
        ])
        .unwrap();

        let csv_path = dir.join(format!("{}_Derived.csv", config.test_name));
        let mut rdr = csv::Reader::from_path(&csv_path).unwrap();
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(&headers[0], "time");
        assert_eq!(&headers[10], "isp");
        assert_eq!(rdr.records().count(), 1799);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_json_export() {
        let dir = scratch_dir("json");
        let config = TestConfig {
            test_name: "J1".into(),
            ..TestConfig::default()
        };
        let log = generate_log(&SynthConfig::default(), &config).unwrap();
        let record = hotfire_analysis::load_csv(
            log.to_csv_bytes().unwrap().as_slice(),
            &config.load_options(),
        )
        .unwrap()
        .align(&config.window)
        .unwrap();
        let report = analyze(&record, &config.calibration, None).unwrap();

        let path = write_output(&dir, OutputFormat::Json, &config, &report).unwrap();
        assert_eq!(path.file_name().unwrap(), "J1_Derived.json");
        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["test_name"], "J1");
        assert!(doc["summary"]["total_impulse"].as_f64().unwrap() > 10_000.0);
        assert_eq!(doc["series"]["time"].as_array().unwrap().len(), report.series.len());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
