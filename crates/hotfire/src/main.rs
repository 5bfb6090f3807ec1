//! Hotfire - Hot-fire test analysis toolkit

use anyhow::Context;
use clap::{Parser, Subcommand};
use hotfire_analysis::{generate_log, SynthConfig, TestConfig};
use hotfire_core::ThrustTrace;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hotfire")]
#[command(about = "Hot-fire test analysis: thrust, impulse, mass flow and Isp")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reduce a recorded test log
    Analyze {
        /// Pass remaining arguments to hotfire-cli
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Export the commanded throttle profile and its propellant budget
    Profile {
        /// JSON test config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,
    },
    /// Write a synthetic raw log for a test config
    Synth {
        /// JSON test config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file (default: the config's input path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[arg(long, default_value_t = 1.0)]
        noise_scale: f64,

        #[arg(long, default_value_t = 100.0)]
        sample_rate: f64,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { args } => {
            let cli_args: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
            run_analyze(&cli_args)
        }
        Commands::Profile { config, output_dir } => {
            let config = load_config(config.as_deref())?;
            run_profile(&config, &output_dir)
        }
        Commands::Synth {
            config,
            output,
            seed,
            noise_scale,
            sample_rate,
        } => {
            let config = load_config(config.as_deref())?;
            let synth = SynthConfig {
                seed,
                noise_scale,
                sample_rate_hz: sample_rate,
                ..SynthConfig::default()
            };
            let output = output.unwrap_or_else(|| config.input_path());
            run_synth(&config, &synth, &output)
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<TestConfig> {
    match path {
        Some(p) => TestConfig::from_json_file(p)
            .with_context(|| format!("Failed to load config {}", p.display())),
        None => Ok(TestConfig::default()),
    }
}

fn run_analyze(args: &[&str]) -> anyhow::Result<()> {
    let mut full_args = vec!["hotfire-cli"];
    full_args.extend(args);

    match hotfire_cli::run_cli_main(&full_args) {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("Analysis error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run_profile(config: &TestConfig, output_dir: &Path) -> anyhow::Result<()> {
    let profile = &config.profile;
    profile.validate()?;

    println!("Commanded Throttle Profile");
    println!("==========================\n");
    println!("  Nominal Thrust: {:.1} N", profile.nominal_thrust);
    println!("  Low Thrust:     {:.1} N", profile.low_thrust());
    println!("  Tolerance:      ±{:.1} N", profile.tolerance());

    println!("\nPhases:");
    for (phase, start, end) in profile.schedule().spans(profile.duration) {
        let ramp = if phase.is_ramp() { "  (ramp)" } else { "" };
        println!("  {:<14} {:>6.3} - {:>6.3} s{}", phase.label(), start, end, ramp);
    }

    let summary = profile.summary(config.design_isp)?;
    println!("\nIdeal Impulse:  {:.1} Ns", summary.total_impulse);
    println!(
        "Propellant:     {:.2} kg at Isp {:.0} s (ox tank {:.1} kg)",
        summary.propellant_mass, summary.design_isp, config.ox_capacity
    );
    println!("-----------------------------");

    let path = write_trace(&profile.trace(), &config.test_name, output_dir)?;
    println!("Trace written to {:?}", path);
    Ok(())
}

/// Commanded trace as `<out_dir>/<test>_Thrust-Trace.csv`.
fn write_trace(trace: &ThrustTrace, test_name: &str, output_dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("{test_name}_Thrust-Trace.csv"));
    let mut wtr = csv::Writer::from_path(&path)?;
    wtr.write_record(["time", "nominal", "max", "min"])?;
    for i in 0..trace.len() {
        wtr.write_record(&[
            format!("{:.4}", trace.time[i]),
            format!("{:.4}", trace.nominal[i]),
            format!("{:.4}", trace.upper[i]),
            format!("{:.4}", trace.lower[i]),
        ])?;
    }
    wtr.flush()?;
    Ok(path)
}

fn run_synth(config: &TestConfig, synth: &SynthConfig, output: &Path) -> anyhow::Result<()> {
    let log = generate_log(synth, config)?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    log.write_path(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Synthetic log for {}", config.test_name);
    println!("  Samples:       {}", log.len());
    println!("  Clean Impulse: {:.1} Ns", log.total_impulse);
    println!("  Ox Burned:     {:.3} kg", log.ox_consumed);
    println!("Written to {:?}", output);
    tracing::info!("Seed {} noise scale {}", synth.seed, synth.noise_scale);
    Ok(())
}
