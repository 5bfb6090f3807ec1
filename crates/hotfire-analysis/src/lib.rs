//! Hotfire Analysis Library
//!
//! Loads a hot-fire sensor log, aligns it to ignition and reduces it to
//! propulsion quantities. Also generates synthetic logs in the same raw
//! schema.

pub mod channel;
pub mod config;
pub mod derived;
pub mod error;
pub mod params;
pub mod sensor;
pub mod synth;

// Re-export main types
pub use channel::{Channel, ChannelMap};
pub use config::TestConfig;
pub use derived::{analyze, reduce, BandCompliance, Calibration, DerivedSeries, HotFireReport, ReportSummary};
pub use error::{AnalysisError, AnalysisResult};
pub use sensor::{load_csv, load_path, LoadOptions, SensorRecord, TestWindow};
pub use synth::{generate_log, SynthConfig, SyntheticLog};
