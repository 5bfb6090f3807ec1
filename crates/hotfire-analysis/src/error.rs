use crate::channel::Channel;
use hotfire_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Missing channel {channel} (raw column '{raw}')")]
    MissingChannel { channel: Channel, raw: String },

    #[error("Malformed value '{value}' in column '{column}' at row {row}")]
    MalformedValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("No samples inside test window ({start} s, {end} s)")]
    EmptyWindow { start: f64, end: f64 },

    #[error("{label} = {value} outside [{min}, {max}] ({name})")]
    InvalidParam {
        name: &'static str,
        label: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Synthetic log error: {0}")]
    Synth(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
