use crate::channel::{Channel, ChannelMap};
use crate::error::{AnalysisError, AnalysisResult};
use hotfire_core::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// How to interpret a raw backend log.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub channels: ChannelMap,
    /// Column holding the row index; never read as a channel.
    pub index_column: Option<usize>,
    /// Raw time units per second (1000 for millisecond stamps).
    pub time_scale: f64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            channels: ChannelMap::default(),
            index_column: Some(1),
            time_scale: 1000.0,
        }
    }
}

/// Test window relative to the first logged sample (s).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestWindow {
    pub start: f64,
    pub ignition: f64,
    pub end: f64,
}

impl Default for TestWindow {
    fn default() -> Self {
        Self {
            start: 142.0,
            ignition: 144.2,
            end: 160.0,
        }
    }
}

impl TestWindow {
    pub fn validate(&self) -> AnalysisResult<()> {
        if !(self.start.is_finite() && self.end.is_finite() && self.ignition.is_finite()) {
            return Err(AnalysisError::Config("test window bounds must be finite".into()));
        }
        if self.start >= self.end {
            return Err(AnalysisError::Config(format!(
                "test window start {} must precede end {}",
                self.start, self.end
            )));
        }
        if self.ignition < self.start || self.ignition > self.end {
            tracing::warn!(
                "Ignition at {} s lies outside the window ({} s, {} s)",
                self.ignition,
                self.start,
                self.end
            );
        }
        Ok(())
    }
}

/// Time-indexed channel measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorRecord {
    /// Seconds; absolute after loading, ignition-relative after [`SensorRecord::align`].
    pub time: Vec<f64>,
    pub channels: BTreeMap<Channel, Vec<f64>>,
    /// Raw column ids the channels were read from.
    pub sources: ChannelMap,
}

impl SensorRecord {
    /// Record with the default channel map, rejecting channels whose length
    /// differs from `time`.
    pub fn new(time: Vec<f64>, channels: BTreeMap<Channel, Vec<f64>>) -> AnalysisResult<Self> {
        let record = Self {
            time,
            channels,
            sources: ChannelMap::default(),
        };
        record.check_lengths()?;
        Ok(record)
    }

    /// Every channel must carry one value per time sample.
    pub fn check_lengths(&self) -> AnalysisResult<()> {
        for values in self.channels.values() {
            if values.len() != self.time.len() {
                return Err(CoreError::LengthMismatch {
                    x_len: self.time.len(),
                    y_len: values.len(),
                }
                .into());
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn has(&self, channel: Channel) -> bool {
        self.channels.contains_key(&channel)
    }

    pub fn channel(&self, channel: Channel) -> AnalysisResult<&[f64]> {
        self.channels
            .get(&channel)
            .map(Vec::as_slice)
            .ok_or_else(|| AnalysisError::MissingChannel {
                channel,
                raw: self.sources.raw_id(channel).to_string(),
            })
    }

    /// Re-zero to the first sample, keep `start < t < end`, then shift so
    /// ignition is t = 0.
    pub fn align(&self, window: &TestWindow) -> AnalysisResult<SensorRecord> {
        window.validate()?;
        self.check_lengths()?;
        let empty = || AnalysisError::EmptyWindow {
            start: window.start,
            end: window.end,
        };
        let t0 = *self.time.first().ok_or_else(empty)?;

        let keep: Vec<usize> = self
            .time
            .iter()
            .enumerate()
            .filter(|(_, t)| {
                let rel = *t - t0;
                rel > window.start && rel < window.end
            })
            .map(|(i, _)| i)
            .collect();
        if keep.is_empty() {
            return Err(empty());
        }

        let time = keep
            .iter()
            .map(|&i| self.time[i] - t0 - window.ignition)
            .collect();
        let channels = self
            .channels
            .iter()
            .map(|(c, values)| (*c, keep.iter().map(|&i| values[i]).collect()))
            .collect();

        tracing::info!(
            "Aligned {} of {} samples to ignition at {} s",
            keep.len(),
            self.len(),
            window.ignition
        );

        Ok(SensorRecord {
            time,
            channels,
            sources: self.sources.clone(),
        })
    }
}

/// Parse a backend CSV log from any reader.
pub fn load_csv<R: Read>(reader: R, opts: &LoadOptions) -> AnalysisResult<SensorRecord> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();

    // Resolve each channel to a column position
    let mut columns: Vec<(Channel, usize)> = Vec::new();
    for (channel, raw) in opts.channels.iter() {
        let pos = headers
            .iter()
            .enumerate()
            .find(|(i, h)| Some(*i) != opts.index_column && *h == raw)
            .map(|(i, _)| i);
        match pos {
            Some(i) => columns.push((channel, i)),
            None if channel.is_required() => {
                return Err(AnalysisError::MissingChannel {
                    channel,
                    raw: raw.to_string(),
                })
            }
            None => tracing::debug!("Optional channel {} ('{}') not logged", channel, raw),
        }
    }

    let mut time = Vec::new();
    let mut channels: BTreeMap<Channel, Vec<f64>> = columns
        .iter()
        .filter(|(c, _)| *c != Channel::Time)
        .map(|(c, _)| (*c, Vec::new()))
        .collect();

    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        for (channel, col) in &columns {
            let cell = record.get(*col).unwrap_or("");
            let value: f64 = cell.parse().map_err(|_| AnalysisError::MalformedValue {
                row: row + 1,
                column: headers.get(*col).unwrap_or("").to_string(),
                value: cell.to_string(),
            })?;
            if *channel == Channel::Time {
                time.push(value / opts.time_scale);
            } else if let Some(values) = channels.get_mut(channel) {
                values.push(value);
            }
        }
    }

    tracing::info!(
        "Loaded {} samples across {} channels",
        time.len(),
        channels.len()
    );

    Ok(SensorRecord {
        time,
        channels,
        sources: opts.channels.clone(),
    })
}

pub fn load_path<P: AsRef<Path>>(path: P, opts: &LoadOptions) -> AnalysisResult<SensorRecord> {
    let file = std::fs::File::open(path.as_ref())?;
    tracing::debug!("Reading {}", path.as_ref().display());
    load_csv(std::io::BufReader::new(file), opts)
}
