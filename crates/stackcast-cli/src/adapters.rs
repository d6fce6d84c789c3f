//! File-backed series adapters.
//!
//! - JSON series documents: `[{"name": ..., "samples": [{"time": ..., "value": ...}]}]`
//!   or the same list under a `"series"` key
//! - Data frames: `[{"name": ..., "refId": ..., "fields": [{"values": [ms...]}, {"values": [...]}]}]`
//!   or the same list under a `"frames"` key
//! - Long-form CSV with `series,time,value` columns
//!
//! Times are RFC 3339 strings or integer milliseconds since the epoch.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use projection_facade::{ProjectionError, Result, Sample, Series, SeriesAdapter};
use serde::Deserialize;
use serde_json::Value;

fn source_error(path: &Path, reason: impl std::fmt::Display) -> ProjectionError {
    ProjectionError::Source(format!("{}: {}", path.display(), reason))
}

/// Parse RFC 3339 or integer milliseconds.
pub fn parse_time(text: &str) -> std::result::Result<DateTime<Utc>, String> {
    let text = text.trim();
    if let Ok(ms) = text.parse::<i64>() {
        return DateTime::from_timestamp_millis(ms)
            .ok_or_else(|| format!("timestamp {} is out of range", ms));
    }
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("invalid time '{}': {}", text, e))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TimeValue {
    Millis(i64),
    Text(String),
}

impl TimeValue {
    fn resolve(&self) -> std::result::Result<DateTime<Utc>, String> {
        match self {
            TimeValue::Millis(ms) => DateTime::from_timestamp_millis(*ms)
                .ok_or_else(|| format!("timestamp {} is out of range", ms)),
            TimeValue::Text(text) => parse_time(text),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SampleDoc {
    time: TimeValue,
    #[serde(default)]
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SeriesDoc {
    name: String,
    #[serde(default)]
    samples: Vec<SampleDoc>,
}

#[derive(Debug, Deserialize)]
struct FieldDoc {
    #[serde(default)]
    values: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct FrameDoc {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "refId")]
    ref_id: Option<String>,
    #[serde(default)]
    fields: Vec<FieldDoc>,
}

fn read_json(path: &Path) -> Result<Value> {
    let file = File::open(path).map_err(|e| source_error(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| source_error(path, e))
}

/// The list under `key`, or the document itself.
fn unwrap_list(value: Value, key: &str) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key(key) => map.remove(key).unwrap_or(Value::Null),
        other => other,
    }
}

fn looks_like_frames(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.contains_key("frames"),
        Value::Array(items) => items.first().map_or(false, |f| f.get("fields").is_some()),
        _ => false,
    }
}

fn decode_series(path: &Path, value: Value) -> Result<Vec<Series>> {
    let docs: Vec<SeriesDoc> =
        serde_json::from_value(unwrap_list(value, "series")).map_err(|e| source_error(path, e))?;
    docs.into_iter()
        .map(|doc| {
            let samples = doc
                .samples
                .into_iter()
                .map(|s| {
                    let time = s.time.resolve().map_err(|e| source_error(path, e))?;
                    Ok(Sample {
                        time,
                        value: s.value,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Series::new(doc.name, samples))
        })
        .collect()
}

fn decode_frames(path: &Path, value: Value) -> Result<Vec<Series>> {
    let frames: Vec<FrameDoc> =
        serde_json::from_value(unwrap_list(value, "frames")).map_err(|e| source_error(path, e))?;
    frames
        .into_iter()
        .enumerate()
        .map(|(index, frame)| {
            let name = frame
                .name
                .filter(|n| !n.is_empty())
                .or(frame.ref_id)
                .unwrap_or_else(|| format!("series-{}", index + 1));
            if frame.fields.len() < 2 {
                return Err(source_error(
                    path,
                    format!("frame '{}' needs a time field and a value field", name),
                ));
            }
            let times = &frame.fields[0].values;
            let values = &frame.fields[1].values;
            if times.len() != values.len() {
                return Err(source_error(
                    path,
                    format!(
                        "frame '{}' has {} times but {} values",
                        name,
                        times.len(),
                        values.len()
                    ),
                ));
            }
            let samples = times
                .iter()
                .zip(values)
                .filter_map(|(time, value)| time.map(|t| (t, *value)))
                .map(|(ms, value)| {
                    let time = frame_time(ms).map_err(|e| source_error(path, e))?;
                    Ok(Sample { time, value })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Series::new(name, samples))
        })
        .collect()
}

/// A frame time must be a whole number of milliseconds.
fn frame_time(ms: f64) -> std::result::Result<DateTime<Utc>, String> {
    if ms.fract() != 0.0 || !(i64::MIN as f64..i64::MAX as f64).contains(&ms) {
        return Err(format!("timestamp {} is not an integer millisecond", ms));
    }
    DateTime::from_timestamp_millis(ms as i64)
        .ok_or_else(|| format!("timestamp {} is out of range", ms))
}

/// JSON series documents, or data frames when the document has `fields`.
#[derive(Debug, Clone)]
pub struct JsonSeriesAdapter {
    path: PathBuf,
}

impl JsonSeriesAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SeriesAdapter for JsonSeriesAdapter {
    fn load(&self) -> Result<Vec<Series>> {
        let value = read_json(&self.path)?;
        if looks_like_frames(&value) {
            decode_frames(&self.path, value)
        } else {
            decode_series(&self.path, value)
        }
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

/// Data frames only; the first field holds millisecond times, the second values.
#[derive(Debug, Clone)]
pub struct FrameAdapter {
    path: PathBuf,
}

impl FrameAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SeriesAdapter for FrameAdapter {
    fn load(&self) -> Result<Vec<Series>> {
        decode_frames(&self.path, read_json(&self.path)?)
    }

    fn describe(&self) -> String {
        format!("frames:{}", self.path.display())
    }
}

/// Long-form CSV. Series keep the order of their first row.
#[derive(Debug, Clone)]
pub struct CsvSeriesAdapter {
    path: PathBuf,
}

impl CsvSeriesAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SeriesAdapter for CsvSeriesAdapter {
    fn load(&self) -> Result<Vec<Series>> {
        let path = self.path.as_path();
        let file = File::open(path).map_err(|e| source_error(path, e))?;
        let mut reader = csv::Reader::from_reader(BufReader::new(file));

        let headers = reader.headers().map_err(|e| source_error(path, e))?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| source_error(path, format!("missing column '{}'", name)))
        };
        let (series_col, time_col, value_col) = (column("series")?, column("time")?, column("value")?);

        let mut series: Vec<Series> = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| source_error(path, e))?;
            let field = |col: usize| record.get(col).unwrap_or("").trim();

            let name = field(series_col);
            let time = parse_time(field(time_col))
                .map_err(|e| source_error(path, format!("row {}: {}", row + 1, e)))?;
            let raw = field(value_col);
            let value = if raw.is_empty() {
                None
            } else {
                Some(raw.parse::<f64>().map_err(|e| {
                    source_error(path, format!("row {}: invalid value '{}': {}", row + 1, raw, e))
                })?)
            };

            let sample = Sample { time, value };
            match series.iter_mut().find(|s| s.name == name) {
                Some(existing) => existing.samples.push(sample),
                None => series.push(Series::new(name, vec![sample])),
            }
        }
        Ok(series)
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}

/// Input file layouts accepted by `--input-format`.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// JSON series documents (data frames are detected)
    Json,
    /// JSON data frames
    Frames,
    /// Long-form `series,time,value` CSV
    Csv,
}

impl InputFormat {
    /// `.csv` is long-form CSV, anything else JSON.
    pub fn from_extension(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "csv" => InputFormat::Csv,
            _ => InputFormat::Json,
        }
    }
}

/// Pick an adapter for `path`, guessing the format from its extension when not given.
pub fn adapter_for(path: &Path, format: Option<InputFormat>) -> Box<dyn SeriesAdapter> {
    match format.unwrap_or_else(|| InputFormat::from_extension(path)) {
        InputFormat::Json => Box::new(JsonSeriesAdapter::new(path)),
        InputFormat::Frames => Box::new(FrameAdapter::new(path)),
        InputFormat::Csv => Box::new(CsvSeriesAdapter::new(path)),
    }
}
