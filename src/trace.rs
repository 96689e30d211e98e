//! Recorded touch traces for replay
//!
//! A trace is a sequence of frames, each holding the raw events delivered
//! between two reads of the tracker. Two on-disk forms are accepted:
//!
//! - CSV with header `frame,phase,x,y,prev_x,prev_y` (prev columns may be empty
//!   for `down` rows)
//! - JSON array of `{ "frame": n, "events": [...] }` objects

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::tracker::{Point, TouchEvent};

/// Events delivered in one frame
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TraceFrame {
    pub frame: u64,
    pub events: Vec<TouchEvent>,
}

/// Loaded trace, frames in ascending order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    pub frames: Vec<TraceFrame>,
}

/// CSV row
#[derive(Debug, Deserialize)]
struct TraceRow {
    frame: u64,
    phase: RowPhase,
    x: f32,
    y: f32,
    prev_x: Option<f32>,
    prev_y: Option<f32>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RowPhase {
    Down,
    Move,
    Up,
}

impl TraceRow {
    fn into_event(self, line: usize) -> Result<TouchEvent> {
        let position = Point::new(self.x, self.y);
        let previous = || -> Result<Point> {
            match (self.prev_x, self.prev_y) {
                (Some(px), Some(py)) => Ok(Point::new(px, py)),
                _ => anyhow::bail!("Row {} needs prev_x and prev_y", line),
            }
        };

        Ok(match self.phase {
            RowPhase::Down => TouchEvent::Down { position },
            RowPhase::Move => TouchEvent::Move {
                position,
                previous: previous()?,
            },
            RowPhase::Up => TouchEvent::Up {
                position,
                previous: previous()?,
            },
        })
    }
}

impl Trace {
    /// Load a trace, picking the format from the file extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read trace file: {}", path.display()))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let trace = match extension.as_deref() {
            Some("csv") => Self::from_csv_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            _ => anyhow::bail!(
                "Unsupported trace format: {} (expected .csv or .json)",
                path.display()
            ),
        }
        .with_context(|| format!("Failed to parse trace: {}", path.display()))?;

        debug!(
            "Loaded trace {} with {} frames, {} events",
            path.display(),
            trace.frames.len(),
            trace.event_count()
        );
        Ok(trace)
    }

    /// Parse CSV content
    pub fn from_csv_str(csv_content: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(csv_content.as_bytes());

        let mut frames: BTreeMap<u64, Vec<TouchEvent>> = BTreeMap::new();
        for (idx, result) in reader.deserialize().enumerate() {
            // Header is line 1
            let line = idx + 2;
            let row: TraceRow =
                result.with_context(|| format!("Failed to parse CSV row {}", line))?;
            let frame = row.frame;
            frames.entry(frame).or_default().push(row.into_event(line)?);
        }

        Ok(Self {
            frames: frames
                .into_iter()
                .map(|(frame, events)| TraceFrame { frame, events })
                .collect(),
        })
    }

    /// Parse JSON content
    pub fn from_json_str(json_content: &str) -> Result<Self> {
        let mut frames: Vec<TraceFrame> =
            serde_json::from_str(json_content).context("Failed to parse JSON trace")?;
        frames.sort_by_key(|f| f.frame);
        Ok(Self { frames })
    }

    pub fn event_count(&self) -> usize {
        self.frames.iter().map(|f| f.events.len()).sum()
    }
}
