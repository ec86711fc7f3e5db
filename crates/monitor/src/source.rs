//! Landmark sources feeding the detection session

use dms::{LandmarkSet, Point};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::MonitorError;

/// Produces the faces found in each frame, in frame order.
///
/// Stands in for the camera + face detector + landmark predictor chain.
#[allow(async_fn_in_trait)]
pub trait LandmarkSource {
    /// Landmarks of every face in the next frame, or `None` once exhausted.
    /// An empty list is a frame without a face.
    async fn next_frame(&mut self) -> Result<Option<Vec<LandmarkSet>>, MonitorError>;
}

/// One line of a landmark recording
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameRecord {
    #[serde(default)]
    pub faces: Vec<Vec<Point>>,
}

/// Replays a JSON-lines landmark recording, one frame per line:
///
/// ```text
/// {"faces": [[[x0, y0], [x1, y1], ... 68 points]]}
/// {"faces": []}
/// ```
///
/// Malformed lines, and lines whose first face has the wrong number of
/// points, are logged and replayed as frames without a face. Other malformed
/// faces are dropped.
pub struct ReplaySource<R> {
    lines: Lines<R>,
    pacing: Option<Interval>,
    line_number: usize,
    frames: usize,
}

impl ReplaySource<BufReader<File>> {
    /// Open a recording on disk
    pub async fn open(path: &Path, frame_interval: Option<Duration>) -> Result<Self, MonitorError> {
        let file = File::open(path).await?;
        info!("Replaying landmarks from {}", path.display());
        Ok(Self::new(BufReader::new(file), frame_interval))
    }
}

impl<R: AsyncBufRead + Unpin> ReplaySource<R> {
    pub fn new(reader: R, frame_interval: Option<Duration>) -> Self {
        let pacing = frame_interval.map(|period| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        Self {
            lines: reader.lines(),
            pacing,
            line_number: 0,
            frames: 0,
        }
    }

    /// Frames handed out so far
    pub fn frames(&self) -> usize {
        self.frames
    }

    fn parse(&self, line: &str) -> Vec<LandmarkSet> {
        let record: FrameRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(e) => {
                warn!("Malformed frame on line {}: {}", self.line_number, e);
                return Vec::new();
            }
        };

        let mut faces = Vec::with_capacity(record.faces.len());
        for (index, points) in record.faces.into_iter().enumerate() {
            match LandmarkSet::new(points) {
                Ok(face) => faces.push(face),
                // the first face is the analyzed one; never promote another
                Err(e) if index == 0 => {
                    warn!("Malformed first face on line {}: {}", self.line_number, e);
                    return Vec::new();
                }
                Err(e) => warn!("Dropping face {} on line {}: {}", index, self.line_number, e),
            }
        }
        faces
    }
}

impl<R: AsyncBufRead + Unpin> LandmarkSource for ReplaySource<R> {
    async fn next_frame(&mut self) -> Result<Option<Vec<LandmarkSet>>, MonitorError> {
        loop {
            let Some(line) = self.lines.next_line().await? else {
                return Ok(None);
            };
            self.line_number += 1;

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(pacing) = self.pacing.as_mut() {
                pacing.tick().await;
            }

            self.frames += 1;
            return Ok(Some(self.parse(line)));
        }
    }
}
