use std::{
    io::BufRead,
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossbeam_channel::{Sender, TrySendError};
use serde::Deserialize;
use serde_json::Value;

use crate::types::{Landmark, TrackerFrame};

/// One line of landmark tracker output.
#[derive(Debug, Deserialize)]
struct TrackerRecord {
    #[serde(default)]
    hands: Vec<Value>,
    #[serde(default)]
    timestamp_ms: Option<u64>,
}

impl TrackerRecord {
    fn into_hands(self) -> Vec<Vec<Option<Landmark>>> {
        self.hands.into_iter().map(decode_hand).collect()
    }
}

/// Entries that are not well-formed points become gaps, and a hand that is
/// not a list becomes empty, so bad hands still reach validation and break
/// the current run instead of vanishing with the whole line.
fn decode_hand(raw: Value) -> Vec<Option<Landmark>> {
    match raw {
        Value::Array(entries) => entries
            .into_iter()
            .map(|entry| serde_json::from_value(entry).ok())
            .collect(),
        other => {
            log::debug!("hand entry is not a landmark list: {other}");
            Vec::new()
        }
    }
}

fn parse_record(line: &str) -> Result<TrackerRecord> {
    serde_json::from_str(line).context("failed to parse tracker record")
}

/// Reads tracker output on its own thread and forwards frames stamped on
/// arrival. Frames are dropped when the session is busy; the thread ends at
/// end of input or once the session goes away.
pub fn start_landmark_stream<R>(reader: R, frame_tx: Sender<TrackerFrame>) -> thread::JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        let mut dropped = 0usize;
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    log::error!("tracker input failed: {err:?}");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            let record = match parse_record(&line) {
                Ok(record) => record,
                Err(err) => {
                    log::warn!("skipping tracker line: {err:#}");
                    continue;
                }
            };

            let frame = TrackerFrame {
                hands: record.into_hands(),
                timestamp: Instant::now(),
            };

            match frame_tx.try_send(frame) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    dropped += 1;
                    log::trace!("session busy, dropped frame ({dropped} so far)");
                }
                Err(TrySendError::Disconnected(_)) => break,
            }
        }
        log::info!("landmark stream ended ({dropped} frames dropped)");
    })
}

/// Recorded tracker output, yielded in order with reproducible timestamps.
///
/// Records carrying `timestamp_ms` are placed at that offset from the start;
/// the rest are spaced `frame_interval` apart by position.
pub struct ReplayFrames<R> {
    lines: std::io::Lines<R>,
    start: Instant,
    frame_interval: Duration,
    index: u32,
}

impl<R: BufRead> ReplayFrames<R> {
    pub fn new(reader: R, frame_interval: Duration) -> Self {
        Self {
            lines: reader.lines(),
            start: Instant::now(),
            frame_interval,
            index: 0,
        }
    }
}

impl<R: BufRead> Iterator for ReplayFrames<R> {
    type Item = Result<TrackerFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(err).context("failed to read replay input")),
            };
            if line.trim().is_empty() {
                continue;
            }

            let position = self.index;
            self.index += 1;
            let record = match parse_record(&line) {
                Ok(record) => record,
                Err(err) => {
                    log::warn!("skipping replay record {position}: {err:#}");
                    continue;
                }
            };

            let offset = record
                .timestamp_ms
                .map(Duration::from_millis)
                .unwrap_or(self.frame_interval * position);
            return Some(Ok(TrackerFrame {
                hands: record.into_hands(),
                timestamp: self.start + offset,
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn parses_hands_with_missing_points() {
        let record =
            parse_record(r#"{"hands":[[{"x":0.1,"y":0.2,"z":0.0},null,{"x":0.3,"y":0.4}]]}"#).unwrap();
        assert_eq!(record.timestamp_ms, None);
        let hands = record.into_hands();
        assert_eq!(hands.len(), 1);
        assert_eq!(hands[0][0], Some(Landmark::new(0.1, 0.2, 0.0)));
        assert_eq!(hands[0][1], None);
        assert_eq!(hands[0][2], Some(Landmark::new(0.3, 0.4, 0.0)));
    }

    #[test]
    fn malformed_hands_survive_parsing() {
        let record = parse_record(
            r#"{"hands":[[{"x":0.1,"y":0.2},{"y":0.5},{"x":"left","y":0.1},7],"open"]}"#,
        )
        .unwrap();
        let hands = record.into_hands();
        assert_eq!(hands.len(), 2);
        assert_eq!(hands[0], vec![Some(Landmark::new(0.1, 0.2, 0.0)), None, None, None]);
        assert!(hands[1].is_empty());

        assert!(parse_record(r#"{"hands":"none"}"#).is_err());
    }

    #[test]
    fn replay_spaces_frames_and_skips_garbage() {
        let input = "{\"hands\":[]}\n\nnot json\n{\"hands\":[],\"timestamp_ms\":500}\n{}\n";
        let frames: Vec<TrackerFrame> = ReplayFrames::new(Cursor::new(input), Duration::from_millis(40))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(frames.len(), 3);
        let start = frames[0].timestamp;
        assert_eq!(frames[1].timestamp - start, Duration::from_millis(500));
        // Position counts the skipped record too.
        assert_eq!(frames[2].timestamp - start, Duration::from_millis(120));
    }

    #[test]
    fn live_stream_forwards_and_finishes() {
        let input = "{\"hands\":[]}\n{\"hands\":[[]]}\n";
        let (tx, rx) = crossbeam_channel::bounded(4);
        start_landmark_stream(Cursor::new(input), tx).join().unwrap();
        let frames: Vec<TrackerFrame> = rx.iter().collect();
        assert_eq!(frames.len(), 2);
        assert!(frames[0].first_hand().is_none());
        assert_eq!(frames[1].first_hand().map(<[_]>::len), Some(0));
    }
}
