use std::{fmt, time::Instant};

use serde::{Deserialize, Serialize};

use crate::error::{GestureError, InputFault};

pub const LANDMARK_COUNT: usize = 21;

/// Hand landmark indices in the standard 21-point hand topology.
#[allow(dead_code)]
pub mod landmarks {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

/// A point in normalized image coordinates. `y` grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One detected hand at one point in time: exactly 21 finite landmarks.
#[derive(Clone, Debug, PartialEq)]
pub struct HandFrame {
    points: [Landmark; LANDMARK_COUNT],
}

impl HandFrame {
    pub fn new(points: &[Landmark]) -> Result<Self, GestureError> {
        if points.len() != LANDMARK_COUNT {
            return Err(InputFault::LandmarkCount(points.len()).into());
        }
        let mut out = [Landmark::default(); LANDMARK_COUNT];
        for (idx, (slot, point)) in out.iter_mut().zip(points).enumerate() {
            if !point.is_finite() {
                return Err(InputFault::NonFinite(idx).into());
            }
            *slot = *point;
        }
        Ok(Self { points: out })
    }

    /// Builds a frame from tracker output where individual entries may be absent.
    pub fn from_partial(points: &[Option<Landmark>]) -> Result<Self, GestureError> {
        if points.len() != LANDMARK_COUNT {
            return Err(InputFault::LandmarkCount(points.len()).into());
        }
        let resolved = points
            .iter()
            .enumerate()
            .map(|(idx, point)| point.ok_or(InputFault::MissingLandmark(idx)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(&resolved)
    }

    pub fn point(&self, index: usize) -> Landmark {
        self.points[index]
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// Landmarks from metacarpal to fingertip.
    pub fn joints(&self) -> [usize; 4] {
        let base = match self {
            Finger::Thumb => landmarks::THUMB_CMC,
            Finger::Index => landmarks::INDEX_MCP,
            Finger::Middle => landmarks::MIDDLE_MCP,
            Finger::Ring => landmarks::RING_MCP,
            Finger::Pinky => landmarks::PINKY_MCP,
        };
        [base, base + 1, base + 2, base + 3]
    }
}

/// Per-finger "extended" flags derived from one hand frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerStates {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerStates {
    pub fn get(&self, finger: Finger) -> bool {
        match finger {
            Finger::Thumb => self.thumb,
            Finger::Index => self.index,
            Finger::Middle => self.middle,
            Finger::Ring => self.ring,
            Finger::Pinky => self.pinky,
        }
    }

    pub fn set(&mut self, finger: Finger, extended: bool) {
        match finger {
            Finger::Thumb => self.thumb = extended,
            Finger::Index => self.index = extended,
            Finger::Middle => self.middle = extended,
            Finger::Ring => self.ring = extended,
            Finger::Pinky => self.pinky = extended,
        }
    }

    /// True when the extended flags equal `[thumb, index, middle, ring, pinky]`.
    pub fn is(&self, pattern: [bool; 5]) -> bool {
        [self.thumb, self.index, self.middle, self.ring, self.pinky] == pattern
    }

    pub fn all_extended(&self) -> bool {
        self.is([true; 5])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GestureKind {
    ThumbsUp,
    ThumbsDown,
    Peace,
    Ok,
    Wave,
    Stop,
    Point,
    Rock,
}

impl GestureKind {
    pub const ALL: [GestureKind; 8] = [
        GestureKind::ThumbsUp,
        GestureKind::ThumbsDown,
        GestureKind::Peace,
        GestureKind::Ok,
        GestureKind::Wave,
        GestureKind::Stop,
        GestureKind::Point,
        GestureKind::Rock,
    ];

    /// Wire identifier sent to the remote peer.
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureKind::ThumbsUp => "thumbs-up",
            GestureKind::ThumbsDown => "thumbs-down",
            GestureKind::Peace => "peace",
            GestureKind::Ok => "ok",
            GestureKind::Wave => "wave",
            GestureKind::Stop => "stop",
            GestureKind::Point => "point",
            GestureKind::Rock => "rock",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GestureKind::ThumbsUp => "Thumbs Up",
            GestureKind::ThumbsDown => "Thumbs Down",
            GestureKind::Peace => "Peace",
            GestureKind::Ok => "OK",
            GestureKind::Wave => "Wave",
            GestureKind::Stop => "Stop",
            GestureKind::Point => "Point",
            GestureKind::Rock => "Rock On",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            GestureKind::ThumbsUp => "👍 ",
            GestureKind::ThumbsDown => "👎 ",
            GestureKind::Peace => "✌️ ",
            GestureKind::Ok => "👌 ",
            GestureKind::Wave => "👋 ",
            GestureKind::Stop => "✋ ",
            GestureKind::Point => "👆 ",
            GestureKind::Rock => "🤘 ",
        }
    }

    pub fn indicator_text(&self) -> String {
        format!("{}{}", self.emoji(), self.display_name())
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A debounced, confirmed gesture ready for the event sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GestureEvent {
    pub gesture: GestureKind,
    pub timestamp: Instant,
}

/// One tracker callback: zero or more hands, each a raw landmark list.
#[derive(Clone, Debug)]
pub struct TrackerFrame {
    pub hands: Vec<Vec<Option<Landmark>>>,
    pub timestamp: Instant,
}

impl TrackerFrame {
    pub fn first_hand(&self) -> Option<&[Option<Landmark>]> {
        self.hands.first().map(Vec::as_slice)
    }
}
