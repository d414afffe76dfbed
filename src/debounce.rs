use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use crate::{
    config::GestureConfig,
    types::{GestureEvent, GestureKind},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebouncePhase {
    Idle,
    Accumulating,
    CoolingDown,
}

#[derive(Clone, Copy, Debug)]
struct Cooldown {
    gesture: GestureKind,
    expires_at: Instant,
}

/// Turns per-frame labels into confirmed, rate-limited gesture events.
///
/// A label is confirmed once it has been seen on more than `confirm_frames`
/// consecutive frames and is not the label currently cooling down. The
/// cooldown is a deadline rather than a frame count: [`Debouncer::expire`]
/// applies it, and [`Debouncer::observe`] applies any due expiry before
/// looking at the new frame. Confirming again replaces the pending deadline.
#[derive(Debug)]
pub struct Debouncer {
    confirm_frames: u32,
    cooldown: Duration,
    counts: HashMap<GestureKind, u32>,
    cooling: Option<Cooldown>,
}

impl Debouncer {
    pub fn new(confirm_frames: u32, cooldown: Duration) -> Self {
        Self {
            confirm_frames,
            cooldown,
            counts: HashMap::new(),
            cooling: None,
        }
    }

    pub fn from_config(config: &GestureConfig) -> Self {
        Self::new(config.confirm_frames, config.cooldown())
    }

    pub fn observe(&mut self, label: Option<GestureKind>, now: Instant) -> Option<GestureEvent> {
        self.expire(now);

        let Some(gesture) = label else {
            self.counts.clear();
            return None;
        };

        let count = self.counts.entry(gesture).or_insert(0);
        *count += 1;
        let count = *count;

        if count <= self.confirm_frames || self.cooling_gesture() == Some(gesture) {
            return None;
        }

        self.counts.clear();
        self.cooling = Some(Cooldown {
            gesture,
            expires_at: now + self.cooldown,
        });
        log::debug!("confirmed {gesture} after {count} frames");

        Some(GestureEvent {
            gesture,
            timestamp: now,
        })
    }

    /// Applies the scheduled cooldown reset if its deadline has passed.
    /// Returns whether a reset happened.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.cooling {
            Some(cooldown) if now >= cooldown.expires_at => {
                log::debug!("cooldown for {} expired", cooldown.gesture);
                self.cooling = None;
                self.counts.clear();
                true
            }
            _ => false,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.cooling.map(|c| c.expires_at)
    }

    pub fn cooling_gesture(&self) -> Option<GestureKind> {
        self.cooling.map(|c| c.gesture)
    }

    pub fn count(&self, gesture: GestureKind) -> u32 {
        self.counts.get(&gesture).copied().unwrap_or(0)
    }

    pub fn phase(&self) -> DebouncePhase {
        if self.cooling.is_some() {
            DebouncePhase::CoolingDown
        } else if self.counts.values().any(|&c| c > 0) {
            DebouncePhase::Accumulating
        } else {
            DebouncePhase::Idle
        }
    }

    pub fn reset(&mut self) {
        self.counts.clear();
        self.cooling = None;
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::from_config(&GestureConfig::default())
    }
}
