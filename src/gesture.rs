use crate::{
    config::GestureConfig,
    error::GestureError,
    geometry::{angle, distance},
    types::{Finger, FingerStates, GestureKind, HandFrame, Landmark, landmarks},
};

/// A finger is extended when the wrist-anchored chain through its four
/// landmarks bends less than the threshold at every joint: the angles at the
/// metacarpal, proximal and distal joints must all exceed `straight_angle_deg`.
///
/// Every finger, the thumb included, starts its chain at the wrist. Chains
/// that instead run from a finger's base one landmark past its tip end up
/// measuring the next finger's base, which is not a joint of this finger.
pub fn finger_states(frame: &HandFrame, straight_angle_deg: f32) -> FingerStates {
    let mut states = FingerStates::default();
    for finger in Finger::ALL {
        states.set(finger, is_extended(frame, finger, straight_angle_deg));
    }
    states
}

/// Same as [`finger_states`] for unchecked tracker output.
pub fn extract_finger_states(
    points: &[Landmark],
    straight_angle_deg: f32,
) -> Result<FingerStates, GestureError> {
    let frame = HandFrame::new(points)?;
    Ok(finger_states(&frame, straight_angle_deg))
}

fn is_extended(frame: &HandFrame, finger: Finger, straight_angle_deg: f32) -> bool {
    let joints = finger.joints();
    let chain = [
        frame.point(landmarks::WRIST),
        frame.point(joints[0]),
        frame.point(joints[1]),
        frame.point(joints[2]),
        frame.point(joints[3]),
    ];
    chain
        .windows(3)
        .all(|w| angle(w[0], w[1], w[2]) > straight_angle_deg)
}

type RulePredicate = fn(&HandFrame, &FingerStates, &GestureConfig) -> bool;

struct GestureRule {
    kind: GestureKind,
    matches: RulePredicate,
}

// First match wins. Wave and stop both need an open hand and are told apart
// only by position in this list.
const RULES: [GestureRule; 8] = [
    GestureRule {
        kind: GestureKind::ThumbsUp,
        matches: thumbs_up,
    },
    GestureRule {
        kind: GestureKind::ThumbsDown,
        matches: thumbs_down,
    },
    GestureRule {
        kind: GestureKind::Peace,
        matches: peace,
    },
    GestureRule {
        kind: GestureKind::Ok,
        matches: ok,
    },
    GestureRule {
        kind: GestureKind::Wave,
        matches: wave,
    },
    GestureRule {
        kind: GestureKind::Stop,
        matches: stop,
    },
    GestureRule {
        kind: GestureKind::Point,
        matches: point,
    },
    GestureRule {
        kind: GestureKind::Rock,
        matches: rock,
    },
];

fn thumbs_up(points: &HandFrame, fingers: &FingerStates, _: &GestureConfig) -> bool {
    fingers.is([true, false, false, false, false])
        && points.point(landmarks::THUMB_TIP).y < points.point(landmarks::THUMB_IP).y
}

fn thumbs_down(points: &HandFrame, fingers: &FingerStates, _: &GestureConfig) -> bool {
    fingers.is([true, false, false, false, false])
        && points.point(landmarks::THUMB_TIP).y > points.point(landmarks::THUMB_IP).y
}

fn peace(points: &HandFrame, fingers: &FingerStates, config: &GestureConfig) -> bool {
    fingers.is([false, true, true, false, false])
        && angle(
            points.point(landmarks::INDEX_TIP),
            points.point(landmarks::INDEX_MCP),
            points.point(landmarks::MIDDLE_TIP),
        ) > config.peace_min_spread_deg
}

// Middle, ring and pinky are deliberately not consulted.
fn ok(points: &HandFrame, fingers: &FingerStates, config: &GestureConfig) -> bool {
    fingers.thumb
        && fingers.index
        && distance(
            points.point(landmarks::THUMB_TIP),
            points.point(landmarks::INDEX_TIP),
        ) < config.ok_max_pinch
}

fn wave(points: &HandFrame, fingers: &FingerStates, config: &GestureConfig) -> bool {
    fingers.all_extended()
        && (points.point(landmarks::MIDDLE_MCP).x - points.point(landmarks::WRIST).x).abs()
            > config.wave_min_horizontal
}

fn stop(points: &HandFrame, fingers: &FingerStates, config: &GestureConfig) -> bool {
    fingers.all_extended()
        && (points.point(landmarks::MIDDLE_MCP).y - points.point(landmarks::WRIST).y).abs()
            < config.stop_max_vertical
}

fn point(_: &HandFrame, fingers: &FingerStates, _: &GestureConfig) -> bool {
    fingers.is([false, true, false, false, false])
}

fn rock(_: &HandFrame, fingers: &FingerStates, _: &GestureConfig) -> bool {
    fingers.is([false, true, false, false, true])
}

pub struct GestureClassifier {
    config: GestureConfig,
}

impl GestureClassifier {
    pub fn new(config: GestureConfig) -> Result<Self, GestureError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Validates raw tracker output and classifies it.
    pub fn classify(&self, points: &[Option<Landmark>]) -> Result<Option<GestureKind>, GestureError> {
        let frame = HandFrame::from_partial(points)?;
        Ok(self.classify_frame(&frame))
    }

    pub fn classify_frame(&self, frame: &HandFrame) -> Option<GestureKind> {
        let fingers = finger_states(frame, self.config.straight_angle_deg);
        let gesture = self.classify_with_states(frame, &fingers);
        log::trace!("fingers {fingers:?} -> {gesture:?}");
        gesture
    }

    pub fn classify_with_states(
        &self,
        frame: &HandFrame,
        fingers: &FingerStates,
    ) -> Option<GestureKind> {
        RULES
            .iter()
            .find(|rule| (rule.matches)(frame, fingers, &self.config))
            .map(|rule| rule.kind)
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self {
            config: GestureConfig::default(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::types::{Finger, HandFrame, LANDMARK_COUNT, Landmark};

    pub fn lm(x: f32, y: f32) -> Landmark {
        Landmark::new(x, y, 0.0)
    }

    /// Four joints on the ray from `origin` along `(dx, dy)`.
    pub fn straight(origin: Landmark, dx: f32, dy: f32) -> [Landmark; 4] {
        [1.0, 2.0, 3.0, 4.0].map(|k| lm(origin.x + dx * k, origin.y + dy * k))
    }

    /// A finger folded 90 degrees at its base.
    pub fn bent(origin: Landmark, dx: f32, dy: f32) -> [Landmark; 4] {
        let base = lm(origin.x + dx, origin.y + dy);
        let knuckle = lm(base.x - dy, base.y + dx);
        let mid = lm(knuckle.x - dx * 0.5, knuckle.y - dy * 0.5);
        let tip = lm(mid.x - dx * 0.5, mid.y - dy * 0.5);
        [base, knuckle, mid, tip]
    }

    pub struct HandBuilder {
        points: [Landmark; LANDMARK_COUNT],
    }

    impl HandBuilder {
        /// Starts from a closed fist with the wrist at `(x, y)`.
        pub fn fist(x: f32, y: f32) -> Self {
            let wrist = lm(x, y);
            let mut builder = Self {
                points: [wrist; LANDMARK_COUNT],
            };
            for (i, finger) in Finger::ALL.into_iter().enumerate() {
                let dx = -0.04 + 0.02 * i as f32;
                builder = builder.finger(finger, bent(wrist, dx, -0.08));
            }
            builder
        }

        pub fn wrist(&self) -> Landmark {
            self.points[0]
        }

        pub fn finger(mut self, finger: Finger, joints: [Landmark; 4]) -> Self {
            for (idx, joint) in finger.joints().into_iter().zip(joints) {
                self.points[idx] = joint;
            }
            self
        }

        pub fn extend(self, finger: Finger, dx: f32, dy: f32) -> Self {
            let wrist = self.wrist();
            self.finger(finger, straight(wrist, dx, dy))
        }

        pub fn set(mut self, index: usize, point: Landmark) -> Self {
            self.points[index] = point;
            self
        }

        pub fn build(self) -> HandFrame {
            HandFrame::new(&self.points).expect("builder produces 21 finite points")
        }
    }

    /// Every finger extended; the middle-finger base sits at `(dx, dy)` from the wrist.
    pub fn open_hand(dx: f32, dy: f32) -> HandFrame {
        HandBuilder::fist(0.1, 0.5)
            .extend(Finger::Thumb, dx - 0.05, dy - 0.1)
            .extend(Finger::Index, dx, dy - 0.05)
            .extend(Finger::Middle, dx, dy)
            .extend(Finger::Ring, dx, dy + 0.05)
            .extend(Finger::Pinky, dx - 0.05, dy + 0.1)
            .build()
    }
}
