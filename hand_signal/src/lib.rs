//! # hand_signal
//!
//! Turns one frame of hand landmarks (the 21-point skeletal convention used by
//! common hand-pose models) into a [`HandSignal`]: a discrete gesture, a
//! mirrored palm cursor, and a presence flag.
//!
//! Classification is a pure function of the frame.  Temporal smoothing, if
//! any, belongs to the pose model upstream or the renderer downstream.
//!
//! ## Quick start
//!
//! ```rust
//! use hand_signal::{Classifier, GestureKind, pose::{self, Pose}};
//!
//! let frame  = pose::hand(Pose::Fist, 0.4, 0.5, 0.2);
//! let signal = Classifier::default().classify(&frame).unwrap();
//!
//! assert_eq!(signal.gesture, GestureKind::Fist);
//! assert!((signal.x - 0.6).abs() < 1e-6);   // mirrored
//! ```
//!
//! ## Gesture priority
//!
//! | Order | Condition | Gesture |
//! |---|---|---|
//! | 1 | no finger open | `Fist` |
//! | 2 | thumb–index gap < `pinch_abs` or < `pinch_rel` × hand scale | `Pinch` |
//! | 3 | three or more fingers open | `OpenHand` |
//! | 4 | anything else | `None` |
//!
//! A closed fist brings thumb and index together, so the fist test runs first
//! and short-circuits the pinch test.

pub mod pose;

use std::fmt;

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

/// Landmarks per detected hand.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// `(tip, pip)` for index, middle, ring and pinky.  The thumb bends sideways
/// and is left out of the open-finger test.
pub const FINGER_JOINTS: [(usize, usize); 4] = [
    (INDEX_TIP,  INDEX_PIP),
    (MIDDLE_TIP, MIDDLE_PIP),
    (RING_TIP,   RING_PIP),
    (PINKY_TIP,  PINKY_PIP),
];

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One tracked keypoint.  `x`/`y` are normalized to the image (0‥1, y grows
/// downward); `z` is depth relative to the wrist.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }

    /// Euclidean distance in the image plane.
    pub fn planar_distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureKind / HandSignal
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GestureKind {
    #[default]
    None,
    OpenHand,
    Fist,
    Pinch,
}

impl GestureKind {
    pub fn name(&self) -> &'static str {
        match self {
            GestureKind::None     => "none",
            GestureKind::OpenHand => "open hand",
            GestureKind::Fist     => "fist",
            GestureKind::Pinch    => "pinch",
        }
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything the rest of the system learns about the hand in one frame.
///
/// `x`/`y` are screen-space (0‥1) and only meaningful when `present` is true;
/// use [`HandSignal::cursor`] to read them safely.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandSignal {
    pub gesture: GestureKind,
    pub x:       f32,
    pub y:       f32,
    pub present: bool,
}

impl HandSignal {
    /// No hand in frame.
    pub const ABSENT: HandSignal = HandSignal {
        gesture: GestureKind::None,
        x:       0.5,
        y:       0.5,
        present: false,
    };

    /// Cursor position, or `None` when no hand is present.
    pub fn cursor(&self) -> Option<(f32, f32)> {
        self.present.then_some((self.x, self.y))
    }
}

impl Default for HandSignal {
    fn default() -> Self { HandSignal::ABSENT }
}

// ════════════════════════════════════════════════════════════════════════════
// InvalidFrame
// ════════════════════════════════════════════════════════════════════════════

/// A frame whose landmark data cannot be classified.
#[derive(Clone, Debug, PartialEq)]
pub enum InvalidFrame {
    /// The frame held some landmarks, but not a full hand.
    WrongCount { got: usize },
    /// A landmark coordinate was NaN or infinite.
    NonFinite { index: usize },
}

impl fmt::Display for InvalidFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidFrame::WrongCount { got } =>
                write!(f, "expected {} landmarks, got {}", LANDMARK_COUNT, got),
            InvalidFrame::NonFinite { index } =>
                write!(f, "landmark {} has a non-finite coordinate", index),
        }
    }
}

impl std::error::Error for InvalidFrame {}

// ════════════════════════════════════════════════════════════════════════════
// ClassifierConfig
// ════════════════════════════════════════════════════════════════════════════

/// Pinch thresholds.  A pinch is reported when the thumb–index gap is below
/// either bound; the relative bound keeps the test usable when the hand is
/// far from the camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassifierConfig {
    /// Absolute gap, in normalized image units.
    pub pinch_abs: f32,
    /// Gap as a fraction of hand scale (wrist to middle-finger base).
    pub pinch_rel: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            pinch_abs: 0.05,
            pinch_rel: 0.5,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandGeometry: the measurements the decision is made from
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandGeometry {
    /// Midpoint of wrist and middle-finger base, unmirrored image coordinates.
    pub centroid:       (f32, f32),
    /// Open fingers among index, middle, ring and pinky (0–4).
    pub open_count:     u8,
    /// Wrist to middle-finger base.
    pub hand_scale:     f32,
    /// Index tip to thumb tip.
    pub pinch_distance: f32,
}

/// Measure a full 21-landmark frame.
pub fn measure(landmarks: &[Landmark]) -> Result<HandGeometry, InvalidFrame> {
    validate(landmarks)?;

    let wrist  = &landmarks[WRIST];
    let middle = &landmarks[MIDDLE_MCP];

    let open_count = FINGER_JOINTS.iter()
        .filter(|&&(tip, pip)| landmarks[tip].y < landmarks[pip].y)
        .count() as u8;

    Ok(HandGeometry {
        centroid:       ((wrist.x + middle.x) / 2.0, (wrist.y + middle.y) / 2.0),
        open_count,
        hand_scale:     wrist.planar_distance(middle),
        pinch_distance: landmarks[INDEX_TIP].planar_distance(&landmarks[THUMB_TIP]),
    })
}

fn validate(landmarks: &[Landmark]) -> Result<(), InvalidFrame> {
    if landmarks.len() != LANDMARK_COUNT {
        return Err(InvalidFrame::WrongCount { got: landmarks.len() });
    }
    match landmarks.iter().position(|l| !l.is_finite()) {
        Some(index) => Err(InvalidFrame::NonFinite { index }),
        None        => Ok(()),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Classifier
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Classifier { config }
    }

    pub fn config(&self) -> &ClassifierConfig { &self.config }

    /// Classify one frame.
    ///
    /// An empty slice means "no hand detected" and yields
    /// [`HandSignal::ABSENT`].  Anything else must be a full, finite hand.
    pub fn classify(&self, landmarks: &[Landmark]) -> Result<HandSignal, InvalidFrame> {
        if landmarks.is_empty() {
            return Ok(HandSignal::ABSENT);
        }
        let geometry = measure(landmarks)?;
        let (cx, cy) = geometry.centroid;

        Ok(HandSignal {
            gesture: self.decide(&geometry),
            x:       1.0 - cx,
            y:       cy,
            present: true,
        })
    }

    /// Frame-loop entry point: a missing or malformed frame reads as "no hand".
    pub fn classify_frame(&self, frame: Option<&[Landmark]>) -> HandSignal {
        match frame {
            Some(landmarks) => self.classify(landmarks).unwrap_or(HandSignal::ABSENT),
            None            => HandSignal::ABSENT,
        }
    }

    /// Apply the priority rules to measured geometry.
    pub fn decide(&self, g: &HandGeometry) -> GestureKind {
        if g.open_count == 0 {
            return GestureKind::Fist;
        }
        if g.pinch_distance < self.config.pinch_abs
            || g.pinch_distance < g.hand_scale * self.config.pinch_rel
        {
            return GestureKind::Pinch;
        }
        if g.open_count >= 3 {
            return GestureKind::OpenHand;
        }
        GestureKind::None
    }
}

/// Classify with the default thresholds.
pub fn classify(landmarks: &[Landmark]) -> Result<HandSignal, InvalidFrame> {
    Classifier::default().classify(landmarks)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
