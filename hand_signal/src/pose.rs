//! Synthetic hand poses.
//!
//! Builds a plausible 21-landmark hand in image coordinates for a handful of
//! canonical poses.  The simulation tracker feeds these to the classifier in
//! place of a camera, and tests use them as fixtures.
//!
//! Geometry, with `s` = hand scale and `(cx, cy)` = palm centre:
//!
//! ```text
//!            tips  (mcp.y − 0.85 s when extended)
//!             │
//!   MCP row  ─┼─  cy − s/2      middle MCP sits exactly at cx
//!             │
//!   wrist    ─┴─  cy + s/2
//! ```
//!
//! so the wrist/middle-MCP midpoint is always `(cx, cy)`.

use crate::{
    Landmark, LANDMARK_COUNT,
    WRIST, THUMB_CMC, THUMB_MCP, THUMB_IP, THUMB_TIP,
    INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pose {
    /// All four fingers extended, thumb out to the side.
    Open,
    /// All four fingers curled.
    Fist,
    /// Thumb tip touching the (curled) index tip, other fingers extended.
    Pinch,
    /// Index and middle extended, ring and pinky curled, thumb away.
    Relaxed,
}

impl Pose {
    pub const ALL: [Pose; 4] = [Pose::Open, Pose::Fist, Pose::Pinch, Pose::Relaxed];

    pub fn name(&self) -> &'static str {
        match self {
            Pose::Open    => "open",
            Pose::Fist    => "fist",
            Pose::Pinch   => "pinch",
            Pose::Relaxed => "relaxed",
        }
    }
}

/// Finger base offsets `(dx, dy)` from `(cx, cy − s/2)`, in units of `s`.
const BASES: [(usize, f32, f32); 4] = [
    (INDEX_MCP,  -0.30, 0.00),
    (MIDDLE_MCP,  0.00, 0.00),
    (RING_MCP,    0.28, 0.02),
    (PINKY_MCP,   0.52, 0.10),
];

/// Joint heights above the MCP (negative = up) for PIP, DIP, TIP.
const EXTENDED: [f32; 3] = [-0.40, -0.65, -0.85];
const CURLED:   [f32; 3] = [-0.25, -0.05,  0.10];

/// Build the 21 landmarks for `pose`.
pub fn hand(pose: Pose, cx: f32, cy: f32, scale: f32) -> [Landmark; LANDMARK_COUNT] {
    let s = scale;
    let mut lm = [Landmark::default(); LANDMARK_COUNT];
    let base_y = cy - s / 2.0;

    lm[WRIST] = Landmark::new(cx, cy + s / 2.0, 0.0);

    let open = match pose {
        Pose::Open    => [true,  true,  true,  true ],
        Pose::Fist    => [false, false, false, false],
        Pose::Pinch   => [false, true,  true,  true ],
        Pose::Relaxed => [true,  true,  false, false],
    };

    for (finger, &(mcp, dx, dy)) in BASES.iter().enumerate() {
        let bx = cx + dx * s;
        let by = base_y + dy * s;
        lm[mcp] = Landmark::new(bx, by, 0.0);

        let heights = if open[finger] { EXTENDED } else { CURLED };
        for (j, h) in heights.iter().enumerate() {
            // PIP, DIP, TIP follow the MCP in index order.
            lm[mcp + 1 + j] = Landmark::new(bx, by + h * s, -0.01 * (j + 1) as f32);
        }
    }

    // Thumb, fanned out to the index side.
    lm[THUMB_CMC] = Landmark::new(cx - 0.35 * s, cy + 0.30 * s, -0.005);
    lm[THUMB_MCP] = Landmark::new(cx - 0.60 * s, cy + 0.05 * s, -0.010);
    lm[THUMB_IP]  = Landmark::new(cx - 0.75 * s, cy - 0.15 * s, -0.015);
    lm[THUMB_TIP] = Landmark::new(cx - 0.85 * s, cy - 0.30 * s, -0.020);

    match pose {
        Pose::Pinch => {
            // Bring thumb tip onto the index tip.
            let tip = lm[INDEX_MCP + 3];
            lm[THUMB_IP]  = Landmark::new(tip.x - 0.20 * s, tip.y + 0.15 * s, -0.015);
            lm[THUMB_TIP] = Landmark::new(tip.x - 0.02 * s, tip.y, -0.020);
        }
        Pose::Fist => {
            // Thumb tucked across the curled fingers.
            lm[THUMB_IP]  = Landmark::new(cx - 0.40 * s, cy - 0.10 * s, -0.015);
            lm[THUMB_TIP] = Landmark::new(cx - 0.15 * s, cy - 0.20 * s, -0.020);
        }
        Pose::Open | Pose::Relaxed => {}
    }

    lm
}
