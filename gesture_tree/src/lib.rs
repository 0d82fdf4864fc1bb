//! # gesture_tree
//!
//! A particle Christmas tree you conduct with one hand.  Hand landmarks from a
//! tracker are classified into gestures ([`hand_signal`]), the gestures drive
//! the Tree / Scatter / PhotoView state machine ([`tree_mode`]), and the
//! scene eases every particle toward the layout of the current mode.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | From | Action |
//! |---|---|---|
//! | Open hand | Tree, PhotoView | Scatter the particles into a cloud |
//! | Fist | Scatter, PhotoView | Gather the particles back into the tree |
//! | Pinch | Scatter | Pull one photo forward (PhotoView) |
//! | Palm movement | any | Steer the cursor and the scene rotation |
//!
//! ## Threads
//!
//! The tracker runs on its own thread and publishes the latest
//! [`HandSignal`](hand_signal::HandSignal) into a [`slot::SignalSlot`].  The
//! render loop reads the slot once per frame; frames the tracker has not
//! finished yet are simply skipped.
//!
//! ## Feature flags
//!
//! * (default): **Simulation mode**: keyboard + mouse synthesize a hand.
//! * `leap`: **Hardware mode**: LeapMotion hands via LeapC.
//!
//! ### Simulation controls
//!
//! | Input | Effect |
//! |---|---|
//! | Mouse | Move the palm |
//! | `1` | Open hand |
//! | `2` | Fist |
//! | `3` | Pinch |
//! | `4` | Relaxed (no gesture) |
//! | `H` | Hand in / out of view |
//! | `P` | Add a placeholder photo |
//! | `R` | Release the photo being viewed |
//! | `Q` / `Escape` | Quit |

pub mod slot;
pub mod tracker;
pub mod scene;
pub mod visualizer;
pub mod app;
