//! Hand trackers: LeapMotion hardware, keyboard/mouse simulation, or any
//! other back end that can deliver 21 landmarks per frame.
//!
//! A tracker runs on its own thread.  Each frame it hands landmarks to the
//! classifier and publishes the resulting signal into a [`SignalSlot`].  The
//! render loop never waits on it.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use hand_signal::{pose::{self, Pose}, Classifier, HandSignal, Landmark};

use crate::slot::SignalSlot;

// ════════════════════════════════════════════════════════════════════════════
// TrackerSettings
// ════════════════════════════════════════════════════════════════════════════

/// Parameters handed to the pose back end at start-up.  Fixed for the
/// session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackerSettings {
    pub max_hands:                u8,
    /// 0 = lite, 1 = full.
    pub model_complexity:         u8,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence:  f32,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        TrackerSettings {
            max_hands:                1,
            model_complexity:         1,
            min_detection_confidence: 0.5,
            min_tracking_confidence:  0.5,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Frame / TrackingError
// ════════════════════════════════════════════════════════════════════════════

/// What a tracker produced for one tick.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    /// Landmarks for the first detected hand.
    Hand(Vec<Landmark>),
    /// A frame was processed and no hand was in it.
    NoHand,
    /// Nothing finished this tick; the previous signal stands.
    Pending,
}

#[derive(Debug)]
pub enum TrackingError {
    /// The device or pose model could not be opened, or failed mid-session.
    Unavailable(String),
    /// The input feeding the tracker went away; a normal shutdown.
    Closed,
}

impl fmt::Display for TrackingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingError::Unavailable(why) => write!(f, "hand tracking unavailable: {}", why),
            TrackingError::Closed           => f.write_str("tracker input closed"),
        }
    }
}

impl std::error::Error for TrackingError {}

// ════════════════════════════════════════════════════════════════════════════
// HandTracker trait: unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

pub trait HandTracker: Send + 'static {
    fn name(&self) -> &'static str;

    /// Acquire the capture device and load the model.
    fn start(&mut self, settings: &TrackerSettings) -> Result<(), TrackingError>;

    /// Wait at most about one frame for the next result.
    fn next_frame(&mut self) -> Result<Frame, TrackingError>;

    /// Release everything `start` acquired.  Must be safe to call after a
    /// failed `start` or a failed `next_frame`, and more than once.
    fn stop(&mut self);
}

// ════════════════════════════════════════════════════════════════════════════
// Spawn helper
// ════════════════════════════════════════════════════════════════════════════

/// Owns a started tracker; stopping it on drop covers every exit path of the
/// worker, including panics.
struct Started<T: HandTracker>(T);

impl<T: HandTracker> Drop for Started<T> {
    fn drop(&mut self) {
        log::debug!("stopping {} tracker", self.0.name());
        self.0.stop();
    }
}

/// A running tracker thread.  Dropping the handle stops it.
pub struct TrackerHandle {
    name:   &'static str,
    stop:   Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl TrackerHandle {
    pub fn name(&self) -> &'static str { self.name }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().map_or(false, |w| !w.is_finished())
    }

    /// Signal the worker and wait for it to release the device.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("{} tracker thread panicked", self.name);
            }
        }
    }
}

impl Drop for TrackerHandle {
    fn drop(&mut self) { self.stop(); }
}

/// Start `tracker` and run it on its own thread, publishing into `slot`.
pub fn spawn_tracker<T: HandTracker>(
    mut tracker: T,
    settings:    TrackerSettings,
    classifier:  Classifier,
    slot:        SignalSlot,
) -> Result<TrackerHandle, TrackingError> {
    let name = tracker.name();
    if let Err(e) = tracker.start(&settings) {
        tracker.stop();
        return Err(e);
    }
    let started = Started(tracker);
    log::info!("{} tracker started ({:?})", name, settings);

    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    let worker = thread::Builder::new()
        .name(format!("{}-tracker", name))
        .spawn(move || track(started, classifier, slot, flag))
        .map_err(|e| TrackingError::Unavailable(e.to_string()))?;

    Ok(TrackerHandle { name, stop, worker: Some(worker) })
}

fn track<T: HandTracker>(
    mut started: Started<T>,
    classifier:  Classifier,
    slot:        SignalSlot,
    stop:        Arc<AtomicBool>,
) {
    let name = started.0.name();
    while !stop.load(Ordering::Acquire) {
        let signal = match started.0.next_frame() {
            Ok(Frame::Hand(landmarks)) => classifier.classify(&landmarks)
                .unwrap_or_else(|e| {
                    log::debug!("{} tracker: dropping frame: {}", name, e);
                    HandSignal::ABSENT
                }),
            Ok(Frame::NoHand)  => HandSignal::ABSENT,
            Ok(Frame::Pending) => continue,
            Err(TrackingError::Closed) => {
                log::debug!("{} tracker input closed", name);
                break;
            }
            Err(e) => {
                log::warn!("{} tracker: {}; continuing without hand input", name, e);
                break;
            }
        };
        slot.publish(signal);
    }
    slot.publish(HandSignal::ABSENT);
}

// ════════════════════════════════════════════════════════════════════════════
// LeapTracker: real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Tracker backed by a LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
///
/// The sensor looks up from the desk, so its horizontal plane plays the role
/// of the camera image: palm-space X maps to image x (pre-mirrored, since the
/// classifier mirrors again), Z (toward the user) maps to image y, and height
/// becomes depth.  Fingers pointing away from the user therefore read as
/// "up", like an upright hand in front of a webcam.
#[cfg(feature = "leap")]
pub struct LeapTracker {
    connection: Option<leaprs::Connection>,
}

#[cfg(feature = "leap")]
impl LeapTracker {
    pub fn new() -> Self { LeapTracker { connection: None } }
}

#[cfg(feature = "leap")]
impl Default for LeapTracker {
    fn default() -> Self { LeapTracker::new() }
}

#[cfg(feature = "leap")]
impl HandTracker for LeapTracker {
    fn name(&self) -> &'static str { "leap" }

    fn start(&mut self, settings: &TrackerSettings) -> Result<(), TrackingError> {
        use leaprs::*;

        if settings.max_hands != 1 {
            log::warn!("leap tracker only reports the first hand");
        }
        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| TrackingError::Unavailable(format!("LeapC connection: {:?}", e)))?;
        connection.open()
            .map_err(|e| TrackingError::Unavailable(format!("LeapMotion device: {:?}", e)))?;
        self.connection = Some(connection);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame, TrackingError> {
        use leaprs::*;

        const POLL_MS: u32 = 16;

        let connection = self.connection.as_mut()
            .ok_or_else(|| TrackingError::Unavailable("not started".to_string()))?;

        let msg = match connection.poll(POLL_MS) {
            Ok(m)  => m,
            Err(_) => return Ok(Frame::Pending),
        };

        if let Event::Tracking(frame) = msg.event() {
            let hands: Vec<_> = frame.hands().collect();
            return Ok(match hands.first() {
                Some(hand) => Frame::Hand(leap_landmarks(hand)),
                None       => Frame::NoHand,
            });
        }
        Ok(Frame::Pending)
    }

    fn stop(&mut self) {
        // Dropping the connection closes the device.
        self.connection = None;
    }
}

/// Map one Leap hand onto the 21-landmark convention.
#[cfg(feature = "leap")]
fn leap_landmarks(hand: &leaprs::Hand) -> Vec<Landmark> {
    // Interaction box, millimetres.
    const HALF_WIDTH: f32 = 200.0;
    const HALF_DEPTH: f32 = 150.0;
    const HEIGHT:     f32 = 500.0;

    let to_image = |x: f32, y: f32, z: f32| Landmark::new(
        0.5 - x / (2.0 * HALF_WIDTH),
        0.5 + z / (2.0 * HALF_DEPTH),
        -y / HEIGHT,
    );

    let mut out = vec![Landmark::default(); hand_signal::LANDMARK_COUNT];
    let digits: Vec<_> = hand.digits().collect();

    if let Some(middle) = digits.get(2) {
        let w = middle.metacarpal().prev_joint();
        out[hand_signal::WRIST] = to_image(w.x, w.y, w.z);
    }

    // Thumb: the Leap "proximal" bone is the anatomical metacarpal.
    // Fingers: base index 5, 9, 13, 17 → MCP, PIP, DIP, TIP.
    for (d, digit) in digits.iter().enumerate().take(5) {
        let base = 1 + d * 4;
        let joints = [
            digit.proximal().prev_joint(),
            digit.intermediate().prev_joint(),
            digit.distal().prev_joint(),
            digit.distal().next_joint(),
        ];
        for (j, p) in joints.iter().enumerate() {
            out[base + j] = to_image(p.x, p.y, p.z);
        }
    }
    out
}

// ════════════════════════════════════════════════════════════════════════════
// SimTracker: keyboard/mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    KeyDown(SimKey),
    /// Pointer position in normalized window coordinates.
    Pointer { x: f32, y: f32 },
}

/// Simulated key codes (mapped from minifb Key).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    Open,       // 1
    Fist,       // 2
    Pinch,      // 3
    Relaxed,    // 4
    ToggleHand, // H
}

/// Tracker driven by [`SimInput`] events from the visualizer's window.
///
/// It keeps a current pose and palm position and synthesizes a full
/// landmark frame from them every tick, so the classifier runs exactly as it
/// would on camera data.
pub struct SimTracker {
    rx:      Receiver<SimInput>,
    pose:    Pose,
    /// Pointer position; the palm is placed so the mirrored cursor lands here.
    pointer: (f32, f32),
    present: bool,
    scale:   f32,
    period:  Duration,
}

impl SimTracker {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimTracker {
            rx,
            pose:    Pose::Relaxed,
            pointer: (0.5, 0.5),
            present: true,
            scale:   0.18,
            period:  Duration::from_millis(16),
        }
    }

    fn apply(&mut self, input: SimInput) {
        match input {
            SimInput::KeyDown(SimKey::Open)       => self.pose = Pose::Open,
            SimInput::KeyDown(SimKey::Fist)       => self.pose = Pose::Fist,
            SimInput::KeyDown(SimKey::Pinch)      => self.pose = Pose::Pinch,
            SimInput::KeyDown(SimKey::Relaxed)    => self.pose = Pose::Relaxed,
            SimInput::KeyDown(SimKey::ToggleHand) => self.present = !self.present,
            SimInput::Pointer { x, y } => {
                self.pointer = (x.clamp(0.0, 1.0), y.clamp(0.0, 1.0));
            }
        }
    }

    fn synthesize(&self) -> Frame {
        if !self.present {
            return Frame::NoHand;
        }
        let (px, py) = self.pointer;
        Frame::Hand(pose::hand(self.pose, 1.0 - px, py, self.scale).to_vec())
    }
}

impl HandTracker for SimTracker {
    fn name(&self) -> &'static str { "sim" }

    fn start(&mut self, _settings: &TrackerSettings) -> Result<(), TrackingError> {
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame, TrackingError> {
        match self.rx.recv_timeout(self.period) {
            Ok(input) => {
                self.apply(input);
                while let Ok(more) = self.rx.try_recv() {
                    self.apply(more);
                }
            }
            Err(RecvTimeoutError::Timeout)      => {}
            Err(RecvTimeoutError::Disconnected) => return Err(TrackingError::Closed),
        }
        Ok(self.synthesize())
    }

    fn stop(&mut self) {}
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_signal::GestureKind;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;
    use std::time::Instant;

    /// Plays back a fixed list of frames, then reports `NoHand` forever.
    struct ScriptedTracker {
        frames:   VecDeque<Result<Frame, TrackingError>>,
        fail:     bool,
        stops:    Arc<AtomicUsize>,
    }

    impl ScriptedTracker {
        fn new(frames: Vec<Result<Frame, TrackingError>>) -> (Self, Arc<AtomicUsize>) {
            let stops = Arc::new(AtomicUsize::new(0));
            let t = ScriptedTracker { frames: frames.into(), fail: false, stops: Arc::clone(&stops) };
            (t, stops)
        }
    }

    impl HandTracker for ScriptedTracker {
        fn name(&self) -> &'static str { "scripted" }

        fn start(&mut self, _s: &TrackerSettings) -> Result<(), TrackingError> {
            if self.fail {
                Err(TrackingError::Unavailable("no camera".to_string()))
            } else {
                Ok(())
            }
        }

        fn next_frame(&mut self) -> Result<Frame, TrackingError> {
            thread::sleep(Duration::from_millis(1));
            self.frames.pop_front().unwrap_or(Ok(Frame::NoHand))
        }

        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn wait_for(slot: &SignalSlot, pred: impl Fn(&HandSignal) -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if pred(&slot.latest().signal) { return true; }
            thread::sleep(Duration::from_millis(1));
        }
        false
    }

    fn hand(p: Pose) -> Result<Frame, TrackingError> {
        Ok(Frame::Hand(pose::hand(p, 0.3, 0.5, 0.2).to_vec()))
    }

    #[test]
    fn default_settings_track_one_hand() {
        let s = TrackerSettings::default();
        assert_eq!(s.max_hands, 1);
        assert_eq!(s.model_complexity, 1);
        assert_eq!(s.min_detection_confidence, 0.5);
        assert_eq!(s.min_tracking_confidence, 0.5);
    }

    #[test]
    fn frames_are_classified_into_the_slot() {
        let (t, _) = ScriptedTracker::new(vec![hand(Pose::Fist), Err(TrackingError::Closed)]);
        let slot = SignalSlot::new();
        let h = spawn_tracker(t, TrackerSettings::default(), Classifier::default(), slot.clone())
            .unwrap();
        let deadline = Instant::now() + Duration::from_secs(2);
        while h.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        // The fist, then the absent signal published on the way out.
        assert_eq!(slot.latest().seq, 2);
        assert!(!slot.latest().signal.present);
    }

    #[test]
    fn latest_gesture_is_visible() {
        let mut frames: Vec<_> = (0..5).map(|_| hand(Pose::Open)).collect();
        frames.push(hand(Pose::Pinch));
        frames.extend((0..2000).map(|_| hand(Pose::Pinch)));
        let (t, _) = ScriptedTracker::new(frames);
        let slot = SignalSlot::new();
        let _h = spawn_tracker(t, TrackerSettings::default(), Classifier::default(), slot.clone())
            .unwrap();
        assert!(wait_for(&slot, |s| s.gesture == GestureKind::Pinch));
        let s = slot.latest().signal;
        assert!(s.present);
        assert!((s.x - 0.7).abs() < 1e-5);
    }

    #[test]
    fn bad_frames_read_as_absent() {
        let mut frames = vec![Ok(Frame::Hand(vec![Landmark::default(); 5]))];
        frames.extend((0..2000).map(|_| Ok(Frame::Pending)));
        let (t, _) = ScriptedTracker::new(frames);
        let slot = SignalSlot::new();
        let _h = spawn_tracker(t, TrackerSettings::default(), Classifier::default(), slot.clone())
            .unwrap();
        let deadline = Instant::now() + Duration::from_secs(2);
        while slot.latest().seq == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(slot.latest().seq, 1);
        assert_eq!(slot.latest().signal, HandSignal::ABSENT);
    }

    #[test]
    fn failed_start_releases_device() {
        let (mut t, stops) = ScriptedTracker::new(vec![]);
        t.fail = true;
        let r = spawn_tracker(t, TrackerSettings::default(), Classifier::default(), SignalSlot::new());
        assert!(matches!(r, Err(TrackingError::Unavailable(_))));
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stop_joins_and_releases() {
        let (t, stops) = ScriptedTracker::new(vec![]);
        let mut h = spawn_tracker(t, TrackerSettings::default(), Classifier::default(), SignalSlot::new())
            .unwrap();
        assert!(h.is_running());
        h.stop();
        assert!(!h.is_running());
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        h.stop();
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_stops_the_worker() {
        let (t, stops) = ScriptedTracker::new(vec![]);
        {
            let _h = spawn_tracker(t, TrackerSettings::default(), Classifier::default(), SignalSlot::new())
                .unwrap();
        }
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn runtime_failure_ends_tracking_and_releases() {
        let (t, stops) = ScriptedTracker::new(vec![
            hand(Pose::Open),
            Err(TrackingError::Unavailable("camera unplugged".to_string())),
        ]);
        let slot = SignalSlot::new();
        let h = spawn_tracker(t, TrackerSettings::default(), Classifier::default(), slot.clone())
            .unwrap();
        let deadline = Instant::now() + Duration::from_secs(2);
        while h.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(!h.is_running());
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert!(!slot.latest().signal.present);
    }

    #[test]
    fn sim_follows_keys_and_pointer() {
        let (tx, rx) = mpsc::channel();
        let mut sim = SimTracker::new(rx);
        tx.send(SimInput::KeyDown(SimKey::Fist)).unwrap();
        tx.send(SimInput::Pointer { x: 0.25, y: 0.75 }).unwrap();

        let frame = match sim.next_frame().unwrap() {
            Frame::Hand(lm) => lm,
            other => panic!("expected a hand, got {:?}", other),
        };
        let s = Classifier::default().classify(&frame).unwrap();
        assert_eq!(s.gesture, GestureKind::Fist);
        assert!((s.x - 0.25).abs() < 1e-5);
        assert!((s.y - 0.75).abs() < 1e-5);
    }

    #[test]
    fn sim_can_hide_the_hand() {
        let (tx, rx) = mpsc::channel();
        let mut sim = SimTracker::new(rx);
        tx.send(SimInput::KeyDown(SimKey::ToggleHand)).unwrap();
        assert_eq!(sim.next_frame().unwrap(), Frame::NoHand);
    }

    #[test]
    fn sim_closes_with_its_window() {
        let (tx, rx) = mpsc::channel::<SimInput>();
        let mut sim = SimTracker::new(rx);
        drop(tx);
        assert!(matches!(sim.next_frame(), Err(TrackingError::Closed)));
    }
}
