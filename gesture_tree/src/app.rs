//! Top-level application state.
//!
//! `AppState` owns the interaction [`Controller`], the photo [`FocusSet`] and
//! the particle [`Scene`].  It consumes one [`HandSignal`] per fresh tracker
//! frame and drives the visualizer each display frame.

use std::fmt;
use std::str::FromStr;
use std::sync::mpsc;

use anyhow::{anyhow, Context};

use hand_signal::{Classifier, ClassifierConfig, HandSignal};
use tree_mode::{AppMode, Controller, FocusSet, ItemId, Outcome, SelectionPolicy, Skip};

use crate::scene::Scene;
use crate::slot::SignalSlot;
use crate::tracker::{spawn_tracker, SimInput, SimTracker, TrackerHandle, TrackerSettings, TrackingError};
use crate::visualizer::{UiCommand, View, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Where hand landmarks come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Backend {
    /// Keyboard + mouse in the visualizer window.
    #[default]
    Simulation,
    /// LeapMotion controller (needs the `leap` feature).
    Leap,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Simulation => "sim",
            Backend::Leap       => "leap",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sim" | "simulation" => Ok(Backend::Simulation),
            "leap"               => Ok(Backend::Leap),
            other => Err(format!("unknown tracker backend '{}' (sim|leap)", other)),
        }
    }
}

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Decorative particles, star included.
    pub particles:  usize,
    /// Photo handles available from the start.
    pub photos:     Vec<String>,
    pub selection:  SelectionPolicy,
    /// Seeds both the layout and random photo selection.
    pub seed:       Option<u64>,
    pub classifier: ClassifierConfig,
    pub tracker:    TrackerSettings,
    pub backend:    Backend,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            particles:  600,
            photos:     Vec::new(),
            selection:  SelectionPolicy::Random,
            seed:       None,
            classifier: ClassifierConfig::default(),
            tracker:    TrackerSettings::default(),
            backend:    Backend::Simulation,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    controller: Controller,
    photos:     FocusSet,
    scene:      Scene,
    signal:     HandSignal,
    placeholders: usize,
    pub status: String,
}

impl AppState {
    pub fn new(cfg: &AppConfig, aspect: f32) -> Self {
        let mut app = AppState {
            controller:   Controller::new(cfg.selection.build(cfg.seed)),
            photos:       FocusSet::new(),
            scene:        Scene::new(cfg.particles, aspect, cfg.seed),
            signal:       HandSignal::ABSENT,
            placeholders: 0,
            status:       format!("Ready: open hand to scatter ({} selection)", cfg.selection),
        };
        for handle in &cfg.photos {
            app.add_photo(handle.clone());
        }
        app
    }

    /// Register a photo and hang it on the tree.
    pub fn add_photo(&mut self, handle: String) -> ItemId {
        let id = self.photos.add(handle);
        self.scene.add_photo(id);
        if let Some(item) = self.photos.get(id) {
            log::info!("photo {} added: {}", id, item.handle);
        }
        id
    }

    /// Add a generated stand-in photo (the `P` key).
    pub fn add_placeholder(&mut self) -> ItemId {
        self.placeholders += 1;
        let id = self.add_photo(format!("placeholder-{}", self.placeholders));
        self.status = format!("Added photo {} ({} total)", id, self.photos.len());
        id
    }

    // ── process one HandSignal ───────────────────────────────────────────

    pub fn handle_signal(&mut self, signal: HandSignal) -> Outcome {
        self.signal = signal;
        let out = self.controller.apply(&signal, &self.photos);
        self.note(&out);
        out
    }

    /// Explicit close from the photo viewer (the `R` key).
    pub fn release(&mut self) -> Outcome {
        let out = self.controller.release();
        self.note(&out);
        out
    }

    fn note(&mut self, out: &Outcome) {
        if let Some(change) = out.change {
            match change.active.and_then(|id| self.photos.get(id)) {
                Some(item) => {
                    log::info!("mode {} -> {} (photo {} {})", change.from, change.to, item.id, item.handle);
                    self.status = format!("{}: {}", change.to.name().to_uppercase(), item.handle);
                }
                None => {
                    log::info!("mode {} -> {}", change.from, change.to);
                    self.status = format!("{}", change.to.name().to_uppercase());
                }
            }
        }
        if let Some(Skip::SelectionUnavailable) = out.skipped {
            self.status = "Pinch: no photos yet (press P to add one)".to_string();
        }
    }

    // ── Per-frame tick ────────────────────────────────────────────────────

    pub fn tick(&mut self) {
        self.scene.tick(self.controller.mode(), self.controller.active(), self.signal.cursor());
        for (id, pos) in self.scene.photo_positions() {
            self.photos.set_screen_pos(id, pos);
        }
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn mode(&self)   -> AppMode        { self.controller.mode() }
    pub fn active(&self) -> Option<ItemId> { self.controller.active() }
    pub fn scene(&self)  -> &Scene         { &self.scene }
    pub fn signal(&self) -> &HandSignal    { &self.signal }
    pub fn photos(&self) -> &FocusSet      { &self.photos }

    /// Where the viewed photo is on screen, for the cursor connector.
    pub fn active_target(&self) -> Option<(f32, f32)> {
        self.active().and_then(|id| self.scene.photo_position(id))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run: the main application loop
// ════════════════════════════════════════════════════════════════════════════

fn start_tracker(
    cfg: &AppConfig,
    sim_rx: mpsc::Receiver<SimInput>,
    slot: &SignalSlot,
) -> Result<TrackerHandle, TrackingError> {
    let classifier = Classifier::new(cfg.classifier);
    match cfg.backend {
        Backend::Simulation =>
            spawn_tracker(SimTracker::new(sim_rx), cfg.tracker, classifier, slot.clone()),
        #[cfg(feature = "leap")]
        Backend::Leap =>
            spawn_tracker(crate::tracker::LeapTracker::new(), cfg.tracker, classifier, slot.clone()),
        #[cfg(not(feature = "leap"))]
        Backend::Leap =>
            Err(TrackingError::Unavailable("built without the `leap` feature".to_string())),
    }
}

/// Run the full application.
///
/// Creates the visualizer and the tracker (simulation unless configured
/// otherwise) and drives the input/update/render loop at ~60 fps.  If the
/// tracker cannot start, the scene still runs with no hand input.
pub fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    let slot = SignalSlot::new();

    let mut tracker = match start_tracker(&cfg, sim_rx, &slot) {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::warn!("{}; continuing without hand input", e);
            None
        }
    };
    let tracker_name = tracker.as_ref().map_or("none", |t| t.name());

    let mut vis = Visualizer::new(sim_tx)
        .map_err(|e| anyhow!("{}", e))
        .context("opening the visualizer window")?;

    let mut app = AppState::new(&cfg, Visualizer::aspect());
    let mut last_seq = 0;

    'frames: while vis.is_open() {
        // 1. Window input
        for command in vis.poll_input() {
            match command {
                UiCommand::Quit     => break 'frames,
                UiCommand::AddPhoto => { app.add_placeholder(); }
                UiCommand::Release  => { app.release(); }
            }
        }

        // 2. Latest hand signal, if the tracker produced a new one
        let latest = slot.latest();
        if latest.seq != last_seq {
            last_seq = latest.seq;
            app.handle_signal(latest.signal);
        }

        // 3. Per-frame animation
        app.tick();

        // 4. Render
        vis.render(&View {
            scene:         app.scene(),
            signal:        app.signal(),
            mode:          app.mode(),
            active_target: app.active_target(),
            status:        &app.status,
            photos:        app.photos().len(),
            tracker:       tracker_name,
        });
    }

    if let Some(handle) = tracker.as_mut() {
        handle.stop();
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
