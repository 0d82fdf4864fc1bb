//! # tree_mode
//!
//! The interaction state machine behind the particle tree.  One
//! [`Controller`] owns the current [`AppMode`] and the active photo, and is
//! fed one [`HandSignal`] per frame.
//!
//! ## Transitions
//!
//! Only frames with a hand present can move the machine.
//!
//! | From | Gesture | To | Active photo |
//! |---|---|---|---|
//! | Scatter, PhotoView | Fist | Tree | cleared |
//! | Tree | OpenHand | Scatter | — |
//! | PhotoView | OpenHand | Scatter | cleared |
//! | Scatter | Pinch, nothing active, ≥ 1 photo | PhotoView | selected |
//! | anything else | | unchanged | |
//!
//! The pinch guard is level-triggered: holding a pinch inside PhotoView never
//! selects a second photo, because a photo is active for the whole of
//! PhotoView.
//!
//! ```rust
//! use hand_signal::{GestureKind, HandSignal};
//! use tree_mode::{AppMode, Controller, FocusSet};
//!
//! let mut photos = FocusSet::new();
//! let only = photos.add("family.jpg");
//! let mut ctl = Controller::default();
//!
//! let sig = |g| HandSignal { gesture: g, x: 0.5, y: 0.5, present: true };
//! ctl.apply(&sig(GestureKind::OpenHand), &photos);
//! ctl.apply(&sig(GestureKind::Pinch), &photos);
//!
//! assert_eq!(ctl.mode(), AppMode::PhotoView);
//! assert_eq!(ctl.active(), Some(only));
//! ```

pub mod focus;
pub mod select;

pub use focus::{FocusItem, FocusSet, ItemId};
pub use select::{NearestSelector, RandomSelector, SelectionPolicy, Selector};

use std::fmt;

use hand_signal::{GestureKind, HandSignal};

// ════════════════════════════════════════════════════════════════════════════
// AppMode
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AppMode {
    /// Particles gathered into the tree.
    #[default]
    Tree,
    /// Particles drifting in a loose cloud.
    Scatter,
    /// One photo pulled forward for viewing.
    PhotoView,
}

impl AppMode {
    pub fn name(&self) -> &'static str {
        match self {
            AppMode::Tree      => "tree",
            AppMode::Scatter   => "scatter",
            AppMode::PhotoView => "photo view",
        }
    }
}

impl fmt::Display for AppMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Outcome
// ════════════════════════════════════════════════════════════════════════════

/// Emitted whenever the mode or the active photo changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeChange {
    pub from:   AppMode,
    pub to:     AppMode,
    pub active: Option<ItemId>,
}

/// A trigger that matched but could not be carried out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Skip {
    /// Pinch in Scatter with no photos to show.
    SelectionUnavailable,
}

/// Controller state after one input, plus what (if anything) happened.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Outcome {
    pub mode:    AppMode,
    pub active:  Option<ItemId>,
    /// Cursor forwarded from the signal; `None` when no hand is present.
    pub cursor:  Option<(f32, f32)>,
    pub change:  Option<ModeChange>,
    pub skipped: Option<Skip>,
}

// ════════════════════════════════════════════════════════════════════════════
// Controller
// ════════════════════════════════════════════════════════════════════════════

pub struct Controller {
    mode:     AppMode,
    active:   Option<ItemId>,
    selector: Box<dyn Selector>,
}

impl Default for Controller {
    fn default() -> Self { Controller::new(Box::new(RandomSelector::new())) }
}

impl Controller {
    pub fn new(selector: Box<dyn Selector>) -> Self {
        Controller {
            mode: AppMode::Tree,
            active: None,
            selector,
        }
    }

    pub fn mode(&self)   -> AppMode        { self.mode }
    pub fn active(&self) -> Option<ItemId> { self.active }
    pub fn policy(&self) -> SelectionPolicy { self.selector.policy() }

    /// Feed one frame's signal.
    pub fn apply(&mut self, signal: &HandSignal, items: &FocusSet) -> Outcome {
        let Some(cursor) = signal.cursor() else {
            return self.outcome(None, None, None);
        };

        let mut skipped = None;
        let target = match (signal.gesture, self.mode) {
            (GestureKind::Fist, AppMode::Scatter | AppMode::PhotoView) =>
                Some((AppMode::Tree, None)),

            (GestureKind::OpenHand, AppMode::Tree | AppMode::PhotoView) =>
                Some((AppMode::Scatter, None)),

            (GestureKind::Pinch, AppMode::Scatter) if self.active.is_none() => {
                match self.pick(items, cursor) {
                    Some(id) => Some((AppMode::PhotoView, Some(id))),
                    None => {
                        log::debug!("pinch ignored: no photos to show");
                        skipped = Some(Skip::SelectionUnavailable);
                        None
                    }
                }
            }

            _ => None,
        };

        let change = target.and_then(|(to, active)| self.transition(to, active));
        self.outcome(Some(cursor), change, skipped)
    }

    /// Leave PhotoView on request from the viewer (e.g. a close action).
    /// Does nothing in other modes.
    pub fn release(&mut self) -> Outcome {
        let change = match self.mode {
            AppMode::PhotoView => self.transition(AppMode::Scatter, None),
            AppMode::Tree | AppMode::Scatter => None,
        };
        self.outcome(None, change, None)
    }

    fn pick(&mut self, items: &FocusSet, cursor: (f32, f32)) -> Option<ItemId> {
        if items.is_empty() {
            return None;
        }
        self.selector.select(items, cursor).filter(|&id| items.contains(id))
    }

    /// Mode and active photo are written together so the pair never
    /// disagrees.
    fn transition(&mut self, to: AppMode, active: Option<ItemId>) -> Option<ModeChange> {
        debug_assert_eq!(active.is_some(), to == AppMode::PhotoView);
        if to == self.mode && active == self.active {
            return None;
        }
        let from = self.mode;
        self.mode = to;
        self.active = active;
        Some(ModeChange { from, to, active })
    }

    fn outcome(
        &self,
        cursor: Option<(f32, f32)>,
        change: Option<ModeChange>,
        skipped: Option<Skip>,
    ) -> Outcome {
        Outcome {
            mode: self.mode,
            active: self.active,
            cursor,
            change,
            skipped,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(gesture: GestureKind) -> HandSignal {
        HandSignal { gesture, x: 0.4, y: 0.6, present: true }
    }

    fn absent(gesture: GestureKind) -> HandSignal {
        HandSignal { gesture, x: 0.4, y: 0.6, present: false }
    }

    fn controller() -> Controller {
        Controller::new(Box::new(RandomSelector::seeded(3)))
    }

    fn photos(n: usize) -> FocusSet {
        let mut set = FocusSet::new();
        for i in 0..n { set.add(format!("p{}.png", i)); }
        set
    }

    fn run(ctl: &mut Controller, items: &FocusSet, gestures: &[GestureKind]) {
        for &g in gestures {
            ctl.apply(&sig(g), items);
        }
    }

    fn invariant_holds(ctl: &Controller) -> bool {
        ctl.active().is_some() == (ctl.mode() == AppMode::PhotoView)
    }

    #[test]
    fn starts_in_tree() {
        let ctl = controller();
        assert_eq!(ctl.mode(), AppMode::Tree);
        assert_eq!(ctl.active(), None);
    }

    #[test]
    fn open_then_pinch_views_the_only_photo() {
        let items = photos(1);
        let mut ctl = controller();
        run(&mut ctl, &items, &[GestureKind::OpenHand, GestureKind::Pinch]);
        assert_eq!(ctl.mode(), AppMode::PhotoView);
        assert_eq!(ctl.active(), Some(ItemId(0)));
    }

    #[test]
    fn held_pinch_does_not_reselect() {
        let items = photos(8);
        let mut ctl = controller();
        run(&mut ctl, &items, &[GestureKind::OpenHand, GestureKind::Pinch]);
        let first = ctl.active();
        assert!(first.is_some());
        for _ in 0..50 {
            let out = ctl.apply(&sig(GestureKind::Pinch), &items);
            assert_eq!(out.change, None);
            assert_eq!(ctl.active(), first);
        }
    }

    #[test]
    fn fist_returns_to_tree_and_clears() {
        let items = photos(1);
        let mut ctl = controller();
        run(&mut ctl, &items, &[GestureKind::OpenHand, GestureKind::Pinch, GestureKind::Fist]);
        assert_eq!(ctl.mode(), AppMode::Tree);
        assert_eq!(ctl.active(), None);
    }

    #[test]
    fn fist_from_scatter() {
        let items = photos(0);
        let mut ctl = controller();
        run(&mut ctl, &items, &[GestureKind::OpenHand, GestureKind::Fist]);
        assert_eq!(ctl.mode(), AppMode::Tree);
    }

    #[test]
    fn fist_in_tree_is_a_no_op() {
        let mut ctl = controller();
        let out = ctl.apply(&sig(GestureKind::Fist), &photos(2));
        assert_eq!(out.mode, AppMode::Tree);
        assert_eq!(out.change, None);
    }

    #[test]
    fn open_hand_leaves_photo_view_for_scatter() {
        let items = photos(2);
        let mut ctl = controller();
        run(&mut ctl, &items, &[GestureKind::OpenHand, GestureKind::Pinch]);
        let out = ctl.apply(&sig(GestureKind::OpenHand), &items);
        assert_eq!(out.mode, AppMode::Scatter);
        assert_eq!(out.active, None);
        assert_eq!(
            out.change,
            Some(ModeChange { from: AppMode::PhotoView, to: AppMode::Scatter, active: None }),
        );
    }

    #[test]
    fn pinch_without_photos_stays_in_scatter() {
        let items = photos(0);
        let mut ctl = controller();
        run(&mut ctl, &items, &[GestureKind::OpenHand]);
        let out = ctl.apply(&sig(GestureKind::Pinch), &items);
        assert_eq!(out.mode, AppMode::Scatter);
        assert_eq!(out.change, None);
        assert_eq!(out.skipped, Some(Skip::SelectionUnavailable));
    }

    #[test]
    fn pinch_in_tree_does_nothing() {
        let mut ctl = controller();
        let out = ctl.apply(&sig(GestureKind::Pinch), &photos(3));
        assert_eq!(out.mode, AppMode::Tree);
        assert_eq!(out.skipped, None);
    }

    #[test]
    fn absent_signal_never_moves() {
        let items = photos(2);
        let mut ctl = controller();
        for g in [GestureKind::OpenHand, GestureKind::Fist, GestureKind::Pinch, GestureKind::None] {
            let out = ctl.apply(&absent(g), &items);
            assert_eq!(out.mode, AppMode::Tree);
            assert_eq!(out.cursor, None);
        }
        run(&mut ctl, &items, &[GestureKind::OpenHand, GestureKind::Pinch]);
        let active = ctl.active();
        for g in [GestureKind::OpenHand, GestureKind::Fist] {
            ctl.apply(&absent(g), &items);
            assert_eq!(ctl.mode(), AppMode::PhotoView);
            assert_eq!(ctl.active(), active);
        }
    }

    #[test]
    fn cursor_is_forwarded() {
        let mut ctl = controller();
        let out = ctl.apply(&sig(GestureKind::None), &photos(0));
        assert_eq!(out.cursor, Some((0.4, 0.6)));
    }

    #[test]
    fn change_reported_once() {
        let items = photos(1);
        let mut ctl = controller();
        let first  = ctl.apply(&sig(GestureKind::OpenHand), &items);
        let second = ctl.apply(&sig(GestureKind::OpenHand), &items);
        assert_eq!(
            first.change,
            Some(ModeChange { from: AppMode::Tree, to: AppMode::Scatter, active: None }),
        );
        assert_eq!(second.change, None);
    }

    #[test]
    fn release_from_photo_view() {
        let items = photos(1);
        let mut ctl = controller();
        run(&mut ctl, &items, &[GestureKind::OpenHand, GestureKind::Pinch]);
        let out = ctl.release();
        assert_eq!(out.mode, AppMode::Scatter);
        assert_eq!(out.active, None);
        assert!(out.change.is_some());
        assert_eq!(ctl.release().change, None);
    }

    #[test]
    fn release_outside_photo_view_is_ignored() {
        let mut ctl = controller();
        assert_eq!(ctl.release().change, None);
        assert_eq!(ctl.mode(), AppMode::Tree);
    }

    #[test]
    fn nearest_policy_picks_closest_photo() {
        let mut items = photos(3);
        items.set_screen_pos(ItemId(0), Some((0.9, 0.1)));
        items.set_screen_pos(ItemId(1), Some((0.4, 0.55)));
        items.set_screen_pos(ItemId(2), Some((0.1, 0.9)));
        let mut ctl = Controller::new(SelectionPolicy::Nearest.build(None));
        run(&mut ctl, &items, &[GestureKind::OpenHand, GestureKind::Pinch]);
        assert_eq!(ctl.active(), Some(ItemId(1)));
    }

    #[test]
    fn invariant_survives_arbitrary_streams() {
        use rand::{Rng, SeedableRng};
        let all = [GestureKind::None, GestureKind::OpenHand, GestureKind::Fist, GestureKind::Pinch];
        let mut rng = rand::rngs::StdRng::seed_from_u64(99);
        let mut items = FocusSet::new();
        let mut ctl = controller();
        for step in 0..2000 {
            if step % 300 == 150 { items.add(format!("late{}.jpg", step)); }
            let g = all[rng.gen_range(0..all.len())];
            let present = rng.gen_bool(0.8);
            if rng.gen_bool(0.02) {
                ctl.release();
            } else {
                ctl.apply(&HandSignal { gesture: g, x: 0.5, y: 0.5, present }, &items);
            }
            assert!(invariant_holds(&ctl), "step {}", step);
        }
    }
}
