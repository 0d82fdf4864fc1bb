//! Which photo a pinch brings into view.
//!
//! The default picks uniformly at random.  [`NearestSelector`] picks the photo
//! drawn closest to the cursor instead, using positions the renderer writes
//! back into the [`FocusSet`].

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::focus::{FocusSet, ItemId};

// ════════════════════════════════════════════════════════════════════════════
// Selector trait
// ════════════════════════════════════════════════════════════════════════════

pub trait Selector: Send {
    /// Choose one item, or `None` if the set offers nothing to choose.
    fn select(&mut self, items: &FocusSet, cursor: (f32, f32)) -> Option<ItemId>;

    fn policy(&self) -> SelectionPolicy;
}

// ════════════════════════════════════════════════════════════════════════════
// RandomSelector
// ════════════════════════════════════════════════════════════════════════════

pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    pub fn new() -> Self {
        RandomSelector { rng: StdRng::from_entropy() }
    }

    /// Deterministic sequence, for tests and reproducible sessions.
    pub fn seeded(seed: u64) -> Self {
        RandomSelector { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Default for RandomSelector {
    fn default() -> Self { RandomSelector::new() }
}

impl Selector for RandomSelector {
    fn select(&mut self, items: &FocusSet, _cursor: (f32, f32)) -> Option<ItemId> {
        if items.is_empty() {
            return None;
        }
        Some(ItemId(self.rng.gen_range(0..items.len())))
    }

    fn policy(&self) -> SelectionPolicy { SelectionPolicy::Random }
}

// ════════════════════════════════════════════════════════════════════════════
// NearestSelector
// ════════════════════════════════════════════════════════════════════════════

/// Picks the item whose last drawn position is nearest the cursor.  Items the
/// renderer has not placed yet are skipped; if none are placed, the first
/// item wins.
#[derive(Default)]
pub struct NearestSelector;

impl Selector for NearestSelector {
    fn select(&mut self, items: &FocusSet, cursor: (f32, f32)) -> Option<ItemId> {
        let (cx, cy) = cursor;
        items.iter()
            .filter_map(|item| item.screen_pos.map(|(x, y)| {
                let d2 = (x - cx) * (x - cx) + (y - cy) * (y - cy);
                (item.id, d2)
            }))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
            .or_else(|| items.iter().next().map(|item| item.id))
    }

    fn policy(&self) -> SelectionPolicy { SelectionPolicy::Nearest }
}

// ════════════════════════════════════════════════════════════════════════════
// SelectionPolicy: config-level name for a selector
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionPolicy {
    #[default]
    Random,
    Nearest,
}

impl SelectionPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            SelectionPolicy::Random  => "random",
            SelectionPolicy::Nearest => "nearest",
        }
    }

    /// Build the selector.  `seed` only affects [`SelectionPolicy::Random`].
    pub fn build(self, seed: Option<u64>) -> Box<dyn Selector> {
        match (self, seed) {
            (SelectionPolicy::Random, Some(s)) => Box::new(RandomSelector::seeded(s)),
            (SelectionPolicy::Random, None)    => Box::new(RandomSelector::new()),
            (SelectionPolicy::Nearest, _)      => Box::new(NearestSelector),
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random"  => Ok(SelectionPolicy::Random),
            "nearest" => Ok(SelectionPolicy::Nearest),
            other     => Err(format!("unknown selection policy '{}' (random|nearest)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photos(n: usize) -> FocusSet {
        let mut set = FocusSet::new();
        for i in 0..n { set.add(format!("photo{}.jpg", i)); }
        set
    }

    #[test]
    fn random_stays_in_range() {
        let set = photos(3);
        let mut sel = RandomSelector::seeded(7);
        for _ in 0..100 {
            let id = sel.select(&set, (0.5, 0.5)).unwrap();
            assert!(set.contains(id));
        }
    }

    #[test]
    fn random_seed_is_reproducible() {
        let set = photos(10);
        let mut a = RandomSelector::seeded(42);
        let mut b = RandomSelector::seeded(42);
        for _ in 0..20 {
            assert_eq!(a.select(&set, (0.0, 0.0)), b.select(&set, (0.0, 0.0)));
        }
    }

    #[test]
    fn empty_set_selects_nothing() {
        let set = FocusSet::new();
        assert_eq!(RandomSelector::seeded(1).select(&set, (0.5, 0.5)), None);
        assert_eq!(NearestSelector.select(&set, (0.5, 0.5)), None);
    }

    #[test]
    fn nearest_uses_screen_positions() {
        let mut set = photos(3);
        set.set_screen_pos(ItemId(0), Some((0.1, 0.1)));
        set.set_screen_pos(ItemId(1), Some((0.8, 0.8)));
        set.set_screen_pos(ItemId(2), Some((0.5, 0.4)));
        assert_eq!(NearestSelector.select(&set, (0.75, 0.9)), Some(ItemId(1)));
        assert_eq!(NearestSelector.select(&set, (0.45, 0.45)), Some(ItemId(2)));
    }

    #[test]
    fn nearest_skips_unplaced_items() {
        let mut set = photos(3);
        set.set_screen_pos(ItemId(2), Some((0.9, 0.9)));
        assert_eq!(NearestSelector.select(&set, (0.0, 0.0)), Some(ItemId(2)));
    }

    #[test]
    fn nearest_falls_back_to_first() {
        let set = photos(2);
        assert_eq!(NearestSelector.select(&set, (0.9, 0.9)), Some(ItemId(0)));
    }

    #[test]
    fn policy_parses() {
        assert_eq!("Nearest".parse::<SelectionPolicy>(), Ok(SelectionPolicy::Nearest));
        assert_eq!("random".parse::<SelectionPolicy>(), Ok(SelectionPolicy::Random));
        assert!("closest".parse::<SelectionPolicy>().is_err());
        assert_eq!(SelectionPolicy::Nearest.build(None).policy(), SelectionPolicy::Nearest);
    }
}
