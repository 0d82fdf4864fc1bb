//! Focusable items: the user-supplied photos a pinch can bring into view.
//!
//! The set is append-only for the lifetime of a session.  Ids are dense
//! insertion indices, so an id handed out once stays valid.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub usize);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FocusItem {
    pub id:         ItemId,
    /// Opaque resource handle (path or URL).  Never opened here.
    pub handle:     String,
    /// Where the renderer last drew this item, normalized screen space.
    /// `None` until the first frame that places it.
    pub screen_pos: Option<(f32, f32)>,
}

#[derive(Clone, Debug, Default)]
pub struct FocusSet {
    items: Vec<FocusItem>,
}

impl FocusSet {
    pub fn new() -> Self { FocusSet::default() }

    /// Append an item and return its id.
    pub fn add(&mut self, handle: impl Into<String>) -> ItemId {
        let id = ItemId(self.items.len());
        self.items.push(FocusItem { id, handle: handle.into(), screen_pos: None });
        id
    }

    pub fn len(&self) -> usize { self.items.len() }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn get(&self, id: ItemId) -> Option<&FocusItem> { self.items.get(id.0) }

    pub fn contains(&self, id: ItemId) -> bool { id.0 < self.items.len() }

    pub fn iter(&self) -> impl Iterator<Item = &FocusItem> { self.items.iter() }

    /// Record the renderer's latest on-screen position for `id`.
    /// Returns false for an unknown id.
    pub fn set_screen_pos(&mut self, id: ItemId, pos: Option<(f32, f32)>) -> bool {
        match self.items.get_mut(id.0) {
            Some(item) => { item.screen_pos = pos; true }
            None       => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_insertion_order() {
        let mut set = FocusSet::new();
        assert_eq!(set.add("a.jpg"), ItemId(0));
        assert_eq!(set.add("b.jpg"), ItemId(1));
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(ItemId(1)).map(|i| i.handle.as_str()), Some("b.jpg"));
        assert!(!set.contains(ItemId(2)));
    }

    #[test]
    fn screen_pos_updates_known_items_only() {
        let mut set = FocusSet::new();
        let id = set.add("a.jpg");
        assert!(set.set_screen_pos(id, Some((0.2, 0.3))));
        assert_eq!(set.get(id).and_then(|i| i.screen_pos), Some((0.2, 0.3)));
        assert!(!set.set_screen_pos(ItemId(9), Some((0.0, 0.0))));
    }
}
