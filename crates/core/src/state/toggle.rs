//! Toggle-by-identity collections (favorites, cart).

use super::Identified;

/// Outcome of [`ToggleCollection::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

impl Toggled {
    /// Whether the item is a member after the toggle.
    #[must_use]
    pub const fn is_member(self) -> bool {
        matches!(self, Self::Added)
    }
}

/// An ordered collection holding at most one item per id.
///
/// Membership is flipped with [`toggle`](Self::toggle): an item whose id is
/// already present is removed, otherwise the snapshot is appended. Toggling
/// the same id twice restores the previous contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleCollection<T> {
    items: Vec<T>,
}

impl<T> Default for ToggleCollection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Identified> ToggleCollection<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove the item with the same id if present, otherwise append it.
    pub fn toggle(&mut self, item: T) -> Toggled {
        let id = item.id();
        if let Some(pos) = self.position(id) {
            self.items.remove(pos);
            Toggled::Removed
        } else {
            self.items.push(item);
            Toggled::Added
        }
    }

    #[must_use]
    pub fn contains(&self, id: T::Id) -> bool {
        self.position(id).is_some()
    }

    #[must_use]
    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Remove the item with `id`, returning it if it was present.
    pub fn remove(&mut self, id: T::Id) -> Option<T> {
        self.position(id).map(|pos| self.items.remove(pos))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    fn position(&self, id: T::Id) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}

impl<'a, T> IntoIterator for &'a ToggleCollection<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Item {
        id: u32,
        label: &'static str,
    }

    impl Identified for Item {
        type Id = u32;

        fn id(&self) -> u32 {
            self.id
        }
    }

    const fn item(id: u32, label: &'static str) -> Item {
        Item { id, label }
    }

    #[test]
    fn test_toggle_twice_restores_contents() {
        let mut favorites = ToggleCollection::new();
        favorites.toggle(item(1, "mug"));
        favorites.toggle(item(2, "lamp"));
        let before = favorites.clone();

        assert_eq!(favorites.toggle(item(3, "rug")), Toggled::Added);
        assert_eq!(favorites.toggle(item(3, "rug")), Toggled::Removed);
        assert_eq!(favorites, before);
    }

    #[test]
    fn test_toggle_matches_on_id_not_contents() {
        let mut cart = ToggleCollection::new();
        cart.toggle(item(1, "mug"));

        // A stale snapshot with the same id still removes the entry.
        assert_eq!(cart.toggle(item(1, "mug (renamed)")), Toggled::Removed);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_no_duplicates_and_insertion_order() {
        let mut cart = ToggleCollection::new();
        for id in [3, 1, 2] {
            cart.toggle(item(id, "x"));
        }
        assert_eq!(cart.len(), 3);
        let ids: Vec<u32> = cart.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert!(cart.contains(1));
        assert_eq!(cart.get(2).unwrap().label, "x");
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = ToggleCollection::new();
        cart.toggle(item(1, "mug"));
        cart.toggle(item(2, "lamp"));

        assert_eq!(cart.remove(1).unwrap().label, "mug");
        assert!(cart.remove(1).is_none());

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.len(), 0);
    }
}
