//! Order-preserving pool of unmatched solution objects
//!
//! Claimed slots are tombstoned rather than removed, so the remaining
//! candidates are always visited in solution-graph order. Diagnostic order
//! depends on this, which is why the pool is never backed by a hash set.

#[derive(Debug, Clone)]
pub struct UnmatchedPool<T> {
    slots: Vec<Option<T>>,
    remaining: usize,
}

impl<T> UnmatchedPool<T> {
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        let slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
        let remaining = slots.len();
        Self { slots, remaining }
    }

    /// Unclaimed candidates with their slot numbers, in original order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, item)| item.as_ref().map(|item| (slot, item)))
    }

    /// First unclaimed candidate satisfying `predicate`
    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<usize> {
        self.iter().find(|(_, item)| predicate(item)).map(|(slot, _)| slot)
    }

    /// Remove a candidate from the pool; `None` if the slot was already claimed
    pub fn claim(&mut self, slot: usize) -> Option<T> {
        let item = self.slots.get_mut(slot)?.take();
        if item.is_some() {
            self.remaining -= 1;
        }
        item
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Never-claimed candidates, in original order
    pub fn into_unclaimed(self) -> impl Iterator<Item = T> {
        self.slots.into_iter().flatten()
    }
}
