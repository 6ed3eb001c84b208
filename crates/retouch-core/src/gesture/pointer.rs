//! Active pointer tracking.

use serde::{Deserialize, Serialize};

/// One pointer position report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    /// Host-assigned pointer id.
    pub id: i32,
    /// Display-space x coordinate.
    pub x: f64,
    /// Display-space y coordinate.
    pub y: f64,
    /// Timestamp in milliseconds.
    pub t: f64,
}

impl PointerSample {
    pub fn new(id: i32, x: f64, y: f64, t: f64) -> Self {
        Self { id, x, y, t }
    }

    /// Euclidean distance to another sample.
    pub fn distance_to(&self, other: &PointerSample) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point halfway between this sample and another.
    pub fn midpoint(&self, other: &PointerSample) -> (f64, f64) {
        ((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Id-keyed table of the pointers in the current gesture, kept in the order
/// they went down.
#[derive(Debug, Clone, Default)]
pub struct PointerTable {
    entries: Vec<PointerSample>,
}

impl PointerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a pointer. A repeated id replaces the existing sample
    /// and keeps its position in the order. Returns `true` for a new id.
    pub fn insert(&mut self, sample: PointerSample) -> bool {
        match self.entries.iter_mut().find(|p| p.id == sample.id) {
            Some(existing) => {
                *existing = sample;
                false
            }
            None => {
                self.entries.push(sample);
                true
            }
        }
    }

    /// Replace the sample for a tracked id, returning the previous one.
    /// Untracked ids are left alone and return `None`.
    pub fn update(&mut self, sample: PointerSample) -> Option<PointerSample> {
        let existing = self.entries.iter_mut().find(|p| p.id == sample.id)?;
        Some(std::mem::replace(existing, sample))
    }

    pub fn remove(&mut self, id: i32) -> Option<PointerSample> {
        let index = self.entries.iter().position(|p| p.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn get(&self, id: i32) -> Option<&PointerSample> {
        self.entries.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: i32) -> bool {
        self.get(id).is_some()
    }

    /// The two earliest tracked pointers, which drive pinch math.
    pub fn primary_pair(&self) -> Option<(&PointerSample, &PointerSample)> {
        match self.entries.as_slice() {
            [a, b, ..] => Some((a, b)),
            _ => None,
        }
    }

    /// True if `id` is one of the two pointers returned by
    /// [`primary_pair`](Self::primary_pair).
    pub fn is_primary(&self, id: i32) -> bool {
        self.entries.iter().take(2).any(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointerSample> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_update() {
        let mut table = PointerTable::new();
        assert!(table.insert(PointerSample::new(1, 0.0, 0.0, 0.0)));
        assert!(!table.insert(PointerSample::new(1, 5.0, 5.0, 1.0)));
        assert_eq!(table.len(), 1);

        let previous = table.update(PointerSample::new(1, 8.0, 9.0, 2.0)).unwrap();
        assert_eq!((previous.x, previous.y), (5.0, 5.0));
        assert_eq!(table.get(1).map(|p| p.x), Some(8.0));
    }

    #[test]
    fn test_update_unknown_id_is_ignored() {
        let mut table = PointerTable::new();
        table.insert(PointerSample::new(1, 0.0, 0.0, 0.0));
        assert!(table.update(PointerSample::new(7, 1.0, 1.0, 1.0)).is_none());
        assert_eq!(table.len(), 1);
        assert!(!table.contains(7));
    }

    #[test]
    fn test_primary_pair_uses_insertion_order() {
        let mut table = PointerTable::new();
        table.insert(PointerSample::new(9, 0.0, 0.0, 0.0));
        assert!(table.primary_pair().is_none());

        table.insert(PointerSample::new(3, 1.0, 0.0, 0.0));
        table.insert(PointerSample::new(5, 2.0, 0.0, 0.0));

        let (a, b) = table.primary_pair().unwrap();
        assert_eq!((a.id, b.id), (9, 3));
        assert!(table.is_primary(3));
        assert!(!table.is_primary(5));

        table.remove(9);
        let (a, b) = table.primary_pair().unwrap();
        assert_eq!((a.id, b.id), (3, 5));
    }

    #[test]
    fn test_distance_and_midpoint() {
        let a = PointerSample::new(1, 0.0, 0.0, 0.0);
        let b = PointerSample::new(2, 30.0, 40.0, 0.0);
        assert_eq!(a.distance_to(&b), 50.0);
        assert_eq!(a.midpoint(&b), (15.0, 20.0));
    }
}
