use std::collections::HashMap;
use std::hash::Hash;

/// Occurrence counter that remembers the order keys were first seen in.
///
/// Ties between equally frequent keys resolve to the earliest one, so
/// reports built on it are reproducible for a given input order.
#[derive(Debug, Clone)]
pub struct Tally<K> {
    counts: Vec<(K, usize)>,
    positions: HashMap<K, usize>,
}

impl<K> Default for Tally<K> {
    fn default() -> Self {
        Self {
            counts: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> Tally<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: K) {
        match self.positions.get(&key) {
            Some(&index) => self.counts[index].1 += 1,
            None => {
                self.positions.insert(key.clone(), self.counts.len());
                self.counts.push((key, 1));
            }
        }
    }

    pub fn count(&self, key: &K) -> usize {
        self.positions
            .get(key)
            .map(|&index| self.counts[index].1)
            .unwrap_or(0)
    }

    pub fn max_count(&self) -> Option<usize> {
        self.counts.iter().map(|(_, count)| *count).max()
    }

    /// Every key sharing the highest count, in first-seen order.
    pub fn leaders(&self) -> Vec<&K> {
        let Some(max) = self.max_count() else {
            return Vec::new();
        };
        self.counts
            .iter()
            .filter(|(_, count)| *count == max)
            .map(|(key, _)| key)
            .collect()
    }

    /// The first-seen key among the leaders.
    pub fn leader(&self) -> Option<&K> {
        self.leaders().into_iter().next()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.counts.iter().map(|(key, count)| (key, *count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl<K: Eq + Hash + Clone> FromIterator<K> for Tally<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tally = Self::new();
        for key in iter {
            tally.add(key);
        }
        tally
    }
}

/// Primary-key lookup over a loaded collection. Later duplicates win.
pub fn index_by<'a, T, F>(items: &'a [T], key: F) -> HashMap<&'a str, &'a T>
where
    F: Fn(&'a T) -> &'a str,
{
    items.iter().map(|item| (key(item), item)).collect()
}
