//! Occurrence counts keyed by client address or endpoint.
//!
//! Keys iterate in the order they were first seen. That order is what the
//! report writers print and what breaks ties in [`FrequencyTable::max_entry`].
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FrequencyTable {
    counts: IndexMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self {
            counts: IndexMap::new(),
        }
    }

    /// Count one more occurrence of `key`. Keys are compared exactly.
    pub fn increment(&mut self, key: &str) {
        match self.counts.get_mut(key) {
            Some(n) => *n += 1,
            None => {
                self.counts.insert(key.to_string(), 1);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<usize> {
        self.counts.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Entry with the highest count. On a tie the key seen first wins.
    pub fn max_entry(&self) -> Option<(&str, usize)> {
        let mut best: Option<(&str, usize)> = None;
        for (key, count) in self.iter() {
            match best {
                Some((_, top)) if count <= top => {}
                _ => best = Some((key, count)),
            }
        }
        best
    }

    /// Keep only entries whose count is at least `min`, preserving order.
    pub fn retain_at_least(mut self, min: usize) -> Self {
        self.counts.retain(|_, n| *n >= min);
        self
    }
}

impl<'a> FromIterator<&'a str> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        for key in iter {
            table.increment(key);
        }
        table
    }
}
