use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// Label-keyed values over a key set fixed at construction.
///
/// Iteration follows the configured label order. Lookups of labels outside the
/// key set return `None` and writes to them are refused, so an unexpected
/// answer can never introduce a new category.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMap<V> {
    labels: Vec<String>,
    values: Vec<V>,
    index: HashMap<String, usize>,
}

impl<V: Clone> LabelMap<V> {
    /// Builds the key set from `labels`, keeping the first occurrence of any duplicate.
    pub fn with_labels<I, S>(labels: I, initial: V) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = LabelMap {
            labels: Vec::new(),
            values: Vec::new(),
            index: HashMap::new(),
        };
        for label in labels {
            let label = label.into();
            if map.index.contains_key(&label) {
                continue;
            }
            map.index.insert(label.clone(), map.labels.len());
            map.labels.push(label);
            map.values.push(initial.clone());
        }
        map
    }

    /// Same key set as `self`, values computed from each entry.
    pub fn map_values<W, F>(&self, mut f: F) -> LabelMap<W>
    where
        F: FnMut(&str, &V) -> W,
    {
        LabelMap {
            labels: self.labels.clone(),
            values: self
                .labels
                .iter()
                .zip(&self.values)
                .map(|(label, value)| f(label, value))
                .collect(),
            index: self.index.clone(),
        }
    }
}

impl<V> LabelMap<V> {
    pub fn get(&self, label: &str) -> Option<&V> {
        self.index.get(label).map(|&i| &self.values[i])
    }

    pub fn get_mut(&mut self, label: &str) -> Option<&mut V> {
        match self.index.get(label) {
            Some(&i) => Some(&mut self.values[i]),
            None => None,
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl LabelMap<usize> {
    /// Count recorded for `label`, 0 for labels outside the key set.
    pub fn count(&self, label: &str) -> usize {
        self.get(label).copied().unwrap_or(0)
    }

    /// Adds one to `label`; returns false when the label is not in the key set.
    pub fn increment(&mut self, label: &str) -> bool {
        match self.get_mut(label) {
            Some(count) => {
                *count += 1;
                true
            }
            None => false,
        }
    }
}

impl<V: Serialize> Serialize for LabelMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.labels.len()))?;
        for (label, value) in self.iter() {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}
