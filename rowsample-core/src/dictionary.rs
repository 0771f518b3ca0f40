//! Categorical dictionaries built over the full row stream
//!
//! A [`CategoricalDictionary`] collects the distinct canonical strings seen
//! in a column while rows stream in. At the end of the stream it is frozen
//! into a [`FrozenDictionary`], whose indices follow ascending lexicographic
//! order of the values rather than discovery order.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Growing set of distinct values observed in one categorical column
#[derive(Debug, Clone, Default)]
pub struct CategoricalDictionary {
    /// Set of unique values
    values: HashSet<String>,

    /// Estimated memory usage
    memory_usage: usize,
}

impl CategoricalDictionary {
    /// Create a new empty dictionary
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value; inserting a value already present is a no-op.
    ///
    /// Returns `true` if the value was new.
    pub fn insert(&mut self, value: &str) -> bool {
        if self.values.contains(value) {
            return false;
        }
        self.memory_usage += value.len();
        self.values.insert(value.to_string())
    }

    /// Check if a value has been observed
    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(value)
    }

    /// Get the number of distinct values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no values have been observed
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the estimated memory usage of the stored values
    pub fn memory_usage(&self) -> usize {
        self.memory_usage
    }

    /// Sort the observed values and make them index-addressable
    pub fn freeze(&self) -> FrozenDictionary {
        let mut values: Vec<String> = self.values.iter().cloned().collect();
        values.sort_unstable();
        FrozenDictionary::from_sorted(values)
    }
}

/// Sorted, immutable dictionary mapping values to stable indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct FrozenDictionary {
    /// Values in ascending order; position is the index
    values: Vec<String>,

    /// Mapping from values to indices
    value_to_index: HashMap<String, u32>,
}

impl FrozenDictionary {
    fn from_sorted(values: Vec<String>) -> Self {
        let value_to_index = values
            .iter()
            .enumerate()
            .map(|(i, v)| (v.clone(), i as u32))
            .collect();

        Self {
            values,
            value_to_index,
        }
    }

    /// Get the index of a value
    pub fn index_of(&self, value: &str) -> Option<u32> {
        self.value_to_index.get(value).copied()
    }

    /// Get the value at an index
    pub fn value(&self, index: u32) -> Option<&str> {
        self.values.get(index as usize).map(String::as_str)
    }

    /// Get all values in index order
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Get the number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the dictionary is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<String>> for FrozenDictionary {
    fn from(mut values: Vec<String>) -> Self {
        values.sort_unstable();
        values.dedup();
        Self::from_sorted(values)
    }
}

impl From<FrozenDictionary> for Vec<String> {
    fn from(dictionary: FrozenDictionary) -> Self {
        dictionary.values
    }
}
