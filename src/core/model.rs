//! Frequency model
//!
//! Tokens are counted in a [`FrequencyDictionary`], which keeps first-seen
//! order until it is turned into a [`SortedFrequencies`] for reporting.

use serde::Serialize;
use std::collections::HashMap;

use crate::core::meta::SessionLog;

/// A distinct token and how often it occurred
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub key: String,
    pub count: u64,
}

/// Token text to occurrence count, in insertion order
#[derive(Debug, Default)]
pub struct FrequencyDictionary {
    entries: Vec<Entry>,
    /// Key to position in `entries`
    index: HashMap<String, usize>,
    total: u64,
}

impl FrequencyDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `key`, inserting it with count 1 if unseen
    pub fn lookup_or_init(&mut self, key: &str) -> &Entry {
        self.total += 1;

        if let Some(&slot) = self.index.get(key) {
            self.entries[slot].count += 1;
            return &self.entries[slot];
        }

        let slot = self.entries.len();
        self.entries.push(Entry {
            key: key.to_owned(),
            count: 1,
        });
        self.index.insert(key.to_owned(), slot);
        &self.entries[slot]
    }

    #[allow(dead_code)]
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.index.get(key).map(|&slot| &self.entries[slot])
    }

    /// Entries in current (first-seen) order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Reorder by ascending count; equal counts keep first-seen order.
    ///
    /// Consumes the dictionary: no tokens can be counted after sorting.
    pub fn sort_by_count_ascending(self) -> SortedFrequencies {
        let mut entries = self.entries;
        entries.sort_by(|a, b| a.count.cmp(&b.count));
        SortedFrequencies {
            entries,
            total: self.total,
        }
    }
}

/// Final, read-only frequency table in ascending count order
#[derive(Debug, Clone, Default)]
pub struct SortedFrequencies {
    entries: Vec<Entry>,
    total: u64,
}

impl SortedFrequencies {
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The `n` most frequent entries, still in ascending order
    pub fn top(&self, n: usize) -> &[Entry] {
        let skip = self.entries.len().saturating_sub(n);
        &self.entries[skip..]
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Counters collected over one pass through a log
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    /// Source name (path or "-")
    pub source: String,
    pub bytes_read: u64,
    /// Tokens forwarded to the dictionary
    pub tokens_counted: u64,
    pub distinct_keys: usize,
    pub meta_tags_filtered: u64,
    pub chopped_tokens: u64,
    pub unprintable_bytes: u64,
    pub elapsed_secs: f64,
    pub sessions: SessionLog,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_or_init_inserts_then_increments() {
        let mut dict = FrequencyDictionary::new();
        assert_eq!(dict.lookup_or_init("a").count, 1);
        assert_eq!(dict.lookup_or_init("b").count, 1);
        assert_eq!(dict.lookup_or_init("a").count, 2);

        assert_eq!(dict.len(), 2);
        assert_eq!(dict.total(), 3);
        assert_eq!(dict.get("a").map(|e| e.count), Some(2));
        assert!(dict.get("missing").is_none());
    }

    #[test]
    fn test_entries_keep_first_seen_order() {
        let mut dict = FrequencyDictionary::new();
        for key in ["z", "[left]", "a", "z"] {
            dict.lookup_or_init(key);
        }
        let keys: Vec<_> = dict.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["z", "[left]", "a"]);
    }

    #[test]
    fn test_sort_ascending_with_stable_ties() {
        let mut dict = FrequencyDictionary::new();
        for key in ["x", "y", "y", "z", "w", "y", "x"] {
            dict.lookup_or_init(key);
        }
        let sorted = dict.sort_by_count_ascending();
        let pairs: Vec<_> = sorted
            .entries()
            .iter()
            .map(|e| (e.key.as_str(), e.count))
            .collect();
        assert_eq!(pairs, vec![("z", 1), ("w", 1), ("x", 2), ("y", 3)]);
        assert_eq!(sorted.total(), 7);
    }

    #[test]
    fn test_sort_handles_counts_beyond_i32() {
        let mut dict = FrequencyDictionary::new();
        dict.lookup_or_init("big");
        dict.lookup_or_init("small");
        dict.entries[0].count = u64::from(u32::MAX) * 4;
        let sorted = dict.sort_by_count_ascending();
        assert_eq!(sorted.entries()[0].key, "small");
        assert_eq!(sorted.entries()[1].key, "big");
    }

    #[test]
    fn test_top_returns_most_frequent_tail() {
        let mut dict = FrequencyDictionary::new();
        for key in ["a", "b", "b", "c", "c", "c"] {
            dict.lookup_or_init(key);
        }
        let sorted = dict.sort_by_count_ascending();
        let top: Vec<_> = sorted.top(2).iter().map(|e| e.key.as_str()).collect();
        assert_eq!(top, vec!["b", "c"]);
        assert_eq!(sorted.top(10).len(), 3);
        assert!(sorted.top(0).is_empty());
    }

    #[test]
    fn test_sum_of_counts_matches_total() {
        let mut dict = FrequencyDictionary::new();
        for key in "hello world".split("").filter(|s| !s.is_empty()) {
            dict.lookup_or_init(key);
        }
        let sum: u64 = dict.entries().iter().map(|e| e.count).sum();
        assert_eq!(sum, dict.total());
        assert_eq!(sum, 11);
    }
}
