//! Ten-entry high score table

use serde::{Deserialize, Serialize};

pub const TABLE_SIZE: usize = 10;
pub const DEFAULT_INITIALS: &str = "TET";
pub const MAX_INITIALS: usize = 3;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    pub initials: String,
}

impl Default for HighScoreEntry {
    fn default() -> Self {
        Self {
            score: 0,
            initials: DEFAULT_INITIALS.to_string(),
        }
    }
}

/// Best scores, highest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl Default for HighScores {
    fn default() -> Self {
        Self {
            entries: vec![HighScoreEntry::default(); TABLE_SIZE],
        }
    }
}

impl HighScores {
    /// Sort, pad and truncate a table read from disk
    pub fn normalized(mut self) -> Self {
        for entry in &mut self.entries {
            entry.initials = normalize_initials(&entry.initials);
        }
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(TABLE_SIZE);
        self.entries.resize_with(TABLE_SIZE, HighScoreEntry::default);
        self
    }

    fn lowest(&self) -> u64 {
        self.entries.last().map(|entry| entry.score).unwrap_or(0)
    }

    /// Whether `score` would earn a place in the table
    pub fn qualifies(&self, score: u64) -> bool {
        self.entries.len() < TABLE_SIZE || score > self.lowest()
    }

    /// Add a score and return its rank (0 = best), or None if it did not
    /// make the table. Ties rank below existing entries.
    pub fn insert(&mut self, score: u64, initials: &str) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self
            .entries
            .iter()
            .position(|entry| entry.score < score)
            .unwrap_or(self.entries.len());
        self.entries.insert(
            rank,
            HighScoreEntry {
                score,
                initials: normalize_initials(initials),
            },
        );
        self.entries.truncate(TABLE_SIZE);
        Some(rank)
    }

    pub fn best(&self) -> Option<&HighScoreEntry> {
        self.entries.first()
    }
}

/// Upper-case ASCII letters and digits, at most three, defaulting to "TET"
pub fn normalize_initials(raw: &str) -> String {
    let initials: String = raw
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .take(MAX_INITIALS)
        .collect();
    if initials.is_empty() {
        DEFAULT_INITIALS.to_string()
    } else {
        initials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = HighScores::default();
        assert_eq!(table.entries.len(), TABLE_SIZE);
        assert!(table.entries.iter().all(|e| e.score == 0 && e.initials == "TET"));
        assert!(!table.qualifies(0));
        assert!(table.qualifies(1));
    }

    #[test]
    fn test_insert_keeps_order_and_size() {
        let mut table = HighScores::default();
        assert_eq!(table.insert(500, "abc"), Some(0));
        assert_eq!(table.insert(900, "xyz"), Some(0));
        assert_eq!(table.insert(700, "mid"), Some(1));

        let scores: Vec<u64> = table.entries.iter().map(|e| e.score).take(3).collect();
        assert_eq!(scores, vec![900, 700, 500]);
        assert_eq!(table.entries.len(), TABLE_SIZE);
        assert_eq!(table.best().unwrap().initials, "XYZ");
    }

    #[test]
    fn test_full_table_rejects_low_scores() {
        let mut table = HighScores::default();
        for score in 1..=10 {
            table.insert(score * 100, "AAA");
        }
        assert!(!table.qualifies(100));
        assert_eq!(table.insert(100, "BBB"), None);
        assert_eq!(table.insert(150, "CCC"), Some(9));
        assert_eq!(table.entries.last().unwrap().score, 150);
    }

    #[test]
    fn test_ties_rank_below_existing() {
        let mut table = HighScores::default();
        table.insert(300, "OLD");
        assert_eq!(table.insert(300, "NEW"), Some(1));
        assert_eq!(table.entries[0].initials, "OLD");
    }

    #[test]
    fn test_normalize_initials() {
        assert_eq!(normalize_initials("ab"), "AB");
        assert_eq!(normalize_initials("j.r.r tolkien"), "JRR");
        assert_eq!(normalize_initials("  "), "TET");
        assert_eq!(normalize_initials("x9ü"), "X9");
    }

    #[test]
    fn test_normalized_repairs_table() {
        let table = HighScores {
            entries: vec![
                HighScoreEntry {
                    score: 5,
                    initials: "low".to_string(),
                },
                HighScoreEntry {
                    score: 50,
                    initials: "toolong".to_string(),
                },
            ],
        }
        .normalized();
        assert_eq!(table.entries.len(), TABLE_SIZE);
        assert_eq!(table.entries[0].score, 50);
        assert_eq!(table.entries[0].initials, "TOO");
        assert_eq!(table.entries[1].initials, "LOW");
        assert_eq!(table.entries[2], HighScoreEntry::default());
    }
}
