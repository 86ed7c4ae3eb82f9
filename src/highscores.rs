//! High score leaderboard system
//!
//! Persisted as a JSON array of numbers under a fixed key, tracks the top 3
//! scores. Anything unreadable in storage counts as an empty board.

use serde_json::Value;

use crate::consts::MAX_HIGH_SCORES;
use crate::platform::KeyValueStore;

/// Storage key for the leaderboard
pub const STORAGE_KEY: &str = "meteor_shooter_highscores";

/// Sorted (descending) list of the best scores
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBoard {
    scores: Vec<f64>,
    capacity: usize,
}

impl ScoreBoard {
    /// Create an empty board holding at most `capacity` scores
    pub fn new(capacity: usize) -> Self {
        Self {
            scores: Vec::new(),
            capacity,
        }
    }

    /// Build a board from arbitrary values, dropping anything negative or
    /// non-finite, then sorting and truncating.
    pub fn from_values(values: impl IntoIterator<Item = f64>, capacity: usize) -> Self {
        let mut scores: Vec<f64> = values
            .into_iter()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .collect();
        scores.sort_by(|a, b| b.total_cmp(a));
        scores.truncate(capacity);
        Self { scores, capacity }
    }

    /// Parse the persisted JSON form. Malformed input yields an empty board.
    pub fn parse(raw: &str, capacity: usize) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => {
                Self::from_values(items.iter().filter_map(Value::as_f64), capacity)
            }
            Ok(_) => {
                log::warn!("Ignoring high scores: stored value is not an array");
                Self::new(capacity)
            }
            Err(err) => {
                log::warn!("Ignoring unreadable high scores: {}", err);
                Self::new(capacity)
            }
        }
    }

    /// JSON array form for storage. Whole scores are written as integers.
    pub fn to_json(&self) -> String {
        Value::Array(self.scores.iter().filter_map(|s| score_to_json(*s)).collect()).to_string()
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: f64) -> bool {
        if !score.is_finite() || score <= 0.0 || self.capacity == 0 {
            return false;
        }
        if self.scores.len() < self.capacity {
            return true;
        }
        self.scores.last().is_none_or(|lowest| score > *lowest)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.scores.iter().position(|s| score > *s);
        Some(rank.unwrap_or(self.scores.len()) + 1)
    }

    /// Insert a score, keeping the board sorted and bounded.
    /// Invalid scores are ignored.
    pub fn insert(&mut self, score: f64) {
        if !score.is_finite() || score < 0.0 {
            return;
        }
        let pos = self
            .scores
            .iter()
            .position(|s| score > *s)
            .unwrap_or(self.scores.len());
        self.scores.insert(pos, score);
        self.scores.truncate(self.capacity);
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<f64> {
        self.scores.first().copied()
    }
}

fn score_to_json(score: f64) -> Option<Value> {
    if score.fract() == 0.0 && score < u64::MAX as f64 {
        Some(Value::from(score as u64))
    } else {
        serde_json::Number::from_f64(score).map(Value::Number)
    }
}

/// Leaderboard persistence over a key-value backend.
///
/// Never fails: read problems load as an empty board and write problems are
/// logged and dropped.
pub struct ScoreStore<S: KeyValueStore> {
    backend: S,
    capacity: usize,
}

impl<S: KeyValueStore> ScoreStore<S> {
    /// Store keeping the top 3 scores
    pub fn new(backend: S) -> Self {
        Self::with_capacity(backend, MAX_HIGH_SCORES)
    }

    pub fn with_capacity(backend: S, capacity: usize) -> Self {
        Self { backend, capacity }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Load the persisted board
    pub fn load_board(&self) -> ScoreBoard {
        match self.backend.get(STORAGE_KEY) {
            Ok(Some(raw)) => ScoreBoard::parse(&raw, self.capacity),
            Ok(None) => ScoreBoard::new(self.capacity),
            Err(err) => {
                log::warn!("Could not read high scores: {}", err);
                ScoreBoard::new(self.capacity)
            }
        }
    }

    /// Top scores, best first
    pub fn load_top(&self) -> Vec<f64> {
        self.load_board().scores
    }

    /// Add a score and write the board back. Returns the updated board.
    pub fn save(&mut self, score: f64) -> ScoreBoard {
        let mut board = self.load_board();
        board.insert(score);
        match self.backend.set(STORAGE_KEY, &board.to_json()) {
            Ok(()) => log::info!("High scores saved ({} entries)", board.scores.len()),
            Err(err) => log::warn!("Could not save high score {}: {}", score, err),
        }
        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;
    use proptest::prelude::*;

    #[test]
    fn test_load_overfull_list() {
        let backend = MemoryStore::new();
        backend.insert_raw(STORAGE_KEY, "[12, 5, 30, 7]");
        let store = ScoreStore::new(backend);
        assert_eq!(store.load_top(), vec![30.0, 12.0, 7.0]);
    }

    #[test]
    fn test_load_missing_or_malformed() {
        let backend = MemoryStore::new();
        let store = ScoreStore::new(backend.clone());
        assert!(store.load_top().is_empty());

        for raw in ["not json", "{\"a\": 1}", "42", "\"[1,2]\"", "null"] {
            backend.insert_raw(STORAGE_KEY, raw);
            assert!(store.load_top().is_empty(), "raw = {raw}");
        }
    }

    #[test]
    fn test_load_filters_bad_elements() {
        let backend = MemoryStore::new();
        backend.insert_raw(STORAGE_KEY, r#"[4, "9", -3, null, 2.5, true, 8]"#);
        let store = ScoreStore::new(backend);
        assert_eq!(store.load_top(), vec![8.0, 4.0, 2.5]);
    }

    #[test]
    fn test_save_appends_and_truncates() {
        let backend = MemoryStore::new();
        let mut store = ScoreStore::new(backend.clone());
        store.save(5.0);
        store.save(12.0);
        store.save(1.0);
        store.save(7.0);
        assert_eq!(store.load_top(), vec![12.0, 7.0, 5.0]);
        assert_eq!(backend.raw(STORAGE_KEY).as_deref(), Some("[12,7,5]"));
    }

    #[test]
    fn test_save_while_offline_is_harmless() {
        let backend = MemoryStore::new();
        let mut store = ScoreStore::new(backend.clone());
        store.save(9.0);

        backend.set_offline(true);
        store.save(20.0);
        assert!(store.load_top().is_empty());

        backend.set_offline(false);
        assert_eq!(store.load_top(), vec![9.0]);
    }

    #[test]
    fn test_save_rejects_invalid_scores() {
        let mut store = ScoreStore::new(MemoryStore::new());
        store.save(f64::NAN);
        store.save(-1.0);
        store.save(f64::INFINITY);
        assert!(store.load_top().is_empty());
    }

    #[test]
    fn test_resave_is_idempotent() {
        let mut store = ScoreStore::new(MemoryStore::new());
        for s in [10.0, 20.0, 30.0] {
            store.save(s);
        }
        let before = store.load_top();
        store.save(10.0);
        assert_eq!(store.load_top(), before);
    }

    #[test]
    fn test_fractional_scores_survive() {
        let board = ScoreBoard::from_values([2.5, 10.0], 3);
        assert_eq!(board.to_json(), "[10,2.5]");
        assert_eq!(ScoreBoard::parse(&board.to_json(), 3), board);
    }

    #[test]
    fn test_large_scores_round_trip_exactly() {
        let board = ScoreBoard::from_values([9.181660656625359e285, 1.0e20, 0.1], 3);
        let parsed = ScoreBoard::parse(&board.to_json(), 3);
        assert_eq!(parsed.scores(), &[9.181660656625359e285, 1.0e20, 0.1]);
    }

    #[test]
    fn test_qualifies_and_rank() {
        let board = ScoreBoard::from_values([30.0, 12.0, 7.0], 3);
        assert!(!board.qualifies(0.0));
        assert!(!board.qualifies(7.0));
        assert!(board.qualifies(8.0));
        assert_eq!(board.potential_rank(31.0), Some(1));
        assert_eq!(board.potential_rank(12.5), Some(2));
        assert_eq!(board.potential_rank(8.0), Some(3));
        assert_eq!(board.potential_rank(3.0), None);

        let board = ScoreBoard::new(3);
        assert_eq!(board.potential_rank(1.0), Some(1));
        assert_eq!(board.top_score(), None);
    }

    proptest! {
        #[test]
        fn board_invariants_hold(
            prior in prop::collection::vec(prop::num::f64::ANY, 0..8),
            saves in prop::collection::vec(prop::num::f64::ANY, 0..12),
        ) {
            let backend = MemoryStore::new();
            let seed = ScoreBoard::from_values(prior.iter().copied(), 10);
            backend.insert_raw(STORAGE_KEY, &seed.to_json());
            let mut store = ScoreStore::new(backend);

            let mut valid: Vec<f64> = prior
                .iter()
                .chain(saves.iter())
                .copied()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .collect();
            valid.sort_by(|a, b| b.total_cmp(a));
            valid.truncate(3);

            for s in &saves {
                store.save(*s);
            }
            let top = store.load_top();

            prop_assert!(top.len() <= 3);
            prop_assert!(top.iter().all(|v| v.is_finite() && *v >= 0.0));
            prop_assert!(top.windows(2).all(|w| w[0] >= w[1]));
            prop_assert_eq!(top, valid);
        }
    }
}
