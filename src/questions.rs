//! Daily question selection
//!
//! The question bank holds the check-in catalog and draws a small daily
//! subset. The draw is seeded from (date, user) so a reload mid-session
//! presents the same questions, and no category repeats within a day's
//! selection while enough distinct categories remain.

use crate::error::EngineError;
use crate::types::{Category, Question, UserContext};
use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;

/// Default number of questions presented per day
pub const DEFAULT_DAILY_COUNT: usize = 2;

/// Catalog of check-in questions plus the daily selection logic
#[derive(Debug, Clone)]
pub struct QuestionBank {
    pool: Vec<Question>,
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::new(default_catalog())
    }
}

impl QuestionBank {
    /// Create a bank over an explicit pool
    pub fn new(pool: Vec<Question>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &[Question] {
        &self.pool
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.pool.iter().find(|q| q.id == id)
    }

    /// Select `count` questions for the day identified by `seed`.
    ///
    /// The draw is an unbiased seeded shuffle without replacement; the same
    /// seed always yields the same ordered selection. No category repeats
    /// while the pool offers at least `count` distinct categories. Returns
    /// `min(count, pool size)` questions, or `EmptyPool` if the catalog is
    /// empty.
    pub fn select_daily(&self, count: usize, seed: u64) -> Result<Vec<Question>, EngineError> {
        if self.pool.is_empty() {
            return Err(EngineError::EmptyPool);
        }

        let mut shuffled: Vec<&Question> = self.pool.iter().collect();
        let mut rng = StdRng::seed_from_u64(seed);
        shuffled.shuffle(&mut rng);

        let distinct_categories: HashSet<Category> =
            self.pool.iter().map(|q| q.category).collect();
        let enforce_fairness = distinct_categories.len() >= count;

        let mut selected: Vec<Question> = Vec::with_capacity(count.min(shuffled.len()));
        let mut used_categories: HashSet<Category> = HashSet::new();
        let mut leftovers: Vec<&Question> = Vec::new();

        for q in &shuffled {
            if selected.len() == count {
                break;
            }
            if enforce_fairness && used_categories.contains(&q.category) {
                leftovers.push(*q);
                continue;
            }
            used_categories.insert(q.category);
            selected.push((*q).clone());
        }

        // With fairness enforced we may still owe questions once the
        // distinct categories run out; fill from the shuffled leftovers.
        for q in leftovers {
            if selected.len() == count.min(self.pool.len()) {
                break;
            }
            selected.push(q.clone());
        }

        Ok(selected)
    }
}

/// Derive a stable per-day, per-user seed for the daily draw.
///
/// The same (date, user) pair always maps to the same seed, so a client
/// reload mid-session sees the same questions. FNV-1a with its fixed
/// constants keeps the mapping durable across builds and Rust releases,
/// which `DefaultHasher` does not promise.
pub fn daily_seed(date: NaiveDate, user: &UserContext) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = FNV_OFFSET;
    for byte in date
        .num_days_from_ce()
        .to_le_bytes()
        .iter()
        .chain(user.username.as_bytes())
    {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Built-in check-in catalog
pub fn default_catalog() -> Vec<Question> {
    vec![
        Question::new(
            "s1",
            Category::Sleep,
            "How refreshed did you feel after waking up?",
        ),
        Question::new(
            "s2",
            Category::Sleep,
            "Did you find it hard to get out of bed today?",
        ),
        Question::new(
            "f1",
            Category::Focus,
            "How easy was it to focus on one task today?",
        ),
        Question::new(
            "f2",
            Category::Focus,
            "Did you find yourself switching tasks often?",
        ),
        Question::new(
            "m1",
            Category::Mood,
            "Did you feel mentally tired before noon today?",
        ),
        Question::new(
            "m2",
            Category::Mood,
            "How would you describe your overall mood?",
        ),
        Question::new(
            "e1",
            Category::Energy,
            "Did screens feel exhausting today?",
        ),
        Question::new(
            "e2",
            Category::Energy,
            "Do you feel like doing a hobby this evening?",
        ),
        Question::new(
            "st1",
            Category::Stress,
            "How overwhelmed did you feel today?",
        ),
        Question::new(
            "sf1",
            Category::ScreenFatigue,
            "Did your eyes feel strained after screen time today?",
        ),
    ]
}
