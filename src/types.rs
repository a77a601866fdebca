//! Core types for the PulseCheck engine
//!
//! This module defines the data that flows through the engine: check-in
//! questions and answers, passive behavior signals, daily risk records, and
//! the heatmap tiles derived from them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Question category for the daily check-in catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Sleep,
    Focus,
    Mood,
    Energy,
    Stress,
    ScreenFatigue,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sleep => "sleep",
            Category::Focus => "focus",
            Category::Mood => "mood",
            Category::Energy => "energy",
            Category::Stress => "stress",
            Category::ScreenFatigue => "screen_fatigue",
        }
    }
}

/// A check-in question. Immutable once defined; owned by the question bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Stable identifier (e.g., "s1")
    pub id: String,
    pub category: Category,
    /// Prompt text shown to the user
    pub text: String,
}

impl Question {
    pub fn new(id: &str, category: Category, text: &str) -> Self {
        Self {
            id: id.to_string(),
            category,
            text: text.to_string(),
        }
    }
}

/// An answer to a single question: a 1-5 value or an explicit skip.
///
/// Skips are a sentinel and must never enter score averaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Value(u8),
    Skipped,
}

impl Answer {
    /// The numeric value, if this answer was not skipped
    pub fn value(&self) -> Option<u8> {
        match self {
            Answer::Value(v) => Some(*v),
            Answer::Skipped => None,
        }
    }
}

/// A recorded answer to one question on one day. Never mutated after
/// creation; only superseded by a new day's set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyResponse {
    pub question_id: String,
    pub category: Category,
    /// Answer value in 1..=5 (1 = best state, 5 = worst)
    pub answer_value: u8,
    pub recorded_at: DateTime<Utc>,
}

/// Passive behavioral signal kinds captured from app usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    AppOpen,
    /// Time taken to answer, in seconds
    ResponseDelay,
    /// Usage between midnight and 5 AM
    LateNightUsage,
    /// Explicitly missed a day
    MissedCheckin,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::AppOpen => "app_open",
            SignalKind::ResponseDelay => "response_delay",
            SignalKind::LateNightUsage => "late_night_usage",
            SignalKind::MissedCheckin => "missed_checkin",
        }
    }
}

/// A single behavioral signal observation. Append-only; multiple per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorSignal {
    #[serde(rename = "type")]
    pub kind: SignalKind,
    /// Numeric magnitude (delay in seconds, or 1.0 for an occurrence)
    pub value: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Categorical risk classification derived from the 0-100 risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Fixed thresholds: Low <= 33, Medium 34-66, High >= 67.
    ///
    /// This is the single classification path; remote-sourced scores are
    /// re-derived through it so both scoring paths agree.
    pub fn from_score(score: f64) -> Self {
        if score <= 33.0 {
            RiskLevel::Low
        } else if score <= 66.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

/// One user's risk analysis for one day.
///
/// Recomputable until the day closes; recomputation on identical inputs is
/// idempotent. Once the day closes the record is read-only history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRiskRecord {
    pub date: NaiveDate,
    /// Risk score in 0-100; higher = more burnout risk
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    /// Ordered observations, rule priority first
    pub insights: Vec<String>,
}

impl DailyRiskRecord {
    /// Inverse view of the risk score (higher = better), used for heatmap
    /// tiers and trend insights.
    pub fn wellness_score(&self) -> f64 {
        100.0 - self.risk_score
    }
}

/// Five-tier color bucket for calendar/heatmap cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatmapTier {
    Excellent,
    Good,
    Fair,
    Low,
    Critical,
    /// Missing day; never interpolated into a numeric tier
    NoData,
}

impl HeatmapTier {
    /// Bucket a wellness score (0-100, higher = better) into a tier.
    ///
    /// Boundaries are exact: 80 => Excellent, 79 => Good, and so on down
    /// through [80+, 60-79, 40-59, 20-39, <20].
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            HeatmapTier::Excellent
        } else if score >= 60.0 {
            HeatmapTier::Good
        } else if score >= 40.0 {
            HeatmapTier::Fair
        } else if score >= 20.0 {
            HeatmapTier::Low
        } else {
            HeatmapTier::Critical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HeatmapTier::Excellent => "Excellent",
            HeatmapTier::Good => "Good",
            HeatmapTier::Fair => "Fair",
            HeatmapTier::Low => "Low",
            HeatmapTier::Critical => "Critical",
            HeatmapTier::NoData => "No data",
        }
    }
}

/// Derived, non-persistent calendar cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapTile {
    pub date: NaiveDate,
    pub tier: HeatmapTier,
    /// Wellness score behind the tier, absent for NoData tiles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl HeatmapTile {
    /// Build a tile for a day, from its record if one exists
    pub fn for_day(date: NaiveDate, record: Option<&DailyRiskRecord>) -> Self {
        match record {
            Some(rec) => {
                let score = rec.wellness_score();
                Self {
                    date,
                    tier: HeatmapTier::from_score(score),
                    score: Some(score),
                }
            }
            None => Self {
                date,
                tier: HeatmapTier::NoData,
                score: None,
            },
        }
    }
}

/// Read-only identity attributing records to a user.
///
/// Passed explicitly into the engine; authentication and token storage are
/// a collaborator's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub username: String,
}

impl UserContext {
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
        }
    }
}
