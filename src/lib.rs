//! PulseCheck - On-device scoring engine for burnout self-tracking check-ins
//!
//! PulseCheck turns short daily check-in answers and passive behavior
//! signals into a bounded risk score, a categorical level, calendar heatmap
//! tiers, and short pattern insights, through a deterministic pipeline:
//! question selection → response capture → risk scoring → insight
//! generation, with history aggregation feeding the calendar views.
//!
//! ## Modules
//!
//! - **questions / checkin / signals**: capture the day's inputs
//! - **scorer / insights**: fold inputs into records and observations
//! - **history**: bucket records into calendar and heatmap views
//! - **remote**: the narrow boundary to network/storage collaborators

pub mod checkin;
pub mod engine;
pub mod error;
pub mod history;
pub mod insights;
pub mod questions;
pub mod remote;
pub mod scorer;
pub mod signals;
pub mod types;

pub use checkin::{CheckInSession, ResponseStore, SessionState};
pub use engine::{encode_record_json, score_checkin, WellnessEngine};
pub use error::EngineError;
pub use history::{HistoryAggregator, MonthCursor, WeekRow, WeekWindow};
pub use insights::{InsightConfig, InsightGenerator};
pub use questions::{daily_seed, QuestionBank, DEFAULT_DAILY_COUNT};
pub use remote::{NullApi, RemoteStatus, WellnessApi};
pub use scorer::{RiskScorer, ScorerConfig};
pub use signals::SignalCollector;
pub use types::{
    Answer, BehaviorSignal, Category, DailyResponse, DailyRiskRecord, HeatmapTier, HeatmapTile,
    Question, RiskLevel, SignalKind, UserContext,
};

/// Engine version embedded in serialized record payloads
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for serialized record payloads
pub const PRODUCER_NAME: &str = "pulsecheck";
