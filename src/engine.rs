//! Engine orchestration
//!
//! This module provides the public API for the PulseCheck engine. It wires
//! the question bank, signal collector, scorer, insight generator, and
//! history aggregation into one session-scoped engine, and offers a
//! stateless one-shot scoring entry point for callers that manage their
//! own state.

use crate::checkin::CheckInSession;
use crate::error::EngineError;
use crate::history::{HistoryAggregator, WeekRow, WeekWindow};
use crate::insights::InsightGenerator;
use crate::questions::{daily_seed, QuestionBank, DEFAULT_DAILY_COUNT};
use crate::remote::{RemoteStatus, WellnessApi};
use crate::scorer::RiskScorer;
use crate::signals::SignalCollector;
use crate::types::{
    BehaviorSignal, DailyResponse, DailyRiskRecord, HeatmapTile, Question, SignalKind, UserContext,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Score one day's frozen inputs with default configuration (stateless).
///
/// # Example
/// ```ignore
/// let record = score_checkin(date, &responses, &signals)?;
/// ```
pub fn score_checkin(
    date: NaiveDate,
    responses: &[DailyResponse],
    signals: &[BehaviorSignal],
) -> Result<DailyRiskRecord, EngineError> {
    RiskScorer::new().score_day(date, responses, signals, &[])
}

/// Producer metadata embedded in serialized record payloads
#[derive(Debug, Clone, Serialize)]
pub struct Producer {
    pub name: &'static str,
    pub version: &'static str,
}

/// JSON envelope for a computed daily record
#[derive(Debug, Clone, Serialize)]
pub struct RecordPayload<'a> {
    pub producer: Producer,
    pub username: &'a str,
    pub computed_at_utc: DateTime<Utc>,
    pub record: &'a DailyRiskRecord,
}

/// Serialize a record with producer provenance
pub fn encode_record_json(
    user: &UserContext,
    record: &DailyRiskRecord,
) -> Result<String, EngineError> {
    let payload = RecordPayload {
        producer: Producer {
            name: crate::PRODUCER_NAME,
            version: crate::ENGINE_VERSION,
        },
        username: &user.username,
        computed_at_utc: Utc::now(),
        record,
    };
    Ok(serde_json::to_string(&payload)?)
}

/// Stateful engine for one user's wellness tracking session.
///
/// Daily record computation is re-entrant: signals or responses arriving
/// after a record was computed are absorbed by calling [`WellnessEngine::recompute`]
/// again, which overwrites the day's record deterministically.
pub struct WellnessEngine {
    user: UserContext,
    bank: QuestionBank,
    collector: SignalCollector,
    scorer: RiskScorer,
    generator: InsightGenerator,
    responses: BTreeMap<NaiveDate, Vec<DailyResponse>>,
    records: BTreeMap<NaiveDate, DailyRiskRecord>,
}

impl WellnessEngine {
    /// Create an engine with the built-in catalog and default scoring
    pub fn new(user: UserContext) -> Self {
        Self::with_parts(user, QuestionBank::default(), RiskScorer::new())
    }

    pub fn with_parts(user: UserContext, bank: QuestionBank, scorer: RiskScorer) -> Self {
        Self {
            user,
            bank,
            collector: SignalCollector::new(),
            scorer,
            generator: InsightGenerator::new(),
            responses: BTreeMap::new(),
            records: BTreeMap::new(),
        }
    }

    pub fn user(&self) -> &UserContext {
        &self.user
    }

    /// The day's selection from the local catalog, stable across reloads
    pub fn daily_questions(&self, date: NaiveDate) -> Result<Vec<Question>, EngineError> {
        self.bank
            .select_daily(DEFAULT_DAILY_COUNT, daily_seed(date, &self.user))
    }

    /// Begin a check-in from the local catalog
    pub fn start_checkin(&self, date: NaiveDate) -> Result<CheckInSession, EngineError> {
        let questions = self.daily_questions(date)?;
        Ok(CheckInSession::new(self.user.clone(), date, questions))
    }

    /// Begin a check-in from the remote question source.
    ///
    /// A transport failure propagates so the caller can present a
    /// "no questions available" state; it is never masked with fabricated
    /// content.
    pub fn start_remote_checkin(
        &self,
        api: &dyn WellnessApi,
        date: NaiveDate,
    ) -> Result<CheckInSession, EngineError> {
        let questions = api.fetch_daily_questions()?;
        Ok(CheckInSession::new(self.user.clone(), date, questions))
    }

    /// Promote a completed session into the day's record.
    ///
    /// An abandoned session is simply dropped instead; its partial store
    /// never reaches this point.
    pub fn complete_checkin(
        &mut self,
        session: CheckInSession,
    ) -> Result<DailyRiskRecord, EngineError> {
        let date = session.date();
        let responses = session.finish()?;
        self.responses.insert(date, responses);
        self.recompute(date)
    }

    /// Record a passive signal observed now
    pub fn track_signal(&mut self, kind: SignalKind, value: f64) {
        self.collector.track(kind, value);
    }

    /// Record a signal with an explicit timestamp (late arrival)
    pub fn track_signal_at(&mut self, kind: SignalKind, value: f64, at: DateTime<Utc>) {
        self.collector.track_at(kind, value, at);
    }

    /// Recompute the day's record from everything known about that day.
    ///
    /// Idempotent on frozen inputs; safe to call again after out-of-order
    /// signal arrival. Overwrites any previous record for the day.
    pub fn recompute(&mut self, date: NaiveDate) -> Result<DailyRiskRecord, EngineError> {
        let responses = self.responses.get(&date).cloned().unwrap_or_default();
        let signals = self.collector.signals_for(date);
        let history: Vec<DailyRiskRecord> = self
            .records
            .values()
            .filter(|r| r.date < date)
            .cloned()
            .collect();

        let record = self
            .scorer
            .score_day(date, &responses, &signals, &history)?;
        self.records.insert(date, record.clone());
        Ok(record)
    }

    /// Adopt a record computed by the remote scoring path. Classification
    /// thresholds are re-applied so both paths agree.
    pub fn adopt_remote_status(&mut self, status: RemoteStatus) -> DailyRiskRecord {
        let record = status.into_record();
        self.records.insert(record.date, record.clone());
        record
    }

    pub fn record_for(&self, date: NaiveDate) -> Option<&DailyRiskRecord> {
        self.records.get(&date)
    }

    /// All records in date order
    pub fn history(&self) -> Vec<DailyRiskRecord> {
        self.records.values().cloned().collect()
    }

    /// Pattern insights over the accumulated history
    pub fn insights(&self) -> Vec<String> {
        let history = self.history();
        self.generator.generate(&history)
    }

    /// Calendar-month tiles for the monthly view
    pub fn month_view(&self, year: i32, month: u32) -> Result<Vec<HeatmapTile>, EngineError> {
        let history = self.history();
        HistoryAggregator::month_tiles(&history, year, month)
    }

    /// Weekly heatmap rows for the last `weeks` weeks ending today
    pub fn weekly_view(&self, today: NaiveDate, weeks: usize) -> Vec<WeekRow> {
        let history = self.history();
        let window = WeekWindow::ending_at(today, weeks);
        HistoryAggregator::week_rows(&history, &window)
    }
}
