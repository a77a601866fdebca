//! External collaborator boundary
//!
//! The engine talks to its network/storage collaborators through this
//! narrow trait. Transport, retries, and auth token storage live behind it;
//! the engine only sees success or `EngineError::Transport`. No failure on
//! this boundary is ever papered over with fabricated data.

use crate::error::EngineError;
use crate::types::{DailyRiskRecord, Question, RiskLevel, SignalKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Dashboard status as computed by a remote scoring path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteStatus {
    pub date: NaiveDate,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub insights: Vec<String>,
}

impl RemoteStatus {
    /// Treat a remote status as an already-computed daily risk record.
    ///
    /// The level is re-derived from the score through the one shared
    /// threshold mapping so the local and remote scoring paths cannot
    /// disagree; a mismatch in the remote payload is logged.
    pub fn into_record(self) -> DailyRiskRecord {
        let derived = RiskLevel::from_score(self.risk_score);
        if derived != self.risk_level {
            log::warn!(
                "remote risk level {} disagrees with score {:.1}, using {}",
                self.risk_level.as_str(),
                self.risk_score,
                derived.as_str()
            );
        }
        DailyRiskRecord {
            date: self.date,
            risk_score: self.risk_score,
            risk_level: derived,
            insights: self.insights,
        }
    }
}

/// Boundary contract with the remote wellness service
pub trait WellnessApi {
    /// Fetch today's question selection from the server
    fn fetch_daily_questions(&self) -> Result<Vec<Question>, EngineError>;

    /// Submit one answer (fire-and-forget from the session's perspective)
    fn submit_response(&self, question_id: &str, answer_value: u8) -> Result<(), EngineError>;

    /// Report a passive behavior signal (fire-and-forget)
    fn track_signal(&self, kind: SignalKind, value: f64) -> Result<(), EngineError>;

    /// Fetch the server-side risk analysis for the dashboard
    fn fetch_dashboard_status(&self) -> Result<RemoteStatus, EngineError>;
}

/// Always-offline collaborator. Fetches fail with a transport error and
/// submissions are dropped, which the fire-and-forget paths tolerate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullApi;

impl WellnessApi for NullApi {
    fn fetch_daily_questions(&self) -> Result<Vec<Question>, EngineError> {
        Err(EngineError::Transport("offline".into()))
    }

    fn submit_response(&self, _question_id: &str, _answer_value: u8) -> Result<(), EngineError> {
        Ok(())
    }

    fn track_signal(&self, _kind: SignalKind, _value: f64) -> Result<(), EngineError> {
        Ok(())
    }

    fn fetch_dashboard_status(&self) -> Result<RemoteStatus, EngineError> {
        Err(EngineError::Transport("offline".into()))
    }
}

/// In-memory collaborator recording what was sent, for tests
#[derive(Debug, Default)]
pub struct InMemoryApi {
    responses: std::sync::Mutex<Vec<(String, u8)>>,
    signals: std::sync::Mutex<Vec<(SignalKind, f64)>>,
    pub questions: Vec<Question>,
    pub status: Option<RemoteStatus>,
}

impl InMemoryApi {
    pub fn submitted_responses(&self) -> Vec<(String, u8)> {
        self.responses.lock().expect("lock poisoned").clone()
    }

    pub fn tracked_signals(&self) -> Vec<(SignalKind, f64)> {
        self.signals.lock().expect("lock poisoned").clone()
    }
}

impl WellnessApi for InMemoryApi {
    fn fetch_daily_questions(&self) -> Result<Vec<Question>, EngineError> {
        Ok(self.questions.clone())
    }

    fn submit_response(&self, question_id: &str, answer_value: u8) -> Result<(), EngineError> {
        self.responses
            .lock()
            .expect("lock poisoned")
            .push((question_id.to_string(), answer_value));
        Ok(())
    }

    fn track_signal(&self, kind: SignalKind, value: f64) -> Result<(), EngineError> {
        self.signals
            .lock()
            .expect("lock poisoned")
            .push((kind, value));
        Ok(())
    }

    fn fetch_dashboard_status(&self) -> Result<RemoteStatus, EngineError> {
        self.status
            .clone()
            .ok_or_else(|| EngineError::Transport("no status configured".into()))
    }
}

/// Collaborator whose every call fails, for exercising degraded paths
#[derive(Debug, Clone, Copy)]
pub struct FailingApi;

impl WellnessApi for FailingApi {
    fn fetch_daily_questions(&self) -> Result<Vec<Question>, EngineError> {
        Err(EngineError::Transport("connection refused".into()))
    }

    fn submit_response(&self, _question_id: &str, _answer_value: u8) -> Result<(), EngineError> {
        Err(EngineError::Transport("connection refused".into()))
    }

    fn track_signal(&self, _kind: SignalKind, _value: f64) -> Result<(), EngineError> {
        Err(EngineError::Transport("connection refused".into()))
    }

    fn fetch_dashboard_status(&self) -> Result<RemoteStatus, EngineError> {
        Err(EngineError::Transport("connection refused".into()))
    }
}
