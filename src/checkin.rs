//! Check-in session state
//!
//! A check-in presents the day's selected questions one at a time. The
//! response store is the local source of truth: each accepted answer is
//! forwarded to the remote collaborator fire-and-forget, and the flow
//! advances on local acceptance regardless of submission outcome.
//!
//! The session is an explicit finite-state machine: `Presenting(i)` until
//! every question has been answered or skipped, then `Complete`. Abandoning
//! a session (dropping it) discards partial state; no partial record is
//! ever promoted to a daily risk record.

use crate::error::EngineError;
use crate::remote::WellnessApi;
use crate::types::{Answer, DailyResponse, Question, UserContext};
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// Day-scoped mapping of question -> answer
#[derive(Debug, Clone)]
pub struct ResponseStore {
    date: NaiveDate,
    questions: Vec<Question>,
    answers: HashMap<String, Answer>,
}

impl ResponseStore {
    /// Create a store scoped to one day's selection
    pub fn new(date: NaiveDate, questions: Vec<Question>) -> Self {
        Self {
            date,
            questions,
            answers: HashMap::new(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    fn question(&self, question_id: &str) -> Result<&Question, EngineError> {
        self.questions
            .iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| EngineError::UnknownQuestion(question_id.to_string()))
    }

    /// Record an answer value for a selected question.
    ///
    /// Rejects values outside 1..=5 and question ids outside the day's
    /// selection; invalid input is never clamped.
    pub fn record(&mut self, question_id: &str, answer_value: u8) -> Result<(), EngineError> {
        self.question(question_id)?;
        if !(1..=5).contains(&answer_value) {
            return Err(EngineError::InvalidAnswer {
                question_id: question_id.to_string(),
                value: answer_value,
            });
        }
        self.answers
            .insert(question_id.to_string(), Answer::Value(answer_value));
        Ok(())
    }

    /// Record an explicit skip. Skips never enter score averaging.
    pub fn skip(&mut self, question_id: &str) -> Result<(), EngineError> {
        self.question(question_id)?;
        self.answers
            .insert(question_id.to_string(), Answer::Skipped);
        Ok(())
    }

    /// True once every selected question has an answer or an explicit skip
    pub fn is_complete(&self) -> bool {
        self.questions
            .iter()
            .all(|q| self.answers.contains_key(&q.id))
    }

    /// Answered responses only; skipped questions are excluded entirely
    pub fn responses(&self) -> Vec<DailyResponse> {
        self.questions
            .iter()
            .filter_map(|q| {
                let value = self.answers.get(&q.id)?.value()?;
                Some(DailyResponse {
                    question_id: q.id.clone(),
                    category: q.category,
                    answer_value: value,
                    recorded_at: Utc::now(),
                })
            })
            .collect()
    }
}

/// Session progression state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Presenting question at this index
    Presenting(usize),
    Complete,
}

/// One user's check-in flow for one day
#[derive(Debug)]
pub struct CheckInSession {
    pub id: Uuid,
    pub user: UserContext,
    store: ResponseStore,
    state: SessionState,
}

impl CheckInSession {
    pub fn new(user: UserContext, date: NaiveDate, questions: Vec<Question>) -> Self {
        let state = if questions.is_empty() {
            SessionState::Complete
        } else {
            SessionState::Presenting(0)
        };
        Self {
            id: Uuid::new_v4(),
            user,
            store: ResponseStore::new(date, questions),
            state,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn date(&self) -> NaiveDate {
        self.store.date()
    }

    /// The question currently being presented, if any
    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            SessionState::Presenting(i) => self.store.questions().get(i),
            SessionState::Complete => None,
        }
    }

    fn advance(&mut self) {
        if let SessionState::Presenting(i) = self.state {
            let next = i + 1;
            self.state = if next < self.store.questions().len() {
                SessionState::Presenting(next)
            } else {
                SessionState::Complete
            };
        }
    }

    /// Answer the current question and advance.
    ///
    /// Local state is the source of truth: the answer is forwarded to the
    /// collaborator fire-and-forget, and a failed submission is logged as a
    /// non-fatal notice without blocking progression.
    pub fn answer(&mut self, value: u8, api: &dyn WellnessApi) -> Result<SessionState, EngineError> {
        let question_id = self
            .current_question()
            .map(|q| q.id.clone())
            .ok_or_else(|| EngineError::InsufficientData("session already complete".into()))?;

        self.store.record(&question_id, value)?;

        if let Err(e) = api.submit_response(&question_id, value) {
            log::warn!("response submission for '{question_id}' failed, continuing locally: {e}");
        }

        self.advance();
        Ok(self.state)
    }

    /// Skip the current question and advance
    pub fn skip(&mut self) -> Result<SessionState, EngineError> {
        let question_id = self
            .current_question()
            .map(|q| q.id.clone())
            .ok_or_else(|| EngineError::InsufficientData("session already complete".into()))?;

        self.store.skip(&question_id)?;
        self.advance();
        Ok(self.state)
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }

    /// Emit the completed response set. Errors while questions remain.
    pub fn finish(self) -> Result<Vec<DailyResponse>, EngineError> {
        if !self.is_complete() {
            return Err(EngineError::InsufficientData(
                "check-in session still has unanswered questions".into(),
            ));
        }
        Ok(self.store.responses())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{FailingApi, InMemoryApi};
    use crate::types::Category;
    use pretty_assertions::assert_eq;

    fn questions() -> Vec<Question> {
        vec![
            Question::new("s1", Category::Sleep, "How refreshed did you feel?"),
            Question::new("f1", Category::Focus, "How easy was it to focus?"),
        ]
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_record_rejects_out_of_range() {
        let mut store = ResponseStore::new(date(), questions());
        assert!(matches!(
            store.record("s1", 0),
            Err(EngineError::InvalidAnswer { .. })
        ));
        assert!(matches!(
            store.record("s1", 6),
            Err(EngineError::InvalidAnswer { .. })
        ));
        assert!(store.record("s1", 5).is_ok());
    }

    #[test]
    fn test_record_rejects_unknown_question() {
        let mut store = ResponseStore::new(date(), questions());
        assert!(matches!(
            store.record("zz", 3),
            Err(EngineError::UnknownQuestion(_))
        ));
    }

    #[test]
    fn test_complete_with_skip() {
        let mut store = ResponseStore::new(date(), questions());
        assert!(!store.is_complete());
        store.record("s1", 2).unwrap();
        assert!(!store.is_complete());
        store.skip("f1").unwrap();
        assert!(store.is_complete());

        // Skipped question is excluded, not treated as value 0
        let responses = store.responses();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].question_id, "s1");
    }

    #[test]
    fn test_session_walks_to_complete() {
        let api = InMemoryApi::default();
        let mut session = CheckInSession::new(UserContext::new("ada"), date(), questions());

        assert_eq!(session.state(), SessionState::Presenting(0));
        assert_eq!(session.current_question().unwrap().id, "s1");

        let state = session.answer(2, &api).unwrap();
        assert_eq!(state, SessionState::Presenting(1));

        let state = session.skip().unwrap();
        assert_eq!(state, SessionState::Complete);
        assert!(session.current_question().is_none());

        let responses = session.finish().unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(api.submitted_responses(), vec![("s1".to_string(), 2)]);
    }

    #[test]
    fn test_session_advances_despite_transport_failure() {
        let api = FailingApi;
        let mut session = CheckInSession::new(UserContext::new("ada"), date(), questions());

        // Submission fails, local flow still advances
        let state = session.answer(4, &api).unwrap();
        assert_eq!(state, SessionState::Presenting(1));
        session.answer(1, &api).unwrap();

        let responses = session.finish().unwrap();
        assert_eq!(responses.len(), 2);
    }

    #[test]
    fn test_finish_rejects_partial_session() {
        let api = InMemoryApi::default();
        let mut session = CheckInSession::new(UserContext::new("ada"), date(), questions());
        session.answer(3, &api).unwrap();
        assert!(session.finish().is_err());
    }

    #[test]
    fn test_answer_after_complete_errors() {
        let api = InMemoryApi::default();
        let mut session = CheckInSession::new(UserContext::new("ada"), date(), vec![]);
        assert!(session.is_complete());
        assert!(session.answer(3, &api).is_err());
    }
}
