//! Passive behavioral signal collection
//!
//! Signals are write-only from the session's perspective; aggregation
//! happens only in the scorer.

use crate::types::{BehaviorSignal, SignalKind};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Append-only store of behavioral signals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalCollector {
    signals: Vec<BehaviorSignal>,
}

impl SignalCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a signal observed now
    pub fn track(&mut self, kind: SignalKind, value: f64) {
        self.track_at(kind, value, Utc::now());
    }

    /// Append a signal with an explicit timestamp (late-arriving data)
    pub fn track_at(&mut self, kind: SignalKind, value: f64, recorded_at: DateTime<Utc>) {
        self.signals.push(BehaviorSignal {
            kind,
            value,
            recorded_at,
        });
    }

    pub fn all(&self) -> &[BehaviorSignal] {
        &self.signals
    }

    /// Signals recorded on a given calendar day (UTC)
    pub fn signals_for(&self, date: NaiveDate) -> Vec<BehaviorSignal> {
        self.signals
            .iter()
            .filter(|s| s.recorded_at.date_naive() == date)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}
