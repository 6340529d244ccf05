//! Inspection store
//!
//! Bounded, newest-first history of inspections. Inserts go to the head;
//! once the store holds more than its capacity, the oldest entries are
//! evicted from the tail.

use chrono::Utc;
use cleancheck_common::Inspection;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Number of inspections retained
pub const HISTORY_CAPACITY: usize = 50;

/// Inspection store errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InspectionError {
    #[error("Inspection not found: {0}")]
    NotFound(String),

    #[error("Invalid score: {0} (expected a number between 0 and 100)")]
    InvalidScore(String),

    #[error("Summary must be a non-empty string")]
    InvalidSummary,
}

/// Which records a reader may see
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryFilter {
    All,
    ByOwner(String),
}

impl HistoryFilter {
    fn matches(&self, inspection: &Inspection) -> bool {
        match self {
            HistoryFilter::All => true,
            HistoryFilter::ByOwner(username) => inspection.user_id == *username,
        }
    }
}

/// Process-wide inspection history, cheap to clone
#[derive(Clone)]
pub struct InspectionStore {
    records: Arc<RwLock<VecDeque<Inspection>>>,
    capacity: usize,
}

impl Default for InspectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InspectionStore {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Arc::new(RwLock::new(VecDeque::with_capacity(capacity + 1))),
            capacity,
        }
    }

    /// Insert at the head; returns how many old records were evicted
    pub async fn insert(&self, inspection: Inspection) -> usize {
        let mut records = self.records.write().await;
        records.push_front(inspection);

        let mut evicted = 0;
        while records.len() > self.capacity {
            records.pop_back();
            evicted += 1;
        }
        evicted
    }

    /// Newest-first list of visible records, optionally truncated
    pub async fn list(&self, filter: &HistoryFilter, limit: Option<usize>) -> Vec<Inspection> {
        self.records
            .read()
            .await
            .iter()
            .filter(|inspection| filter.matches(inspection))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    pub async fn find(&self, id: Uuid) -> Option<Inspection> {
        self.records
            .read()
            .await
            .iter()
            .find(|inspection| inspection.id == id)
            .cloned()
    }

    /// Remove a record; ownership checks are the caller's job
    pub async fn delete(&self, id: Uuid) -> Result<Inspection, InspectionError> {
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|inspection| inspection.id == id)
            .ok_or_else(|| InspectionError::NotFound(id.to_string()))?;

        records
            .remove(index)
            .ok_or_else(|| InspectionError::NotFound(id.to_string()))
    }

    /// Replace the assessment summary and stamp `updated_at`
    pub async fn update_summary(
        &self,
        id: Uuid,
        summary: &str,
    ) -> Result<Inspection, InspectionError> {
        let summary = summary.trim();
        if summary.is_empty() {
            return Err(InspectionError::InvalidSummary);
        }

        self.modify(id, |inspection| {
            inspection.assessment.summary = summary.to_string();
        })
        .await
    }

    /// Replace the overall score, recompute the quality band, stamp `updated_at`
    pub async fn update_score(&self, id: Uuid, score: u8) -> Result<Inspection, InspectionError> {
        if score > 100 {
            return Err(InspectionError::InvalidScore(score.to_string()));
        }

        self.modify(id, |inspection| inspection.assessment.rescore(score))
            .await
    }

    async fn modify<F>(&self, id: Uuid, apply: F) -> Result<Inspection, InspectionError>
    where
        F: FnOnce(&mut Inspection),
    {
        let mut records = self.records.write().await;
        let inspection = records
            .iter_mut()
            .find(|inspection| inspection.id == id)
            .ok_or_else(|| InspectionError::NotFound(id.to_string()))?;

        apply(inspection);
        inspection.updated_at = Some(Utc::now());
        Ok(inspection.clone())
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

/// Validate a client-supplied score
///
/// Accepts a JSON number or a numeric string in 0..=100; fractional values
/// are rounded.
pub fn parse_score(value: &Value) -> Result<u8, InspectionError> {
    let invalid = || InspectionError::InvalidScore(value.to_string());

    let number = match value {
        Value::Number(n) => n.as_f64().ok_or_else(invalid)?,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };

    if !number.is_finite() || !(0.0..=100.0).contains(&number) {
        return Err(invalid());
    }

    Ok(number.round() as u8)
}
