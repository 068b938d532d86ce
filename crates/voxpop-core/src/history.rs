//! Append-only history of completed research runs.

use crate::error::{Result, VoxError};
use crate::project::ProjectInfo;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

/// A snapshot of one completed (or partially completed) research run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    /// Timestamp when the record was saved (ISO 8601 format).
    pub timestamp: String,
    pub project: Option<ProjectInfo>,
    pub initial_analysis: Option<String>,
    pub final_analysis: Option<String>,
    pub hypothesis: Option<String>,
    pub persona_names: Vec<String>,
}

/// Compact listing entry for the history index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub id: String,
    pub timestamp: String,
    pub topic: Option<String>,
    pub persona_names: Vec<String>,
}

/// In-process append-only log of history records.
///
/// Records are never mutated or deleted; listing returns newest first.
#[derive(Default)]
pub struct HistoryLog {
    records: RwLock<Vec<HistoryRecord>>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record, assigning it a fresh opaque id.
    pub async fn record(
        &self,
        project: Option<ProjectInfo>,
        initial_analysis: Option<String>,
        final_analysis: Option<String>,
        hypothesis: Option<String>,
        persona_names: Vec<String>,
    ) -> String {
        let record = HistoryRecord {
            id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            project,
            initial_analysis,
            final_analysis,
            hypothesis,
            persona_names,
        };
        let id = record.id.clone();
        self.records.write().await.push(record);
        tracing::info!(target: "history", id = %id, "history record saved");
        id
    }

    /// Lists saved records, newest first.
    pub async fn list(&self) -> Vec<HistorySummary> {
        self.records
            .read()
            .await
            .iter()
            .rev()
            .map(|record| HistorySummary {
                id: record.id.clone(),
                timestamp: record.timestamp.clone(),
                topic: record.project.as_ref().map(|p| p.topic.clone()),
                persona_names: record.persona_names.clone(),
            })
            .collect()
    }

    /// Fetches one record by id.
    pub async fn detail(&self, id: &str) -> Result<HistoryRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or_else(|| VoxError::not_found("history record", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_are_listed_newest_first() {
        let log = HistoryLog::new();
        let first = log
            .record(
                Some(ProjectInfo::with_topic("coffee")),
                Some("initial".into()),
                None,
                None,
                vec!["Maya".into()],
            )
            .await;
        let second = log
            .record(Some(ProjectInfo::with_topic("tea")), None, None, None, vec![])
            .await;

        let listing = log.list().await;
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].id, second);
        assert_eq!(listing[1].id, first);
        assert_eq!(listing[1].topic.as_deref(), Some("coffee"));
    }

    #[tokio::test]
    async fn detail_returns_the_full_record_or_not_found() {
        let log = HistoryLog::new();
        let id = log
            .record(None, None, Some("final report".into()), None, vec![])
            .await;

        let record = log.detail(&id).await.unwrap();
        assert_eq!(record.final_analysis.as_deref(), Some("final report"));

        let err = log.detail("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
