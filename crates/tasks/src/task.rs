//! Task records.
//!
//! A [`ScanTask`] is never mutated in place once it is registered: every state
//! change builds a fresh record from the previous one, and the registry swaps
//! the whole record in one step.

use crate::status::TaskStatus;
use derive_more::Display;
use docscan_reader::{DocumentRecord, ScanOutcome, ScanStatistics};
use serde::{Serialize, Serializer};
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

/// Opaque task identifier (random UUID v4).
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);
impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}
impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}
impl FromStr for TaskId {
    type Err = uuid::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// One asynchronous scan request and, eventually, its outcome.
///
/// - `documents` is only present once the task `completed`.
/// - `stats` is present once the task reached either terminal state (empty
///   statistics for a failed task).
/// - `error` is only present once the task `failed`.
/// - `completed_at` is set exactly once, at the terminal transition.
#[derive(Debug, Clone, Serialize)]
pub struct ScanTask {
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub folder_path: String,
    /// Per-file size ceiling this scan runs with.
    pub max_file_size_mb: u32,
    pub documents: Option<Vec<DocumentRecord>>,
    pub stats: Option<ScanStatistics>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    pub error: Option<String>,
}
impl ScanTask {
    pub(crate) fn pending(folder_path: impl Into<String>, max_file_size_mb: u32) -> Self {
        Self {
            task_id: TaskId::new(),
            status: TaskStatus::Pending,
            folder_path: folder_path.into(),
            max_file_size_mb,
            documents: None,
            stats: None,
            created_at: OffsetDateTime::now_utc(),
            completed_at: None,
            error: None,
        }
    }

    pub(crate) fn running(&self) -> Self {
        Self {
            status: TaskStatus::Running,
            ..self.clone()
        }
    }

    pub(crate) fn completed(&self, outcome: ScanOutcome) -> Self {
        Self {
            status: TaskStatus::Completed,
            documents: Some(outcome.documents),
            stats: Some(outcome.stats),
            completed_at: Some(OffsetDateTime::now_utc()),
            error: None,
            ..self.clone()
        }
    }

    pub(crate) fn failed(&self, error: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Failed,
            documents: None,
            stats: Some(ScanStatistics::default()),
            completed_at: Some(OffsetDateTime::now_utc()),
            error: Some(error.into()),
            ..self.clone()
        }
    }

    pub fn document_count(&self) -> usize {
        self.documents.as_ref().map_or(0, Vec::len)
    }

    pub fn total_words(&self) -> u64 {
        self.documents
            .iter()
            .flatten()
            .map(|document| document.word_count)
            .sum()
    }

    /// Listing projection, without any extracted text.
    pub fn summary(&self) -> TaskSummary {
        TaskSummary {
            task_id: self.task_id,
            status: self.status,
            folder_path: self.folder_path.clone(),
            document_count: self.document_count(),
            created_at: self.created_at,
        }
    }
}

/// Cheap view of a task for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub folder_path: String,
    pub document_count: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Result of [`Coordinator::list_tasks`](crate::Coordinator::list_tasks).
///
/// Serializes as `{"total_tasks": n, "tasks": {"<id>": summary, ...}}`, the
/// map keeping insertion order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskListing {
    pub total_tasks: usize,
    #[serde(serialize_with = "summaries_by_id")]
    pub tasks: Vec<TaskSummary>,
}
impl TaskListing {
    pub(crate) fn new(tasks: Vec<TaskSummary>) -> Self {
        Self {
            total_tasks: tasks.len(),
            tasks,
        }
    }
}

fn summaries_by_id<S: Serializer>(tasks: &[TaskSummary], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(tasks.iter().map(|summary| (summary.task_id.to_string(), summary)))
}
