//! `docscan batch`: several folders, one JSON report.
//!
//! Every folder is submitted up front so the scans run concurrently; the
//! report lists folders in the order they were given.

use crate::cli::BatchArgs;
use crate::error::{ErrorKind, Result};
use crate::scan::kibibytes;
use docscan_tasks::{Coordinator, ScanTask, TaskStatus};
use exn::ResultExt;
use serde::{Serialize, Serializer};
use std::time::Duration;
use time::OffsetDateTime;

#[derive(Debug, Serialize)]
pub struct BatchReport {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Keyed by folder path, in the order the folders were given.
    #[serde(serialize_with = "folders_by_path")]
    pub folders: Vec<(String, FolderReport)>,
    pub summary: BatchSummary,
}

#[derive(Debug, Serialize)]
pub struct FolderReport {
    pub document_count: usize,
    pub total_words: u64,
    pub documents: Vec<DocumentEntry>,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DocumentEntry {
    pub name: String,
    pub words: u64,
    pub size_kb: f64,
}

#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    pub total_folders: usize,
    pub total_documents: usize,
    pub total_words: u64,
    pub failed_folders: Vec<FailedFolder>,
}

#[derive(Debug, Serialize)]
pub struct FailedFolder {
    pub path: String,
    pub error: String,
}

fn folders_by_path<S: Serializer>(folders: &[(String, FolderReport)], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_map(folders.iter().map(|(path, report)| (path, report)))
}

impl BatchReport {
    pub fn new(total_folders: usize) -> Self {
        Self {
            timestamp: OffsetDateTime::now_utc(),
            folders: Vec::new(),
            summary: BatchSummary {
                total_folders,
                ..BatchSummary::default()
            },
        }
    }

    /// Fold one finished task into the report.
    pub fn record(&mut self, task: &ScanTask) {
        if task.status != TaskStatus::Completed {
            self.record_failure(&task.folder_path, task.error.clone().unwrap_or_default());
            return;
        }
        let documents: Vec<DocumentEntry> = task
            .documents
            .iter()
            .flatten()
            .map(|document| DocumentEntry {
                name: document.filename.clone(),
                words: document.word_count,
                size_kb: kibibytes(document.file_size_bytes),
            })
            .collect();
        let folder = FolderReport {
            document_count: documents.len(),
            total_words: task.total_words(),
            documents,
            errors: task.stats.as_ref().map(|stats| stats.errors()).unwrap_or_default(),
        };
        self.summary.total_documents += folder.document_count;
        self.summary.total_words += folder.total_words;
        self.folders.push((task.folder_path.clone(), folder));
    }

    pub fn record_failure(&mut self, path: impl Into<String>, error: impl Into<String>) {
        self.summary.failed_folders.push(FailedFolder {
            path: path.into(),
            error: error.into(),
        });
    }
}

pub async fn run(coordinator: &Coordinator, args: BatchArgs) -> Result<()> {
    let report = scan_all(coordinator, &args).await;
    let json = serde_json::to_string_pretty(&report).or_raise(|| ErrorKind::Serialize)?;
    tokio::fs::write(&args.output, &json)
        .await
        .or_raise(|| ErrorKind::Report(args.output.clone()))?;

    println!("Report saved to: {}", args.output.display());
    let summary = serde_json::to_string_pretty(&report.summary).or_raise(|| ErrorKind::Serialize)?;
    println!("{summary}");
    Ok(())
}

/// Scan every folder; a folder that cannot be scanned is listed under
/// `failed_folders` rather than failing the batch.
pub async fn scan_all(coordinator: &Coordinator, args: &BatchArgs) -> BatchReport {
    let timeout = Duration::from_secs(args.timeout);
    let mut report = BatchReport::new(args.folders.len());
    let mut submitted = Vec::with_capacity(args.folders.len());
    for folder in &args.folders {
        let path = folder.to_string_lossy().into_owned();
        tracing::info!(folder = %path, "Processing");
        match coordinator.submit(path.clone(), args.max_file_size_mb).await {
            Ok(task) => submitted.push((path, Some(task.task_id.to_string()))),
            Err(e) => {
                let kind: &docscan_tasks::error::ErrorKind = &e;
                report.record_failure(&path, kind.to_string());
                submitted.push((path, None));
            },
        }
    }
    for (path, task_id) in submitted {
        let Some(task_id) = task_id else { continue };
        match coordinator.wait_for(&task_id, timeout).await {
            Ok(task) => report.record(&task),
            Err(e) => {
                let kind: &docscan_tasks::error::ErrorKind = &e;
                report.record_failure(path, kind.to_string());
            },
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use docscan_tasks::CoordinatorConfig;
    use std::path::PathBuf;

    fn args(folders: Vec<PathBuf>, output: PathBuf) -> BatchArgs {
        BatchArgs {
            folders,
            output,
            max_file_size_mb: None,
            timeout: 10,
        }
    }

    #[tokio::test]
    async fn test_batch_report() {
        let first = tempfile::tempdir().unwrap();
        std::fs::write(first.path().join("a.txt"), "one two three").unwrap();
        std::fs::write(first.path().join("b.md"), "x".repeat(2048)).unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(second.path().join("c.txt"), "four five").unwrap();
        let missing = first.path().join("missing");
        let coordinator = Coordinator::new(CoordinatorConfig::default());

        let output = first.path().join("report.json");
        let args = args(
            vec![first.path().to_path_buf(), missing.clone(), second.path().to_path_buf()],
            output.clone(),
        );
        let report = scan_all(&coordinator, &args).await;
        assert_eq!(report.summary.total_folders, 3);
        assert_eq!(report.summary.total_documents, 3);
        assert_eq!(report.summary.total_words, 6);
        assert_eq!(report.summary.failed_folders.len(), 1);
        assert_eq!(report.summary.failed_folders[0].path, missing.to_string_lossy());
        assert!(report.summary.failed_folders[0].error.contains("does not exist"));

        let json = serde_json::to_value(&report).unwrap();
        let folder = &json["folders"][first.path().to_string_lossy().as_ref()];
        assert_eq!(folder["document_count"], 2);
        let big = folder["documents"]
            .as_array()
            .unwrap()
            .iter()
            .find(|d| d["name"] == "b.md")
            .unwrap();
        assert_eq!(big["size_kb"], 2.0);
        assert_eq!(big["words"], 1);
    }

    #[tokio::test]
    async fn test_run_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        let output = dir.path().join("out.json");
        let coordinator = Coordinator::new(CoordinatorConfig::default());
        run(&coordinator, args(vec![dir.path().to_path_buf()], output.clone())).await.unwrap();
        let written: serde_json::Value = serde_json::from_slice(&std::fs::read(&output).unwrap()).unwrap();
        assert_eq!(written["summary"]["total_documents"], 1);
        assert!(written["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_invalid_size_marks_every_folder_failed() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = Coordinator::new(CoordinatorConfig::default());
        let mut args = args(vec![dir.path().to_path_buf()], dir.path().join("out.json"));
        args.max_file_size_mb = Some(0);
        let report = scan_all(&coordinator, &args).await;
        assert!(report.folders.is_empty());
        assert_eq!(report.summary.failed_folders.len(), 1);
        assert!(report.summary.failed_folders[0].error.contains("max_file_size_mb"));
    }
}
