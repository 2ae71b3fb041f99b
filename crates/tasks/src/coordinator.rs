use crate::error::{ErrorKind, Result};
use crate::registry::TaskRegistry;
use crate::stats::GlobalStats;
use crate::status::TaskStatus;
use crate::task::{ScanTask, TaskId, TaskListing};
use crate::{DEFAULT_MAX_FILE_SIZE_MB, MAX_FILE_SIZE_MB_RANGE};
use docscan_reader::ScanOptions;
use docscan_reader::error::ErrorKind as ReaderErrorKind;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, instrument};

/// Settings shared by every task a [`Coordinator`] runs.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Ceiling used when a submission does not name one.
    pub default_max_file_size_mb: u32,
    /// Template for every scan; the size ceiling is replaced per task.
    pub scan_options: ScanOptions,
    /// Cap on retained task records; `None` keeps every task.
    pub max_tasks: Option<usize>,
}
impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            default_max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            scan_options: ScanOptions::default(),
            max_tasks: None,
        }
    }
}

/// Runs folder scans in the background and answers queries about them.
///
/// Cloning is cheap; every clone shares the same registry.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

struct Inner {
    registry: TaskRegistry,
    config: CoordinatorConfig,
    /// Panics with this message in place of scanning.
    #[cfg(test)]
    fault: Option<&'static str>,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: TaskRegistry::new(config.max_tasks),
                config,
                #[cfg(test)]
                fault: None,
            }),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    /// Register a scan of `folder_path` and start it in the background.
    ///
    /// Returns the freshly created `pending` record straight away; the scan
    /// itself runs on the Tokio runtime and must be observed through
    /// [`get_task`](Self::get_task) or [`wait_for`](Self::wait_for). The
    /// folder is not inspected here: a bad path shows up as a `failed` task.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidMaxFileSize`] if the ceiling is outside `1..=1000`
    /// MiB. No task is created in that case.
    #[instrument(skip(self, folder_path), fields(folder = tracing::field::Empty))]
    pub async fn submit(&self, folder_path: impl Into<String>, max_file_size_mb: Option<u32>) -> Result<ScanTask> {
        let folder_path = folder_path.into();
        tracing::Span::current().record("folder", folder_path.as_str());
        let max_file_size_mb = max_file_size_mb.unwrap_or(self.inner.config.default_max_file_size_mb);
        if !MAX_FILE_SIZE_MB_RANGE.contains(&max_file_size_mb) {
            exn::bail!(ErrorKind::InvalidMaxFileSize(max_file_size_mb));
        }

        let task = self.inner.registry.insert(ScanTask::pending(folder_path, max_file_size_mb)).await;
        let task_id = task.task_id;
        tracing::info!(%task_id, folder = %task.folder_path, "Task created");

        let inner = Arc::clone(&self.inner);
        let span = tracing::info_span!("scan_task", %task_id);
        tokio::spawn(async move { inner.execute(task_id).await }.instrument(span));
        Ok(ScanTask::clone(&task))
    }

    /// Current record of a task.
    ///
    /// The record is shared with the registry, so polling never copies the
    /// extracted documents.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::NotFound`] for an unknown identifier, including anything
    /// that is not a UUID at all.
    pub async fn get_task(&self, task_id: &str) -> Result<Arc<ScanTask>> {
        let task = match task_id.parse::<TaskId>() {
            Ok(id) => self.inner.registry.get(&id).await,
            Err(_) => None,
        };
        match task {
            Some(task) => Ok(task),
            None => {
                tracing::warn!(task_id, "Task not found");
                exn::bail!(ErrorKind::NotFound(task_id.to_string()))
            },
        }
    }

    /// Summaries of every task (optionally only those with one status), in
    /// submission order.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::UnknownStatus`] when `status_filter` is not one of
    /// `pending`, `running`, `completed` or `failed`.
    pub async fn list_tasks(&self, status_filter: Option<&str>) -> Result<TaskListing> {
        let status = status_filter.map(str::parse::<TaskStatus>).transpose()?;
        let summaries = self
            .inner
            .registry
            .snapshot()
            .await
            .iter()
            .filter(|task| status.is_none_or(|status| task.status == status))
            .map(|task| task.summary())
            .collect();
        Ok(TaskListing::new(summaries))
    }

    /// Aggregate counters, folded over every known task at call time.
    pub async fn global_stats(&self) -> GlobalStats {
        let tasks = self.inner.registry.snapshot().await;
        GlobalStats::fold(tasks.iter().map(Arc::as_ref))
    }

    /// Wait until a task reaches a terminal state.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::NotFound`] if the task is (or becomes) unknown, and
    /// [`ErrorKind::Timeout`] if it is still in flight after `timeout`.
    pub async fn wait_for(&self, task_id: &str, timeout: Duration) -> Result<Arc<ScanTask>> {
        match tokio::time::timeout(timeout, self.wait_until_terminal(task_id)).await {
            Ok(result) => result,
            Err(_) => exn::bail!(ErrorKind::Timeout),
        }
    }

    async fn wait_until_terminal(&self, task_id: &str) -> Result<Arc<ScanTask>> {
        let mut changes = self.inner.registry.subscribe();
        loop {
            // Mark the current version as seen before looking, so that a change
            // between the check and the wait is not missed.
            changes.borrow_and_update();
            let task = self.get_task(task_id).await?;
            if task.status.is_terminal() {
                return Ok(task);
            }
            if changes.changed().await.is_err() {
                // Sender dropped along with the registry.
                exn::bail!(ErrorKind::NotFound(task_id.to_string()));
            }
        }
    }
}

impl Inner {
    /// Drive one task from `pending` to a terminal state.
    ///
    /// Every outcome of the scan, including a panic inside it, ends up as the
    /// task's terminal record; nothing propagates out of here.
    async fn execute(&self, task_id: TaskId) {
        let Some(task) = self.registry.transition(&task_id, ScanTask::running).await else {
            return;
        };
        tracing::info!(folder = %task.folder_path, "Starting folder scan");

        let options = self
            .config
            .scan_options
            .clone()
            .with_max_file_size_mb(u64::from(task.max_file_size_mb));
        let folder = task.folder_path.clone();
        #[cfg(test)]
        let fault = self.fault;
        let scan = tokio::spawn(
            async move {
                #[cfg(test)]
                if let Some(message) = fault {
                    panic!("{message}");
                }
                docscan_reader::scan_folder(&folder, &options).await
            }
            .in_current_span(),
        );

        let outcome = scan.await;
        let finished = self
            .registry
            .transition(&task_id, move |current| match outcome {
                Ok(Ok(outcome)) => current.completed(outcome),
                Ok(Err(e)) => {
                    let kind: &ReaderErrorKind = &e;
                    current.failed(kind.to_string())
                },
                Err(e) => current.failed(format!("internal error while scanning: {e}")),
            })
            .await;

        match finished {
            Some(task) if task.status == TaskStatus::Completed => tracing::info!(
                documents = task.document_count(),
                errors = task.stats.as_ref().map_or(0, |stats| stats.errors_count()),
                "Task completed"
            ),
            Some(task) => tracing::error!(error = task.error.as_deref().unwrap_or_default(), "Task failed"),
            None => {},
        }
    }
}
