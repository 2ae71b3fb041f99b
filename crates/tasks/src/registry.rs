//! In-memory task registry.
//!
//! Records are stored as `Arc<ScanTask>` and only ever replaced whole while
//! the write lock is held, so a reader either sees the previous record or the
//! next one, never a mix. Every change bumps a [`watch`] counter that waiters
//! use to re-check their task.

use crate::task::{ScanTask, TaskId};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{RwLock, watch};

#[derive(Default)]
struct Entries {
    /// Insertion order.
    order: VecDeque<TaskId>,
    tasks: HashMap<TaskId, Arc<ScanTask>>,
}

pub(crate) struct TaskRegistry {
    entries: RwLock<Entries>,
    changes: watch::Sender<u64>,
    max_tasks: Option<usize>,
}
impl TaskRegistry {
    /// `max_tasks` caps how many records are kept; `None` keeps everything for
    /// the lifetime of the process.
    pub(crate) fn new(max_tasks: Option<usize>) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            entries: RwLock::new(Entries::default()),
            changes,
            max_tasks,
        }
    }

    pub(crate) async fn insert(&self, task: ScanTask) -> Arc<ScanTask> {
        let task = Arc::new(task);
        {
            let mut entries = self.entries.write().await;
            entries.order.push_back(task.task_id);
            entries.tasks.insert(task.task_id, Arc::clone(&task));
            if let Some(max_tasks) = self.max_tasks {
                evict_terminal(&mut entries, max_tasks);
            }
        }
        self.notify();
        task
    }

    pub(crate) async fn get(&self, id: &TaskId) -> Option<Arc<ScanTask>> {
        self.entries.read().await.tasks.get(id).cloned()
    }

    /// Every record, in insertion order.
    pub(crate) async fn snapshot(&self) -> Vec<Arc<ScanTask>> {
        let entries = self.entries.read().await;
        entries
            .order
            .iter()
            .filter_map(|id| entries.tasks.get(id).cloned())
            .collect()
    }

    /// Replace a record with the one built by `next`.
    ///
    /// The replacement is refused (and `None` returned) when the task is
    /// unknown or when it would move the task's status backwards.
    pub(crate) async fn transition(&self, id: &TaskId, next: impl FnOnce(&ScanTask) -> ScanTask) -> Option<Arc<ScanTask>> {
        let updated = {
            let mut entries = self.entries.write().await;
            let current = entries.tasks.get(id)?;
            let updated = Arc::new(next(current));
            if !current.status.can_transition_to(updated.status) {
                tracing::warn!(
                    task_id = %id,
                    from = %current.status,
                    to = %updated.status,
                    "Refusing out-of-order task transition"
                );
                return None;
            }
            entries.tasks.insert(*id, Arc::clone(&updated));
            updated
        };
        self.notify();
        Some(updated)
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    fn notify(&self) {
        self.changes.send_modify(|version| *version = version.wrapping_add(1));
    }
}

/// Drop the oldest terminal records until at most `max_tasks` remain.
///
/// Pending and running tasks are never evicted, so the registry may exceed
/// the cap while they are in flight.
fn evict_terminal(entries: &mut Entries, max_tasks: usize) {
    let mut excess = entries.tasks.len().saturating_sub(max_tasks);
    if excess == 0 {
        return;
    }
    let Entries { order, tasks } = entries;
    order.retain(|id| {
        if excess == 0 {
            return true;
        }
        let terminal = tasks.get(id).is_some_and(|task| task.status.is_terminal());
        if terminal {
            tasks.remove(id);
            excess -= 1;
            tracing::debug!(task_id = %id, "Evicted task from registry");
        }
        !terminal
    });
}
