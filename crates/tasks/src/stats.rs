use crate::status::TaskStatus;
use crate::task::ScanTask;
use serde::Serialize;

/// Counters over every task the coordinator knows about.
///
/// Documents and words are only summed over `completed` tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GlobalStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub failed_tasks: usize,
    pub total_documents: usize,
    pub total_words: u64,
}
impl GlobalStats {
    pub(crate) fn fold<'a>(tasks: impl IntoIterator<Item = &'a ScanTask>) -> Self {
        tasks.into_iter().fold(Self::default(), |mut stats, task| {
            stats.total_tasks += 1;
            match task.status {
                TaskStatus::Completed => {
                    stats.completed_tasks += 1;
                    stats.total_documents += task.document_count();
                    stats.total_words += task.total_words();
                },
                TaskStatus::Failed => stats.failed_tasks += 1,
                TaskStatus::Pending | TaskStatus::Running => {},
            }
            stats
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(GlobalStats::fold(std::iter::empty()), GlobalStats::default());
    }

    #[test]
    fn test_only_terminal_tasks_are_counted() {
        let pending = ScanTask::pending("/a", 50);
        let running = ScanTask::pending("/b", 50).running();
        let failed = ScanTask::pending("/c", 50).running().failed("boom");
        let stats = GlobalStats::fold([&pending, &running, &failed]);
        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.completed_tasks, 0);
        assert_eq!(stats.failed_tasks, 1);
        assert_eq!(stats.total_documents, 0);
        assert_eq!(stats.total_words, 0);
    }
}
