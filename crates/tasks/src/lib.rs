//! Background scan tasks.
//!
//! A [`Coordinator`] accepts scan requests, runs each one as an independent
//! Tokio task and keeps every [`ScanTask`] record in an in-memory registry for
//! the lifetime of the process (or until evicted, when a cap is configured).
//!
//! Status only ever moves forward: `pending → running → {completed, failed}`.
//! Problems with the scanned folder never surface from [`Coordinator::submit`];
//! they turn the task itself into `failed`.

mod coordinator;
pub mod error;
mod registry;
mod stats;
mod status;
mod task;

use std::ops::RangeInclusive;

pub use crate::coordinator::{Coordinator, CoordinatorConfig};
pub use crate::stats::GlobalStats;
pub use crate::status::TaskStatus;
pub use crate::task::{ScanTask, TaskId, TaskListing, TaskSummary};

/// Per-file ceiling applied when a submission does not name one.
pub const DEFAULT_MAX_FILE_SIZE_MB: u32 = 50;
/// Accepted values for a submission's per-file ceiling.
pub const MAX_FILE_SIZE_MB_RANGE: RangeInclusive<u32> = 1..=1000;
