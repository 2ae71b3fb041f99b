//! `docscan scan`: one folder, printed as a listing.

use crate::cli::ScanArgs;
use crate::error::{ErrorKind, Result};
use docscan_tasks::{Coordinator, ScanTask, TaskStatus};
use exn::ResultExt;
use std::fmt::Write;
use std::time::Duration;

const PREVIEW_CHARS: usize = 60;
const RULE_WIDTH: usize = 50;

pub async fn run(coordinator: &Coordinator, args: ScanArgs) -> Result<()> {
    let folder = args.folder.to_string_lossy().into_owned();
    let task = coordinator
        .submit(folder, args.max_file_size_mb)
        .await
        .or_raise(|| ErrorKind::Submit)?;
    let task = coordinator
        .wait_for(&task.task_id.to_string(), Duration::from_secs(args.timeout))
        .await
        .or_raise(|| ErrorKind::Wait)?;

    if args.json {
        let json = serde_json::to_string_pretty(&*task).or_raise(|| ErrorKind::Serialize)?;
        println!("{json}");
    } else {
        print!("{}", render(&task));
    }

    if task.status == TaskStatus::Failed {
        exn::bail!(ErrorKind::ScanFailed(task.error.clone().unwrap_or_default()));
    }
    Ok(())
}

/// Human-readable listing of a finished task.
pub fn render(task: &ScanTask) -> String {
    let mut out = String::new();
    // Infallible: writing to a `String` cannot fail.
    let _ = writeln!(out, "Scanning: {}", task.folder_path);
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    for document in task.documents.iter().flatten() {
        let _ = writeln!(out, "{}", document.filename);
        let _ = writeln!(out, "   Words: {}", document.word_count);
        let _ = writeln!(out, "   Size: {:.1} KB", kibibytes(document.file_size_bytes));
        let _ = writeln!(out, "   Preview: {}...", preview(&document.text));
        let _ = writeln!(out);
    }
    if let Some(stats) = &task.stats {
        for error in stats.errors() {
            let _ = writeln!(out, "Skipped {error}");
        }
    }
    let _ = writeln!(out, "\nTotal: {} documents", task.document_count());
    out
}

#[allow(clippy::cast_precision_loss)]
pub fn kibibytes(bytes: u64) -> f64 {
    bytes as f64 / 1024.0
}

/// The first characters of `text` on a single line.
pub fn preview(text: &str) -> String {
    text.chars()
        .take(PREVIEW_CHARS)
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect()
}
