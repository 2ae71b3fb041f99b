use crate::document::display_name;
use crate::format::Format;
use crate::models::FileFailure;
use async_stream::stream;
use futures::Stream;
use std::path::PathBuf;
use tokio::fs::{self, DirEntry, ReadDir};

enum WalkEntry {
    File(PathBuf),
    Descend(PathBuf),
    Skip,
}

/// Stream every eligible (supported extension) file below an already opened
/// root directory, depth-first, in directory enumeration order.
///
/// The root was opened by the caller so that failing to list it aborts the
/// scan. Anything below the root that cannot be listed is yielded as a
/// [`FileFailure`] and the walk carries on.
pub(crate) fn eligible_files(root: PathBuf, entries: ReadDir, recursive: bool) -> impl Stream<Item = Result<PathBuf, FileFailure>> {
    stream!({
        let mut stack: Vec<PathBuf> = Vec::new();
        let mut opened = Some((root, entries));
        'dirs: loop {
            let (current, mut entries) = match opened.take() {
                Some(pair) => pair,
                None => match stack.pop() {
                    None => break 'dirs,
                    Some(dir) => match fs::read_dir(&dir).await {
                        Ok(entries) => (dir, entries),
                        Err(e) => {
                            yield Err(FileFailure::from_io(display_name(&dir), &e));
                            continue 'dirs;
                        },
                    },
                },
            };
            'entries: loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break 'entries,
                    // A directory that fails mid-listing is unlikely to recover.
                    Err(e) => {
                        yield Err(FileFailure::from_io(display_name(&current), &e));
                        break 'entries;
                    },
                };
                match classify(entry, recursive).await {
                    Ok(WalkEntry::File(path)) => yield Ok(path),
                    Ok(WalkEntry::Descend(dir)) => stack.push(dir),
                    Ok(WalkEntry::Skip) => {},
                    Err(e) => yield Err(e),
                }
            }
        }
    })
}

async fn classify(entry: DirEntry, recursive: bool) -> Result<WalkEntry, FileFailure> {
    let path = entry.path();
    let file_type = entry.file_type().await.map_err(|e| FileFailure::from_io(display_name(&path), &e))?;
    if file_type.is_dir() {
        return Ok(if recursive { WalkEntry::Descend(path) } else { WalkEntry::Skip });
    }
    if Format::from_path(&path).is_none() {
        return Ok(WalkEntry::Skip);
    }
    if file_type.is_file() {
        return Ok(WalkEntry::File(path));
    }
    // Symlinks are followed to files only. Symlinked directories are never
    // descended into, which rules out cycles.
    if file_type.is_symlink() {
        return Ok(match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => WalkEntry::File(path),
            Ok(_) => WalkEntry::Skip,
            // Note: silently drop what is most likely a broken symlink.
            Err(_) => WalkEntry::Skip,
        });
    }
    Ok(WalkEntry::Skip)
}
