use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
    Payload,
    Feed,
}

// event paths come back absolute, so match on file name
fn classify(paths: &[PathBuf], feed: Option<&Path>) -> WatchEvent {
    match feed {
        Some(f) if paths.iter().any(|p| p.file_name() == f.file_name()) => WatchEvent::Feed,
        _ => WatchEvent::Payload,
    }
}

/// Watches the payload file (and the feed file, if any). The watcher must
/// outlive the receiver's use.
pub fn spawn_watcher(
    payload: &Path,
    feed: Option<&Path>,
) -> notify::Result<(RecommendedWatcher, Receiver<WatchEvent>)> {
    let (tx, rx) = channel();
    let feed_owned = feed.map(Path::to_path_buf);
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        match res {
            Ok(ev) if matches!(ev.kind, EventKind::Modify(_) | EventKind::Create(_)) => {
                let _ = tx.send(classify(&ev.paths, feed_owned.as_deref()));
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "watch error"),
        }
    })?;
    watcher.watch(payload, RecursiveMode::NonRecursive)?;
    if let Some(f) = feed {
        watcher.watch(f, RecursiveMode::NonRecursive)?;
    }
    tracing::info!(payload = %payload.display(), feed = ?feed, "watching for changes");
    Ok((watcher, rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_paths_are_classified() {
        let feed = PathBuf::from("/tmp/data/feed.jsonl");
        let ev = classify(&[PathBuf::from("/tmp/data/feed.jsonl")], Some(&feed));
        assert_eq!(ev, WatchEvent::Feed);
        let ev = classify(&[PathBuf::from("/tmp/data/analysis.json")], Some(&feed));
        assert_eq!(ev, WatchEvent::Payload);
        let ev = classify(&[PathBuf::from("/tmp/data/feed.jsonl")], None);
        assert_eq!(ev, WatchEvent::Payload);
    }
}
