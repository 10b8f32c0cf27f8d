use std::path::Path;
use std::time::Duration;

use notify_debouncer_full::{
    new_debouncer,
    notify::{EventKind, RecursiveMode, Watcher},
    DebounceEventResult,
};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, info};

use crate::error::{BuildError, Result};
use crate::html::PageShell;
use crate::models::SiteConfig;
use crate::site::build_site;

const DEBOUNCE: Duration = Duration::from_millis(200);

/// Watches the article directory and runs a full rebuild after every
/// relevant change. Rebuild failures are logged and watching continues.
/// Returns only if the watcher shuts down.
pub async fn watch_and_rebuild(config: &SiteConfig) -> Result<()> {
    let article_dir = Path::new(&config.article_dir);
    let (tx, mut rx) = mpsc::channel(1);

    let mut debouncer = new_debouncer(DEBOUNCE, None, move |res: DebounceEventResult| match res {
        Ok(events) => {
            let changed: Vec<_> = events
                .iter()
                .filter(|event| is_relevant_kind(&event.kind))
                .flat_map(|event| &event.event.paths)
                .filter(|path| !is_editor_temp_file(path))
                .collect();

            if changed.is_empty() {
                return;
            }
            debug!(paths = ?changed, "Article change detected");
            // A pending rebuild already covers this change
            if let Err(TrySendError::Closed(())) = tx.try_send(()) {
                error!("Rebuild loop has stopped, dropping change event");
            }
        }
        Err(errors) => {
            for e in errors {
                error!("Watcher error: {}", e);
            }
        }
    })
    .map_err(|source| BuildError::Watch {
        path: article_dir.to_path_buf(),
        source,
    })?;

    debouncer
        .watcher()
        .watch(article_dir, RecursiveMode::Recursive)
        .map_err(|source| BuildError::Watch {
            path: article_dir.to_path_buf(),
            source,
        })?;
    info!(path = %article_dir.display(), "Watching articles for changes");

    while rx.recv().await.is_some() {
        info!("Change detected, rebuilding site...");
        match build_site(config, &PageShell::current(config)).await {
            Ok(summary) => info!(articles = summary.articles, "Rebuild finished"),
            Err(e) => error!("Rebuild failed: {}", e),
        }
    }

    Ok(())
}

fn is_relevant_kind(kind: &EventKind) -> bool {
    kind.is_modify() || kind.is_create() || kind.is_remove()
}

/// Emacs lock files (`.#name`) and backup files (`name~`).
fn is_editor_temp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(".#") || name.ends_with('~'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify_debouncer_full::notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};

    #[test]
    fn content_changes_are_relevant() {
        assert!(is_relevant_kind(&EventKind::Create(CreateKind::File)));
        assert!(is_relevant_kind(&EventKind::Modify(ModifyKind::Any)));
        assert!(is_relevant_kind(&EventKind::Remove(RemoveKind::File)));
        assert!(!is_relevant_kind(&EventKind::Access(AccessKind::Any)));
    }

    #[test]
    fn editor_temp_files_are_ignored() {
        assert!(is_editor_temp_file(Path::new("article/.#2024-01-01.md")));
        assert!(is_editor_temp_file(Path::new("article/2024-01-01.md~")));
        assert!(!is_editor_temp_file(Path::new("article/2024-01-01.md")));
    }
}
