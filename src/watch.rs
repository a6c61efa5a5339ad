//! Filesystem watcher driving full rebuilds.
//!
//! The project root is watched recursively; notify pushes events onto an
//! mpsc channel and a single consumer loop drains it. Events are debounced
//! so a burst of saves coalesces into one rebuild. Paths under the output
//! tree (and its staging siblings), dot-prefixed paths at the project
//! root, and editor temp files are ignored.
//!
//! A rebuild failure here is logged and the previous output stays live;
//! only the initial build under `serve` is fatal.

use crate::{build, config::SiteConfig, log};
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::RecvTimeoutError,
    },
    time::{Duration, Instant},
};

/// Quiet window after the last event before a rebuild fires
const DEBOUNCE_MS: u64 = 300;

/// Poll interval while idle, bounds how long shutdown can lag
const IDLE_TIMEOUT_MS: u64 = 500;

// =============================================================================
// Ignore Rules
// =============================================================================

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// True for paths whose changes should trigger a rebuild.
///
/// The output tree and its staging siblings are what builds themselves
/// write; reacting to them would rebuild forever.
fn is_watched(path: &Path, config: &SiteConfig) -> bool {
    if path.starts_with(&config.build.output)
        || path.starts_with(config.staging_dir())
        || path.starts_with(config.old_output_dir())
        || is_temp_file(path)
    {
        return false;
    }

    // dot-prefixed top-level entries (.git, .quill caches, ...)
    if let Ok(rel) = path.strip_prefix(config.get_root())
        && let Some(first) = rel.components().next()
        && first.as_os_str().to_string_lossy().starts_with('.')
    {
        return false;
    }

    true
}

const fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

// =============================================================================
// Debounce State
// =============================================================================

/// Batches rapid file events into a single rebuild.
struct Debouncer {
    pending: HashSet<PathBuf>,
    last_event: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            pending: HashSet::new(),
            last_event: None,
        }
    }

    fn add(&mut self, path: PathBuf) {
        self.pending.insert(path);
        self.last_event = Some(Instant::now());
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty()
            && self
                .last_event
                .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        self.pending.drain().collect()
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            Duration::from_millis(IDLE_TIMEOUT_MS)
        } else {
            Duration::from_millis(DEBOUNCE_MS)
        }
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Watch the project root and rebuild on change until `shutdown` is set.
///
/// Blocks the calling thread. Every coalesced batch of changes triggers
/// one full rebuild; failures are logged and the loop keeps going.
pub fn watch_for_changes_blocking(
    config: &'static SiteConfig,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx).context("failed to create file watcher")?;

    let root = config.get_root().to_path_buf();
    watcher
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("failed to watch `{}`", root.display()))?;
    log!("watch"; "watching {}", root.display());

    let mut debouncer = Debouncer::new();

    while !shutdown.load(Ordering::SeqCst) {
        match rx.recv_timeout(debouncer.timeout()) {
            Ok(Ok(event)) if is_relevant(&event) => {
                for path in event.paths {
                    if is_watched(&path, config) {
                        debouncer.add(path);
                    }
                }
            }
            Ok(Err(err)) => log!("watch"; "error: {err}"),
            Err(RecvTimeoutError::Timeout) if debouncer.ready() => {
                let changed = debouncer.take();
                log!("watch"; "{} changed, rebuilding...", describe(&changed, &root));
                if let Err(err) = build::build_site(config) {
                    log!("watch"; "rebuild failed, keeping previous output");
                    log!("watch"; "{err:#}");
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
            // irrelevant events, idle timeouts
            _ => {}
        }
    }

    Ok(())
}

/// Short log line for a batch of changed paths.
fn describe(paths: &[PathBuf], root: &Path) -> String {
    match paths {
        [single] => single
            .strip_prefix(root)
            .unwrap_or(single)
            .display()
            .to_string(),
        _ => format!("{} paths", paths.len()),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn config_at(root: &Path) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.set_root(root);
        config.build.output = root.join("www");
        config
    }

    #[test]
    fn test_temp_files_are_ignored() {
        assert!(is_temp_file(Path::new("/p/posts/draft.md.swp")));
        assert!(is_temp_file(Path::new("/p/posts/draft.md~")));
        assert!(is_temp_file(Path::new("/p/posts/.draft.md")));
        assert!(is_temp_file(Path::new("/p/posts/old.bak")));
        assert!(!is_temp_file(Path::new("/p/posts/draft.md")));
    }

    #[test]
    fn test_output_and_staging_are_ignored() {
        let config = config_at(Path::new("/site"));

        assert!(!is_watched(Path::new("/site/www/index.html"), &config));
        assert!(!is_watched(Path::new("/site/.www.staging/x.html"), &config));
        assert!(!is_watched(Path::new("/site/.www.old/x.html"), &config));
        assert!(is_watched(Path::new("/site/posts/hello.md"), &config));
    }

    #[test]
    fn test_dot_prefixed_root_entries_are_ignored() {
        let config = config_at(Path::new("/site"));

        assert!(!is_watched(Path::new("/site/.git/HEAD"), &config));
        // dotfiles deeper down are already caught by the temp-file rule;
        // a dotted top-level directory hides everything under it
        assert!(!is_watched(Path::new("/site/.cache/posts/a.md"), &config));
        assert!(is_watched(Path::new("/site/pages/index.html.j2"), &config));
    }

    #[test]
    fn test_debouncer_coalesces_bursts() {
        let mut debouncer = Debouncer::new();
        debouncer.add(PathBuf::from("/site/a.md"));
        debouncer.add(PathBuf::from("/site/b.md"));
        debouncer.add(PathBuf::from("/site/a.md"));

        // still within the quiet window
        assert!(!debouncer.ready());

        sleep(Duration::from_millis(DEBOUNCE_MS + 50));
        assert!(debouncer.ready());

        let batch = debouncer.take();
        assert_eq!(batch.len(), 2);
        assert!(!debouncer.ready());
    }

    #[test]
    fn test_event_kinds() {
        let create = Event::new(EventKind::Create(notify::event::CreateKind::File));
        let access = Event::new(EventKind::Access(notify::event::AccessKind::Read));

        assert!(is_relevant(&create));
        assert!(!is_relevant(&access));
    }
}
