//! Hot reload of the facade configuration file.
//!
//! The parent directory is watched rather than the file itself, so editors
//! that save by writing a temp file and renaming it over the original are
//! still picked up. Only reloads that parse, validate and differ from the
//! last delivered config reach the receiver.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::AppConfig;

pub struct ConfigWatcher {
    path: PathBuf,
    last: Mutex<Option<AppConfig>>,
    update_tx: mpsc::UnboundedSender<AppConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end for reloaded configs.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<AppConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            last: Mutex::new(None),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Seed the last-delivered config so an unchanged save is not re-sent.
    pub fn with_current(self, current: AppConfig) -> Self {
        if let Ok(mut last) = self.last.lock() {
            *last = Some(current);
        }
        self
    }

    /// Start watching. Updates stop when the returned handle is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if touches(&event, &self.path) => self.reload(),
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %path.display(), "Config watcher started");
        Ok(watcher)
    }

    fn reload(&self) {
        let config = match load_config(&self.path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Config reload rejected, keeping current settings");
                return;
            }
        };

        let Ok(mut last) = self.last.lock() else {
            return;
        };
        if last.as_ref() == Some(&config) {
            tracing::debug!(path = %self.path.display(), "Config saved without changes");
            return;
        }

        tracing::info!(path = %self.path.display(), "Config reloaded");
        *last = Some(config.clone());
        let _ = self.update_tx.send(config);
    }
}

/// Whether `event` creates or modifies the file at `path`.
fn touches(event: &Event, path: &Path) -> bool {
    let relevant_kind = matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_));
    let name = path.file_name();
    relevant_kind && event.paths.iter().any(|p| p.file_name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_touches_matches_file_name() {
        let target = Path::new("/etc/storefront/storefront.toml");
        assert!(touches(&event(EventKind::Modify(ModifyKind::Any), "/etc/storefront/storefront.toml"), target));
        assert!(touches(&event(EventKind::Create(CreateKind::File), "/etc/storefront/storefront.toml"), target));
        assert!(!touches(&event(EventKind::Modify(ModifyKind::Any), "/etc/storefront/other.toml"), target));
        assert!(!touches(&event(EventKind::Remove(RemoveKind::File), "/etc/storefront/storefront.toml"), target));
    }

    #[test]
    fn test_unchanged_config_is_not_resent() {
        let path = std::env::temp_dir().join(format!("storefront-watch-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[latency]\nmin_ms = 10\nmax_ms = 20\n").unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(&path);
        watcher.reload();
        let first = rx.try_recv().unwrap();
        assert_eq!(first.latency.min_ms, 10);

        watcher.reload();
        assert!(rx.try_recv().is_err());

        std::fs::write(&path, "[latency]\nmin_ms = 30\nmax_ms = 40\n").unwrap();
        watcher.reload();
        assert_eq!(rx.try_recv().unwrap().latency.min_ms, 30);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_seeded_config_suppresses_identical_reload() {
        let path = std::env::temp_dir().join(format!("storefront-watch-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[latency]\nmin_ms = 10\nmax_ms = 20\n").unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(&path);
        let current = load_config(&path).unwrap();
        let watcher = watcher.with_current(current);
        watcher.reload();
        assert!(rx.try_recv().is_err());

        std::fs::write(&path, "[latency]\nmin_ms = 15\nmax_ms = 20\n").unwrap();
        watcher.reload();
        assert_eq!(rx.try_recv().unwrap().latency.min_ms, 15);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_invalid_reload_is_dropped() {
        let path = std::env::temp_dir().join(format!("storefront-watch-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[latency]\nmin_ms = 900\nmax_ms = 100\n").unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(&path);
        let watcher = watcher.with_current(AppConfig::default());
        watcher.reload();
        assert!(rx.try_recv().is_err());

        std::fs::remove_file(&path).unwrap();
    }
}
