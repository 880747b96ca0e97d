//! Debounced, periodic project persistence with a user-visible status.

use crate::model::Project;
use crate::signal::{Observable, SubscriptionId};
use crate::storage::{Storage, StorageResult};
use chrono::{DateTime, Utc};
use log::{error, info};
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Default auto-save interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// Quiet period after the last change before saving.
pub const DEFAULT_DEBOUNCE_MILLIS: u64 = 2000;

/// How long "saved" is shown before the status falls back to idle.
const SAVED_DISPLAY: Duration = Duration::from_secs(2);

/// Key for the "last opened" project.
pub const LAST_PROJECT_KEY: &str = "__last_project__";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error(String),
}

/// Saves the active project some time after it changes.
///
/// Failures land in the status and are retried on the next cycle only.
pub struct AutoSaveManager<S: Storage> {
    storage: Arc<S>,
    interval: Duration,
    debounce: Duration,
    last_save: Option<Instant>,
    last_change: Option<Instant>,
    last_saved_at: Option<DateTime<Utc>>,
    dirty: bool,
    status: Observable<SaveStatus>,
    current_project_id: Option<String>,
}

impl<S: Storage> AutoSaveManager<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MILLIS),
            last_save: None,
            last_change: None,
            last_saved_at: None,
            dirty: false,
            status: Observable::default(),
            current_project_id: None,
        }
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_debounce(&mut self, debounce: Duration) {
        self.debounce = debounce;
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Note a change; restarts the debounce window.
    pub fn mark_dirty(&mut self, now: Instant) {
        self.dirty = true;
        self.last_change = Some(now);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_project_id(&mut self, id: Option<String>) {
        self.current_project_id = id;
    }

    pub fn project_id(&self) -> Option<&str> {
        self.current_project_id.as_deref()
    }

    pub fn status(&self) -> &SaveStatus {
        self.status.get()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&SaveStatus) + 'static) -> SubscriptionId {
        self.status.subscribe(callback)
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    /// Dirty, and either the debounce window has passed since the last
    /// change or the interval has passed since the last save.
    pub fn should_save(&self, now: Instant) -> bool {
        if !self.dirty || *self.status.get() == SaveStatus::Saving {
            return false;
        }
        let debounced = self
            .last_change
            .is_none_or(|changed| now.saturating_duration_since(changed) >= self.debounce);
        let interval_due = self
            .last_save
            .is_none_or(|saved| now.saturating_duration_since(saved) >= self.interval);
        debounced || (interval_due && self.last_save.is_some())
    }

    /// Drop a stale "saved" status back to idle.
    pub fn settle(&mut self, now: Instant) {
        let expired = self
            .last_save
            .is_some_and(|saved| now.saturating_duration_since(saved) >= SAVED_DISPLAY);
        if *self.status.get() == SaveStatus::Saved && expired {
            self.status.set(SaveStatus::Idle);
        }
    }

    /// Save if due. Returns true if a save was performed.
    pub async fn maybe_save(&mut self, project: &Project, now: Instant) -> StorageResult<bool> {
        self.settle(now);
        if !self.should_save(now) {
            return Ok(false);
        }
        self.save(project, now).await?;
        Ok(true)
    }

    /// Save immediately, also recording the project as the last opened one.
    pub async fn save(&mut self, project: &Project, now: Instant) -> StorageResult<()> {
        let id = self
            .current_project_id
            .clone()
            .unwrap_or_else(|| project.id.to_string());
        self.status.set(SaveStatus::Saving);

        let result = match self.storage.save(&id, project).await {
            Ok(()) => self.storage.save(LAST_PROJECT_KEY, project).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                self.last_save = Some(now);
                self.last_saved_at = Some(Utc::now());
                self.dirty = false;
                self.status.set(SaveStatus::Saved);
                info!("Saved project {id}");
                Ok(())
            }
            Err(e) => {
                error!("Saving project {id} failed: {e}");
                self.status.set(SaveStatus::Error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Text for the status indicator.
    pub fn status_text(&self, now: DateTime<Utc>) -> String {
        match self.status.get() {
            SaveStatus::Saving => "Saving...".to_string(),
            SaveStatus::Saved => "All changes saved".to_string(),
            SaveStatus::Error(message) => format!("Save failed: {message}"),
            SaveStatus::Idle if self.dirty => "Unsaved changes".to_string(),
            SaveStatus::Idle => match self.last_saved_at {
                Some(saved) => format!("Last saved: {}", format_elapsed(now - saved)),
                None => "No changes".to_string(),
            },
        }
    }

    pub async fn load(&mut self, id: &str, now: Instant) -> StorageResult<Project> {
        let project = self.storage.load(id).await?;
        self.opened(id.to_string(), now);
        info!("Loaded project {id}");
        Ok(project)
    }

    /// The last saved project, if any.
    pub async fn load_last(&mut self, now: Instant) -> Option<Project> {
        let project = self.storage.load(LAST_PROJECT_KEY).await.ok()?;
        self.opened(project.id.to_string(), now);
        Some(project)
    }

    fn opened(&mut self, id: String, now: Instant) {
        self.current_project_id = Some(id);
        self.dirty = false;
        self.last_change = None;
        self.last_save = Some(now);
        self.status.set(SaveStatus::Idle);
    }

    pub async fn delete(&self, id: &str) -> StorageResult<()> {
        self.storage.delete(id).await
    }

    /// Saved project ids, without the last-opened entry.
    pub async fn list_projects(&self) -> StorageResult<Vec<String>> {
        let mut ids = self.storage.list().await?;
        ids.retain(|id| id != LAST_PROJECT_KEY && !id.starts_with("__"));
        Ok(ids)
    }

    pub async fn exists(&self, id: &str) -> StorageResult<bool> {
        self.storage.exists(id).await
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

/// "just now", "N minute(s) ago" or "N hour(s) ago".
pub fn format_elapsed(elapsed: chrono::Duration) -> String {
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes} minute{} ago", if minutes > 1 { "s" } else { "" })
    } else {
        let hours = minutes / 60;
        format!("{hours} hour{} ago", if hours > 1 { "s" } else { "" })
    }
}

/// Create a platform-appropriate storage backend.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::FileStorage>> {
    Ok(Arc::new(crate::storage::FileStorage::default_location()?))
}

#[cfg(target_arch = "wasm32")]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::MemoryStorage>> {
    Ok(Arc::new(crate::storage::MemoryStorage::new()))
}

#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStorage = crate::storage::FileStorage;

#[cfg(target_arch = "wasm32")]
pub type PlatformStorage = crate::storage::MemoryStorage;

pub type PlatformAutoSaveManager = AutoSaveManager<PlatformStorage>;

pub fn create_autosave_manager() -> StorageResult<PlatformAutoSaveManager> {
    let storage = create_default_storage()?;
    Ok(AutoSaveManager::new(storage))
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::model::ProjectOptions;
    use crate::storage::{BoxFuture, MemoryStorage, StorageError, block_on};

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn save(&self, _: &str, _: &Project) -> BoxFuture<'_, StorageResult<()>> {
            Box::pin(async { Err(StorageError::Io("disk full".to_string())) })
        }

        fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Project>> {
            let id = id.to_string();
            Box::pin(async move { Err(StorageError::NotFound(id)) })
        }

        fn delete(&self, _: &str) -> BoxFuture<'_, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
            Box::pin(async { Ok(vec![]) })
        }

        fn exists(&self, _: &str) -> BoxFuture<'_, StorageResult<bool>> {
            Box::pin(async { Ok(false) })
        }
    }

    fn project(name: &str) -> Project {
        Project::new(ProjectOptions {
            name: Some(name.to_string()),
            ..ProjectOptions::default()
        })
        .unwrap()
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_autosave_manager_creation() {
        let manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        assert!(!manager.is_dirty());
        assert!(!manager.should_save(Instant::now()));
        assert_eq!(manager.status_text(Utc::now()), "No changes");
    }

    #[test]
    fn test_debounce_waits_for_quiet_period() {
        let mut manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        let t0 = Instant::now();
        manager.mark_dirty(t0);
        assert!(!manager.should_save(t0 + ms(1500)));
        manager.mark_dirty(t0 + ms(1500));
        assert!(!manager.should_save(t0 + ms(3000)));
        assert!(manager.should_save(t0 + ms(3500)));
        assert_eq!(manager.status_text(Utc::now()), "Unsaved changes");
    }

    #[test]
    fn test_save_clears_dirty_and_reports() {
        let mut manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        let project = project("Bounce");
        let t0 = Instant::now();
        manager.mark_dirty(t0);

        assert!(block_on(manager.maybe_save(&project, t0 + ms(2000))).unwrap());
        assert!(!manager.is_dirty());
        assert_eq!(*manager.status(), SaveStatus::Saved);
        assert_eq!(manager.status_text(Utc::now()), "All changes saved");

        manager.settle(t0 + ms(5000));
        assert_eq!(*manager.status(), SaveStatus::Idle);
        assert_eq!(manager.status_text(Utc::now()), "Last saved: just now");
    }

    #[test]
    fn test_failed_save_sets_error_status() {
        let mut manager = AutoSaveManager::new(Arc::new(FailingStorage));
        let project = project("Doomed");
        let t0 = Instant::now();
        manager.mark_dirty(t0);

        assert!(block_on(manager.maybe_save(&project, t0 + ms(2000))).is_err());
        assert!(manager.is_dirty());
        assert_eq!(
            manager.status_text(Utc::now()),
            "Save failed: IO error: disk full"
        );
    }

    #[test]
    fn test_load_last() {
        let mut manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        let t0 = Instant::now();
        block_on(manager.save(&project("Title card"), t0)).unwrap();

        let mut second = AutoSaveManager::new(manager.storage().clone());
        let loaded = block_on(second.load_last(t0)).unwrap();
        assert_eq!(loaded.name, "Title card");
        assert_eq!(second.project_id(), Some(loaded.id.to_string().as_str()));
    }

    #[test]
    fn test_list_excludes_last_project_key() {
        let mut manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        block_on(manager.save(&project("One"), Instant::now())).unwrap();
        let ids = block_on(manager.list_projects()).unwrap();
        assert_eq!(ids.len(), 1);
        assert!(!ids.contains(&LAST_PROJECT_KEY.to_string()));
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(chrono::Duration::seconds(30)), "just now");
        assert_eq!(format_elapsed(chrono::Duration::minutes(1)), "1 minute ago");
        assert_eq!(format_elapsed(chrono::Duration::minutes(5)), "5 minutes ago");
        assert_eq!(format_elapsed(chrono::Duration::minutes(60)), "1 hour ago");
        assert_eq!(format_elapsed(chrono::Duration::hours(3)), "3 hours ago");
    }
}
