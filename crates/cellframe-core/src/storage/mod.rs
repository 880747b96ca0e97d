//! Project persistence.

mod autosave;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use autosave::{
    AutoSaveManager, DEFAULT_AUTOSAVE_INTERVAL_SECS, DEFAULT_DEBOUNCE_MILLIS, LAST_PROJECT_KEY,
    PlatformAutoSaveManager, PlatformStorage, SaveStatus, create_autosave_manager,
    create_default_storage, format_elapsed,
};
pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::model::Project;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Project not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Project storage backend, keyed by id.
///
/// On native platforms, implementations must be Send + Sync.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    fn save(&self, id: &str, project: &Project) -> BoxFuture<'_, StorageResult<()>>;

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Project>>;

    /// Deleting a missing id is not an error.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Project storage backend (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    fn save(&self, id: &str, project: &Project) -> BoxFuture<'_, StorageResult<()>>;

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Project>>;

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Minimal executor for storage tests.
///
/// Every backend here completes without yielding, so polling in a loop
/// never spins for long.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(future: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    // SAFETY: the vtable functions ignore the data pointer entirely.
    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut future = std::pin::pin!(future);

    loop {
        if let Poll::Ready(result) = future.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
