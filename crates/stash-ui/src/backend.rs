//! Backend integration for Stash.
//!
//! Bridges the UI and the item library. The `Backend` trait is
//! GPUI-independent and mockable for testing.
//!
//! ## Reactive State
//!
//! The library broadcasts snapshots via `tokio::sync::watch` after every
//! mutation. The window subscribes and feeds them to the panel as props.

use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::watch;

use stash_core::MyStuffIntent;
use stash_library::{Library, LibraryError, LibrarySnapshot, Outcome};

/// Library state broadcast to the UI.
pub type BackendState = LibrarySnapshot;

// =============================================================================
// Backend Trait
// =============================================================================

/// Trait for backend operations.
///
/// Returns futures so the caller decides where they run; the window runs
/// them on GPUI's background executor since they touch the filesystem.
pub trait Backend: Send + Sync {
    /// Subscribe to state changes. Clone the receiver for each subscriber.
    fn subscribe(&self) -> watch::Receiver<BackendState>;

    /// Perform the side effect of a view intent.
    fn apply(&self, intent: MyStuffIntent) -> BoxFuture<'static, Result<Outcome, LibraryError>>;
}

// =============================================================================
// Library Backend
// =============================================================================

pub struct LibraryBackend {
    library: Arc<Library>,
}

impl LibraryBackend {
    pub fn new(library: Arc<Library>) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &Arc<Library> {
        &self.library
    }
}

impl Backend for LibraryBackend {
    fn subscribe(&self) -> watch::Receiver<BackendState> {
        self.library.subscribe()
    }

    fn apply(&self, intent: MyStuffIntent) -> BoxFuture<'static, Result<Outcome, LibraryError>> {
        let library = self.library.clone();
        Box::pin(async move { library.apply(intent) })
    }
}

// =============================================================================
// Mock Backend for Testing
// =============================================================================

#[cfg(test)]
pub mod mock {
    use super::*;
    use parking_lot::Mutex;
    use stash_core::Folders;

    /// Records intents and answers with a fixed outcome.
    pub struct MockBackend {
        pub applied: Arc<Mutex<Vec<MyStuffIntent>>>,
        state_tx: watch::Sender<BackendState>,
        state_rx: watch::Receiver<BackendState>,
    }

    impl MockBackend {
        pub fn new(folders: Folders) -> Self {
            let (state_tx, state_rx) = watch::channel(LibrarySnapshot {
                folders,
                ..Default::default()
            });
            Self {
                applied: Arc::new(Mutex::new(Vec::new())),
                state_tx,
                state_rx,
            }
        }

        /// Push a new snapshot to subscribers.
        pub fn publish(&self, folders: Folders) {
            let _ = self.state_tx.send(LibrarySnapshot {
                folders,
                ..Default::default()
            });
        }
    }

    impl Backend for MockBackend {
        fn subscribe(&self) -> watch::Receiver<BackendState> {
            self.state_rx.clone()
        }

        fn apply(
            &self,
            intent: MyStuffIntent,
        ) -> BoxFuture<'static, Result<Outcome, LibraryError>> {
            let applied = self.applied.clone();
            Box::pin(async move {
                let folder = intent.folder().to_string();
                applied.lock().push(intent);
                Err(LibraryError::UnknownFolder(folder))
            })
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;
    use stash_core::{Folders, Item};

    fn folders() -> Folders {
        vec![("A".to_string(), vec![Item::new("1", "Foo", "note", 10)])]
            .into_iter()
            .collect()
    }

    #[tokio::test]
    async fn test_library_backend_applies_and_broadcasts() {
        let backend = LibraryBackend::new(Arc::new(Library::in_memory(folders())));
        let mut rx = backend.subscribe();

        let outcome = backend
            .apply(MyStuffIntent::Add { folder: "A".into() })
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Added(_)));

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().folders.items("A").len(), 2);
    }

    #[tokio::test]
    async fn test_library_backend_reports_errors() {
        let backend = LibraryBackend::new(Arc::new(Library::in_memory(folders())));
        let err = backend
            .apply(MyStuffIntent::Undo {
                folder: "A".into(),
                item: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::NothingToUndo));
    }

    #[tokio::test]
    async fn test_mock_backend_records_intents() {
        let backend = MockBackend::new(folders());
        let _ = backend
            .apply(MyStuffIntent::Add { folder: "A".into() })
            .await;
        assert_eq!(backend.applied.lock().len(), 1);

        let mut rx = backend.subscribe();
        backend.publish(Folders::new());
        rx.changed().await.unwrap();
        assert!(rx.borrow().folders.is_empty());
    }
}
