//! services/app/src/runtime/progress.rs
//!
//! The reading progress tracker. Writes bookmarks onto the signed-in user and
//! mirrors them into the catalog's user list.

use std::sync::Arc;

use novaread_core::domain::ReadingProgress;
use novaread_core::ports::CatalogService;
use tracing::{debug, warn};

use crate::runtime::session::SessionStore;

#[derive(Clone)]
pub struct ProgressTracker {
    session: SessionStore,
    catalog: Arc<dyn CatalogService>,
}

impl ProgressTracker {
    pub fn new(session: SessionStore, catalog: Arc<dyn CatalogService>) -> Self {
        Self { session, catalog }
    }

    /// Upserts the bookmark for `(signed-in user, progress.novel_id)`.
    ///
    /// Never fails and never notifies. Returns `false` when nobody is signed in,
    /// in which case nothing is recorded. The latest call always wins.
    pub async fn update_progress(&self, progress: ReadingProgress) -> bool {
        let Some(user_id) = self.session.record_progress(progress.clone()).await else {
            debug!("Ignoring reading progress without a signed-in user");
            return false;
        };
        debug!(
            "Progress for {} on novel {}: chapter {} at {:.0}%",
            user_id, progress.novel_id, progress.chapter_number, progress.scroll_percentage
        );
        if let Err(e) = self.catalog.save_reading_progress(&user_id, progress).await {
            warn!("Could not mirror reading progress for {}: {}", user_id, e);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::tests::fast_hasher;
    use crate::adapters::{MemoryAuth, MemoryCatalog};
    use crate::config::Config;
    use crate::runtime::notifications::NotificationQueue;
    use std::time::Duration;

    async fn tracker(signed_in: bool) -> (ProgressTracker, SessionStore, Arc<MemoryCatalog>, NotificationQueue) {
        let notifications = NotificationQueue::new(Duration::from_secs(3));
        let catalog = Arc::new(MemoryCatalog::new());
        let auth = Arc::new(MemoryAuth::with_hasher(catalog.clone(), fast_hasher()));
        let session = SessionStore::new(auth, notifications.clone(), Arc::new(Config::default()));
        if signed_in {
            session.register("nightowl", "owl@x.io", "pw").await.unwrap();
            notifications.clear().await;
        }
        let tracker = ProgressTracker::new(session.clone(), catalog.clone());
        (tracker, session, catalog, notifications)
    }

    #[tokio::test]
    async fn second_update_for_a_novel_replaces_the_first() {
        let (tracker, session, catalog, _) = tracker(true).await;
        assert!(tracker.update_progress(ReadingProgress::new("n1", "c1", 1, 45.0)).await);
        assert!(tracker.update_progress(ReadingProgress::new("n1", "c2", 2, 30.0)).await);

        let user = session.current_user().await.unwrap();
        assert_eq!(user.reading_history.len(), 1);
        assert_eq!(user.reading_history[0].chapter_id, "c2");
        assert_eq!(user.reading_history[0].scroll_percentage, 30.0);

        let mirrored = catalog.get_user(&user.id).await.unwrap().unwrap();
        assert_eq!(mirrored.reading_history, user.reading_history);
    }

    #[tokio::test]
    async fn without_a_user_nothing_is_recorded_or_announced() {
        let (tracker, session, catalog, notifications) = tracker(false).await;
        assert!(!tracker.update_progress(ReadingProgress::new("n1", "c1", 1, 80.0)).await);
        assert!(session.current_user().await.is_none());
        assert!(catalog.list_users().await.unwrap().is_empty());
        assert!(notifications.snapshot().await.is_empty());
    }
}
