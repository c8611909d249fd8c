//! services/app/src/runtime/catalog.rs
//!
//! The catalog store: CRUD over novels, chapters and users plus the derived
//! views. Every successful mutation is announced on the notification queue.

use std::sync::Arc;

use novaread_core::commands::{ChapterDraft, ChapterPatch, NovelDraft, NovelPatch};
use novaread_core::domain::{Chapter, ChapterDetails, Novel, NovelDetails, Role, User};
use novaread_core::ports::{CatalogService, PortResult};
use novaread_core::route::SearchFilters;
use novaread_core::views;
use tracing::{error, info};

use crate::runtime::notifications::NotificationQueue;
use crate::runtime::session::SessionStore;

#[derive(Clone)]
pub struct CatalogStore {
    catalog: Arc<dyn CatalogService>,
    notifications: NotificationQueue,
    session: SessionStore,
}

/// Logs a failed port call on its way back to the caller.
fn logged<T>(action: &str, result: PortResult<T>) -> PortResult<T> {
    if let Err(e) = &result {
        error!("{} failed: {}", action, e);
    }
    result
}

impl CatalogStore {
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        notifications: NotificationQueue,
        session: SessionStore,
    ) -> Self {
        Self {
            catalog,
            notifications,
            session,
        }
    }

    //=====================================================================================
    // Reads and Derived Views
    //=====================================================================================

    pub async fn novels(&self) -> PortResult<Vec<Novel>> {
        self.catalog.list_novels().await
    }

    pub async fn latest_novels(&self) -> PortResult<Vec<Novel>> {
        Ok(views::latest_novels(&self.novels().await?))
    }

    pub async fn popular_novels(&self) -> PortResult<Vec<Novel>> {
        Ok(views::popular_novels(&self.novels().await?))
    }

    pub async fn search_novels(&self, filters: &SearchFilters) -> PortResult<Vec<Novel>> {
        Ok(views::search_novels(&self.novels().await?, filters))
    }

    pub async fn suggest(&self, query: &str) -> PortResult<Vec<Novel>> {
        Ok(views::suggest(&self.novels().await?, query))
    }

    pub async fn related_novels(&self, novel: &Novel) -> PortResult<Vec<Novel>> {
        Ok(views::related_novels(&self.novels().await?, novel))
    }

    /// `Ok(None)` when no novel has this id.
    pub async fn fetch_novel_details(&self, novel_id: &str) -> PortResult<Option<NovelDetails>> {
        self.catalog.novel_details(novel_id).await
    }

    /// `Ok(None)` when no chapter has this id.
    pub async fn fetch_chapter(&self, chapter_id: &str) -> PortResult<Option<ChapterDetails>> {
        self.catalog.chapter_details(chapter_id).await
    }

    //=====================================================================================
    // Novels
    //=====================================================================================

    pub async fn add_novel(&self, draft: NovelDraft) -> PortResult<Novel> {
        let novel = logged("add_novel", self.catalog.create_novel(draft).await)?;
        info!("Novel {} added", novel.id);
        self.notifications.success("Novel added").await;
        Ok(novel)
    }

    pub async fn update_novel(&self, novel_id: &str, patch: NovelPatch) -> PortResult<Novel> {
        let novel = logged("update_novel", self.catalog.update_novel(novel_id, patch).await)?;
        info!("Novel {} updated", novel.id);
        self.notifications.success("Updated").await;
        Ok(novel)
    }

    /// Deletes the novel and all of its chapters.
    pub async fn delete_novel(&self, novel_id: &str) -> PortResult<()> {
        logged("delete_novel", self.catalog.delete_novel(novel_id).await)?;
        info!("Novel {} deleted", novel_id);
        self.notifications.success("Deleted").await;
        Ok(())
    }

    //=====================================================================================
    // Chapters
    //=====================================================================================

    pub async fn add_chapter(&self, draft: ChapterDraft) -> PortResult<Chapter> {
        let chapter = logged("add_chapter", self.catalog.create_chapter(draft).await)?;
        info!("Chapter {} added to novel {}", chapter.id, chapter.novel_id);
        self.notifications.success("Chapter added").await;
        Ok(chapter)
    }

    pub async fn update_chapter(&self, chapter_id: &str, patch: ChapterPatch) -> PortResult<Chapter> {
        let chapter = logged(
            "update_chapter",
            self.catalog.update_chapter(chapter_id, patch).await,
        )?;
        info!("Chapter {} updated", chapter.id);
        self.notifications.success("Chapter updated").await;
        Ok(chapter)
    }

    pub async fn delete_chapter(&self, chapter_id: &str) -> PortResult<()> {
        logged("delete_chapter", self.catalog.delete_chapter(chapter_id).await)?;
        info!("Chapter {} deleted", chapter_id);
        self.notifications.success("Chapter deleted").await;
        Ok(())
    }

    //=====================================================================================
    // Users
    //=====================================================================================

    pub async fn get_all_users(&self) -> PortResult<Vec<User>> {
        self.catalog.list_users().await
    }

    pub async fn update_user_role(&self, user_id: &str, role: Role) -> PortResult<User> {
        let user = logged(
            "update_user_role",
            self.catalog.update_user_role(user_id, role).await,
        )?;
        self.session.sync_user(&user).await;
        info!("User {} is now {:?}", user.id, user.role);
        self.notifications.success("Role updated").await;
        Ok(user)
    }

    pub async fn delete_user(&self, user_id: &str) -> PortResult<()> {
        logged("delete_user", self.catalog.delete_user(user_id).await)?;
        self.session.evict(user_id).await;
        info!("User {} deleted", user_id);
        self.notifications.success("User deleted").await;
        Ok(())
    }

    /// Toggles the ban flag; applying it twice restores the original value.
    pub async fn ban_user(&self, user_id: &str) -> PortResult<User> {
        let user = logged("ban_user", self.catalog.toggle_user_ban(user_id).await)?;
        self.session.sync_user(&user).await;
        let message = if user.is_banned {
            "User banned"
        } else {
            "User unbanned"
        };
        info!("{}: {}", message, user.id);
        self.notifications.success(message).await;
        Ok(user)
    }
}
