//! services/app/src/adapters/memory.rs
//!
//! This module contains the in-memory catalog adapter, the concrete implementation
//! of the `CatalogService` port from the `core` crate. The whole dataset sits
//! behind one lock, so every mutation lands as a unit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use novaread_core::commands::{ChapterDraft, ChapterPatch, NovelDraft, NovelPatch};
use novaread_core::domain::{
    Chapter, ChapterDetails, Comment, Novel, NovelDetails, ReadingProgress, Review, Role, User,
};
use novaread_core::ports::{CatalogService, PortError, PortResult};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::adapters::seed::CatalogSeed;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Debug, Default)]
struct CatalogData {
    novels: Vec<Novel>,
    chapters: Vec<Chapter>,
    reviews: Vec<Review>,
    comments: Vec<Comment>,
    users: Vec<User>,
}

/// A catalog adapter that keeps novels, chapters and users in process memory.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    data: RwLock<CatalogData>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from seed data, re-deriving every `latest_chapter_number`.
    pub fn from_seed(seed: CatalogSeed) -> Self {
        let mut data = CatalogData {
            novels: seed.novels,
            chapters: seed.chapters,
            reviews: seed.reviews,
            comments: seed.comments,
            users: seed.users,
        };
        for novel in data.novels.iter_mut() {
            novel.recompute_latest(&data.chapters);
        }
        Self {
            data: RwLock::new(data),
        }
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn novel_not_found(novel_id: &str) -> PortError {
    PortError::NotFound(format!("Novel {} not found", novel_id))
}

fn chapter_not_found(chapter_id: &str) -> PortError {
    PortError::NotFound(format!("Chapter {} not found", chapter_id))
}

fn user_not_found(user_id: &str) -> PortError {
    PortError::NotFound(format!("User {} not found", user_id))
}

/// Re-derives the owning novel's latest chapter number after a chapter mutation.
fn refresh_novel(novels: &mut [Novel], chapters: &[Chapter], novel_id: &str, now: DateTime<Utc>) {
    if let Some(novel) = novels.iter_mut().find(|n| n.id == novel_id) {
        novel.recompute_latest(chapters);
        novel.updated_at = now;
    }
}

//=========================================================================================
// `CatalogService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CatalogService for MemoryCatalog {
    async fn list_novels(&self) -> PortResult<Vec<Novel>> {
        Ok(self.data.read().await.novels.clone())
    }

    async fn novel_details(&self, novel_id: &str) -> PortResult<Option<NovelDetails>> {
        let data = self.data.read().await;
        let Some(novel) = data.novels.iter().find(|n| n.id == novel_id) else {
            return Ok(None);
        };
        let mut chapters: Vec<Chapter> = data
            .chapters
            .iter()
            .filter(|c| c.novel_id == novel_id)
            .cloned()
            .collect();
        chapters.sort_by_key(|c| c.chapter_number);
        let reviews = data
            .reviews
            .iter()
            .filter(|r| r.novel_id == novel_id)
            .cloned()
            .collect();
        Ok(Some(NovelDetails {
            novel: novel.clone(),
            chapters,
            reviews,
        }))
    }

    async fn create_novel(&self, draft: NovelDraft) -> PortResult<Novel> {
        let novel = draft.into_novel(new_id(), Utc::now());
        self.data.write().await.novels.push(novel.clone());
        debug!("Created novel {}", novel.id);
        Ok(novel)
    }

    async fn update_novel(&self, novel_id: &str, patch: NovelPatch) -> PortResult<Novel> {
        let mut data = self.data.write().await;
        let novel = data
            .novels
            .iter_mut()
            .find(|n| n.id == novel_id)
            .ok_or_else(|| novel_not_found(novel_id))?;
        patch.apply_to(novel, Utc::now());
        Ok(novel.clone())
    }

    async fn delete_novel(&self, novel_id: &str) -> PortResult<()> {
        let mut data = self.data.write().await;
        let index = data
            .novels
            .iter()
            .position(|n| n.id == novel_id)
            .ok_or_else(|| novel_not_found(novel_id))?;
        data.novels.remove(index);

        let mut orphaned_targets: Vec<String> = data
            .chapters
            .iter()
            .filter(|c| c.novel_id == novel_id)
            .map(|c| c.id.clone())
            .collect();
        orphaned_targets.extend(
            data.reviews
                .iter()
                .filter(|r| r.novel_id == novel_id)
                .map(|r| r.id.clone()),
        );

        data.chapters.retain(|c| c.novel_id != novel_id);
        data.reviews.retain(|r| r.novel_id != novel_id);
        data.comments
            .retain(|comment| !orphaned_targets.contains(&comment.target_id));
        debug!(
            "Deleted novel {} and {} dependent chapters/reviews",
            novel_id,
            orphaned_targets.len()
        );
        Ok(())
    }

    async fn chapter_details(&self, chapter_id: &str) -> PortResult<Option<ChapterDetails>> {
        let data = self.data.read().await;
        let Some(chapter) = data.chapters.iter().find(|c| c.id == chapter_id) else {
            return Ok(None);
        };
        let mut comments: Vec<Comment> = data
            .comments
            .iter()
            .filter(|c| c.target_id == chapter_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(Some(ChapterDetails {
            chapter: chapter.clone(),
            comments,
        }))
    }

    async fn create_chapter(&self, draft: ChapterDraft) -> PortResult<Chapter> {
        let mut data = self.data.write().await;
        if !data.novels.iter().any(|n| n.id == draft.novel_id) {
            return Err(novel_not_found(&draft.novel_id));
        }
        let now = Utc::now();
        let chapter = draft.into_chapter(new_id(), now);
        data.chapters.push(chapter.clone());

        let CatalogData {
            novels, chapters, ..
        } = &mut *data;
        refresh_novel(novels, chapters, &chapter.novel_id, now);
        Ok(chapter)
    }

    async fn update_chapter(&self, chapter_id: &str, patch: ChapterPatch) -> PortResult<Chapter> {
        let mut data = self.data.write().await;
        if let Some(target) = patch.novel_id.as_deref() {
            if !data.novels.iter().any(|n| n.id == target) {
                return Err(novel_not_found(target));
            }
        }
        let now = Utc::now();
        let CatalogData {
            novels, chapters, ..
        } = &mut *data;

        let chapter = chapters
            .iter_mut()
            .find(|c| c.id == chapter_id)
            .ok_or_else(|| chapter_not_found(chapter_id))?;
        let previous_owner = chapter.novel_id.clone();
        patch.apply_to(chapter);
        let updated = chapter.clone();

        refresh_novel(novels, chapters, &updated.novel_id, now);
        if previous_owner != updated.novel_id {
            refresh_novel(novels, chapters, &previous_owner, now);
        }
        Ok(updated)
    }

    async fn delete_chapter(&self, chapter_id: &str) -> PortResult<()> {
        let mut data = self.data.write().await;
        let index = data
            .chapters
            .iter()
            .position(|c| c.id == chapter_id)
            .ok_or_else(|| chapter_not_found(chapter_id))?;
        let removed = data.chapters.remove(index);
        data.comments.retain(|c| c.target_id != chapter_id);

        let CatalogData {
            novels, chapters, ..
        } = &mut *data;
        refresh_novel(novels, chapters, &removed.novel_id, Utc::now());
        Ok(())
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        Ok(self.data.read().await.users.clone())
    }

    async fn get_user(&self, user_id: &str) -> PortResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn insert_user(&self, user: User) -> PortResult<User> {
        let mut data = self.data.write().await;
        if data.users.iter().any(|u| u.id == user.id) {
            return Err(PortError::Conflict(format!("User {} already exists", user.id)));
        }
        data.users.push(user.clone());
        Ok(user)
    }

    async fn update_user_role(&self, user_id: &str, role: Role) -> PortResult<User> {
        let mut data = self.data.write().await;
        let user = data
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| user_not_found(user_id))?;
        user.role = role;
        Ok(user.clone())
    }

    async fn toggle_user_ban(&self, user_id: &str) -> PortResult<User> {
        let mut data = self.data.write().await;
        let user = data
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| user_not_found(user_id))?;
        user.is_banned = !user.is_banned;
        Ok(user.clone())
    }

    async fn delete_user(&self, user_id: &str) -> PortResult<()> {
        let mut data = self.data.write().await;
        let before = data.users.len();
        data.users.retain(|u| u.id != user_id);
        if data.users.len() == before {
            return Err(user_not_found(user_id));
        }
        Ok(())
    }

    async fn save_reading_progress(
        &self,
        user_id: &str,
        progress: ReadingProgress,
    ) -> PortResult<()> {
        let mut data = self.data.write().await;
        let user = data
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| user_not_found(user_id))?;
        user.record_progress(progress);
        Ok(())
    }
}
