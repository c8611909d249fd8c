//! crates/novaread_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! runtime to stay independent of where the catalog and credentials live.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::commands::{ChapterDraft, ChapterPatch, NovelDraft, NovelPatch};
use crate::domain::{
    AuthSession, Chapter, ChapterDetails, Novel, NovelDetails, ReadingProgress, Role, User,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("This account has been banned")]
    Banned,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The novel/chapter/user dataset.
///
/// Every mutation is applied as a whole or not at all. Reads of composite views
/// return `Ok(None)` for a missing id instead of an error.
#[async_trait]
pub trait CatalogService: Send + Sync {
    // --- Novels ---
    async fn list_novels(&self) -> PortResult<Vec<Novel>>;

    /// The novel with its chapters ordered by `chapter_number` ascending, and its reviews.
    async fn novel_details(&self, novel_id: &str) -> PortResult<Option<NovelDetails>>;

    async fn create_novel(&self, draft: NovelDraft) -> PortResult<Novel>;

    async fn update_novel(&self, novel_id: &str, patch: NovelPatch) -> PortResult<Novel>;

    /// Removes the novel together with its chapters, reviews and chapter comments.
    async fn delete_novel(&self, novel_id: &str) -> PortResult<()>;

    // --- Chapters ---
    async fn chapter_details(&self, chapter_id: &str) -> PortResult<Option<ChapterDetails>>;

    async fn create_chapter(&self, draft: ChapterDraft) -> PortResult<Chapter>;

    async fn update_chapter(&self, chapter_id: &str, patch: ChapterPatch) -> PortResult<Chapter>;

    async fn delete_chapter(&self, chapter_id: &str) -> PortResult<()>;

    // --- Users ---
    async fn list_users(&self) -> PortResult<Vec<User>>;

    async fn get_user(&self, user_id: &str) -> PortResult<Option<User>>;

    async fn insert_user(&self, user: User) -> PortResult<User>;

    async fn update_user_role(&self, user_id: &str, role: Role) -> PortResult<User>;

    /// Flips the ban flag and returns the updated user.
    async fn toggle_user_ban(&self, user_id: &str) -> PortResult<User>;

    async fn delete_user(&self, user_id: &str) -> PortResult<()>;

    /// Upserts a bookmark on the catalog's copy of the user.
    async fn save_reading_progress(
        &self,
        user_id: &str,
        progress: ReadingProgress,
    ) -> PortResult<()>;
}

/// Credential checks and browser session bookkeeping.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an account. Fails with `Conflict` for a taken email or username.
    async fn register(&self, username: &str, email: &str, password: &str) -> PortResult<User>;

    /// Verifies credentials. Fails with `InvalidCredentials` or `Banned`.
    async fn authenticate(&self, email: &str, password: &str) -> PortResult<User>;

    async fn create_auth_session(
        &self,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<AuthSession>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}

/// Makes user- or editor-authored HTML safe for direct rendering.
pub trait HtmlSanitizer: Send + Sync {
    fn sanitize(&self, html: &str) -> String;
}
