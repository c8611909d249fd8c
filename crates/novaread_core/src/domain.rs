//! crates/novaread_core/src/domain.rs
//!
//! Defines the pure, core data structures for the reading platform.
//! These structs are independent of any storage or presentation layer; the
//! serde attributes only fix the camelCase shape used by seed files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type NovelId = String;
pub type ChapterId = String;
pub type UserId = String;

//=========================================================================================
// Users, Roles and Preferences
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// The other role, used by the admin panel's promote/demote action.
    pub fn flipped(self) -> Self {
        match self {
            Role::User => Role::Admin,
            Role::Admin => Role::User,
        }
    }
}

/// The process-wide theme. Exactly two values, no intermediate states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    #[default]
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("'{}' is not a theme (expected dark or light)", other)),
        }
    }
}

/// The reader page's own theme. Seeded from [`Theme`] on entry, then independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReaderTheme {
    Dark,
    Light,
    Sepia,
}

impl From<Theme> for ReaderTheme {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::Dark => ReaderTheme::Dark,
            Theme::Light => ReaderTheme::Light,
        }
    }
}

/// The preference stored on a user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Dark,
    Light,
    Sepia,
    #[default]
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LibraryStatus {
    Reading,
    #[serde(rename = "Plan to Read")]
    PlanToRead,
    Completed,
    Dropped,
    #[serde(rename = "On Hold")]
    OnHold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntry {
    pub novel_id: NovelId,
    pub status: LibraryStatus,
    pub added_at: DateTime<Utc>,
}

/// A per-user bookmark: the last chapter visited in a novel and how far down it was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingProgress {
    pub novel_id: NovelId,
    pub chapter_id: ChapterId,
    pub chapter_number: u32,
    pub last_read_at: DateTime<Utc>,
    /// Always within `0.0..=100.0`.
    pub scroll_percentage: f64,
}

impl ReadingProgress {
    pub fn new(
        novel_id: impl Into<NovelId>,
        chapter_id: impl Into<ChapterId>,
        chapter_number: u32,
        scroll_percentage: f64,
    ) -> Self {
        Self {
            novel_id: novel_id.into(),
            chapter_id: chapter_id.into(),
            chapter_number,
            last_read_at: Utc::now(),
            scroll_percentage: clamp_percentage(scroll_percentage),
        }
    }
}

/// Clamps a raw scroll measurement into `0..=100`; NaN counts as the top of the page.
pub fn clamp_percentage(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub library: Vec<LibraryEntry>,
    /// Most recent first, at most one entry per novel.
    #[serde(default)]
    pub reading_history: Vec<ReadingProgress>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    pub joined_at: DateTime<Utc>,
    #[serde(default)]
    pub theme_preference: ThemePreference,
    #[serde(default)]
    pub is_banned: bool,
}

impl User {
    pub fn new(id: impl Into<UserId>, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: email.into(),
            role: Role::User,
            library: Vec::new(),
            reading_history: Vec::new(),
            avatar_url: None,
            bio: None,
            joined_at: Utc::now(),
            theme_preference: ThemePreference::Auto,
            is_banned: false,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Upserts the bookmark for `progress.novel_id`.
    ///
    /// Any prior entry for the same novel is removed and the new one becomes the
    /// most recent, so the history never holds two entries for one novel.
    pub fn record_progress(&mut self, progress: ReadingProgress) {
        self.reading_history
            .retain(|entry| entry.novel_id != progress.novel_id);
        self.reading_history.insert(0, progress);
    }

    pub fn progress_for(&self, novel_id: &str) -> Option<&ReadingProgress> {
        self.reading_history
            .iter()
            .find(|entry| entry.novel_id == novel_id)
    }
}

//=========================================================================================
// Catalog Entities
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NovelStatus {
    #[default]
    Ongoing,
    Completed,
    Hiatus,
}

impl std::str::FromStr for NovelStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ongoing" => Ok(NovelStatus::Ongoing),
            "completed" => Ok(NovelStatus::Completed),
            "hiatus" => Ok(NovelStatus::Hiatus),
            other => Err(format!("unknown novel status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Novel {
    pub id: NovelId,
    pub title: String,
    pub synopsis: String,
    pub author: String,
    #[serde(default)]
    pub cover_url: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: NovelStatus,

    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub rating_count: u64,
    #[serde(default)]
    pub saves: u64,
    #[serde(default)]
    pub daily_votes: u64,
    #[serde(default)]
    pub weekly_votes: u64,
    #[serde(default)]
    pub all_time_votes: u64,

    pub updated_at: DateTime<Utc>,
    /// Derived: the highest `chapter_number` among the novel's chapters.
    #[serde(default)]
    pub latest_chapter_number: u32,
}

impl Novel {
    /// Re-derives `latest_chapter_number` from the given chapters of this novel.
    ///
    /// Chapters of other novels are ignored. With no chapters left the previous
    /// value is kept.
    pub fn recompute_latest<'a>(&mut self, chapters: impl IntoIterator<Item = &'a Chapter>) {
        let latest = chapters
            .into_iter()
            .filter(|chapter| chapter.novel_id == self.id)
            .map(|chapter| chapter.chapter_number)
            .max();
        if let Some(latest) = latest {
            self.latest_chapter_number = latest;
        }
    }

    pub fn shares_genre_with(&self, other: &Novel) -> bool {
        self.genres.iter().any(|genre| other.genres.contains(genre))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: ChapterId,
    pub novel_id: NovelId,
    pub title: String,
    /// Raw rich-text HTML as produced by the editor. Sanitize before display.
    pub content: String,
    pub chapter_number: u32,
    pub release_date: DateTime<Utc>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub comments: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub novel_id: NovelId,
    pub user_id: UserId,
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// 1 to 5.
    pub rating: u8,
    pub content: String,
    #[serde(default)]
    pub is_spoiler: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub liked_by: Vec<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    /// Chapter id or review id.
    pub target_id: String,
    pub user_id: UserId,
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub liked_by: Vec<UserId>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

//=========================================================================================
// Composite Read Views
//=========================================================================================

/// Everything the novel detail page needs. Chapters are ordered by `chapter_number`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelDetails {
    pub novel: Novel,
    pub chapters: Vec<Chapter>,
    pub reviews: Vec<Review>,
}

impl NovelDetails {
    /// Previous and next chapter ids around `chapter_id` in reading order.
    pub fn neighbours(&self, chapter_id: &str) -> (Option<ChapterId>, Option<ChapterId>) {
        let Some(index) = self.chapters.iter().position(|c| c.id == chapter_id) else {
            return (None, None);
        };
        let prev = index
            .checked_sub(1)
            .and_then(|i| self.chapters.get(i))
            .map(|c| c.id.clone());
        let next = self.chapters.get(index + 1).map(|c| c.id.clone());
        (prev, next)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDetails {
    pub chapter: Chapter,
    pub comments: Vec<Comment>,
}

//=========================================================================================
// Sessions and Reader Settings
//=========================================================================================

// Represents a signed-in browser session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub id: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    Sans,
    Serif,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderSettings {
    pub font_size: u32,
    pub line_height: f32,
    pub paragraph_spacing: u32,
    pub text_align: TextAlign,
    pub font_family: FontFamily,
    pub theme: ReaderTheme,
    pub max_width: u32,
}

impl ReaderSettings {
    /// Default reading layout with the theme seeded from the global one.
    pub fn seeded_from(theme: Theme) -> Self {
        Self {
            font_size: 18,
            line_height: 1.8,
            paragraph_spacing: 24,
            text_align: TextAlign::Left,
            font_family: FontFamily::Sans,
            theme: theme.into(),
            max_width: 800,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(id: &str, novel_id: &str, number: u32) -> Chapter {
        Chapter {
            id: id.to_string(),
            novel_id: novel_id.to_string(),
            title: format!("Chapter {}", number),
            content: String::new(),
            chapter_number: number,
            release_date: Utc::now(),
            views: 0,
            comments: 0,
        }
    }

    #[test]
    fn record_progress_replaces_entry_for_same_novel() {
        let mut user = User::new("u1", "reader", "reader@example.com");
        user.record_progress(ReadingProgress::new("n1", "c1", 1, 25.0));
        user.record_progress(ReadingProgress::new("n2", "c9", 9, 50.0));
        user.record_progress(ReadingProgress::new("n1", "c2", 2, 10.0));

        assert_eq!(user.reading_history.len(), 2);
        assert_eq!(user.reading_history[0].chapter_id, "c2");
        assert_eq!(user.reading_history[0].scroll_percentage, 10.0);
        assert_eq!(user.reading_history[1].novel_id, "n2");
    }

    #[test]
    fn recompute_latest_ignores_other_novels_and_keeps_value_when_empty() {
        let mut novel = Novel {
            id: "n1".to_string(),
            title: "T".to_string(),
            synopsis: String::new(),
            author: "A".to_string(),
            cover_url: String::new(),
            genres: vec![],
            tags: vec![],
            status: NovelStatus::Ongoing,
            views: 0,
            rating: 0.0,
            rating_count: 0,
            saves: 0,
            daily_votes: 0,
            weekly_votes: 0,
            all_time_votes: 0,
            updated_at: Utc::now(),
            latest_chapter_number: 0,
        };
        let chapters = vec![chapter("a", "n1", 3), chapter("b", "n2", 40), chapter("c", "n1", 7)];
        novel.recompute_latest(&chapters);
        assert_eq!(novel.latest_chapter_number, 7);

        novel.recompute_latest(&Vec::<Chapter>::new());
        assert_eq!(novel.latest_chapter_number, 7);
    }

    #[test]
    fn reader_theme_is_seeded_from_global_theme() {
        assert_eq!(ReaderSettings::seeded_from(Theme::Dark).theme, ReaderTheme::Dark);
        assert_eq!(ReaderSettings::seeded_from(Theme::Light).theme, ReaderTheme::Light);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }

    #[test]
    fn library_status_uses_display_names_on_the_wire() {
        let json = serde_json::to_string(&LibraryStatus::PlanToRead).unwrap();
        assert_eq!(json, "\"Plan to Read\"");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
    }

    #[test]
    fn progress_percentage_is_clamped() {
        assert_eq!(ReadingProgress::new("n", "c", 1, 140.0).scroll_percentage, 100.0);
        assert_eq!(clamp_percentage(f64::NAN), 0.0);
    }
}
