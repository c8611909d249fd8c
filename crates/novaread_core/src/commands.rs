//! crates/novaread_core/src/commands.rs
//!
//! Payloads for the catalog's mutating operations. Drafts create entities,
//! patches change only the fields they carry.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{Chapter, ChapterId, Novel, NovelId, NovelStatus};
use crate::input::ListInput;

/// Create a novel.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NovelDraft {
    pub title: String,
    pub author: String,
    pub synopsis: String,
    pub cover_url: String,
    pub genres: ListInput,
    pub tags: ListInput,
    pub status: NovelStatus,
}

impl NovelDraft {
    pub fn into_novel(self, id: NovelId, now: DateTime<Utc>) -> Novel {
        Novel {
            id,
            title: self.title,
            synopsis: self.synopsis,
            author: self.author,
            cover_url: self.cover_url,
            genres: self.genres.normalize(),
            tags: self.tags.normalize(),
            status: self.status,
            views: 0,
            rating: 0.0,
            rating_count: 0,
            saves: 0,
            daily_votes: 0,
            weekly_votes: 0,
            all_time_votes: 0,
            updated_at: now,
            latest_chapter_number: 0,
        }
    }
}

/// Edit a novel.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NovelPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub synopsis: Option<String>,
    pub cover_url: Option<String>,
    pub genres: Option<ListInput>,
    pub tags: Option<ListInput>,
    pub status: Option<NovelStatus>,
}

impl NovelPatch {
    pub fn apply_to(self, novel: &mut Novel, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            novel.title = title;
        }
        if let Some(author) = self.author {
            novel.author = author;
        }
        if let Some(synopsis) = self.synopsis {
            novel.synopsis = synopsis;
        }
        if let Some(cover_url) = self.cover_url {
            novel.cover_url = cover_url;
        }
        if let Some(genres) = self.genres {
            novel.genres = genres.normalize();
        }
        if let Some(tags) = self.tags {
            novel.tags = tags.normalize();
        }
        if let Some(status) = self.status {
            novel.status = status;
        }
        novel.updated_at = now;
    }
}

/// Create a chapter. `chapter_number` is taken as given: no uniqueness or gap checks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChapterDraft {
    pub novel_id: NovelId,
    pub title: String,
    pub content: String,
    pub chapter_number: u32,
    pub release_date: Option<DateTime<Utc>>,
}

impl ChapterDraft {
    pub fn into_chapter(self, id: ChapterId, now: DateTime<Utc>) -> Chapter {
        Chapter {
            id,
            novel_id: self.novel_id,
            title: self.title,
            content: self.content,
            chapter_number: self.chapter_number,
            release_date: self.release_date.unwrap_or(now),
            views: 0,
            comments: 0,
        }
    }
}

/// Edit a chapter. Setting `novel_id` moves it to another novel.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChapterPatch {
    pub novel_id: Option<NovelId>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub chapter_number: Option<u32>,
    pub release_date: Option<DateTime<Utc>>,
}

impl ChapterPatch {
    pub fn apply_to(self, chapter: &mut Chapter) {
        if let Some(novel_id) = self.novel_id {
            chapter.novel_id = novel_id;
        }
        if let Some(title) = self.title {
            chapter.title = title;
        }
        if let Some(content) = self.content {
            chapter.content = content;
        }
        if let Some(chapter_number) = self.chapter_number {
            chapter.chapter_number = chapter_number;
        }
        if let Some(release_date) = self.release_date {
            chapter.release_date = release_date;
        }
    }
}
