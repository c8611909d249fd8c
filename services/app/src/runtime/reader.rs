//! services/app/src/runtime/reader.rs
//!
//! The reader page: the chapter with its neighbours, page-local reading settings,
//! and the throttled scroll telemetry that feeds the progress tracker.

use std::time::Duration;

use novaread_core::domain::{
    clamp_percentage, Chapter, ChapterId, Comment, Novel, ReaderSettings, ReaderTheme,
    ReadingProgress,
};
use novaread_core::ports::PortResult;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::runtime::page::PageScope;
use crate::runtime::progress::ProgressTracker;
use crate::runtime::state::AppStore;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderView {
    pub novel: Novel,
    /// `content` has been through the sanitizer.
    pub chapter: Chapter,
    pub comments: Vec<Comment>,
    pub prev_chapter_id: Option<ChapterId>,
    pub next_chapter_id: Option<ChapterId>,
    pub settings: ReaderSettings,
    pub scroll_percentage: f64,
}

/// What a progress write needs to know about the open chapter.
#[derive(Debug, Clone)]
struct Bookmark {
    novel_id: String,
    chapter_id: String,
    chapter_number: u32,
}

pub struct ReaderPage {
    view: ReaderView,
    samples: watch::Sender<f64>,
    flusher: JoinHandle<()>,
}

impl ReaderPage {
    /// Loads the chapter and its novel. `Ok(None)` if either is missing.
    pub async fn open(store: &AppStore, scope: &PageScope, chapter_id: &str) -> PortResult<Option<Self>> {
        let Some(details) = store.catalog.fetch_chapter(chapter_id).await? else {
            return Ok(None);
        };
        let Some(novel_details) = store
            .catalog
            .fetch_novel_details(&details.chapter.novel_id)
            .await?
        else {
            return Ok(None);
        };
        let (prev_chapter_id, next_chapter_id) = novel_details.neighbours(&details.chapter.id);

        let mut chapter = details.chapter;
        chapter.content = store.sanitizer.sanitize(&chapter.content);
        let settings = ReaderSettings::seeded_from(store.session.theme().await);

        let bookmark = Bookmark {
            novel_id: novel_details.novel.id.clone(),
            chapter_id: chapter.id.clone(),
            chapter_number: chapter.chapter_number,
        };
        let (samples, receiver) = watch::channel(0.0);
        let flusher = tokio::spawn(flush_progress(
            store.progress.clone(),
            receiver,
            bookmark,
            store.config.progress_threshold_pct,
            store.config.progress_flush_interval,
            scope.child_token(),
        ));
        info!("Reader opened chapter {}", chapter.id);

        Ok(Some(Self {
            view: ReaderView {
                novel: novel_details.novel,
                chapter,
                comments: details.comments,
                prev_chapter_id,
                next_chapter_id,
                settings,
                scroll_percentage: 0.0,
            },
            samples,
            flusher,
        }))
    }

    pub fn view(&self) -> &ReaderView {
        &self.view
    }

    /// Feeds a scroll measurement. Returns the resulting percentage.
    ///
    /// A page shorter than the viewport counts as fully read.
    pub fn on_scroll(&mut self, scroll_top: f64, scroll_height: f64, client_height: f64) -> f64 {
        let scrollable = scroll_height - client_height;
        let pct = if scrollable <= 0.0 {
            100.0
        } else {
            clamp_percentage(scroll_top / scrollable * 100.0)
        };
        self.set_scroll_percentage(pct)
    }

    pub fn set_scroll_percentage(&mut self, pct: f64) -> f64 {
        let pct = clamp_percentage(pct);
        self.view.scroll_percentage = pct;
        self.samples.send_replace(pct);
        pct
    }

    /// Changes the page-local theme; the global theme is untouched.
    pub fn set_theme(&mut self, theme: ReaderTheme) {
        self.view.settings.theme = theme;
    }

    pub fn is_flushing(&self) -> bool {
        !self.flusher.is_finished()
    }
}

/// Writes at most one bookmark per `interval`, always the latest sample.
/// Exits when the page's token is cancelled, writing any sample still pending.
async fn flush_progress(
    tracker: ProgressTracker,
    mut samples: watch::Receiver<f64>,
    bookmark: Bookmark,
    threshold: f64,
    interval: Duration,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            changed = samples.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
        let closing = tokio::select! {
            _ = token.cancelled() => true,
            _ = tokio::time::sleep(interval) => false,
        };
        let pct = *samples.borrow_and_update();
        if pct > threshold {
            tracker
                .update_progress(ReadingProgress::new(
                    bookmark.novel_id.clone(),
                    bookmark.chapter_id.clone(),
                    bookmark.chapter_number,
                    pct,
                ))
                .await;
        }
        if closing {
            break;
        }
    }
    debug!("Progress flusher for chapter {} stopped", bookmark.chapter_id);
}
