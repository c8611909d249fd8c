//! services/app/src/adapters/seed.rs
//!
//! Loading of the initial catalog: either a JSON file named by the configuration
//! or a small built-in dataset for local runs.

use std::path::Path;

use chrono::{Duration, Utc};
use novaread_core::commands::NovelDraft;
use novaread_core::domain::{Chapter, Comment, Novel, NovelStatus, Review, Role, User};
use novaread_core::input::ListInput;
use serde::Deserialize;

use crate::error::AppError;

/// A sign-in for a seeded user. Hashed by the auth adapter at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedAccount {
    pub user_id: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogSeed {
    pub novels: Vec<Novel>,
    pub chapters: Vec<Chapter>,
    pub reviews: Vec<Review>,
    pub comments: Vec<Comment>,
    pub users: Vec<User>,
    pub accounts: Vec<SeedAccount>,
}

impl CatalogSeed {
    pub async fn from_path(path: &Path) -> Result<Self, AppError> {
        let raw = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Two novels, a handful of chapters and an admin plus a reader account.
    pub fn demo() -> Self {
        let now = Utc::now();

        let mut ashen = NovelDraft {
            title: "The Ashen Crown".to_string(),
            author: "Mara Voss".to_string(),
            synopsis: "<p>A disgraced knight guards the last ember of a fallen kingdom.</p>"
                .to_string(),
            genres: ListInput::from("Action, Fantasy"),
            tags: ListInput::from("Knights, Revenge"),
            status: NovelStatus::Ongoing,
            ..Default::default()
        }
        .into_novel("ashen-crown".to_string(), now - Duration::days(2));
        ashen.views = 12_400;
        ashen.rating = 4.6;
        ashen.rating_count = 210;

        let mut tides = NovelDraft {
            title: "Tides of Quiet Stars".to_string(),
            author: "Ilya Renn".to_string(),
            synopsis: "<p>A lighthouse keeper charts a sea that moves between worlds.</p>"
                .to_string(),
            genres: ListInput::from("Sci-Fi, Fantasy"),
            tags: ListInput::from("Slow Burn"),
            status: NovelStatus::Completed,
            ..Default::default()
        }
        .into_novel("quiet-stars".to_string(), now - Duration::days(5));
        tides.views = 3_100;
        tides.rating = 4.2;
        tides.rating_count = 64;

        let chapters = (1..=3)
            .map(|n| demo_chapter("ashen-crown", "ac", n, now))
            .chain((1..=2).map(|n| demo_chapter("quiet-stars", "qs", n, now)))
            .collect();

        let mut admin = User::new("admin", "curator", "admin@novaread.dev");
        admin.role = Role::Admin;
        let reader = User::new("reader", "nightowl", "reader@novaread.dev");

        CatalogSeed {
            novels: vec![ashen, tides],
            chapters,
            reviews: Vec::new(),
            comments: Vec::new(),
            users: vec![admin, reader],
            accounts: vec![
                SeedAccount {
                    user_id: "admin".to_string(),
                    password: "admin-pass".to_string(),
                },
                SeedAccount {
                    user_id: "reader".to_string(),
                    password: "reader-pass".to_string(),
                },
            ],
        }
    }
}

fn demo_chapter(novel_id: &str, prefix: &str, number: u32, now: chrono::DateTime<Utc>) -> Chapter {
    Chapter {
        id: format!("{}-{}", prefix, number),
        novel_id: novel_id.to_string(),
        title: format!("Chapter {}", number),
        content: format!("<p>Chapter {} begins here.</p>", number),
        chapter_number: number,
        release_date: now - Duration::days(10 - i64::from(number)),
        views: 0,
        comments: 0,
    }
}
