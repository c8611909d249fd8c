//! End-to-end scenarios driven through the shell and the store, the way a page would.

use std::time::Duration;

use app_lib::adapters::CatalogSeed;
use app_lib::config::Config;
use app_lib::runtime::{AppStore, PageView, Severity, Shell};
use argon2::{Algorithm, Argon2, Params, Version};
use novaread_core::commands::{ChapterDraft, ChapterPatch, NovelDraft};
use novaread_core::domain::{ReadingProgress, Role};
use novaread_core::route::{PageId, Route};

fn cheap_hasher() -> Argon2<'static> {
    Argon2::new(
        Algorithm::Argon2id,
        Version::V0x13,
        Params::new(1024, 1, 1, None).unwrap(),
    )
}

async fn demo_store() -> AppStore {
    AppStore::in_memory_with_hasher(Config::default(), CatalogSeed::demo(), cheap_hasher())
        .await
        .unwrap()
}

async fn admin_shell() -> Shell {
    let mut shell = Shell::new(demo_store().await, "#/");
    shell
        .submit_login("admin@novaread.dev", "admin-pass", false)
        .await
        .unwrap();
    shell.navigate("#/admin").await;
    shell.store().notifications.clear().await;
    shell
}

fn chapter(novel_id: &str, number: u32) -> ChapterDraft {
    ChapterDraft {
        novel_id: novel_id.to_string(),
        title: format!("Chapter {}", number),
        content: "<p>text</p>".to_string(),
        chapter_number: number,
        release_date: None,
    }
}

#[tokio::test]
async fn admin_genre_input_is_split_trimmed_and_ordered() {
    let mut shell = admin_shell().await;
    let draft: NovelDraft = serde_json::from_str(
        r#"{"title": "Iron Choir", "author": "K. Lund", "genres": "Action, Fantasy, Sci-Fi"}"#,
    )
    .unwrap();

    let catalog = shell.store().catalog.clone();
    let novel = shell.admin(catalog.add_novel(draft)).await.unwrap();
    assert_eq!(novel.genres, vec!["Action", "Fantasy", "Sci-Fi"]);

    let stored = catalog.fetch_novel_details(&novel.id).await.unwrap().unwrap();
    assert_eq!(stored.novel.genres, novel.genres);

    let queued = shell.store().notifications.snapshot().await;
    assert_eq!(queued[0].message, "Novel added");
    let Some(PageView::Admin(admin)) = shell.view() else {
        panic!("admin page should stay open");
    };
    assert!(admin.novels.iter().any(|n| n.id == novel.id));
}

#[tokio::test(start_paused = true)]
async fn anonymous_reader_scrolling_records_nothing() {
    let mut shell = Shell::new(demo_store().await, "#/read/ac-2");
    assert!(matches!(shell.start().await, PageView::Reader(_)));

    assert_eq!(shell.set_scroll_percentage(35.0), Some(35.0));
    assert_eq!(shell.scroll(900.0, 2000.0, 1000.0), Some(90.0));
    tokio::time::sleep(Duration::from_millis(700)).await;

    assert!(shell.store().session.current_user().await.is_none());
    assert!(shell.store().notifications.snapshot().await.is_empty());
    for user in shell.store().catalog.get_all_users().await.unwrap() {
        assert!(user.reading_history.is_empty());
    }
}

#[tokio::test(start_paused = true)]
async fn signed_in_reading_shows_up_on_home() {
    let mut shell = Shell::new(demo_store().await, "#/");
    shell
        .submit_login("reader@novaread.dev", "reader-pass", false)
        .await
        .unwrap();
    shell.navigate("#/read/qs-2").await;
    shell.set_scroll_percentage(60.0);
    tokio::time::sleep(Duration::from_millis(600)).await;

    let PageView::Home(home) = shell.navigate("#/").await.unwrap() else {
        panic!("expected home");
    };
    assert_eq!(home.continue_reading.len(), 1);
    assert_eq!(home.continue_reading[0].novel.id, "quiet-stars");
    assert_eq!(home.continue_reading[0].progress.chapter_id, "qs-2");

    let mirrored = shell.store().catalog.get_all_users().await.unwrap();
    let reader = mirrored.iter().find(|u| u.id == "reader").unwrap();
    assert_eq!(reader.reading_history.len(), 1);
}

#[tokio::test]
async fn wrong_password_leaves_session_empty_and_quiet() {
    let store = demo_store().await;
    assert!(store.session.login("a@b.com", "wrong", false).await.is_err());
    assert!(store
        .session
        .login("reader@novaread.dev", "wrong", false)
        .await
        .is_err());
    assert!(store.session.current_user().await.is_none());
    assert!(store.session.auth_session().await.is_none());
    assert!(store
        .notifications
        .snapshot()
        .await
        .iter()
        .all(|n| n.severity != Severity::Success));
}

#[tokio::test]
async fn deleting_a_novel_removes_its_chapters() {
    let mut shell = admin_shell().await;
    let catalog = shell.store().catalog.clone();
    shell.admin(catalog.delete_novel("ashen-crown")).await.unwrap();

    assert!(catalog.fetch_novel_details("ashen-crown").await.unwrap().is_none());
    for id in ["ac-1", "ac-2", "ac-3"] {
        assert!(catalog.fetch_chapter(id).await.unwrap().is_none());
    }
    assert!(catalog.fetch_chapter("qs-1").await.unwrap().is_some());

    let view = shell.navigate("#/novel/ashen-crown").await.unwrap();
    assert!(matches!(view, PageView::NotFound { .. }));
}

#[tokio::test]
async fn latest_chapter_number_tracks_every_chapter_change() {
    let mut shell = admin_shell().await;
    let catalog = shell.store().catalog.clone();
    let latest = |details: Option<novaread_core::domain::NovelDetails>| {
        details.unwrap().novel.latest_chapter_number
    };

    let added = shell.admin(catalog.add_chapter(chapter("quiet-stars", 9))).await.unwrap();
    assert_eq!(latest(catalog.fetch_novel_details("quiet-stars").await.unwrap()), 9);

    let patch = ChapterPatch {
        chapter_number: Some(1),
        ..Default::default()
    };
    shell.admin(catalog.update_chapter(&added.id, patch)).await.unwrap();
    assert_eq!(latest(catalog.fetch_novel_details("quiet-stars").await.unwrap()), 2);

    // Moving a chapter across novels updates both sides.
    let patch = ChapterPatch {
        novel_id: Some("ashen-crown".to_string()),
        chapter_number: Some(12),
        ..Default::default()
    };
    shell.admin(catalog.update_chapter("qs-2", patch)).await.unwrap();
    assert_eq!(latest(catalog.fetch_novel_details("ashen-crown").await.unwrap()), 12);
    assert_eq!(latest(catalog.fetch_novel_details("quiet-stars").await.unwrap()), 1);

    shell.admin(catalog.delete_chapter("qs-2")).await.unwrap();
    assert_eq!(latest(catalog.fetch_novel_details("ashen-crown").await.unwrap()), 3);

    // Removing every chapter leaves the last known value.
    for id in ["qs-1".to_string(), added.id.clone()] {
        shell.admin(catalog.delete_chapter(&id)).await.unwrap();
    }
    let details = catalog.fetch_novel_details("quiet-stars").await.unwrap().unwrap();
    assert!(details.chapters.is_empty());
    assert_eq!(details.novel.latest_chapter_number, 1);
}

#[tokio::test]
async fn repeated_progress_for_one_novel_keeps_only_the_last() {
    let store = demo_store().await;
    store
        .session
        .login("reader@novaread.dev", "reader-pass", true)
        .await
        .unwrap();

    store
        .progress
        .update_progress(ReadingProgress::new("ashen-crown", "ac-1", 1, 40.0))
        .await;
    store
        .progress
        .update_progress(ReadingProgress::new("quiet-stars", "qs-1", 1, 25.0))
        .await;
    store
        .progress
        .update_progress(ReadingProgress::new("ashen-crown", "ac-3", 3, 75.0))
        .await;

    let history = store.session.current_user().await.unwrap().reading_history;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].novel_id, "ashen-crown");
    assert_eq!(history[0].chapter_id, "ac-3");
    assert_eq!(history[0].scroll_percentage, 75.0);
    assert_eq!(history[1].novel_id, "quiet-stars");
}

#[tokio::test]
async fn banning_twice_restores_the_flag() {
    let mut shell = admin_shell().await;
    let catalog = shell.store().catalog.clone();

    let banned = shell.admin(catalog.ban_user("reader")).await.unwrap();
    assert!(banned.is_banned);
    let restored = shell.admin(catalog.ban_user("reader")).await.unwrap();
    assert!(!restored.is_banned);

    let messages: Vec<String> = shell
        .store()
        .notifications
        .snapshot()
        .await
        .into_iter()
        .map(|n| n.message)
        .collect();
    assert_eq!(messages, vec!["User banned", "User unbanned"]);
}

#[tokio::test]
async fn banned_users_cannot_sign_in() {
    let mut shell = admin_shell().await;
    let catalog = shell.store().catalog.clone();
    shell.admin(catalog.ban_user("reader")).await.unwrap();
    shell.logout().await;

    let message = shell
        .submit_login("reader@novaread.dev", "reader-pass", false)
        .await
        .unwrap_err();
    assert_eq!(message, "This account has been banned");
}

#[tokio::test]
async fn demoting_yourself_reaches_the_session() {
    let mut shell = admin_shell().await;
    let catalog = shell.store().catalog.clone();

    shell.admin(catalog.update_user_role("admin", Role::User)).await.unwrap();
    assert!(!shell.store().session.is_admin().await);
    assert!(matches!(shell.view(), Some(PageView::AccessDenied)));

    // No longer an admin, so further admin work is refused.
    assert!(shell.admin(catalog.delete_user("admin")).await.is_none());
    assert!(shell.store().session.current_user().await.is_some());
}

#[tokio::test(start_paused = true)]
async fn notifications_expire_or_can_be_dismissed_early() {
    let store = demo_store().await;
    let queue = &store.notifications;

    let first = queue.success("Updated").await;
    tokio::time::sleep(Duration::from_millis(1000)).await;
    let second = queue.info("Logged out").await;

    assert!(queue.dismiss(second).await);
    assert!(!queue.dismiss(second).await);
    assert_eq!(queue.snapshot().await.len(), 1);

    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert!(queue.snapshot().await.is_empty());
    assert!(!queue.dismiss(first).await);

    // The dismissed entry's timer would have fired here.
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert!(queue.snapshot().await.is_empty());
}

#[tokio::test]
async fn every_navigation_prefix_resolves_to_its_page() {
    let mut shell = Shell::new(demo_store().await, "#/");
    shell.start().await;
    let cases = [
        ("#/browse?q=tides&sortBy=rating", PageId::Browse),
        ("#/rankings", PageId::Rankings),
        ("#/library", PageId::Library),
        ("#/login", PageId::Login),
        ("#/register", PageId::Register),
        ("#/forgot-password", PageId::ForgotPassword),
        ("#/admin", PageId::Admin),
        ("#/profile", PageId::Profile),
        ("#/novel/quiet-stars", PageId::NovelDetail),
        ("#/read/qs-1", PageId::Reader),
        ("#/", PageId::Home),
        ("#/unknown/place", PageId::Home),
    ];
    for (path, page) in cases {
        shell.navigate(path).await;
        assert_eq!(shell.router().current_route().page(), page, "after {}", path);
    }

    for id in ["x", "a-b_c", "42", "%E2%9C%93"] {
        assert_eq!(
            Route::parse(&format!("#/novel/{}", id)),
            Route::NovelDetail { id: id.to_string() }
        );
    }
}
