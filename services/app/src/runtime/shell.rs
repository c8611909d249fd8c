//! services/app/src/runtime/shell.rs
//!
//! The application shell. Turns route-changed events from the navigation engine
//! into page loads, owns the active page's scope, and routes user input (forms,
//! scrolling, admin actions) to the store.

use std::future::Future;

use novaread_core::domain::{LibraryEntry, Novel, NovelDetails, ReaderTheme, ReadingProgress, Theme, User};
use novaread_core::ports::{PortError, PortResult};
use novaread_core::route::{Route, SearchFilters};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::runtime::page::{PageCommand, PageScope};
use crate::runtime::reader::{ReaderPage, ReaderView};
use crate::runtime::router::NavigationEngine;
use crate::runtime::state::AppStore;

const CONTINUE_READING_LIMIT: usize = 3;

//=========================================================================================
// Page Views
//=========================================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueReading {
    pub novel: Novel,
    pub progress: ReadingProgress,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    pub latest: Vec<Novel>,
    pub popular: Vec<Novel>,
    pub continue_reading: Vec<ContinueReading>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelDetailView {
    pub details: NovelDetails,
    pub related: Vec<Novel>,
    /// The signed-in user's bookmark in this novel, if any.
    pub progress: Option<ReadingProgress>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItem {
    pub entry: LibraryEntry,
    pub novel: Novel,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminView {
    pub query: String,
    pub users: Vec<User>,
    pub novels: Vec<Novel>,
}

impl AdminView {
    /// Users whose username or email contains `query`, case-insensitively.
    pub fn filtered_users(&self) -> Vec<&User> {
        let needle = self.query.trim().to_lowercase();
        self.users
            .iter()
            .filter(|user| {
                needle.is_empty()
                    || user.username.to_lowercase().contains(&needle)
                    || user.email.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

/// What the active page currently shows.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum PageView {
    Home(HomeView),
    NovelDetail(NovelDetailView),
    Reader(ReaderView),
    Browse {
        filters: SearchFilters,
        results: Vec<Novel>,
    },
    Library {
        items: Vec<LibraryItem>,
    },
    Rankings {
        popular: Vec<Novel>,
    },
    Login,
    Register,
    ForgotPassword,
    Admin(AdminView),
    Profile {
        user: User,
    },
    NotFound {
        what: String,
    },
    SignInRequired,
    AccessDenied,
    /// A load failed; the rest of the application keeps working.
    Unavailable {
        message: String,
    },
}

struct ActivePage {
    scope: PageScope,
    view: PageView,
    reader: Option<ReaderPage>,
}

//=========================================================================================
// Shell
//=========================================================================================

pub struct Shell {
    store: AppStore,
    router: NavigationEngine,
    active: Option<ActivePage>,
}

impl Shell {
    pub fn new(store: AppStore, initial_fragment: &str) -> Self {
        Self {
            store,
            router: NavigationEngine::new(initial_fragment),
            active: None,
        }
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    pub fn router(&self) -> &NavigationEngine {
        &self.router
    }

    pub fn view(&self) -> Option<&PageView> {
        self.active.as_ref().map(|page| &page.view)
    }

    /// Loads the page for the initial fragment.
    pub async fn start(&mut self) -> PageView {
        let route = self.router.current_route();
        self.enter(route).await
    }

    /// Returns the new page, or `None` when the location did not change.
    pub async fn navigate(&mut self, path: &str) -> Option<PageView> {
        let change = self.router.navigate(path)?;
        Some(self.enter(change.route).await)
    }

    pub async fn back(&mut self) -> Option<PageView> {
        let change = self.router.back()?;
        Some(self.enter(change.route).await)
    }

    pub async fn forward(&mut self) -> Option<PageView> {
        let change = self.router.forward()?;
        Some(self.enter(change.route).await)
    }

    /// The browser changed the location without going through `navigate`.
    pub async fn location_changed(&mut self, fragment: &str) -> Option<PageView> {
        let change = self.router.location_changed(fragment)?;
        Some(self.enter(change.route).await)
    }

    /// Reloads the active page in place.
    pub async fn refresh(&mut self) -> PageView {
        let route = self.router.current_route();
        self.enter(route).await
    }

    //=====================================================================================
    // Page Lifecycle
    //=====================================================================================

    async fn enter(&mut self, route: Route) -> PageView {
        if let Some(previous) = self.active.take() {
            previous.scope.close();
        }
        let scope = PageScope::open(route.clone());
        let command = PageCommand::for_route(&route);
        let (view, reader) = match scope.guard(self.load(&scope, command)).await {
            Some(loaded) => loaded,
            // Only reachable if something else closed the scope mid-load.
            None => (PageView::NotFound { what: "page".to_string() }, None),
        };
        self.active = Some(ActivePage {
            scope,
            view: view.clone(),
            reader,
        });
        view
    }

    async fn load(&self, scope: &PageScope, command: PageCommand) -> (PageView, Option<ReaderPage>) {
        let result = match command {
            PageCommand::LoadReader { chapter_id } => {
                return match ReaderPage::open(&self.store, scope, &chapter_id).await {
                    Ok(Some(reader)) => (PageView::Reader(reader.view().clone()), Some(reader)),
                    Ok(None) => (
                        PageView::NotFound {
                            what: "chapter".to_string(),
                        },
                        None,
                    ),
                    Err(e) => (unavailable(e), None),
                };
            }
            PageCommand::LoadHome => self.load_home().await,
            PageCommand::LoadNovel { id } => self.load_novel(&id).await,
            PageCommand::Search { filters } => self
                .store
                .catalog
                .search_novels(&filters)
                .await
                .map(|results| PageView::Browse { filters, results }),
            PageCommand::LoadLibrary => self.load_library().await,
            PageCommand::LoadRankings => self
                .store
                .catalog
                .popular_novels()
                .await
                .map(|popular| PageView::Rankings { popular }),
            PageCommand::LoadUsers => self.load_admin(String::new()).await,
            PageCommand::LoadProfile => Ok(match self.store.session.current_user().await {
                Some(user) => PageView::Profile { user },
                None => PageView::SignInRequired,
            }),
            PageCommand::ShowLogin => Ok(PageView::Login),
            PageCommand::ShowRegister => Ok(PageView::Register),
            PageCommand::ShowForgotPassword => Ok(PageView::ForgotPassword),
        };
        (result.unwrap_or_else(unavailable), None)
    }

    async fn load_home(&self) -> PortResult<PageView> {
        let novels = self.store.catalog.novels().await?;
        let continue_reading = match self.store.session.current_user().await {
            Some(user) => user
                .reading_history
                .into_iter()
                .filter_map(|progress| {
                    novels
                        .iter()
                        .find(|novel| novel.id == progress.novel_id)
                        .map(|novel| ContinueReading {
                            novel: novel.clone(),
                            progress,
                        })
                })
                .take(CONTINUE_READING_LIMIT)
                .collect(),
            None => Vec::new(),
        };
        Ok(PageView::Home(HomeView {
            latest: novaread_core::views::latest_novels(&novels),
            popular: novaread_core::views::popular_novels(&novels),
            continue_reading,
        }))
    }

    async fn load_novel(&self, novel_id: &str) -> PortResult<PageView> {
        let Some(mut details) = self.store.catalog.fetch_novel_details(novel_id).await? else {
            return Ok(PageView::NotFound {
                what: "novel".to_string(),
            });
        };
        let sanitizer = &self.store.sanitizer;
        details.novel.synopsis = sanitizer.sanitize(&details.novel.synopsis);
        for review in &mut details.reviews {
            review.content = sanitizer.sanitize(&review.content);
        }
        let related = self.store.catalog.related_novels(&details.novel).await?;
        let progress = self
            .store
            .session
            .current_user()
            .await
            .and_then(|user| user.progress_for(novel_id).cloned());
        Ok(PageView::NovelDetail(NovelDetailView {
            details,
            related,
            progress,
        }))
    }

    async fn load_library(&self) -> PortResult<PageView> {
        let Some(user) = self.store.session.current_user().await else {
            return Ok(PageView::SignInRequired);
        };
        let novels = self.store.catalog.novels().await?;
        let items = user
            .library
            .into_iter()
            .filter_map(|entry| {
                let novel = novels.iter().find(|n| n.id == entry.novel_id)?.clone();
                Some(LibraryItem { entry, novel })
            })
            .collect();
        Ok(PageView::Library { items })
    }

    async fn load_admin(&self, query: String) -> PortResult<PageView> {
        if !self.store.session.is_admin().await {
            return Ok(PageView::AccessDenied);
        }
        Ok(PageView::Admin(AdminView {
            query,
            users: self.store.catalog.get_all_users().await?,
            novels: self.store.catalog.novels().await?,
        }))
    }

    //=====================================================================================
    // Reader Input
    //=====================================================================================

    /// Forwards a scroll measurement to the open reader. `None` off the reader page.
    pub fn scroll(&mut self, scroll_top: f64, scroll_height: f64, client_height: f64) -> Option<f64> {
        self.router.set_scroll_offset(scroll_top);
        let page = self.active.as_mut()?;
        let reader = page.reader.as_mut()?;
        let pct = reader.on_scroll(scroll_top, scroll_height, client_height);
        page.view = PageView::Reader(reader.view().clone());
        Some(pct)
    }

    pub fn set_scroll_percentage(&mut self, pct: f64) -> Option<f64> {
        let page = self.active.as_mut()?;
        let reader = page.reader.as_mut()?;
        let pct = reader.set_scroll_percentage(pct);
        page.view = PageView::Reader(reader.view().clone());
        Some(pct)
    }

    pub fn set_reader_theme(&mut self, theme: ReaderTheme) -> bool {
        let Some(page) = self.active.as_mut() else {
            return false;
        };
        let Some(reader) = page.reader.as_mut() else {
            return false;
        };
        reader.set_theme(theme);
        page.view = PageView::Reader(reader.view().clone());
        true
    }

    //=====================================================================================
    // Session Input
    //=====================================================================================

    /// Submits the login form. Failures come back as the inline message to show.
    pub async fn submit_login(
        &mut self,
        email: &str,
        password: &str,
        remember: bool,
    ) -> Result<PageView, String> {
        self.store
            .session
            .login(email, password, remember)
            .await
            .map_err(|e| e.to_string())?;
        Ok(self.go_home().await)
    }

    pub async fn submit_register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<PageView, String> {
        self.store
            .session
            .register(username, email, password)
            .await
            .map_err(|e| e.to_string())?;
        Ok(self.go_home().await)
    }

    pub async fn logout(&mut self) -> PageView {
        self.store.session.logout().await;
        self.refresh().await
    }

    pub async fn toggle_theme(&mut self) -> Theme {
        self.store.session.toggle_theme().await
    }

    pub async fn dismiss(&self, id: Uuid) -> bool {
        self.store.notifications.dismiss(id).await
    }

    async fn go_home(&mut self) -> PageView {
        match self.navigate("#/").await {
            Some(view) => view,
            None => self.refresh().await,
        }
    }

    //=====================================================================================
    // Admin Actions
    //=====================================================================================

    /// Narrows the admin user list. `false` off the admin page.
    pub fn filter_users(&mut self, query: &str) -> bool {
        match self.active.as_mut().map(|page| &mut page.view) {
            Some(PageView::Admin(admin)) => {
                admin.query = query.to_string();
                true
            }
            _ => false,
        }
    }

    /// Runs an admin mutation issued from the active page.
    ///
    /// Non-admins are refused. Failures become error notifications instead of
    /// propagating. The mutation always completes; its result only refreshes the
    /// page if the page that issued it is still the active one.
    pub async fn admin<T, F>(&mut self, work: F) -> Option<T>
    where
        F: Future<Output = PortResult<T>>,
    {
        if !self.store.session.is_admin().await {
            warn!("Admin action refused for a non-admin session");
            self.store
                .notifications
                .error(PortError::Unauthorized.to_string())
                .await;
            return None;
        }
        // Before the first page loads there is no scope to outlive; the result always applies.
        let outcome = match self.active.as_ref().map(|page| page.scope.clone()) {
            Some(scope) => match scope.guard(work).await {
                Some(outcome) => outcome,
                None => {
                    info!(
                        "Admin action finished after its {:?} page closed",
                        scope.route().page()
                    );
                    return None;
                }
            },
            None => work.await,
        };
        match outcome {
            Ok(value) => {
                let query = match self.view() {
                    Some(PageView::Admin(admin)) => Some(admin.query.clone()),
                    _ => None,
                };
                if let Some(query) = query {
                    let view = self
                        .load_admin(query)
                        .await
                        .unwrap_or_else(unavailable);
                    if let Some(page) = self.active.as_mut() {
                        page.view = view;
                    }
                }
                Some(value)
            }
            Err(e) => {
                self.store.notifications.error(e.to_string()).await;
                None
            }
        }
    }

    /// Promotes a user to admin or demotes an admin back to a regular user.
    pub async fn toggle_user_role(&mut self, user_id: &str) -> Option<User> {
        let catalog = self.store.catalog.clone();
        let target = async {
            let users = catalog.get_all_users().await?;
            let user = users
                .into_iter()
                .find(|user| user.id == user_id)
                .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
            catalog.update_user_role(user_id, user.role.flipped()).await
        };
        self.admin(target).await
    }
}

fn unavailable(e: PortError) -> PageView {
    error!("Page load failed: {}", e);
    PageView::Unavailable {
        message: e.to_string(),
    }
}
