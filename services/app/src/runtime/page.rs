//! services/app/src/runtime/page.rs
//!
//! Page lifetimes. Each route entry opens a `PageScope`; leaving the route closes
//! it. Work started for a page is never cancelled midway (a store mutation
//! already issued still lands), but its result is dropped once the page is gone.

use std::future::Future;

use novaread_core::route::{Route, SearchFilters};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// The data load a route entry asks for. Derived from the route, executed by the shell.
#[derive(Debug, Clone, PartialEq)]
pub enum PageCommand {
    LoadHome,
    LoadNovel { id: String },
    LoadReader { chapter_id: String },
    Search { filters: SearchFilters },
    LoadLibrary,
    LoadRankings,
    LoadUsers,
    LoadProfile,
    ShowLogin,
    ShowRegister,
    ShowForgotPassword,
}

impl PageCommand {
    pub fn for_route(route: &Route) -> Self {
        match route {
            Route::Home => PageCommand::LoadHome,
            Route::NovelDetail { id } => PageCommand::LoadNovel { id: id.clone() },
            Route::Reader { id } => PageCommand::LoadReader {
                chapter_id: id.clone(),
            },
            Route::Browse { filters } => PageCommand::Search {
                filters: filters.clone(),
            },
            Route::Library => PageCommand::LoadLibrary,
            Route::Rankings => PageCommand::LoadRankings,
            Route::Admin => PageCommand::LoadUsers,
            Route::Profile => PageCommand::LoadProfile,
            Route::Login => PageCommand::ShowLogin,
            Route::Register => PageCommand::ShowRegister,
            Route::ForgotPassword => PageCommand::ShowForgotPassword,
        }
    }
}

/// The active lifetime of one page.
#[derive(Debug, Clone)]
pub struct PageScope {
    route: Route,
    token: CancellationToken,
}

impl PageScope {
    pub fn open(route: Route) -> Self {
        Self {
            route,
            token: CancellationToken::new(),
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Token for page-owned background work (timers, throttles). Cancelled on close.
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    pub fn close(&self) {
        if self.is_active() {
            debug!("Closing page scope for {:?}", self.route.page());
            self.token.cancel();
        }
    }

    /// Runs `work` to completion, then hands back its output only if the page is
    /// still active. Late results are dropped rather than applied to another page.
    pub async fn guard<F>(&self, work: F) -> Option<F::Output>
    where
        F: Future,
    {
        let output = work.await;
        if self.is_active() {
            Some(output)
        } else {
            debug!("Dropping late result for closed {:?} page", self.route.page());
            None
        }
    }
}
