//! services/app/src/runtime/state.rs
//!
//! Defines the application's shared state: the port adapters and the store
//! composed on top of them. Created once at startup and handed to the shell.

use std::sync::Arc;

use argon2::Argon2;
use novaread_core::ports::{AuthService, CatalogService, HtmlSanitizer};
use tracing::info;

use crate::adapters::{AmmoniaSanitizer, CatalogSeed, MemoryAuth, MemoryCatalog};
use crate::config::Config;
use crate::error::AppError;
use crate::runtime::catalog::CatalogStore;
use crate::runtime::notifications::NotificationQueue;
use crate::runtime::progress::ProgressTracker;
use crate::runtime::session::SessionStore;

//=========================================================================================
// AppState (The Port Adapters)
//=========================================================================================

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogService>,
    pub auth: Arc<dyn AuthService>,
    pub sanitizer: Arc<dyn HtmlSanitizer>,
    pub config: Arc<Config>,
}

//=========================================================================================
// AppStore (Everything Pages Read From and Write To)
//=========================================================================================

/// The single application store. Cloning shares the underlying state.
#[derive(Clone)]
pub struct AppStore {
    pub config: Arc<Config>,
    pub sanitizer: Arc<dyn HtmlSanitizer>,
    pub notifications: NotificationQueue,
    pub session: SessionStore,
    pub catalog: CatalogStore,
    pub progress: ProgressTracker,
}

impl AppStore {
    pub fn new(state: AppState) -> Self {
        let notifications = NotificationQueue::new(state.config.notification_timeout);
        let session = SessionStore::new(
            state.auth.clone(),
            notifications.clone(),
            state.config.clone(),
        );
        let catalog = CatalogStore::new(
            state.catalog.clone(),
            notifications.clone(),
            session.clone(),
        );
        let progress = ProgressTracker::new(session.clone(), state.catalog.clone());
        Self {
            config: state.config,
            sanitizer: state.sanitizer,
            notifications,
            session,
            catalog,
            progress,
        }
    }

    /// Builds a store over in-memory adapters loaded from `seed`.
    pub async fn in_memory(config: Config, seed: CatalogSeed) -> Result<Self, AppError> {
        Self::in_memory_with_hasher(config, seed, Argon2::default()).await
    }

    pub async fn in_memory_with_hasher(
        config: Config,
        seed: CatalogSeed,
        hasher: Argon2<'static>,
    ) -> Result<Self, AppError> {
        let accounts = seed.accounts.clone();
        let catalog: Arc<dyn CatalogService> = Arc::new(MemoryCatalog::from_seed(seed));
        let auth = MemoryAuth::with_hasher(catalog.clone(), hasher);
        for account in &accounts {
            auth.add_account(&account.user_id, &account.password).await?;
        }
        info!("In-memory store ready with {} accounts", accounts.len());

        Ok(Self::new(AppState {
            catalog,
            auth: Arc::new(auth),
            sanitizer: Arc::new(AmmoniaSanitizer::new()),
            config: Arc::new(config),
        }))
    }
}
