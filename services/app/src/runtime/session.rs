//! services/app/src/runtime/session.rs
//!
//! Session/auth state: the signed-in user, their auth session and the global theme.

use std::sync::Arc;

use chrono::Utc;
use novaread_core::domain::{AuthSession, ReadingProgress, Theme, User};
use novaread_core::ports::{AuthService, PortResult};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::Config;
use crate::runtime::notifications::NotificationQueue;

/// The mutable session slice. At most one signed-in user.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<User>,
    pub auth_session: Option<AuthSession>,
    pub theme: Theme,
}

#[derive(Clone)]
pub struct SessionStore {
    state: Arc<Mutex<Session>>,
    auth: Arc<dyn AuthService>,
    notifications: NotificationQueue,
    config: Arc<Config>,
}

impl SessionStore {
    pub fn new(
        auth: Arc<dyn AuthService>,
        notifications: NotificationQueue,
        config: Arc<Config>,
    ) -> Self {
        let session = Session {
            theme: config.default_theme,
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(session)),
            auth,
            notifications,
            config,
        }
    }

    /// Signs in. Failures leave the session untouched and are returned to the
    /// caller to present inline; only success is announced.
    pub async fn login(&self, email: &str, password: &str, remember: bool) -> PortResult<User> {
        let user = self.auth.authenticate(email, password).await.map_err(|e| {
            warn!("Login rejected for {}: {}", email, e);
            e
        })?;
        let lifetime = if remember {
            self.config.remember_session
        } else {
            self.config.default_session
        };
        let auth_session = self
            .auth
            .create_auth_session(&user.id, Utc::now() + lifetime)
            .await?;
        self.replace_session(user.clone(), auth_session).await;
        info!("User {} logged in (remember: {})", user.id, remember);
        self.notifications.success("Logged in").await;
        Ok(user)
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> PortResult<User> {
        let user = self
            .auth
            .register(username, email, password)
            .await
            .map_err(|e| {
                warn!("Registration rejected for {}: {}", email, e);
                e
            })?;
        let auth_session = self
            .auth
            .create_auth_session(&user.id, Utc::now() + self.config.default_session)
            .await?;
        self.replace_session(user.clone(), auth_session).await;
        info!("User {} registered and signed in", user.id);
        self.notifications.success("Registered").await;
        Ok(user)
    }

    /// Signs out. Without a signed-in user this does nothing.
    pub async fn logout(&self) {
        let previous = {
            let mut state = self.state.lock().await;
            let user = state.user.take();
            let auth_session = state.auth_session.take();
            user.map(|user| (user, auth_session))
        };
        let Some((user, auth_session)) = previous else {
            return;
        };
        if let Some(auth_session) = auth_session {
            self.end_auth_session(&auth_session.id).await;
        }
        info!("User {} logged out", user.id);
        self.notifications.info("Logged out").await;
    }

    pub async fn toggle_theme(&self) -> Theme {
        let mut state = self.state.lock().await;
        state.theme = state.theme.toggled();
        info!("Theme switched to {:?}", state.theme);
        state.theme
    }

    pub async fn theme(&self) -> Theme {
        self.state.lock().await.theme
    }

    pub async fn current_user(&self) -> Option<User> {
        self.state.lock().await.user.clone()
    }

    pub async fn auth_session(&self) -> Option<AuthSession> {
        self.state.lock().await.auth_session.clone()
    }

    pub async fn is_admin(&self) -> bool {
        self.state
            .lock()
            .await
            .user
            .as_ref()
            .is_some_and(User::is_admin)
    }

    /// Mirrors an admin edit of `user` into the session when it is the signed-in user.
    pub(crate) async fn sync_user(&self, user: &User) {
        let mut state = self.state.lock().await;
        if let Some(current) = state.user.as_mut().filter(|u| u.id == user.id) {
            current.role = user.role;
            current.is_banned = user.is_banned;
        }
    }

    /// Ends the session if `user_id` is the signed-in user (their account was deleted).
    pub(crate) async fn evict(&self, user_id: &str) -> bool {
        let auth_session = {
            let mut state = self.state.lock().await;
            if state.user.as_ref().map_or(true, |u| u.id != user_id) {
                return false;
            }
            state.user = None;
            state.auth_session.take()
        };
        if let Some(auth_session) = auth_session {
            self.end_auth_session(&auth_session.id).await;
        }
        info!("Signed-in user {} was removed; session ended", user_id);
        true
    }

    /// Upserts a bookmark on the signed-in user. Returns their id, or `None`
    /// when nobody is signed in.
    pub(crate) async fn record_progress(&self, progress: ReadingProgress) -> Option<String> {
        let mut state = self.state.lock().await;
        let user = state.user.as_mut()?;
        user.record_progress(progress);
        Some(user.id.clone())
    }

    async fn replace_session(&self, user: User, auth_session: AuthSession) {
        let stale = {
            let mut state = self.state.lock().await;
            state.user = Some(user);
            state.auth_session.replace(auth_session)
        };
        if let Some(stale) = stale {
            self.end_auth_session(&stale.id).await;
        }
    }

    async fn end_auth_session(&self, session_id: &str) {
        if let Err(e) = self.auth.delete_auth_session(session_id).await {
            warn!("Failed to delete auth session {}: {}", session_id, e);
        }
    }
}
