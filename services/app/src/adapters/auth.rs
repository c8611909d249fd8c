//! services/app/src/adapters/auth.rs
//!
//! An in-memory implementation of the `AuthService` port. Passwords are kept as
//! argon2 hashes; accounts are linked to users stored in the catalog.

use std::collections::HashMap;
use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use novaread_core::domain::{AuthSession, User};
use novaread_core::ports::{AuthService, CatalogService, PortError, PortResult};
use tokio::sync::RwLock;
use tracing::{error, info};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Debug, Clone)]
struct Credential {
    user_id: String,
    email: String,
    password_hash: String,
}

pub struct MemoryAuth {
    catalog: Arc<dyn CatalogService>,
    hasher: Argon2<'static>,
    credentials: RwLock<Vec<Credential>>,
    sessions: RwLock<HashMap<String, AuthSession>>,
}

impl MemoryAuth {
    pub fn new(catalog: Arc<dyn CatalogService>) -> Self {
        Self::with_hasher(catalog, Argon2::default())
    }

    /// Uses custom argon2 parameters (cheap ones keep tests fast).
    pub fn with_hasher(catalog: Arc<dyn CatalogService>, hasher: Argon2<'static>) -> Self {
        Self {
            catalog,
            hasher,
            credentials: RwLock::new(Vec::new()),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Attaches a password to a user that already exists in the catalog.
    pub async fn add_account(&self, user_id: &str, password: &str) -> PortResult<()> {
        let user = self
            .catalog
            .get_user(user_id)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        let password_hash = self.hash(password)?;
        self.credentials.write().await.push(Credential {
            user_id: user.id,
            email: normalize_email(&user.email),
            password_hash,
        });
        Ok(())
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn hash(&self, password: &str) -> PortResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.hasher
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                error!("Failed to hash password: {:?}", e);
                PortError::Unexpected("Failed to hash password".to_string())
            })
    }

    fn verify(&self, password: &str, stored: &str) -> PortResult<bool> {
        let parsed_hash = PasswordHash::new(stored).map_err(|e| {
            error!("Failed to parse password hash: {:?}", e);
            PortError::Unexpected("Authentication error".to_string())
        })?;
        Ok(self
            .hasher
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

//=========================================================================================
// `AuthService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AuthService for MemoryAuth {
    async fn register(&self, username: &str, email: &str, password: &str) -> PortResult<User> {
        let email = normalize_email(email);
        if self
            .credentials
            .read()
            .await
            .iter()
            .any(|c| c.email == email)
        {
            return Err(PortError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }
        let username = username.trim();
        let taken = self
            .catalog
            .list_users()
            .await?
            .iter()
            .any(|u| u.username.eq_ignore_ascii_case(username));
        if taken {
            return Err(PortError::Conflict("This username is already taken".to_string()));
        }

        let password_hash = self.hash(password)?;
        let user = self
            .catalog
            .insert_user(User::new(Uuid::new_v4().to_string(), username, email.clone()))
            .await?;
        self.credentials.write().await.push(Credential {
            user_id: user.id.clone(),
            email,
            password_hash,
        });
        info!("Registered user {}", user.id);
        Ok(user)
    }

    async fn authenticate(&self, email: &str, password: &str) -> PortResult<User> {
        let email = normalize_email(email);
        let credential = self
            .credentials
            .read()
            .await
            .iter()
            .find(|c| c.email == email)
            .cloned()
            .ok_or(PortError::InvalidCredentials)?;

        if !self.verify(password, &credential.password_hash)? {
            return Err(PortError::InvalidCredentials);
        }

        // The account may outlive a user an admin deleted.
        let user = self
            .catalog
            .get_user(&credential.user_id)
            .await?
            .ok_or(PortError::InvalidCredentials)?;
        if user.is_banned {
            return Err(PortError::Banned);
        }
        Ok(user)
    }

    async fn create_auth_session(
        &self,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<AuthSession> {
        let session = AuthSession {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            expires_at,
        };
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}
