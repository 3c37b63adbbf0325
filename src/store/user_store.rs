use std::sync::Arc;

use bcrypt::{hash, DEFAULT_COST};
use tokio::sync::RwLock;

use super::storage::Storage;
use crate::errors::StoreResult;
use crate::models::{display_date_today, NewUser, User, UserUpdate};

/// Storage key of the serialized record collection.
pub const USERS_KEY: &str = "user-management-data";
/// Storage key of the id counter, persisted alongside the collection so ids
/// stay unique across delete-then-add sequences.
pub const NEXT_ID_KEY: &str = "user-management-next-id";

struct StoreInner {
    users: Vec<User>,
    next_id: u64,
}

/// Authoritative, persisted collection of user records.
///
/// Every mutation rewrites the full collection through the storage port
/// before returning. The in-memory collection stays the source of truth for
/// the running process even when a persist attempt fails; storage problems
/// are logged, never surfaced to callers.
pub struct UserStore {
    inner: Arc<RwLock<StoreInner>>,
    storage: Arc<dyn Storage>,
}

impl UserStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                users: Vec::new(),
                next_id: 1,
            })),
            storage,
        }
    }

    /// Restore the collection from storage. An absent blob seeds the single
    /// default administrator; an unreadable blob falls back to the same seed.
    pub async fn load(&self) {
        let mut seeded = false;
        let users = match self.storage.load(USERS_KEY).await {
            Ok(Some(blob)) => match serde_json::from_str::<Vec<User>>(&blob) {
                Ok(users) => users,
                Err(e) => {
                    tracing::warn!("Persisted user data is unreadable, using default seed: {}", e);
                    seeded = true;
                    seed_users()
                }
            },
            Ok(None) => {
                tracing::info!("No persisted user data found, seeding default administrator");
                seeded = true;
                seed_users()
            }
            Err(e) => {
                tracing::warn!("Failed to read persisted user data, using default seed: {}", e);
                seeded = true;
                seed_users()
            }
        };

        let next_id = match self.storage.load(NEXT_ID_KEY).await {
            Ok(Some(value)) => value.parse().ok(),
            _ => None,
        }
        .unwrap_or_else(|| derive_next_id(&users));

        let mut inner = self.inner.write().await;
        inner.users = users;
        inner.next_id = next_id;

        if seeded {
            self.persist_users(&inner.users).await;
            self.persist_next_id(inner.next_id).await;
        }

        tracing::info!("User store loaded with {} record(s)", inner.users.len());
    }

    /// Append a new record. Assigns the next id, stamps `last_active` and
    /// `date_added` to today, persists and returns the created record.
    pub async fn add(&self, new_user: NewUser) -> User {
        let today = display_date_today();
        let mut inner = self.inner.write().await;

        let user = User {
            id: inner.next_id.to_string(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            avatar: new_user.avatar,
            is_admin: new_user.is_admin,
            can_export_data: new_user.can_export_data,
            can_import_data: new_user.can_import_data,
            last_active: today.clone(),
            date_added: today,
        };
        inner.next_id += 1;
        inner.users.push(user.clone());

        self.persist_users(&inner.users).await;
        self.persist_next_id(inner.next_id).await;
        user
    }

    /// Remove the record with this id. Unknown ids are a silent no-op.
    pub async fn delete(&self, id: &str) {
        let mut inner = self.inner.write().await;
        let before = inner.users.len();
        inner.users.retain(|u| u.id != id);
        if inner.users.len() == before {
            tracing::debug!("Delete requested for unknown user id {}", id);
        }
        self.persist_users(&inner.users).await;
    }

    /// Replace only the supplied fields of the matching record. Unknown ids
    /// are a silent no-op. `date_added` cannot be changed through this path.
    pub async fn update_fields(&self, id: &str, update: UserUpdate) {
        let mut inner = self.inner.write().await;
        match inner.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                if let Some(name) = update.name {
                    user.name = name;
                }
                if let Some(email) = update.email {
                    user.email = email;
                }
                if let Some(password_hash) = update.password_hash {
                    user.password_hash = password_hash;
                }
                if let Some(avatar) = update.avatar {
                    user.avatar = avatar;
                }
                if let Some(is_admin) = update.is_admin {
                    user.is_admin = is_admin;
                }
                if let Some(can_export_data) = update.can_export_data {
                    user.can_export_data = can_export_data;
                }
                if let Some(can_import_data) = update.can_import_data {
                    user.can_import_data = can_import_data;
                }
                if let Some(last_active) = update.last_active {
                    user.last_active = last_active;
                }
            }
            None => tracing::debug!("Update requested for unknown user id {}", id),
        }
        self.persist_users(&inner.users).await;
    }

    pub async fn find_by_id(&self, id: &str) -> Option<User> {
        let inner = self.inner.read().await;
        inner.users.iter().find(|u| u.id == id).cloned()
    }

    pub async fn find_by_email(&self, email: &str) -> Option<User> {
        let inner = self.inner.read().await;
        inner.users.iter().find(|u| u.email == email).cloned()
    }

    /// Full copy of the collection, in insertion order.
    pub async fn snapshot(&self) -> Vec<User> {
        let inner = self.inner.read().await;
        inner.users.clone()
    }

    async fn persist_users(&self, users: &[User]) {
        if let Err(e) = self.try_persist_users(users).await {
            tracing::error!("Failed to persist user collection: {}", e);
        }
    }

    async fn try_persist_users(&self, users: &[User]) -> StoreResult<()> {
        let blob = serde_json::to_string(users)?;
        self.storage.save(USERS_KEY, &blob).await
    }

    async fn persist_next_id(&self, next_id: u64) {
        if let Err(e) = self.storage.save(NEXT_ID_KEY, &next_id.to_string()).await {
            tracing::error!("Failed to persist id counter: {}", e);
        }
    }
}

impl Clone for UserStore {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            storage: self.storage.clone(),
        }
    }
}

/// The record collection a fresh installation starts with.
fn seed_users() -> Vec<User> {
    vec![User {
        id: "1".to_string(),
        name: "Florence Shaw".to_string(),
        email: "florence@untitledui.com".to_string(),
        password_hash: hash("admin123".as_bytes(), DEFAULT_COST).unwrap_or_default(),
        avatar: "/static/avatars/florence.jpg".to_string(),
        is_admin: true,
        last_active: "Mar 4, 2024".to_string(),
        date_added: "July 4, 2022".to_string(),
        can_export_data: true,
        can_import_data: true,
    }]
}

/// Next id for collections persisted before the counter existed: one past
/// the highest numeric id in use.
fn derive_next_id(users: &[User]) -> u64 {
    users
        .iter()
        .filter_map(|u| u.id.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
        + 1
}
