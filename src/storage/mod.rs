// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Storage backends of the application.
//!
//! # Description
//!
//! Handlers never talk to a database directly. They receive an `Arc<dyn RecipeStore>` and an
//! `Arc<dyn AccountStore>` as application data, so the same handlers run on top of MariaDB ([MySqlStore]) or the
//! volatile [MemoryStore] used for local development and testing.
//!
//! Mutations that require ownership take the owner as part of the filter, i.e. the ownership check and the
//! mutation are a single operation for the backend.

mod memory;
mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

use crate::domain::{Recipe, RecipeContent, RecipeId, RecipeWithOwner, User, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Corrupt record in the storage backend: {0}")]
    CorruptRecord(String),
    #[error("The storage backend is unavailable: {0}")]
    Unavailable(String),
}

/// Server-side record of an open session.
#[derive(Clone, Debug)]
pub struct SessionRecord {
    pub id: Uuid,
    pub user_id: UserId,
    /// PHC string of the session secret.
    pub token_hash: SecretString,
    pub expires_at: DateTime<Utc>,
}

/// Persistence of recipes.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Store a new recipe.
    async fn insert_recipe(&self, recipe: &Recipe) -> Result<(), StoreError>;

    /// Fetch a recipe by ID, without its owner's profile.
    async fn find_recipe(&self, id: &RecipeId) -> Result<Option<Recipe>, StoreError>;

    /// Fetch a recipe by ID joined with its owner's profile.
    async fn find_recipe_with_owner(
        &self,
        id: &RecipeId,
    ) -> Result<Option<RecipeWithOwner>, StoreError>;

    /// All public recipes, newest first.
    async fn list_public_recipes(&self) -> Result<Vec<RecipeWithOwner>, StoreError>;

    /// Public recipes of a given owner, in the backend's natural order.
    async fn list_public_recipes_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<RecipeWithOwner>, StoreError>;

    /// Every recipe of a given owner, whatever its status, newest first.
    async fn list_recipes_by_owner(&self, owner: &UserId) -> Result<Vec<Recipe>, StoreError>;

    /// Replace the content of the recipe identified by `id` if, and only if, it is owned by `owner`.
    ///
    /// Returns the updated recipe, or `None` when no recipe matched both the ID and the owner.
    async fn update_owned_recipe(
        &self,
        id: &RecipeId,
        owner: &UserId,
        content: &RecipeContent,
    ) -> Result<Option<Recipe>, StoreError>;

    /// Delete the recipe identified by `id` if, and only if, it is owned by `owner`.
    ///
    /// Returns whether a recipe was deleted.
    async fn delete_owned_recipe(&self, id: &RecipeId, owner: &UserId)
        -> Result<bool, StoreError>;
}

/// Persistence of users and their sessions.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn register_user(&self, user: &User) -> Result<(), StoreError>;

    async fn find_user(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    async fn insert_session(&self, session: &SessionRecord) -> Result<(), StoreError>;

    async fn find_session(&self, id: &Uuid) -> Result<Option<SessionRecord>, StoreError>;

    async fn delete_session(&self, id: &Uuid) -> Result<(), StoreError>;

    /// Remove every session that expired at or before `now`. Returns how many were removed.
    async fn delete_expired_sessions(&self, now: &DateTime<Utc>) -> Result<u64, StoreError>;
}

/// Handles to the storage backend shared by all the workers of the server.
#[derive(Clone)]
pub struct Storage {
    pub recipes: Arc<dyn RecipeStore>,
    pub accounts: Arc<dyn AccountStore>,
}

impl Storage {
    pub fn from_mysql(store: MySqlStore) -> Self {
        let store = Arc::new(store);

        Storage {
            recipes: store.clone(),
            accounts: store,
        }
    }

    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Storage {
            recipes: store.clone(),
            accounts: store,
        }
    }
}
