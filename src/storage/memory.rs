// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory storage backend.

use crate::{
    domain::{Recipe, RecipeContent, RecipeId, RecipeStatus, RecipeWithOwner, User, UserId},
    storage::{AccountStore, RecipeStore, SessionRecord, StoreError},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use uuid::Uuid;

/// A volatile storage backend.
///
/// # Limitations
///
/// Nothing survives a server restart, and data is not shared between server instances. This backend is meant for
/// local development and testing.
///
/// Recipes are kept in insertion order, which is the natural order of this backend. Locks are always taken in the
/// order recipes, users, sessions.
#[derive(Default)]
pub struct MemoryStore {
    recipes: RwLock<Vec<Recipe>>,
    users: RwLock<HashMap<UserId, User>>,
    sessions: RwLock<HashMap<Uuid, SessionRecord>>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read()
        .map_err(|_| StoreError::Unavailable("poisoned lock".into()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write()
        .map_err(|_| StoreError::Unavailable("poisoned lock".into()))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the recipes that pass `filter` with their owners. Recipes whose owner is unknown are skipped.
    fn join_owners<F>(&self, filter: F) -> Result<Vec<RecipeWithOwner>, StoreError>
    where
        F: Fn(&Recipe) -> bool,
    {
        let recipes = read(&self.recipes)?;
        let users = read(&self.users)?;

        Ok(recipes
            .iter()
            .filter(|recipe| filter(recipe))
            .filter_map(|recipe| {
                users.get(recipe.owner_id()).map(|owner| RecipeWithOwner {
                    recipe: recipe.clone(),
                    owner: owner.clone(),
                })
            })
            .collect())
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn insert_recipe(&self, recipe: &Recipe) -> Result<(), StoreError> {
        write(&self.recipes)?.push(recipe.clone());

        Ok(())
    }

    async fn find_recipe(&self, id: &RecipeId) -> Result<Option<Recipe>, StoreError> {
        Ok(read(&self.recipes)?
            .iter()
            .find(|recipe| recipe.id() == id)
            .cloned())
    }

    async fn find_recipe_with_owner(
        &self,
        id: &RecipeId,
    ) -> Result<Option<RecipeWithOwner>, StoreError> {
        Ok(self.join_owners(|recipe| recipe.id() == id)?.pop())
    }

    async fn list_public_recipes(&self) -> Result<Vec<RecipeWithOwner>, StoreError> {
        let mut recipes = self.join_owners(|recipe| recipe.status() == RecipeStatus::Public)?;
        recipes.sort_by(|a, b| b.recipe.created_at().cmp(a.recipe.created_at()));

        Ok(recipes)
    }

    async fn list_public_recipes_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<RecipeWithOwner>, StoreError> {
        self.join_owners(|recipe| {
            recipe.is_owned_by(owner) && recipe.status() == RecipeStatus::Public
        })
    }

    async fn list_recipes_by_owner(&self, owner: &UserId) -> Result<Vec<Recipe>, StoreError> {
        let mut recipes: Vec<Recipe> = read(&self.recipes)?
            .iter()
            .filter(|recipe| recipe.is_owned_by(owner))
            .cloned()
            .collect();
        recipes.sort_by(|a, b| b.created_at().cmp(a.created_at()));

        Ok(recipes)
    }

    async fn update_owned_recipe(
        &self,
        id: &RecipeId,
        owner: &UserId,
        content: &RecipeContent,
    ) -> Result<Option<Recipe>, StoreError> {
        let mut recipes = write(&self.recipes)?;

        Ok(recipes
            .iter_mut()
            .find(|recipe| recipe.id() == id && recipe.is_owned_by(owner))
            .map(|recipe| {
                recipe.update_content(content.clone());
                recipe.clone()
            }))
    }

    async fn delete_owned_recipe(
        &self,
        id: &RecipeId,
        owner: &UserId,
    ) -> Result<bool, StoreError> {
        let mut recipes = write(&self.recipes)?;
        let before = recipes.len();
        recipes.retain(|recipe| !(recipe.id() == id && recipe.is_owned_by(owner)));

        Ok(recipes.len() != before)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn register_user(&self, user: &User) -> Result<(), StoreError> {
        write(&self.users)?.insert(*user.id(), user.clone());

        Ok(())
    }

    async fn find_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        Ok(read(&self.users)?.get(id).cloned())
    }

    async fn insert_session(&self, session: &SessionRecord) -> Result<(), StoreError> {
        write(&self.sessions)?.insert(session.id, session.clone());

        Ok(())
    }

    async fn find_session(&self, id: &Uuid) -> Result<Option<SessionRecord>, StoreError> {
        Ok(read(&self.sessions)?.get(id).cloned())
    }

    async fn delete_session(&self, id: &Uuid) -> Result<(), StoreError> {
        write(&self.sessions)?.remove(id);

        Ok(())
    }

    async fn delete_expired_sessions(&self, now: &DateTime<Utc>) -> Result<u64, StoreError> {
        let mut sessions = write(&self.sessions)?;
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > *now);

        Ok((before - sessions.len()) as u64)
    }
}
