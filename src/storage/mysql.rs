// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MariaDB storage backend.

use crate::{
    domain::{
        Recipe, RecipeContent, RecipeId, RecipeStatus, RecipeWithOwner, User, UserId,
    },
    storage::{AccountStore, RecipeStore, SessionRecord, StoreError},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use sqlx::{mysql::MySqlRow, Executor, MySqlPool, Row};
use std::str::FromStr;
use tracing::{debug, error, instrument};
use uuid::Uuid;

const RECIPE_COLUMNS: &str = "r.`id`, r.`owner_id`, r.`title`, r.`ingredients`, r.`instructions`, r.`status`, \
    r.`created_at`, r.`updated_at`";

const OWNER_COLUMNS: &str = "u.`display_name` AS owner_display_name, u.`first_name` AS owner_first_name, \
    u.`last_name` AS owner_last_name, u.`image` AS owner_image, u.`created_at` AS owner_created_at";

/// Storage backend on top of a pool of connections to a MariaDB server.
///
/// The schema is defined by the migrations in the `migrations` folder, see [MySqlStore::migrate].
#[derive(Clone, Debug)]
pub struct MySqlStore(MySqlPool);

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self(pool)
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.0
    }

    /// Bring the schema of the DB up to date.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.0).await
    }
}

fn db_error(e: sqlx::Error) -> StoreError {
    error!("{e}");
    StoreError::Database(e)
}

fn corrupt<E: std::fmt::Display>(e: E) -> StoreError {
    error!("Failed to parse a record of the DB: {e}");
    StoreError::CorruptRecord(e.to_string())
}

fn recipe_from_row(row: &MySqlRow) -> Result<Recipe, StoreError> {
    let id: String = row.try_get("id")?;
    let owner_id: String = row.try_get("owner_id")?;
    let title: String = row.try_get("title")?;
    let ingredients: Option<String> = row.try_get("ingredients")?;
    let instructions: String = row.try_get("instructions")?;
    let status: String = row.try_get("status")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: Option<DateTime<Utc>> = row.try_get("updated_at")?;

    let content = RecipeContent::new(
        &title,
        ingredients.as_deref(),
        &instructions,
        RecipeStatus::try_from(status.as_str()).map_err(corrupt)?,
    )
    .map_err(corrupt)?;

    Ok(Recipe::from_parts(
        RecipeId::from_str(&id).map_err(corrupt)?,
        UserId::from_str(&owner_id).map_err(corrupt)?,
        content,
        created_at,
        updated_at,
    ))
}

/// Parse the owner's columns of a joined row. The owner's ID is the `owner_id` column of the recipe.
fn owner_from_row(row: &MySqlRow) -> Result<User, StoreError> {
    let id: String = row.try_get("owner_id")?;

    User::new(
        UserId::from_str(&id).map_err(corrupt)?,
        Some(row.try_get("owner_display_name")?),
        row.try_get("owner_first_name")?,
        row.try_get("owner_last_name")?,
        row.try_get("owner_image")?,
        row.try_get("owner_created_at")?,
    )
    .map_err(corrupt)
}

fn user_from_row(row: &MySqlRow) -> Result<User, StoreError> {
    let id: String = row.try_get("id")?;

    User::new(
        UserId::from_str(&id).map_err(corrupt)?,
        Some(row.try_get("display_name")?),
        row.try_get("first_name")?,
        row.try_get("last_name")?,
        row.try_get("image")?,
        row.try_get("created_at")?,
    )
    .map_err(corrupt)
}

fn joined_from_row(row: &MySqlRow) -> Result<RecipeWithOwner, StoreError> {
    Ok(RecipeWithOwner {
        recipe: recipe_from_row(row)?,
        owner: owner_from_row(row)?,
    })
}

#[async_trait]
impl RecipeStore for MySqlStore {
    #[instrument(skip(self, recipe), fields(recipe_id = %recipe.id()))]
    async fn insert_recipe(&self, recipe: &Recipe) -> Result<(), StoreError> {
        let content = recipe.content();
        let query = sqlx::query(
            r#"
            INSERT INTO `Recipe`
            (`id`, `owner_id`, `title`, `ingredients`, `instructions`, `status`, `created_at`, `updated_at`)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(recipe.id().to_string())
        .bind(recipe.owner_id().to_string())
        .bind(content.title())
        .bind(content.ingredients())
        .bind(content.instructions())
        .bind(content.status().as_str())
        .bind(recipe.created_at())
        .bind(recipe.updated_at());

        self.0.execute(query).await.map_err(db_error)?;
        debug!("Recipe stored");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_recipe(&self, id: &RecipeId) -> Result<Option<Recipe>, StoreError> {
        let row = sqlx::query(&format!("SELECT {RECIPE_COLUMNS} FROM `Recipe` r WHERE r.`id` = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.0)
            .await
            .map_err(db_error)?;

        row.as_ref().map(recipe_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn find_recipe_with_owner(
        &self,
        id: &RecipeId,
    ) -> Result<Option<RecipeWithOwner>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {RECIPE_COLUMNS}, {OWNER_COLUMNS} FROM `Recipe` r \
             INNER JOIN `User` u ON u.`id` = r.`owner_id` WHERE r.`id` = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.0)
        .await
        .map_err(db_error)?;

        row.as_ref().map(joined_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn list_public_recipes(&self) -> Result<Vec<RecipeWithOwner>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {RECIPE_COLUMNS}, {OWNER_COLUMNS} FROM `Recipe` r \
             INNER JOIN `User` u ON u.`id` = r.`owner_id` \
             WHERE r.`status` = ? ORDER BY r.`created_at` DESC"
        ))
        .bind(RecipeStatus::Public.as_str())
        .fetch_all(&self.0)
        .await
        .map_err(db_error)?;

        debug!("{} public recipes found", rows.len());

        rows.iter().map(joined_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn list_public_recipes_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<RecipeWithOwner>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {RECIPE_COLUMNS}, {OWNER_COLUMNS} FROM `Recipe` r \
             INNER JOIN `User` u ON u.`id` = r.`owner_id` \
             WHERE r.`owner_id` = ? AND r.`status` = ?"
        ))
        .bind(owner.to_string())
        .bind(RecipeStatus::Public.as_str())
        .fetch_all(&self.0)
        .await
        .map_err(db_error)?;

        rows.iter().map(joined_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn list_recipes_by_owner(&self, owner: &UserId) -> Result<Vec<Recipe>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {RECIPE_COLUMNS} FROM `Recipe` r WHERE r.`owner_id` = ? ORDER BY r.`created_at` DESC"
        ))
        .bind(owner.to_string())
        .fetch_all(&self.0)
        .await
        .map_err(db_error)?;

        rows.iter().map(recipe_from_row).collect()
    }

    #[instrument(skip(self, content))]
    async fn update_owned_recipe(
        &self,
        id: &RecipeId,
        owner: &UserId,
        content: &RecipeContent,
    ) -> Result<Option<Recipe>, StoreError> {
        let mut transaction = self.0.begin().await.map_err(db_error)?;

        let query = sqlx::query(
            r#"
            UPDATE `Recipe`
            SET `title` = ?, `ingredients` = ?, `instructions` = ?, `status` = ?, `updated_at` = ?
            WHERE `id` = ? AND `owner_id` = ?
            "#,
        )
        .bind(content.title())
        .bind(content.ingredients())
        .bind(content.instructions())
        .bind(content.status().as_str())
        .bind(Utc::now())
        .bind(id.to_string())
        .bind(owner.to_string());

        let result = transaction.execute(query).await.map_err(db_error)?;

        if result.rows_affected() == 0 {
            transaction.rollback().await.map_err(db_error)?;
            return Ok(None);
        }

        let row = sqlx::query(&format!("SELECT {RECIPE_COLUMNS} FROM `Recipe` r WHERE r.`id` = ?"))
            .bind(id.to_string())
            .fetch_one(&mut *transaction)
            .await
            .map_err(db_error)?;

        transaction.commit().await.map_err(db_error)?;

        recipe_from_row(&row).map(Some)
    }

    #[instrument(skip(self))]
    async fn delete_owned_recipe(
        &self,
        id: &RecipeId,
        owner: &UserId,
    ) -> Result<bool, StoreError> {
        let query = sqlx::query("DELETE FROM `Recipe` WHERE `id` = ? AND `owner_id` = ?")
            .bind(id.to_string())
            .bind(owner.to_string());

        let result = self.0.execute(query).await.map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AccountStore for MySqlStore {
    #[instrument(skip(self, user), fields(user_id = %user.id()))]
    async fn register_user(&self, user: &User) -> Result<(), StoreError> {
        let query = sqlx::query(
            r#"
            INSERT INTO `User` (`id`, `display_name`, `first_name`, `last_name`, `image`, `created_at`)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id().to_string())
        .bind(user.display_name())
        .bind(user.first_name())
        .bind(user.last_name())
        .bind(user.image())
        .bind(user.created_at());

        self.0.execute(query).await.map_err(db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT `id`, `display_name`, `first_name`, `last_name`, `image`, `created_at` FROM `User` WHERE `id` = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.0)
        .await
        .map_err(db_error)?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self, session), fields(session_id = %session.id))]
    async fn insert_session(&self, session: &SessionRecord) -> Result<(), StoreError> {
        let query = sqlx::query(
            "INSERT INTO `Session` (`id`, `user_id`, `token_hash`, `expires_at`) VALUES (?, ?, ?, ?)",
        )
        .bind(session.id.to_string())
        .bind(session.user_id.to_string())
        .bind(session.token_hash.expose_secret())
        .bind(session.expires_at);

        self.0.execute(query).await.map_err(db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_session(&self, id: &Uuid) -> Result<Option<SessionRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT `user_id`, `token_hash`, `expires_at` FROM `Session` WHERE `id` = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.0)
        .await
        .map_err(db_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let user_id: String = row.try_get("user_id")?;
        let token_hash: String = row.try_get("token_hash")?;

        Ok(Some(SessionRecord {
            id: *id,
            user_id: UserId::from_str(&user_id).map_err(corrupt)?,
            token_hash: SecretString::from(token_hash),
            expires_at: row.try_get("expires_at")?,
        }))
    }

    #[instrument(skip(self))]
    async fn delete_session(&self, id: &Uuid) -> Result<(), StoreError> {
        let query = sqlx::query("DELETE FROM `Session` WHERE `id` = ?").bind(id.to_string());

        self.0.execute(query).await.map_err(db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_expired_sessions(&self, now: &DateTime<Utc>) -> Result<u64, StoreError> {
        let query = sqlx::query("DELETE FROM `Session` WHERE `expires_at` <= ?").bind(*now);

        let result = self.0.execute(query).await.map_err(db_error)?;

        Ok(result.rows_affected())
    }
}
