// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data objects related to Recipes.
//!
//! # Description
//!
//! This module includes the definition of the object [Recipe] which is a representation of a recipe entry in the
//! storage backend. Clients never send a [Recipe]: the create and update forms are received as a [RecipeForm], which
//! only lists the fields that a user is allowed to set. Once validated, a form becomes a [RecipeContent], the piece
//! of a recipe that its owner can change.

use crate::domain::{DataDomainError, User, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Identifier of a recipe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipeId(Uuid);

impl RecipeId {
    pub fn new() -> Self {
        RecipeId(Uuid::now_v7())
    }
}

impl Default for RecipeId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for RecipeId {
    type Err = DataDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(RecipeId)
            .map_err(|_| DataDomainError::InvalidId)
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visibility of a recipe.
///
/// `Public` recipes are listed and readable by any signed-in user, `Private` recipes only by their owner.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecipeStatus {
    #[default]
    Public,
    Private,
}

impl RecipeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipeStatus::Public => "public",
            RecipeStatus::Private => "private",
        }
    }
}

impl fmt::Display for RecipeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for RecipeStatus {
    type Error = DataDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "public" => Ok(RecipeStatus::Public),
            "private" => Ok(RecipeStatus::Private),
            _ => Err(DataDomainError::InvalidStatus(value.into())),
        }
    }
}

/// Fields accepted by the create and edit forms.
///
/// # Description
///
/// Any other field sent along the form is ignored, so the owner of a recipe can't be forged through the form.
/// Use [RecipeForm::parse] to obtain the validated [RecipeContent].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RecipeForm {
    /// Recipe's title. Up to 100 chars.
    #[schema(example = "Tomato soup")]
    pub title: String,
    /// Free list of ingredients. Up to 2000 chars.
    #[serde(default)]
    pub ingredients: String,
    /// Preparation steps. Up to 10000 chars.
    #[schema(example = "Roast the tomatoes, blend and serve hot.")]
    pub instructions: String,
    #[serde(default)]
    pub status: RecipeStatus,
}

/// The part of a [Recipe] that its owner can modify.
#[derive(Clone, Debug, Validate, PartialEq)]
pub struct RecipeContent {
    #[validate(length(min = 1, max = 100))]
    title: String,
    #[validate(length(max = 2000))]
    ingredients: Option<String>,
    #[validate(length(min = 1, max = 10000))]
    instructions: String,
    status: RecipeStatus,
}

impl RecipeForm {
    /// Validate the form and turn it into a [RecipeContent].
    ///
    /// Surrounding whitespace is trimmed, and an empty ingredient list is stored as no ingredient list at all.
    pub fn parse(self) -> Result<RecipeContent, DataDomainError> {
        let ingredients = self.ingredients.trim();

        RecipeContent::new(
            self.title.trim(),
            if ingredients.is_empty() {
                None
            } else {
                Some(ingredients)
            },
            self.instructions.trim(),
            self.status,
        )
    }
}

impl From<&Recipe> for RecipeForm {
    fn from(recipe: &Recipe) -> Self {
        RecipeForm {
            title: recipe.content.title.clone(),
            ingredients: recipe.content.ingredients.clone().unwrap_or_default(),
            instructions: recipe.content.instructions.clone(),
            status: recipe.content.status,
        }
    }
}

impl RecipeContent {
    pub fn new(
        title: &str,
        ingredients: Option<&str>,
        instructions: &str,
        status: RecipeStatus,
    ) -> Result<Self, DataDomainError> {
        let content = RecipeContent {
            title: title.into(),
            ingredients: ingredients.map(String::from),
            instructions: instructions.into(),
            status,
        };

        match content.validate() {
            Ok(_) => Ok(content),
            Err(e) => Err(DataDomainError::InvalidParams { source: e }),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn ingredients(&self) -> Option<&str> {
        self.ingredients.as_deref()
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn status(&self) -> RecipeStatus {
        self.status
    }
}

/// Object that represents a stored recipe.
///
/// # Description
///
/// The owner of a recipe is fixed when the recipe is created and no method allows changing it afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Recipe {
    id: RecipeId,
    owner_id: UserId,
    content: RecipeContent,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl Recipe {
    /// Build a brand new recipe owned by `owner_id`.
    pub fn new(owner_id: UserId, content: RecipeContent) -> Self {
        Recipe {
            id: RecipeId::new(),
            owner_id,
            content,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Rebuild a recipe from its stored parts.
    pub fn from_parts(
        id: RecipeId,
        owner_id: UserId,
        content: RecipeContent,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Recipe {
            id,
            owner_id,
            content,
            created_at,
            updated_at,
        }
    }

    /// Replace the content of the recipe. The owner and the creation date are kept.
    pub fn update_content(&mut self, content: RecipeContent) {
        self.content = content;
        self.updated_at = Some(Utc::now());
    }

    pub fn id(&self) -> &RecipeId {
        &self.id
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    pub fn content(&self) -> &RecipeContent {
        &self.content
    }

    pub fn title(&self) -> &str {
        self.content.title()
    }

    pub fn status(&self) -> RecipeStatus {
        self.content.status()
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    pub fn updated_at(&self) -> Option<&DateTime<Utc>> {
        self.updated_at.as_ref()
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner_id == user
    }

    /// Whether `user` is allowed to read the recipe.
    pub fn is_visible_to(&self, user: &UserId) -> bool {
        self.status() == RecipeStatus::Public || self.is_owned_by(user)
    }
}

/// A [Recipe] joined with the public profile of its owner.
#[derive(Clone, Debug, PartialEq)]
pub struct RecipeWithOwner {
    pub recipe: Recipe,
    pub owner: User,
}
