// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Domain objects of the application: users, recipes and the errors produced when building them.

mod recipe;
mod user;

pub use recipe::{Recipe, RecipeContent, RecipeForm, RecipeId, RecipeStatus, RecipeWithOwner};
pub use user::{User, UserBuilder, UserId};

use thiserror::Error;
use validator::ValidationErrors;

/// Errors produced when raw input can't be turned into a domain object.
#[derive(Debug, Error)]
pub enum DataDomainError {
    #[error("The given ID is not valid")]
    InvalidId,
    #[error("Invalid parameters: {source}")]
    InvalidParams { source: ValidationErrors },
    #[error("Malformed form: {0}")]
    InvalidForm(String),
    #[error("Unknown recipe status: {0}")]
    InvalidStatus(String),
    #[error("Invalid session token")]
    InvalidSessionToken,
}
