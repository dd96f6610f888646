// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Logic shared by the handlers of the `/recipes` endpoint.

use crate::{
    authentication::SessionUser,
    domain::{DataDomainError, RecipeForm, RecipeId},
    storage::RecipeStore,
    views::{see_other, PageError},
};
use actix_web::HttpResponse;
use std::str::FromStr;
use tracing::{info, warn};

/// Landing page of signed-in users.
pub const DASHBOARD_PATH: &str = "/dashboard";
/// List of public recipes.
pub const RECIPES_PATH: &str = "/recipes";

/// Parse the ID found in the path of a request. Unparsable IDs can't match any recipe.
pub fn parse_recipe_id(raw: &str) -> Result<RecipeId, PageError> {
    RecipeId::from_str(raw).map_err(|_| PageError::NotFound)
}

/// Decode a URL-encoded recipe form.
pub fn decode_form(body: &[u8]) -> Result<RecipeForm, DataDomainError> {
    serde_urlencoded::from_bytes(body).map_err(|e| DataDomainError::InvalidForm(e.to_string()))
}

/// Update the recipe `raw_id` using the content of a submitted form.
///
/// # Description
///
/// The update is issued as a single conditional operation filtered by the ID and the caller, so a recipe owned by
/// someone else is never modified. When nothing was updated, a read-only lookup tells apart a missing recipe
/// (not found page) from a recipe owned by someone else (redirection to the list of recipes). Invalid forms get
/// the same treatment for non-owners, and an error page for the owner.
pub async fn apply_update(
    recipes: &dyn RecipeStore,
    user: &SessionUser,
    raw_id: &str,
    body: &[u8],
) -> Result<HttpResponse, PageError> {
    let id = parse_recipe_id(raw_id)?;

    let content = match decode_form(body).and_then(RecipeForm::parse) {
        Ok(content) => content,
        Err(e) => {
            let recipe = recipes.find_recipe(&id).await?.ok_or(PageError::NotFound)?;
            if !recipe.is_owned_by(user.user_id()) {
                warn!("Attempt to update a recipe owned by another user");
                return Ok(see_other(RECIPES_PATH));
            }
            info!("Rejected update: {e}");
            return Err(PageError::InvalidInput(e));
        }
    };

    match recipes
        .update_owned_recipe(&id, user.user_id(), &content)
        .await?
    {
        Some(recipe) => {
            info!("Recipe {} updated", recipe.id());
            Ok(see_other(DASHBOARD_PATH))
        }
        None => match recipes.find_recipe(&id).await? {
            Some(_) => {
                warn!("Attempt to update a recipe owned by another user");
                Ok(see_other(RECIPES_PATH))
            }
            None => Err(PageError::NotFound),
        },
    }
}

/// Delete the recipe `raw_id` if it is owned by the caller.
///
/// Missing recipes and recipes owned by someone else are not told apart: both redirect to the list of recipes.
pub async fn apply_delete(
    recipes: &dyn RecipeStore,
    user: &SessionUser,
    raw_id: &str,
) -> Result<HttpResponse, PageError> {
    let Ok(id) = RecipeId::from_str(raw_id) else {
        return Ok(see_other(RECIPES_PATH));
    };

    if recipes.delete_owned_recipe(&id, user.user_id()).await? {
        info!("Recipe {id} deleted");
        Ok(see_other(DASHBOARD_PATH))
    } else {
        warn!("No recipe {id} owned by the caller, nothing deleted");
        Ok(see_other(RECIPES_PATH))
    }
}
