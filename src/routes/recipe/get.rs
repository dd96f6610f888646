// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recipe endpoint GET methods.

use crate::{
    authentication::SessionUser,
    domain::UserId,
    routes::recipe::utils::{parse_recipe_id, RECIPES_PATH},
    storage::RecipeStore,
    views::{
        found, render, AddRecipePage, EditRecipePage, PageError, RecipeCard, RecipeDetail,
        RecipeIndexPage, ShowRecipePage,
    },
};
use actix_web::{get, web, HttpResponse};
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};

/// GET method for the /recipes/add endpoint (Restricted).
///
/// Renders the form to write a new recipe.
#[utoipa::path(
    get,
    path = "/recipes/add",
    tag = "Recipe",
    responses(
        (status = 200, description = "Form to add a new recipe."),
        (status = 302, description = "The client has no valid session."),
    )
)]
#[instrument(skip_all, fields(user_id = %user.user_id()))]
#[get("/add")]
pub async fn show_add_form(user: SessionUser) -> Result<HttpResponse, PageError> {
    render(&AddRecipePage {
        title: "Add a recipe",
    })
}

/// GET method for the /recipes endpoint (Restricted).
///
/// # Description
///
/// Lists every public recipe, newest first. Private recipes are never listed here, not even to their owners.
#[utoipa::path(
    get,
    path = "/recipes",
    tag = "Recipe",
    responses(
        (status = 200, description = "List of public recipes."),
        (status = 302, description = "The client has no valid session."),
    )
)]
#[instrument(skip_all, fields(user_id = %user.user_id()))]
#[get("")]
pub async fn list_recipes(
    user: SessionUser,
    recipes: web::Data<dyn RecipeStore>,
) -> Result<HttpResponse, PageError> {
    let entries = recipes.list_public_recipes().await?;
    debug!("{} public recipes found", entries.len());

    render(&RecipeIndexPage {
        title: "Recipes",
        heading: String::from("All public recipes"),
        recipes: entries
            .iter()
            .map(|entry| RecipeCard::new(entry, user.user_id()))
            .collect(),
    })
}

/// GET method for the /recipes/user/{user_id} endpoint (Restricted).
///
/// Lists the public recipes of a single user. An unknown user simply has no recipes.
#[utoipa::path(
    get,
    path = "/recipes/user/{user_id}",
    tag = "Recipe",
    params(("user_id" = String, Path, description = "ID of the owner of the recipes.")),
    responses(
        (status = 200, description = "List of public recipes of the user."),
        (status = 302, description = "The client has no valid session."),
        (status = 404, description = "Malformed user ID."),
    )
)]
#[instrument(skip(user, recipes))]
#[get("/user/{user_id}")]
pub async fn list_user_recipes(
    path: web::Path<String>,
    user: SessionUser,
    recipes: web::Data<dyn RecipeStore>,
) -> Result<HttpResponse, PageError> {
    let owner = UserId::from_str(&path).map_err(|_| PageError::NotFound)?;
    let entries = recipes.list_public_recipes_by_owner(&owner).await?;

    let heading = match entries.first() {
        Some(entry) => format!("Recipes by {}", entry.owner.display_name()),
        None => String::from("No public recipes by this user"),
    };

    render(&RecipeIndexPage {
        title: "Recipes",
        heading,
        recipes: entries
            .iter()
            .map(|entry| RecipeCard::new(entry, user.user_id()))
            .collect(),
    })
}

/// GET method for the /recipes/{id} endpoint (Restricted).
///
/// # Description
///
/// Public recipes are shown to any signed-in user. Private recipes are only shown to their owner, everyone else
/// gets the same answer as for a recipe that doesn't exist.
#[utoipa::path(
    get,
    path = "/recipes/{id}",
    tag = "Recipe",
    params(("id" = String, Path, description = "ID of the recipe.")),
    responses(
        (status = 200, description = "The recipe."),
        (status = 302, description = "The client has no valid session."),
        (status = 404, description = "No recipe visible to the client matches the given ID."),
    )
)]
#[instrument(skip(user, recipes))]
#[get("/{id}")]
pub async fn get_recipe(
    path: web::Path<String>,
    user: SessionUser,
    recipes: web::Data<dyn RecipeStore>,
) -> Result<HttpResponse, PageError> {
    let id = parse_recipe_id(&path)?;
    let entry = recipes
        .find_recipe_with_owner(&id)
        .await?
        .ok_or(PageError::NotFound)?;

    if !entry.recipe.is_visible_to(user.user_id()) {
        info!("Private recipe requested by a user that doesn't own it");
        return Err(PageError::NotFound);
    }

    render(&ShowRecipePage {
        title: "Recipe",
        recipe: RecipeDetail::new(&entry, user.user_id()),
    })
}

/// GET method for the /recipes/edit/{id} endpoint (Restricted).
///
/// Renders the edit form pre-filled with the current content of the recipe. Only the owner gets the form,
/// other users are sent back to the list of recipes.
#[utoipa::path(
    get,
    path = "/recipes/edit/{id}",
    tag = "Recipe",
    params(("id" = String, Path, description = "ID of the recipe.")),
    responses(
        (status = 200, description = "Form to edit the recipe."),
        (status = 302, description = "The client has no valid session, or doesn't own the recipe."),
        (status = 404, description = "No recipe matches the given ID."),
    )
)]
#[instrument(skip(user, recipes))]
#[get("/edit/{id}")]
pub async fn show_edit_form(
    path: web::Path<String>,
    user: SessionUser,
    recipes: web::Data<dyn RecipeStore>,
) -> Result<HttpResponse, PageError> {
    let id = parse_recipe_id(&path)?;
    let recipe = recipes.find_recipe(&id).await?.ok_or(PageError::NotFound)?;

    if !recipe.is_owned_by(user.user_id()) {
        warn!("Edit form requested by a user that doesn't own the recipe");
        return Ok(found(RECIPES_PATH));
    }

    render(&EditRecipePage::new(&recipe))
}
