// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recipe endpoint PUT method.

use crate::{
    authentication::SessionUser, routes::recipe::utils::apply_update, storage::RecipeStore,
    views::PageError,
};
use actix_web::{put, web, HttpResponse};
use tracing::instrument;

/// PUT method for the /recipes/{id} endpoint (Restricted).
///
/// # Description
///
/// Replaces the content of a recipe owned by the caller. Requests from any other user leave the recipe
/// untouched and get redirected to the list of recipes.
#[utoipa::path(
    put,
    path = "/recipes/{id}",
    tag = "Recipe",
    params(("id" = String, Path, description = "ID of the recipe.")),
    request_body(content = RecipeForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirection to the dashboard if the recipe was updated, or to the list of recipes if the client doesn't own it."),
        (status = 302, description = "The client has no valid session."),
        (status = 400, description = "The form contains invalid values."),
        (status = 404, description = "No recipe matches the given ID."),
    )
)]
#[instrument(skip(body, user, recipes))]
#[put("/{id}")]
pub async fn update_recipe(
    path: web::Path<String>,
    body: web::Bytes,
    user: SessionUser,
    recipes: web::Data<dyn RecipeStore>,
) -> Result<HttpResponse, PageError> {
    apply_update(recipes.get_ref(), &user, &path, &body).await
}
