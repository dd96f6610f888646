// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recipe endpoint DELETE method.

use crate::{
    authentication::SessionUser, routes::recipe::utils::apply_delete, storage::RecipeStore,
    views::PageError,
};
use actix_web::{delete, web, HttpResponse};
use tracing::instrument;

/// DELETE method for the /recipes/{id} endpoint (Restricted).
///
/// # Description
///
/// Deletes a recipe owned by the caller. Nothing is deleted when the recipe doesn't exist or belongs to someone
/// else, and the client is redirected to the list of recipes without further notice.
#[utoipa::path(
    delete,
    path = "/recipes/{id}",
    tag = "Recipe",
    params(("id" = String, Path, description = "ID of the recipe.")),
    responses(
        (status = 303, description = "Redirection to the dashboard if the recipe was deleted, or to the list of recipes otherwise."),
        (status = 302, description = "The client has no valid session."),
    )
)]
#[instrument(skip(user, recipes))]
#[delete("/{id}")]
pub async fn delete_recipe(
    path: web::Path<String>,
    user: SessionUser,
    recipes: web::Data<dyn RecipeStore>,
) -> Result<HttpResponse, PageError> {
    apply_delete(recipes.get_ref(), &user, &path).await
}
