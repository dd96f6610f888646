// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recipe endpoint POST methods.

use crate::{
    authentication::SessionUser,
    domain::{Recipe, RecipeForm},
    routes::recipe::utils::{apply_delete, apply_update, decode_form, DASHBOARD_PATH},
    storage::RecipeStore,
    views::{see_other, PageError},
};
use actix_web::{post, web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument, warn};

/// POST method for the /recipes endpoint (Restricted).
///
/// # Description
///
/// Stores a new recipe owned by the caller. The owner is always taken from the session: any owner-like field
/// included in the form is ignored.
#[utoipa::path(
    post,
    path = "/recipes",
    tag = "Recipe",
    request_body(content = RecipeForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "The recipe was stored. Redirection to the dashboard."),
        (status = 302, description = "The client has no valid session."),
        (status = 400, description = "The form contains invalid values."),
    )
)]
#[instrument(skip_all, fields(user_id = %user.user_id()))]
#[post("")]
pub async fn add_recipe(
    body: web::Bytes,
    user: SessionUser,
    recipes: web::Data<dyn RecipeStore>,
) -> Result<HttpResponse, PageError> {
    let content = decode_form(&body).and_then(RecipeForm::parse)?;
    let recipe = Recipe::new(*user.user_id(), content);

    recipes.insert_recipe(&recipe).await?;
    info!("New recipe stored: {}", recipe.id());

    Ok(see_other(DASHBOARD_PATH))
}

/// Hidden field used by HTML forms to tunnel methods other than GET and POST.
#[derive(Debug, Deserialize)]
struct MethodOverride {
    #[serde(rename = "_method")]
    method: Option<String>,
}

/// POST method for the /recipes/{id} endpoint (Restricted).
///
/// # Description
///
/// HTML forms can only send GET and POST requests, so the edit and delete forms send a POST request including a
/// `_method` field whose value is `PUT` or `DELETE` (any case). The request is then handled as the PUT or DELETE
/// method of the same endpoint. Any other value is rejected.
#[utoipa::path(
    post,
    path = "/recipes/{id}",
    tag = "Recipe",
    params(("id" = String, Path, description = "ID of the recipe.")),
    request_body(content = RecipeForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "See the PUT and DELETE methods of this endpoint."),
        (status = 302, description = "The client has no valid session."),
        (status = 400, description = "The form contains invalid values."),
        (status = 404, description = "No recipe matches the given ID."),
        (status = 405, description = "Missing or unsupported `_method` field."),
    )
)]
#[instrument(skip(body, user, recipes))]
#[post("/{id}")]
pub async fn override_method(
    path: web::Path<String>,
    body: web::Bytes,
    user: SessionUser,
    recipes: web::Data<dyn RecipeStore>,
) -> Result<HttpResponse, PageError> {
    let method = serde_urlencoded::from_bytes::<MethodOverride>(&body)
        .ok()
        .and_then(|m| m.method)
        .map(|m| m.to_ascii_uppercase());

    match method.as_deref() {
        Some("PUT") => apply_update(recipes.get_ref(), &user, &path, &body).await,
        Some("DELETE") => apply_delete(recipes.get_ref(), &user, &path).await,
        other => {
            warn!("Unsupported method override: {other:?}");
            Ok(HttpResponse::MethodNotAllowed().finish())
        }
    }
}
