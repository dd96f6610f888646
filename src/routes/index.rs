// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Landing page, dashboard and logout.

use crate::{
    authentication::{
        close_session, removal_cookie, session_token, AuthError, SessionUser, SIGN_IN_PATH,
    },
    configuration::SessionSettings,
    routes::recipe::utils::DASHBOARD_PATH,
    storage::{AccountStore, RecipeStore},
    views::{found, render, DashboardPage, LoginPage, PageError, RecipeRow},
};
use actix_web::{get, http::header, web, HttpRequest, HttpResponse};
use tracing::{error, info, instrument, warn};

/// Path of the logout endpoint.
const LOGOUT_PATH: &str = "/logout";

/// GET method for the / endpoint (Public).
///
/// Signed-in users are sent to their dashboard. Clients without a valid session get the sign-in page, and a
/// session that can't be checked because of a backend failure gets the server error page.
#[utoipa::path(
    get,
    path = "/",
    tag = "Session",
    responses(
        (status = 200, description = "Sign-in page."),
        (status = 302, description = "The client is signed in. Redirection to the dashboard."),
        (status = 500, description = "The session couldn't be checked."),
    )
)]
#[instrument(skip_all)]
#[get("/")]
pub async fn landing(user: Result<SessionUser, AuthError>) -> actix_web::Result<HttpResponse> {
    match user {
        Ok(_) => Ok(found(DASHBOARD_PATH)),
        Err(AuthError::MissingSession | AuthError::InvalidSession(_)) => Ok(render(&LoginPage {
            title: "Welcome",
        })?),
        Err(e) => {
            error!("Failed to check the session of the client: {e}");
            Err(e.into())
        }
    }
}

/// GET method for the /dashboard endpoint (Restricted).
///
/// # Description
///
/// Greets the caller and lists all of their recipes, whatever their status, newest first.
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "Session",
    responses(
        (status = 200, description = "Dashboard of the user."),
        (status = 302, description = "The client has no valid session."),
    )
)]
#[instrument(skip_all, fields(user_id = %user.user_id()))]
#[get("/dashboard")]
pub async fn dashboard(
    user: SessionUser,
    accounts: web::Data<dyn AccountStore>,
    recipes: web::Data<dyn RecipeStore>,
) -> Result<HttpResponse, PageError> {
    let Some(profile) = accounts.find_user(user.user_id()).await? else {
        // A session that outlived its user. Drop it.
        warn!("Session of an unknown user");
        return Ok(found(LOGOUT_PATH));
    };

    let own_recipes = recipes.list_recipes_by_owner(user.user_id()).await?;

    render(&DashboardPage {
        title: "Dashboard",
        name: profile.greeting_name().to_owned(),
        recipes: own_recipes.iter().map(RecipeRow::from).collect(),
    })
}

/// GET method for the /logout endpoint (Public).
///
/// Closes the session of the caller, if any, and asks the client to drop the session cookie.
#[utoipa::path(
    get,
    path = "/logout",
    tag = "Session",
    responses(
        (status = 302, description = "Redirection to the sign-in page."),
    )
)]
#[instrument(skip_all)]
#[get("/logout")]
pub async fn logout(
    req: HttpRequest,
    accounts: web::Data<dyn AccountStore>,
    settings: web::Data<SessionSettings>,
) -> HttpResponse {
    if let Ok(token) = session_token(&req) {
        match close_session(accounts.get_ref(), &token).await {
            Ok(()) => info!("User signed out"),
            Err(e) => error!("Failed to close a session: {e}"),
        }
    }

    HttpResponse::Found()
        .insert_header((header::LOCATION, SIGN_IN_PATH))
        .cookie(removal_cookie(&settings))
        .finish()
}
