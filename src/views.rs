// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTML views of the application.
//!
//! # Description
//!
//! Pages are [askama] templates found in the `templates` folder. Handlers build one of the `*Page` objects and
//! pass it to [render], or answer with a redirection. Failures are reported through [PageError], which renders the
//! matching error page.

use crate::{
    domain::{DataDomainError, Recipe, RecipeForm, RecipeStatus, RecipeWithOwner, User, UserId},
    storage::StoreError,
};
use actix_web::{
    http::{header, header::ContentType, StatusCode},
    HttpResponse, HttpResponseBuilder, ResponseError,
};
use askama::Template;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::error;

/// Max number of characters of a recipe shown in the lists.
const EXCERPT_LENGTH: usize = 150;

/// Errors that end a request with an error page.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Resource not found")]
    NotFound,
    #[error(transparent)]
    InvalidInput(#[from] DataDomainError),
    #[error(transparent)]
    Storage(#[from] StoreError),
    #[error("Failed to render a page: {0}")]
    Render(#[from] askama::Error),
}

impl ResponseError for PageError {
    fn status_code(&self) -> StatusCode {
        match self {
            PageError::NotFound => StatusCode::NOT_FOUND,
            PageError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PageError::Storage(_) | PageError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            PageError::NotFound => not_found_page(),
            PageError::InvalidInput(e) => error_page(
                StatusCode::BAD_REQUEST,
                &format!("The recipe could not be saved. {e}"),
            ),
            PageError::Storage(e) => {
                error!("Storage failure: {e}");
                server_error_page()
            }
            PageError::Render(e) => {
                error!("{e}");
                HttpResponse::InternalServerError().finish()
            }
        }
    }
}

/// Render a page with a `200 OK` status.
pub fn render<T: Template>(page: &T) -> Result<HttpResponse, PageError> {
    Ok(html(HttpResponse::Ok(), page.render()?))
}

fn html(mut builder: HttpResponseBuilder, body: String) -> HttpResponse {
    builder
        .insert_header(ContentType::html())
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .body(body)
}

/// Redirection after a form submission. The client follows it using GET.
pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Plain redirection for GET requests.
pub fn found(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub fn not_found_page() -> HttpResponse {
    match (NotFoundPage { title: "Not found" }).render() {
        Ok(body) => html(HttpResponse::NotFound(), body),
        Err(e) => {
            error!("{e}");
            HttpResponse::NotFound().finish()
        }
    }
}

pub fn server_error_page() -> HttpResponse {
    error_page(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Something went wrong on our side.",
    )
}

fn error_page(status: StatusCode, message: &str) -> HttpResponse {
    let page = ErrorPage {
        title: "Error",
        message: message.to_owned(),
    };

    match page.render() {
        Ok(body) => html(HttpResponse::build(status), body),
        Err(e) => {
            error!("{e}");
            HttpResponse::build(status).finish()
        }
    }
}

#[derive(Template)]
#[template(path = "error/404.html")]
pub struct NotFoundPage {
    pub title: &'static str,
}

#[derive(Template)]
#[template(path = "error/500.html")]
pub struct ErrorPage {
    pub title: &'static str,
    pub message: String,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub title: &'static str,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub title: &'static str,
    pub name: String,
    pub recipes: Vec<RecipeRow>,
}

#[derive(Template)]
#[template(path = "recipes/add.html")]
pub struct AddRecipePage {
    pub title: &'static str,
}

#[derive(Template)]
#[template(path = "recipes/edit.html")]
pub struct EditRecipePage {
    pub title: &'static str,
    pub id: String,
    pub form: RecipeForm,
    pub is_private: bool,
}

#[derive(Template)]
#[template(path = "recipes/index.html")]
pub struct RecipeIndexPage {
    pub title: &'static str,
    pub heading: String,
    pub recipes: Vec<RecipeCard>,
}

#[derive(Template)]
#[template(path = "recipes/show.html")]
pub struct ShowRecipePage {
    pub title: &'static str,
    pub recipe: RecipeDetail,
}

/// Owner of a recipe, as shown in the pages.
pub struct OwnerView {
    pub id: String,
    pub name: String,
    /// Avatar URL, empty when the user has none.
    pub image: String,
}

impl From<&User> for OwnerView {
    fn from(user: &User) -> Self {
        OwnerView {
            id: user.id().to_string(),
            name: user.display_name().to_owned(),
            image: user.image().unwrap_or_default().to_owned(),
        }
    }
}

/// Entry of the recipe lists.
pub struct RecipeCard {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub owner: OwnerView,
    pub created: String,
    pub can_edit: bool,
}

impl RecipeCard {
    pub fn new(entry: &RecipeWithOwner, viewer: &UserId) -> Self {
        let recipe = &entry.recipe;

        RecipeCard {
            id: recipe.id().to_string(),
            title: recipe.title().to_owned(),
            excerpt: excerpt(recipe.content().instructions(), EXCERPT_LENGTH),
            owner: OwnerView::from(&entry.owner),
            created: format_date(recipe.created_at()),
            can_edit: recipe.is_owned_by(viewer),
        }
    }
}

/// Full view of a recipe.
pub struct RecipeDetail {
    pub id: String,
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub status: String,
    pub owner: OwnerView,
    pub created: String,
    pub can_edit: bool,
}

impl RecipeDetail {
    pub fn new(entry: &RecipeWithOwner, viewer: &UserId) -> Self {
        let recipe = &entry.recipe;
        let content = recipe.content();

        RecipeDetail {
            id: recipe.id().to_string(),
            title: recipe.title().to_owned(),
            ingredients: non_empty_lines(content.ingredients().unwrap_or_default()),
            instructions: non_empty_lines(content.instructions()),
            status: recipe.status().to_string(),
            owner: OwnerView::from(&entry.owner),
            created: format_date(recipe.created_at()),
            can_edit: recipe.is_owned_by(viewer),
        }
    }
}

/// Entry of the dashboard table.
pub struct RecipeRow {
    pub id: String,
    pub title: String,
    pub status: String,
    pub created: String,
}

impl From<&Recipe> for RecipeRow {
    fn from(recipe: &Recipe) -> Self {
        RecipeRow {
            id: recipe.id().to_string(),
            title: recipe.title().to_owned(),
            status: recipe.status().to_string(),
            created: format_date(recipe.created_at()),
        }
    }
}

impl EditRecipePage {
    pub fn new(recipe: &Recipe) -> Self {
        EditRecipePage {
            title: "Edit recipe",
            id: recipe.id().to_string(),
            form: RecipeForm::from(recipe),
            is_private: recipe.status() == RecipeStatus::Private,
        }
    }
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y %H:%M").to_string()
}

/// Cut `text` to `max_chars` characters, on a word boundary when possible.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }

    let cut: String = text.chars().take(max_chars).collect();
    let cut = match cut.rfind(char::is_whitespace) {
        Some(position) if position > 0 => &cut[..position],
        _ => cut.as_str(),
    };

    format!("{}...", cut.trim_end())
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
