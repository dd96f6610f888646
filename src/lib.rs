// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recetario library.
//!
//! A small web application to share cooking recipes. Signed-in users write recipes, publish them or keep them
//! private, and browse the public recipes of everyone else.

use utoipa::OpenApi;

// Re-export of the domain objects.
pub use domain::{Recipe, RecipeForm, RecipeStatus, User, UserId};

pub mod authentication;
pub mod configuration;
pub mod domain;
pub mod startup;
pub mod storage;
pub mod telemetry;
pub mod views;

pub mod routes {
    pub mod health;
    pub mod index;

    pub use health::{echo, openapi_json};
    pub use index::{dashboard, landing, logout};

    pub mod recipe {
        pub mod delete;
        pub mod get;
        pub mod post;
        pub mod put;
        pub mod utils;

        pub use delete::delete_recipe;
        pub use get::{get_recipe, list_recipes, list_user_recipes, show_add_form, show_edit_form};
        pub use post::{add_recipe, override_method};
        pub use put::update_recipe;
    }
}

/// Main [OpenApi] `Struct`. See [the official docs](https://docs.rs/utoipa/latest/utoipa/derive.OpenApi.html).
#[derive(OpenApi)]
#[openapi(
    paths(
        routes::recipe::get::show_add_form,
        routes::recipe::get::list_recipes,
        routes::recipe::get::list_user_recipes,
        routes::recipe::get::get_recipe,
        routes::recipe::get::show_edit_form,
        routes::recipe::post::add_recipe,
        routes::recipe::post::override_method,
        routes::recipe::put::update_recipe,
        routes::recipe::delete::delete_recipe,
        routes::index::landing,
        routes::index::dashboard,
        routes::index::logout,
        routes::health::echo,
    ),
    components(
        schemas(RecipeForm, RecipeStatus)
    ),
    tags(
        (name = "Recipe", description = "Pages to read and write recipes."),
        (name = "Session", description = "Sign-in page, dashboard and logout."),
        (name = "Maintenance", description = "Endpoints related to server's status.")
    ),
    info(
        title = "Recetario",
        description = "## A web application to share cooking recipes.",
        contact(name = "Felipe Torres González", email = "admin@nubecita.eu")
    )
)]
pub struct ApiDoc;
