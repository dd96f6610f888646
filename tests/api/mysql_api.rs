// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests against the MariaDB backend.
//!
//! Each test creates its own database. Run them with `cargo test -- --ignored` once a MariaDB server is reachable
//! with the settings of `config/` (or `RECETARIO__DATABASE__*` variables).

use crate::helpers::{location, spawn_mysql_app};
use actix_web::http::StatusCode;
use chrono::{TimeDelta, Utc};
use pretty_assertions::assert_eq;
use recetario::{
    authentication::open_session,
    domain::{RecipeId, RecipeStatus, UserId},
    storage::AccountStore,
};

fn stew_form() -> Vec<(&'static str, &'static str)> {
    vec![
        ("title", "Lentil stew"),
        ("ingredients", "Lentils\nCarrots"),
        ("instructions", "Simmer everything for forty minutes."),
        ("status", "public"),
    ]
}

#[actix_web::test]
#[ignore = "requires a MariaDB server"]
async fn foreign_recipes_are_neither_updated_nor_deleted() {
    let test_app = spawn_mysql_app().await;
    let owner = test_app.sign_in("Jane").await;
    let other = test_app.sign_in("John").await;
    let recipe = test_app
        .seed_recipe(owner.id(), "Gazpacho", RecipeStatus::Public, Utc::now())
        .await;
    let path = format!("/recipes/{}", recipe.id());

    let response = test_app.put_form(&path, &other, &stew_form()).await;
    assert_eq!(response.status().as_u16(), StatusCode::SEE_OTHER.as_u16());
    assert_eq!(location(&response), "/recipes");

    let response = test_app.delete(&path, &other).await;
    assert_eq!(response.status().as_u16(), StatusCode::SEE_OTHER.as_u16());
    assert_eq!(location(&response), "/recipes");

    // DATETIME columns drop the nanoseconds, so compare field by field.
    let stored = test_app
        .stored_recipe(recipe.id())
        .await
        .expect("The recipe was deleted by a non-owner");
    assert_eq!(stored.owner_id(), owner.id());
    assert_eq!(stored.content(), recipe.content());
    assert!(stored.updated_at().is_none());
}

#[actix_web::test]
#[ignore = "requires a MariaDB server"]
async fn owners_update_and_delete_their_recipes() {
    let test_app = spawn_mysql_app().await;
    let owner = test_app.sign_in("Jane").await;
    let recipe = test_app
        .seed_recipe(owner.id(), "Gazpacho", RecipeStatus::Public, Utc::now())
        .await;
    let path = format!("/recipes/{}", recipe.id());

    let response = test_app.put_form(&path, &owner, &stew_form()).await;
    assert_eq!(response.status().as_u16(), StatusCode::SEE_OTHER.as_u16());
    assert_eq!(location(&response), "/dashboard");

    let stored = test_app.stored_recipe(recipe.id()).await.unwrap();
    assert_eq!(stored.title(), "Lentil stew");
    assert_eq!(stored.content().ingredients(), Some("Lentils\nCarrots"));
    assert_eq!(stored.owner_id(), owner.id());
    assert!(stored.updated_at().is_some());

    let response = test_app.delete(&path, &owner).await;
    assert_eq!(response.status().as_u16(), StatusCode::SEE_OTHER.as_u16());
    assert_eq!(location(&response), "/dashboard");
    assert!(test_app.stored_recipe(recipe.id()).await.is_none());
}

#[actix_web::test]
#[ignore = "requires a MariaDB server"]
async fn missing_recipes_on_mysql() {
    let test_app = spawn_mysql_app().await;
    let user = test_app.sign_in("Jane").await;
    let path = format!("/recipes/{}", RecipeId::new());

    let response = test_app.put_form(&path, &user, &stew_form()).await;
    assert_eq!(response.status().as_u16(), StatusCode::NOT_FOUND.as_u16());

    let response = test_app.delete(&path, &user).await;
    assert_eq!(response.status().as_u16(), StatusCode::SEE_OTHER.as_u16());
    assert_eq!(location(&response), "/recipes");
}

#[actix_web::test]
#[ignore = "requires a MariaDB server"]
async fn private_recipes_stay_private_on_mysql() {
    let test_app = spawn_mysql_app().await;
    let owner = test_app.sign_in("Jane").await;
    let other = test_app.sign_in("John").await;
    let recipe = test_app
        .seed_recipe(owner.id(), "Secret sauce", RecipeStatus::Private, Utc::now())
        .await;
    let path = format!("/recipes/{}", recipe.id());

    let response = test_app.get_page(&path, Some(&other)).await;
    assert_eq!(response.status().as_u16(), StatusCode::NOT_FOUND.as_u16());
    assert!(!response.text().await.unwrap().contains("Secret sauce"));

    let response = test_app.get_page(&path, Some(&owner)).await;
    assert_eq!(response.status().as_u16(), StatusCode::OK.as_u16());
    let body = response.text().await.unwrap();
    assert!(body.contains("Secret sauce"));
    assert!(body.contains("Jane"));
}

#[actix_web::test]
#[ignore = "requires a MariaDB server"]
async fn lists_are_ordered_on_mysql() {
    let test_app = spawn_mysql_app().await;
    let jane = test_app.sign_in("Jane").await;
    let john = test_app.sign_in("John").await;
    let now = Utc::now();

    test_app
        .seed_recipe(jane.id(), "Oldest paella", RecipeStatus::Public, now - TimeDelta::hours(2))
        .await;
    test_app
        .seed_recipe(john.id(), "Hidden flan", RecipeStatus::Private, now - TimeDelta::hours(1))
        .await;
    test_app
        .seed_recipe(john.id(), "Newest tortilla", RecipeStatus::Public, now)
        .await;

    let response = test_app.get_page("/recipes", Some(&jane)).await;
    assert_eq!(response.status().as_u16(), StatusCode::OK.as_u16());
    let body = response.text().await.unwrap();
    assert!(!body.contains("Hidden flan"));
    let newest = body.find("Newest tortilla").expect("Missing public recipe");
    let oldest = body.find("Oldest paella").expect("Missing public recipe");
    assert!(newest < oldest);

    // The dashboard shows private recipes of the caller too, newest first.
    let response = test_app.get_page("/dashboard", Some(&john)).await;
    assert_eq!(response.status().as_u16(), StatusCode::OK.as_u16());
    let body = response.text().await.unwrap();
    let newest = body.find("Newest tortilla").expect("Missing own recipe");
    let older = body.find("Hidden flan").expect("Missing own private recipe");
    assert!(newest < older);
    assert!(!body.contains("Oldest paella"));

    let response = test_app
        .get_page(&format!("/recipes/user/{}", john.id()), Some(&jane))
        .await;
    let body = response.text().await.unwrap();
    assert!(body.contains("Newest tortilla"));
    assert!(!body.contains("Hidden flan"));
    assert!(!body.contains("Oldest paella"));
}

#[actix_web::test]
#[ignore = "requires a MariaDB server"]
async fn expired_sessions_are_swept_on_mysql() {
    let test_app = spawn_mysql_app().await;
    let jane = test_app.sign_in("Jane").await;
    let user: &UserId = jane.id();

    let stale = open_session(test_app.accounts.as_ref(), user, TimeDelta::seconds(-1))
        .await
        .unwrap();
    assert!(test_app.accounts.find_session(stale.id()).await.unwrap().is_some());

    open_session(test_app.accounts.as_ref(), user, TimeDelta::hours(1))
        .await
        .unwrap();
    assert!(test_app.accounts.find_session(stale.id()).await.unwrap().is_none());

    // The session of the signed-in user is still valid.
    let response = test_app.get_page("/dashboard", Some(&jane)).await;
    assert_eq!(response.status().as_u16(), StatusCode::OK.as_u16());
}
