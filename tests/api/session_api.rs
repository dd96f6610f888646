// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::helpers::{location, spawn_app};
use actix_web::http::StatusCode;
use chrono::{TimeDelta, Utc};
use pretty_assertions::assert_eq;
use recetario::domain::RecipeStatus;
use reqwest::header;

#[actix_web::test]
async fn landing_page_for_guests_and_signed_in_users() {
    let test_app = spawn_app().await;

    let response = test_app.get_page("/", None).await;
    assert_eq!(response.status().as_u16(), StatusCode::OK.as_u16());
    assert!(response.text().await.unwrap().contains("Sign in"));

    let user = test_app.sign_in("Jane").await;
    let response = test_app.get_page("/", Some(&user)).await;
    assert_eq!(response.status().as_u16(), StatusCode::FOUND.as_u16());
    assert_eq!(location(&response), "/dashboard");
}

#[actix_web::test]
async fn dashboard_lists_every_own_recipe() {
    let test_app = spawn_app().await;
    let jane = test_app.sign_in("Jane").await;
    let john = test_app.sign_in("John").await;
    let now = Utc::now();

    test_app
        .seed_recipe(jane.id(), "Older public stew", RecipeStatus::Public, now - TimeDelta::hours(1))
        .await;
    test_app
        .seed_recipe(jane.id(), "Newer private pie", RecipeStatus::Private, now)
        .await;
    test_app
        .seed_recipe(john.id(), "Foreign tart", RecipeStatus::Public, now)
        .await;

    let response = test_app.get_page("/dashboard", Some(&jane)).await;
    assert_eq!(response.status().as_u16(), StatusCode::OK.as_u16());
    let body = response.text().await.unwrap();

    assert!(body.contains("Welcome Jane"));
    assert!(!body.contains("Foreign tart"));
    let newer = body.find("Newer private pie").expect("Missing private recipe");
    let older = body.find("Older public stew").expect("Missing public recipe");
    assert!(newer < older);
}

#[actix_web::test]
async fn logout_closes_the_session() {
    let test_app = spawn_app().await;
    let user = test_app.sign_in("Jane").await;

    let response = test_app.get_page("/logout", Some(&user)).await;
    assert_eq!(response.status().as_u16(), StatusCode::FOUND.as_u16());
    assert_eq!(location(&response), "/");
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Missing Set-Cookie header")
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with(&format!("{}=;", test_app.cookie_name)));

    // The old cookie is no longer accepted.
    let response = test_app.get_page("/dashboard", Some(&user)).await;
    assert_eq!(response.status().as_u16(), StatusCode::FOUND.as_u16());
    assert_eq!(location(&response), "/");
}

#[actix_web::test]
async fn logout_without_session_redirects() {
    let test_app = spawn_app().await;

    let response = test_app.get_page("/logout", None).await;
    assert_eq!(response.status().as_u16(), StatusCode::FOUND.as_u16());
    assert_eq!(location(&response), "/");
}

#[actix_web::test]
async fn echo_is_not_cached() {
    let test_app = spawn_app().await;

    let response = test_app.get_page("/echo", None).await;
    assert_eq!(response.status().as_u16(), StatusCode::OK.as_u16());
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-cache"
    );
}

#[actix_web::test]
async fn openapi_document_lists_the_recipe_routes() {
    let test_app = spawn_app().await;

    let response = test_app.get_page("/api-docs/openapi.json", None).await;
    assert_eq!(response.status().as_u16(), StatusCode::OK.as_u16());

    let doc: serde_json::Value = response.json().await.unwrap();
    assert_eq!(doc["info"]["title"], "Recetario");
    let paths = doc["paths"].as_object().expect("No paths in the document");
    assert!(paths.keys().any(|path| path.ends_with("edit/{id}")));
    assert!(paths.keys().any(|path| path.ends_with("user/{user_id}")));
}
