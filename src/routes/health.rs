// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Module that implements an endpoint for health checks.

use crate::ApiDoc;
use actix_web::{get, HttpResponse, Responder};
use utoipa::OpenApi;

/// GET method for the /echo endpoint (Public).
///
/// Answers with an empty `200 OK` while the server is able to handle requests.
#[utoipa::path(
    get,
    path = "/echo",
    tag = "Maintenance",
    responses(
        (status = 200, description = "The server is up.", headers(("Cache-Control"))),
    )
)]
#[get("/echo")]
pub async fn echo() -> impl Responder {
    HttpResponse::Ok()
        // Avoid caching this endpoint.
        .append_header(("Cache-Control", "no-cache"))
        .finish()
}

/// Serves the OpenAPI document of the application.
#[get("/api-docs/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
