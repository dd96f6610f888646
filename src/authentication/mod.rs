// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Authentication gate of the application.
//!
//! # Description
//!
//! Handlers that require a signed-in user take a [SessionUser] argument. The extractor resolves the session cookie
//! before the handler runs, so handlers receive the identity of the caller as a plain value and never look it up
//! by themselves. Requests without a valid session are redirected to the landing page.

mod session;

pub use session::{
    close_session, generate_secret, generate_secret_hash, open_session, removal_cookie,
    resolve_session, session_cookie, verify_secret_hash, SessionError, SessionToken,
};

use crate::{configuration::SessionSettings, domain::UserId, storage::AccountStore, views};
use actix_web::{
    dev::Payload, http::header, http::StatusCode, web, FromRequest, HttpRequest, HttpResponse,
    ResponseError,
};
use std::{future::Future, pin::Pin, str::FromStr};
use thiserror::Error;
use tracing::{debug, error};

/// Where unauthenticated requests are sent to.
pub const SIGN_IN_PATH: &str = "/";

/// Errors raised by the authentication gate.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No session cookie in the request")]
    MissingSession,
    #[error("Invalid session: {0}")]
    InvalidSession(SessionError),
    #[error("The authentication gate is not configured")]
    Misconfigured,
    #[error(transparent)]
    Backend(SessionError),
}

impl From<SessionError> for AuthError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Store(_) | SessionError::Hashing | SessionError::Blocking => {
                AuthError::Backend(e)
            }
            _ => AuthError::InvalidSession(e),
        }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingSession | AuthError::InvalidSession(_) => StatusCode::FOUND,
            AuthError::Misconfigured | AuthError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AuthError::MissingSession | AuthError::InvalidSession(_) => HttpResponse::Found()
                .insert_header((header::LOCATION, SIGN_IN_PATH))
                .finish(),
            AuthError::Misconfigured | AuthError::Backend(_) => views::server_error_page(),
        }
    }
}

/// Identity of the caller, resolved from the session cookie.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionUser {
    user_id: UserId,
}

impl SessionUser {
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

impl FromRequest for SessionUser {
    type Error = AuthError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let store = req.app_data::<web::Data<dyn AccountStore>>().cloned();
        let token = session_token(req);

        Box::pin(async move {
            let store = store.ok_or_else(|| {
                error!("No AccountStore registered as application data");
                AuthError::Misconfigured
            })?;
            let token = token?;

            let user_id = resolve_session(store.get_ref(), &token)
                .await
                .inspect_err(|e| debug!("Session rejected: {e}"))?;

            Ok(SessionUser { user_id })
        })
    }
}

/// Read the session token from the cookie of the request.
pub fn session_token(req: &HttpRequest) -> Result<SessionToken, AuthError> {
    let settings = req
        .app_data::<web::Data<SessionSettings>>()
        .ok_or(AuthError::Misconfigured)?;
    let cookie = req
        .cookie(&settings.cookie_name)
        .ok_or(AuthError::MissingSession)?;

    SessionToken::from_str(cookie.value())
        .map_err(|e| AuthError::InvalidSession(SessionError::InvalidToken(e)))
}
