// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Utilities for managing the sessions of signed-in users.
//!
//! # Description
//!
//! A session token has the format `<session id>:<secret>`. The session ID locates the server-side record, and the
//! secret is checked against the argon2 hash kept in that record. Secrets are never stored in clear.

use crate::{
    configuration::SessionSettings,
    domain::{DataDomainError, UserId},
    storage::{AccountStore, SessionRecord, StoreError},
};
use actix_web::{
    cookie::{time, Cookie, SameSite},
    web,
};
use argon2::{
    password_hash::SaltString,
    {Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version},
};
use chrono::{TimeDelta, Utc};
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use secrecy::{ExposeSecret, SecretString};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// Length of the random part of a session token.
const SECRET_LENGTH: usize = 25;

/// Errors produced while resolving a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    InvalidToken(#[from] DataDomainError),
    #[error("Unknown session")]
    UnknownSession,
    #[error("Expired session")]
    Expired,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Failed to hash the session secret")]
    Hashing,
    #[error("The blocking thread pool is unavailable")]
    Blocking,
}

/// Token handed to the client inside the session cookie.
#[derive(Clone, Debug)]
pub struct SessionToken {
    id: Uuid,
    secret: SecretString,
}

impl SessionToken {
    pub fn id(&self) -> &Uuid {
        &self.id
    }

    /// Value of the session cookie.
    pub fn expose(&self) -> String {
        format!("{}:{}", self.id, self.secret.expose_secret())
    }
}

impl FromStr for SessionToken {
    type Err = DataDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, secret) = s
            .split_once(':')
            .ok_or(DataDomainError::InvalidSessionToken)?;

        if secret.len() != SECRET_LENGTH || !secret.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DataDomainError::InvalidSessionToken);
        }

        Ok(SessionToken {
            id: Uuid::parse_str(id).map_err(|_| DataDomainError::InvalidSessionToken)?,
            secret: SecretString::from(secret),
        })
    }
}

/// Generate the random part of a session token.
pub fn generate_secret() -> String {
    let mut rng = thread_rng();
    std::iter::repeat_with(|| rng.sample(Alphanumeric))
        .map(char::from)
        .take(SECRET_LENGTH)
        .collect()
}

/// Hash a secret using argon2id.
pub fn generate_secret_hash(plain_secret: &SecretString) -> Result<SecretString, SessionError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let params = Params::new(15000, 2, 1, None).map_err(|_| SessionError::Hashing)?;
    let secret_hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(plain_secret.expose_secret().as_bytes(), &salt)
        .map_err(|_| SessionError::Hashing)?
        .to_string();

    Ok(SecretString::from(secret_hash))
}

#[tracing::instrument(name = "Validate session secret", skip_all)]
pub fn verify_secret_hash(
    expected_secret_hash: &SecretString,
    secret_candidate: &SecretString,
) -> Result<(), DataDomainError> {
    let expected_secret_hash =
        PasswordHash::new(expected_secret_hash.expose_secret()).map_err(|e| {
            error!("Couldn't parse the stored session hash: {e}");
            DataDomainError::InvalidSessionToken
        })?;

    Argon2::default()
        .verify_password(
            secret_candidate.expose_secret().as_bytes(),
            &expected_secret_hash,
        )
        .map_err(|_| DataDomainError::InvalidSessionToken)
}

/// Open a new session for `user`, valid for `ttl`.
///
/// # Description
///
/// This is the entry point for the sign-in flow: once the identity of a user is confirmed, a session is opened
/// and the returned token shall be sent to the client using [session_cookie]. Sessions that expired without
/// being presented again are swept at this point.
///
/// Hashing runs in the blocking thread pool of the runtime.
#[instrument(skip(store))]
pub async fn open_session(
    store: &dyn AccountStore,
    user: &UserId,
    ttl: TimeDelta,
) -> Result<SessionToken, SessionError> {
    let secret = SecretString::from(generate_secret());
    let plain = secret.clone();
    let token_hash = web::block(move || generate_secret_hash(&plain))
        .await
        .map_err(|_| SessionError::Blocking)??;

    let swept = store.delete_expired_sessions(&Utc::now()).await?;
    if swept > 0 {
        debug!("{swept} expired sessions removed");
    }

    let record = SessionRecord {
        id: Uuid::now_v7(),
        user_id: *user,
        token_hash,
        expires_at: Utc::now() + ttl,
    };

    store.insert_session(&record).await?;
    info!("New session opened: {}", record.id);

    Ok(SessionToken {
        id: record.id,
        secret,
    })
}

/// Resolve the user that owns the session identified by `token`.
///
/// The secret is checked in the blocking thread pool, the async worker keeps serving other requests meanwhile.
#[instrument(skip_all, fields(session_id = %token.id))]
pub async fn resolve_session(
    store: &dyn AccountStore,
    token: &SessionToken,
) -> Result<UserId, SessionError> {
    let record = store
        .find_session(&token.id)
        .await?
        .ok_or(SessionError::UnknownSession)?;

    if record.expires_at <= Utc::now() {
        debug!("The session expired at {}", record.expires_at);
        store.delete_session(&record.id).await?;
        return Err(SessionError::Expired);
    }

    let expected = record.token_hash;
    let candidate = token.secret.clone();
    web::block(move || verify_secret_hash(&expected, &candidate))
        .await
        .map_err(|_| SessionError::Blocking)??;

    Ok(record.user_id)
}

/// Close the session identified by `token`.
#[instrument(skip_all, fields(session_id = %token.id))]
pub async fn close_session(
    store: &dyn AccountStore,
    token: &SessionToken,
) -> Result<(), SessionError> {
    store.delete_session(&token.id).await?;
    info!("Session closed");

    Ok(())
}

/// Build the cookie that carries a session token.
pub fn session_cookie(settings: &SessionSettings, token: &SessionToken) -> Cookie<'static> {
    Cookie::build(settings.cookie_name.clone(), token.expose())
        .path("/")
        .http_only(true)
        .secure(settings.secure_cookie)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(settings.ttl_hours as i64))
        .finish()
}

/// Build a cookie that makes the client drop its session cookie.
pub fn removal_cookie(settings: &SessionSettings) -> Cookie<'static> {
    let mut cookie = Cookie::build(settings.cookie_name.clone(), "")
        .path("/")
        .http_only(true)
        .secure(settings.secure_cookie)
        .same_site(SameSite::Lax)
        .finish();
    cookie.make_removal();

    cookie
}
