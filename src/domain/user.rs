// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data objects related to Users.

use crate::domain::DataDomainError;
use chrono::{DateTime, Utc};
use names::Generator;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;
use validator::Validate;

/// Identifier of a registered user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    pub fn new() -> Self {
        UserId(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for UserId {
    type Err = DataDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|_| DataDomainError::InvalidId)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public profile of a user of the application.
///
/// # Description
///
/// Users are registered by the external sign-in flow. Only the data needed to present the owner of a recipe is
/// kept here: a display name, the optional first and last names, and an optional avatar URL.
///
/// Some restrictions over the `struct`'s members:
/// - [User::display_name] shall have a length between 2 and 60 characters. When the sign-in flow provides
///   no name, a random funny name is assigned.
/// - [User::first_name] and [User::last_name] can't exceed 40 characters.
/// - [User::image] must contain an url format (`http://...` or `https://...`).
///
/// Prefer [UserBuilder] rather than [User::new] to build a new [User] instance.
#[derive(Clone, Debug, Serialize, Deserialize, Validate, PartialEq)]
pub struct User {
    id: UserId,
    #[validate(length(min = 2, max = 60))]
    display_name: String,
    #[validate(length(max = 40))]
    first_name: Option<String>,
    #[validate(length(max = 40))]
    last_name: Option<String>,
    #[validate(url)]
    image: Option<String>,
    created_at: DateTime<Utc>,
}

/// Implementation of the builder pattern for the [User] `struct`.
///
/// ```rust
/// use recetario::domain::UserBuilder;
///
/// let user = UserBuilder::default()
///     .set_display_name("Jane Doe")
///     .set_first_name("Jane")
///     .build()
///     .unwrap();
/// assert_eq!(user.first_name(), Some("Jane"));
/// ```
#[derive(Default)]
pub struct UserBuilder {
    id: Option<UserId>,
    display_name: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    image: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Constructor of the [User] struct. The given values are validated.
    pub fn new(
        id: UserId,
        display_name: Option<String>,
        first_name: Option<String>,
        last_name: Option<String>,
        image: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DataDomainError> {
        let display_name = match display_name {
            Some(name) => name,
            None => funny_name(),
        };

        let user = User {
            id,
            display_name,
            first_name,
            last_name,
            image,
            created_at,
        };

        match user.validate() {
            Ok(_) => Ok(user),
            Err(e) => Err(DataDomainError::InvalidParams { source: e }),
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    /// Name used to greet the user: the first name when known, the display name otherwise.
    pub fn greeting_name(&self) -> &str {
        self.first_name().unwrap_or(&self.display_name)
    }
}

impl UserBuilder {
    pub fn set_id(mut self, id: UserId) -> Self {
        self.id = Some(id);

        self
    }

    pub fn set_display_name(mut self, name: &str) -> Self {
        self.display_name = Some(name.into());

        self
    }

    pub fn set_first_name(mut self, name: &str) -> Self {
        self.first_name = Some(name.into());

        self
    }

    pub fn set_last_name(mut self, name: &str) -> Self {
        self.last_name = Some(name.into());

        self
    }

    pub fn set_image(mut self, image: &str) -> Self {
        self.image = Some(image.into());

        self
    }

    pub fn set_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);

        self
    }

    pub fn build(self) -> Result<User, DataDomainError> {
        User::new(
            self.id.unwrap_or_default(),
            self.display_name,
            self.first_name,
            self.last_name,
            self.image,
            self.created_at.unwrap_or_else(Utc::now),
        )
    }
}

/// Compose a name such as "Purple Penguin" out of the random generator.
fn funny_name() -> String {
    Generator::default()
        .next()
        .unwrap_or_else(|| String::from("anonymous-cook"))
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
