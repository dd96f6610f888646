// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Common stuff for running integration tests.

use actix_web::rt::spawn;
use chrono::{DateTime, TimeDelta, Utc};
use once_cell::sync::Lazy;
use recetario::{
    authentication::open_session,
    configuration::{DataBaseSettings, LogSettings, Settings},
    domain::{Recipe, RecipeContent, RecipeId, RecipeStatus, User, UserBuilder, UserId},
    startup::Application,
    storage::{AccountStore, MemoryStore, MySqlStore, RecipeStore, Storage},
    telemetry::configure_tracing,
};
use reqwest::{header, Response};
use sqlx::{Connection, Executor, MySqlConnection, MySqlPool};
use std::sync::Arc;
use uuid::Uuid;

static TRACING: Lazy<()> = Lazy::new(|| {
    let mut settings = LogSettings {
        tracing_level: "info".into(),
        journald: Some(false),
        pretty_log: Some(true),
    };

    if let Ok(level) = std::env::var("TEST_LOG") {
        match level.as_str() {
            "info" => settings.tracing_level = "info".into(),
            "debug" => settings.tracing_level = "debug".into(),
            "warn" => settings.tracing_level = "warn".into(),
            "error" => settings.tracing_level = "error".into(),
            &_ => settings.tracing_level = "none".into(),
        }

        if level != "none" {
            configure_tracing(&settings);
        }
    }
});

pub struct TestApp {
    pub address: String,
    pub recipes: Arc<dyn RecipeStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub api_client: reqwest::Client,
    pub cookie_name: String,
}

/// A registered user with an open session.
pub struct TestUser {
    pub user: User,
    /// Value of the `Cookie` header that authenticates the user.
    pub cookie: String,
}

impl TestUser {
    pub fn id(&self) -> &UserId {
        self.user.id()
    }
}

fn test_configuration() -> Settings {
    let mut c = Settings::new().expect("Failed to read configuration");
    // When using 0, a random port will be used.
    c.application.port = 0;
    c.application.host = "127.0.0.1".into();
    c
}

/// Spawn the application on top of the in-memory backend.
pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    // Every test runs against its own pristine storage.
    let store = Arc::new(MemoryStore::new());

    launch(test_configuration(), Storage::from_memory(store)).await
}

/// Spawn the application on top of a brand new MariaDB database.
///
/// The connection settings are taken from the configuration files and `RECETARIO__DATABASE__*` variables.
pub async fn spawn_mysql_app() -> TestApp {
    Lazy::force(&TRACING);

    let configuration = {
        let mut c = test_configuration();
        // Use a random name for the testing DB.
        c.database.db_name = Uuid::now_v7().to_string();
        c
    };

    let db_pool = configure_database(&configuration.database).await;

    launch(configuration, Storage::from_mysql(MySqlStore::new(db_pool))).await
}

async fn launch(configuration: Settings, storage: Storage) -> TestApp {
    let cookie_name = configuration.session.cookie_name.clone();
    let (recipes, accounts) = (storage.recipes.clone(), storage.accounts.clone());

    let application = Application::build_with_storage(configuration, storage)
        .await
        .expect("Failed to build the Recetario application.");

    let address = format!("http://127.0.0.1:{}", application.port());
    let _ = spawn(application.run_until_stopped());

    // Instantiate an HTTP client to run the tests against the app's backend.
    let api_client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .unwrap();

    TestApp {
        address,
        recipes,
        accounts,
        api_client,
        cookie_name,
    }
}

pub async fn configure_database(config: &DataBaseSettings) -> MySqlPool {
    // Connect to the testing DB without using a DB name, as we'll give a testing name.
    let mut conn = MySqlConnection::connect_with(&config.build_db_conn_without_db())
        .await
        .expect("Failed to connect to MariaDB.");

    conn.execute(format!(r#"CREATE DATABASE `{}`;"#, config.db_name).as_str())
        .await
        .expect("Failed to create test DB.");

    let conn_pool = MySqlPool::connect_with(config.build_db_conn_with_db())
        .await
        .expect("Failed to connect to MariaDB.");

    let store = MySqlStore::new(conn_pool.clone());
    store
        .migrate()
        .await
        .expect("Failed to migrate the testing DB.");

    conn_pool
}

impl TestApp {
    /// Register a user and open a session on its behalf, as the sign-in flow would do.
    pub async fn sign_in(&self, display_name: &str) -> TestUser {
        let user = UserBuilder::default()
            .set_display_name(display_name)
            .build()
            .expect("Failed to build a test user");
        self.accounts
            .register_user(&user)
            .await
            .expect("Failed to register a test user");

        let token = open_session(self.accounts.as_ref(), user.id(), TimeDelta::hours(1))
            .await
            .expect("Failed to open a session");

        TestUser {
            user,
            cookie: format!("{}={}", self.cookie_name, token.expose()),
        }
    }

    /// Store a recipe straight into the backend.
    pub async fn seed_recipe(
        &self,
        owner: &UserId,
        title: &str,
        status: RecipeStatus,
        created_at: DateTime<Utc>,
    ) -> Recipe {
        let content = RecipeContent::new(
            title,
            Some("Water\nSalt"),
            "Boil the water and add the salt.",
            status,
        )
        .expect("Failed to build the content of a test recipe");
        let recipe = Recipe::from_parts(RecipeId::new(), *owner, content, created_at, None);

        self.recipes
            .insert_recipe(&recipe)
            .await
            .expect("Failed to seed a recipe");

        recipe
    }

    pub async fn stored_recipe(&self, id: &RecipeId) -> Option<Recipe> {
        self.recipes
            .find_recipe(id)
            .await
            .expect("Failed to read the storage")
    }

    pub async fn get_page(&self, path: &str, user: Option<&TestUser>) -> Response {
        let mut request = self.api_client.get(format!("{}{path}", self.address));
        if let Some(user) = user {
            request = request.header(header::COOKIE, &user.cookie);
        }

        request
            .send()
            .await
            .unwrap_or_else(|_| panic!("Failed to execute GET for {path}."))
    }

    pub async fn post_form<Body>(&self, path: &str, user: Option<&TestUser>, body: &Body) -> Response
    where
        Body: serde::Serialize + ?Sized,
    {
        let mut request = self
            .api_client
            .post(format!("{}{path}", self.address))
            .form(body);
        if let Some(user) = user {
            request = request.header(header::COOKIE, &user.cookie);
        }

        request
            .send()
            .await
            .unwrap_or_else(|_| panic!("Failed to execute POST for {path}."))
    }

    pub async fn put_form<Body>(&self, path: &str, user: &TestUser, body: &Body) -> Response
    where
        Body: serde::Serialize + ?Sized,
    {
        self.api_client
            .put(format!("{}{path}", self.address))
            .header(header::COOKIE, &user.cookie)
            .form(body)
            .send()
            .await
            .unwrap_or_else(|_| panic!("Failed to execute PUT for {path}."))
    }

    pub async fn delete(&self, path: &str, user: &TestUser) -> Response {
        self.api_client
            .delete(format!("{}{path}", self.address))
            .header(header::COOKIE, &user.cookie)
            .send()
            .await
            .unwrap_or_else(|_| panic!("Failed to execute DELETE for {path}."))
    }
}

/// Read the `Location` header of a redirection.
pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("The response is not a redirection")
        .to_str()
        .expect("Non ASCII Location header")
}
