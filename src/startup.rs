// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Module that includes helper functions to start the **Recetario** application.

use crate::{
    configuration::{DataBaseSettings, SessionSettings, Settings, StorageBackend},
    routes::{self, recipe},
    storage::{AccountStore, MemoryStore, MySqlStore, RecipeStore, Storage},
};
use actix_files::Files;
use actix_web::{dev::Server, middleware::NormalizePath, web, App, HttpServer};
use sqlx::{mysql::MySqlPoolOptions, MySqlPool};
use std::{net::TcpListener, sync::Arc};
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    /// Build the application using the storage backend selected in the configuration.
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let storage = match configuration.database.backend {
            StorageBackend::MySql => {
                // Create a connection pool to handle connections to the DB.
                let connection_pool = get_connection_pool(&configuration.database).await?;
                let store = MySqlStore::new(connection_pool);
                store.migrate().await?;
                info!("Connected to the DB {}", configuration.database.db_name);

                Storage::from_mysql(store)
            }
            StorageBackend::Memory => {
                warn!("Using the in-memory storage, data will be lost when the server stops");
                Storage::from_memory(Arc::new(MemoryStore::new()))
            }
        };

        Self::build_with_storage(configuration, storage).await
    }

    /// Build the application on top of an already initialised storage backend.
    pub async fn build_with_storage(
        configuration: Settings,
        storage: Storage,
    ) -> Result<Self, anyhow::Error> {
        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let server = run(listener, storage, configuration.session).await?;

        Ok(Self { port, server })
    }

    /// Port in which the server is listening. Useful when the port was picked by the OS.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub async fn run(
    listener: TcpListener,
    storage: Storage,
    session_settings: SessionSettings,
) -> Result<Server, anyhow::Error> {
    let recipes: web::Data<dyn RecipeStore> = web::Data::from(storage.recipes);
    let accounts: web::Data<dyn AccountStore> = web::Data::from(storage.accounts);
    let session_settings = web::Data::new(session_settings);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .app_data(recipes.clone())
            .app_data(accounts.clone())
            .app_data(session_settings.clone())
            .service(routes::echo)
            .service(routes::openapi_json)
            .service(Files::new("/static", "static"))
            .service(routes::landing)
            .service(routes::dashboard)
            .service(routes::logout)
            .service(
                // Literal paths go first so they are not taken as recipe IDs.
                web::scope("/recipes")
                    .service(recipe::show_add_form)
                    .service(recipe::show_edit_form)
                    .service(recipe::list_user_recipes)
                    .service(recipe::list_recipes)
                    .service(recipe::add_recipe)
                    .service(recipe::get_recipe)
                    .service(recipe::update_recipe)
                    .service(recipe::delete_recipe)
                    .service(recipe::override_method),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub async fn get_connection_pool(
    configuration: &DataBaseSettings,
) -> Result<MySqlPool, sqlx::Error> {
    MySqlPoolOptions::new()
        .max_connections(configuration.max_connections as u32)
        .idle_timeout(configuration.idle_timeout())
        .connect_with(configuration.build_db_conn_with_db())
        .await
}
