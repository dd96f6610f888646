// Copyright 2024 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recetario configuration module.
//!
//! # Description
//!
//! This module includes all the definitions for the app's settings and the
//! objects that automate reading the configuration from files or environment
//! variables and parsing them to Rust's native types.
//!
//! All the environment variables that are meant to be used within this module
//! shall use the prefix `RECETARIO`.
//!
//! # Settings
//!
//! The settings of the application may be set via 2 methods:
//! - Using the configuration files located in the `config` folder.
//! - Using environment variables.
//!
//! The former is advised for settings that usually take the same values and don't include
//! any value that shall not be exposed to the public (passwords, tokens, ...).
//! The latter is advised for settings that we only intend to set for a limited amount of
//! time, i.e. a debug session, or contain private values.
//!
//! ## Environment Variables
//!
//! - `RUN_MODE`: `devel`, `prod`. This variable shall take a value that refers to a
//!    configuration file in the `config` folder. The settings found there will
//!    override the settings found in `base.toml`. When not set, `devel` is considered
//!    as run mode.
//!
//! Variables defined within configuration files can be overridden using the `RECETARIO`
//! prefix. Variables need to be scoped in the same way as they are found in the configuration
//! files. For example, to override [LogSettings::tracing_level]:
//!
//! ```bash
//! $ RECETARIO__APPLICATION__LOG_SETTINGS__TRACING_LEVEL=trace ./recetario
//! ```
//!
//! **Note that the scope separator is a double `_`.**
//!
//! ## Configuration Files
//!
//! The descriptions for each variable are found in the `Struct`s docs:
//! - [ApplicationSettings] for settings that apply to the main application.
//! - [DataBaseSettings] for settings that apply to the storage backend.
//! - [SessionSettings] for the session cookie.

use config::{Config, ConfigError, Environment, File};
use core::time;
use secrecy::{ExposeSecret, SecretString};
use serde_aux::field_attributes::deserialize_number_from_string;
use serde_derive::Deserialize;
use sqlx::mysql::{MySqlConnectOptions, MySqlSslMode};
use std::env;
use std::time::Duration;
use tracing::level_filters::LevelFilter;

/// Name of the directory in which configuration files will be stored.
const CONF_DIR: &str = "config";

/// Top level `struct` for the configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    /// Storage settings.
    pub database: DataBaseSettings,
    /// Session cookie settings.
    pub session: SessionSettings,
}

/// Application's settings.
#[derive(Clone, Debug, Deserialize)]
pub struct ApplicationSettings {
    /// Listening port for the application.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    /// Host address for the application.
    pub host: String,
    /// Base URL for accessing the application through the network.
    pub base_url: String,
    /// Log settings.
    pub log_settings: LogSettings,
}

/// Storage backends supported by the application.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// MariaDB / MySQL server accessed through a connection pool.
    #[default]
    MySql,
    /// Volatile in-process storage. Data is lost when the server stops.
    Memory,
}

/// Data Base connection settings.
#[derive(Clone, Debug, Deserialize)]
pub struct DataBaseSettings {
    /// Which storage backend serves the application.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Host address for the DB server.
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    /// Listening port for the DB server.
    pub port: u16,
    /// Username to access the application's database.
    pub username: String,
    /// Password to access the application's database.
    pub password: SecretString,
    /// Name of the application's database.
    pub db_name: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    /// Maximum number of connections for the connections pool.
    pub max_connections: u16,
    /// Idle timeout for open connections.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub idle_timeout_sec: u16,
    /// Force using SSL for the connection to the DB. False sets the connection to `Preferred` mode.
    pub require_ssl: bool,
}

/// Settings of the session cookie issued to signed-in users.
#[derive(Clone, Debug, Deserialize)]
pub struct SessionSettings {
    /// Name of the cookie that carries the session token.
    pub cookie_name: String,
    /// Lifetime of a session, in hours.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub ttl_hours: u16,
    /// Only send the cookie over HTTPS.
    pub secure_cookie: bool,
}

/// Log related settings.
///
/// # Description
///
/// The application logs to _stdout_ by default. When running as a systemd service, the logs can be
/// sent to journald instead by enabling [LogSettings::journald]. Console logs can be pretty printed,
/// which is useful for debugging sessions but too verbose for production.
#[derive(Clone, Debug, Deserialize)]
pub struct LogSettings {
    /// See [tracing::Level](https://docs.rs/tracing/0.1.40/tracing/struct.Level.html).
    /// Accepted values are specified at [LogSettings::get_verbosity_level].
    pub tracing_level: String,
    /// Send the logs to journald rather than to the console.
    pub journald: Option<bool>,
    /// Multi-line console output.
    pub pretty_log: Option<bool>,
}

impl Settings {
    /// Parse the application settings.
    pub fn new() -> Result<Self, ConfigError> {
        // Build the full path of the configuration directory.
        let base_path = std::env::current_dir()
            .map_err(|e| ConfigError::Message(format!("Failed to determine the current directory: {e}")))?;
        let cfg_dir = base_path.join(CONF_DIR);

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "devel".into());

        let settings = Config::builder()
            .add_source(File::from(cfg_dir.join("base")).required(true))
            .add_source(File::from(cfg_dir.join(run_mode)).required(false))
            .add_source(File::from(cfg_dir.join("local")).required(false))
            .add_source(Environment::with_prefix("recetario").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

impl DataBaseSettings {
    /// Translate a timeout in seconds from an integer to a type `time::Duration`.
    pub fn idle_timeout(&self) -> time::Duration {
        Duration::from_secs(self.idle_timeout_sec as u64)
    }

    /// Build a connection to the MariaDB server without using a DB name.
    ///
    /// # Description
    ///
    /// The following settings will be applied:
    /// - [DataBaseSettings::host]
    /// - [DataBaseSettings::username]
    /// - [DataBaseSettings::password]
    /// - [DataBaseSettings::port]
    /// - [DataBaseSettings::require_ssl]
    pub fn build_db_conn_without_db(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .port(self.port)
            .ssl_mode(if self.require_ssl {
                MySqlSslMode::Required
            } else {
                MySqlSslMode::Preferred
            })
    }

    /// Same as [DataBaseSettings::build_db_conn_without_db] plus [DataBaseSettings::db_name].
    pub fn build_db_conn_with_db(&self) -> MySqlConnectOptions {
        self.build_db_conn_without_db().database(&self.db_name)
    }
}

impl SessionSettings {
    pub fn ttl(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::hours(self.ttl_hours as i64)
    }
}

impl LogSettings {
    /// Get the chosen verbosity level as a [LevelFilter] object.
    ///
    /// # Description
    ///
    /// Accepted values:
    /// - `debug` or `dbg` to set the verbosity to `DEBUG`.
    /// - `info` to set the verbosity to `INFO`.
    /// - `error` or `err` to set the verbosity to `ERROR`.
    /// - `trace` to set the verbosity to `TRACE`.
    /// - `none` or `off` to mute the logs.
    /// - `warn` or any other string to set the verbosity to `WARN`.
    pub fn get_verbosity_level(&self) -> LevelFilter {
        LogSettings::verbosity(&self.tracing_level)
    }

    fn verbosity(level: &str) -> LevelFilter {
        match level {
            "debug" | "dbg" => LevelFilter::DEBUG,
            "info" => LevelFilter::INFO,
            "error" | "err" => LevelFilter::ERROR,
            "trace" => LevelFilter::TRACE,
            "none" | "off" => LevelFilter::OFF,
            _ => LevelFilter::WARN,
        }
    }
}
