// Copyright 2024-2025 Felipe Torres González
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::configuration::LogSettings;
use tracing_subscriber::{fmt, prelude::*, Layer};

/// Install the global tracing subscriber using the given settings.
///
/// # Description
///
/// When journald is requested but not reachable, the function falls back to the console output so the
/// application never runs muted.
pub fn configure_tracing(conf: &LogSettings) {
    let mut layers = Vec::new();
    let level_filter = conf.get_verbosity_level();
    let mut journald_error = None;

    if conf.journald.unwrap_or_default() {
        match tracing_journald::layer() {
            Ok(layer) => {
                layers.push(
                    layer
                        .with_field_prefix(Some("recetario".to_owned()))
                        .with_filter(level_filter)
                        .boxed(),
                );
            }
            // journald is typically available on Linux systems, but nowhere else.
            Err(e) => journald_error = Some(e),
        }
    }

    if layers.is_empty() {
        if conf.pretty_log.unwrap_or_default() {
            layers.push(
                fmt::layer()
                    .pretty()
                    .with_target(false)
                    .with_filter(level_filter)
                    .boxed(),
            );
        } else {
            layers.push(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_filter(level_filter)
                    .boxed(),
            );
        }
    }

    tracing_subscriber::registry().with(layers).init();

    if let Some(e) = journald_error {
        tracing::error!("couldn't connect to journald, logging to stdout: {e}");
    }
}
