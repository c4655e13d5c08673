// SPDX-License-Identifier: GPL-3.0-only

//! Tracing subscriber setup
//!
//! The native library has no `main`, so the host calls [`init`] once from
//! its load hook. `RUST_LOG` controls the level, e.g. `RUST_LOG=debug` or
//! `RUST_LOG=camera_shell=debug`.

use tracing_subscriber::EnvFilter;

/// Install the formatter with `RUST_LOG`, defaulting to `warn`
///
/// Returns `false` if a global subscriber was already installed.
pub fn init() -> bool {
    init_with_filter("warn")
}

/// Install the formatter, using `default_filter` when `RUST_LOG` is unset
pub fn init_with_filter(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(version = crate::constants::VERSION, "Camera shell logging initialized");
    }
    installed
}
