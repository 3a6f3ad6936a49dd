// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Logging setup.

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber. `RUST_LOG` takes precedence over `fallback`.
///
/// Returns `false` if a global subscriber was already installed (by the host
/// or an earlier call); that is not an error.
pub fn init(fallback: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
