// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Launcher Utils: input devices, controller lights and haptics exposed by
//! the Android launcher host.
//!
//! Everything here is a typed call through [`launcher_utils_bridge`]. Call
//! [`init`] once at startup to install a configuration and logging; without
//! it the defaults apply.

use std::sync::OnceLock;

use launcher_utils_core::logging;

pub mod controllers;
pub mod device;
pub mod haptics;
pub mod host;

pub use launcher_utils_bridge as bridge;
pub use launcher_utils_core::error::{BridgeError, Result};
pub use launcher_utils_core::types::{BatteryStatus, ControllerLightType, InputSource};
pub use launcher_utils_core::BridgeConfig;

pub use controllers::{connected_controller_count, connected_devices};
pub use device::{BatteryInfo, DeviceInfo, InputDevice};
pub use haptics::{vibrate, vibrate_pattern, vibrate_supported};

static CONFIG: OnceLock<BridgeConfig> = OnceLock::new();

/// Install `config` process-wide and set up logging.
///
/// The first configuration installed (or read) wins; returns `false` if this
/// one was ignored.
pub fn init(config: BridgeConfig) -> bool {
    let installed = install(&CONFIG, config);
    let active = self::config();
    logging::init(&active.log_filter);
    tracing::info!(
        utils_class = %active.utils_class,
        installed,
        "launcher-utils initialised"
    );
    installed
}

/// The active configuration.
pub fn config() -> &'static BridgeConfig {
    CONFIG.get_or_init(BridgeConfig::default)
}

fn install(slot: &OnceLock<BridgeConfig>, config: BridgeConfig) -> bool {
    slot.set(config).is_ok()
}
