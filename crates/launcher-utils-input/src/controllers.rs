// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Controller enumeration.

use launcher_utils_bridge::dispatch::static_call;
use launcher_utils_core::error::Result;

use crate::config;
use crate::host::utils;

/// Number of game controllers currently connected.
pub fn connected_controller_count() -> Result<i32> {
    let (name, sig) = utils::CONTROLLERS_CONNECTED;
    static_call(&config().utils_class, name, sig, &[])
}

/// Ids of every connected input device, controllers or not. Pass one to
/// [`InputDevice::create`](crate::InputDevice::create).
pub fn connected_devices() -> Result<Vec<i32>> {
    let (name, sig) = utils::GET_CONNECTED_DEVICES;
    static_call(&config().utils_class, name, sig, &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use launcher_utils_bridge::mock::{MockEnv, MockReturn};
    use launcher_utils_core::config::DEFAULT_UTILS_CLASS;
    use launcher_utils_core::error::BridgeError;

    #[test]
    fn enumerates_devices() {
        let mock = MockEnv::new();
        mock.define_static(DEFAULT_UTILS_CLASS, "controllersConnected", "()I", |_| {
            MockReturn::Int(1)
        });
        mock.define_static(DEFAULT_UTILS_CLASS, "getConnectedDevices", "()[I", |_| {
            MockReturn::IntArray(vec![2, 7, 11])
        });
        let _guard = mock.attach();

        assert_eq!(connected_controller_count().expect("count failed"), 1);
        assert_eq!(connected_devices().expect("enumerate failed"), vec![2, 7, 11]);
        assert_eq!(mock.live_local_refs(), 0);
    }

    #[test]
    fn no_devices_is_empty_not_error() {
        let mock = MockEnv::new();
        mock.define_static(DEFAULT_UTILS_CLASS, "getConnectedDevices", "()[I", |_| {
            MockReturn::IntArray(Vec::new())
        });
        let _guard = mock.attach();

        assert!(connected_devices().expect("enumerate failed").is_empty());
    }

    #[test]
    fn missing_host_method_is_reported() {
        let mock = MockEnv::new();
        mock.define_class(DEFAULT_UTILS_CLASS);
        let _guard = mock.attach();

        let err = connected_controller_count().unwrap_err();
        assert!(matches!(err, BridgeError::SymbolNotFound { .. }));
    }
}
