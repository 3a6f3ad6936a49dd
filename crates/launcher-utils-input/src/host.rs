// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Symbols exported by the launcher host.
//
// Names and signatures must match the host exactly. The utility class path
// itself comes from `BridgeConfig::utils_class`.

/// `android.view.InputDevice`, queried directly on the device object.
pub const INPUT_DEVICE_CLASS: &str = "android/view/InputDevice";

pub mod device {
    pub const GET_NAME: (&str, &str) = ("getName", "()Ljava/lang/String;");
    pub const GET_DESCRIPTOR: (&str, &str) = ("getDescriptor", "()Ljava/lang/String;");
    pub const GET_VENDOR_ID: (&str, &str) = ("getVendorId", "()I");
    pub const GET_PRODUCT_ID: (&str, &str) = ("getProductId", "()I");
    pub const GET_SOURCES: (&str, &str) = ("getSources", "()I");
}

/// Static methods on the utility class.
pub mod utils {
    pub const GET_DEVICE: (&str, &str) = ("getDevice", "(I)Landroid/view/InputDevice;");
    pub const DEVICE_HAS_BATTERY: (&str, &str) = ("deviceHasBattery", "(I)Z");
    pub const GET_BATTERY_CAPACITY: (&str, &str) = ("getDeviceBatteryCapacity", "(I)F");
    pub const GET_BATTERY_STATUS: (&str, &str) = ("getDeviceBatteryStatus", "(I)I");
    pub const GET_LIGHTS_COUNT: (&str, &str) = ("getDeviceLightsCount", "(I)I");
    pub const GET_LIGHT_TYPE: (&str, &str) = ("getLightType", "(I)I");
    pub const SET_LIGHT_COLOR: (&str, &str) = ("setDeviceLightColor", "(III)Z");
    pub const GET_HAPTICS_COUNT: (&str, &str) = ("getDeviceHapticsCount", "(I)I");
    pub const VIBRATE_DEVICE: (&str, &str) = ("vibrateDevice", "(IJII)Z");

    pub const CONTROLLERS_CONNECTED: (&str, &str) = ("controllersConnected", "()I");
    pub const GET_CONNECTED_DEVICES: (&str, &str) = ("getConnectedDevices", "()[I");
    pub const VIBRATE_SUPPORTED: (&str, &str) = ("vibrateSupported", "()Z");
    pub const VIBRATE: (&str, &str) = ("vibrate", "(J)V");
    pub const VIBRATE_PATTERN: (&str, &str) = ("vibratePattern", "([JI)V");
}
