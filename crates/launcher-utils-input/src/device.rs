// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Input device facade.
//
// An `InputDevice` pairs a host device id with a global reference to the
// `android.view.InputDevice` object. Queries never fail: a failed call logs at
// debug level and yields the query's default. Commands report failure.

use std::fmt;

use serde::{Deserialize, Serialize};

use launcher_utils_bridge::dispatch::{CallReturn, method_call, static_call};
use launcher_utils_bridge::env;
use launcher_utils_bridge::raw::Arg;
use launcher_utils_bridge::refs::{DurableRef, ScopedRef};
use launcher_utils_core::error::{BridgeError, Result};
use launcher_utils_core::types::{BatteryStatus, ControllerLightType, InputSource};

use crate::config;
use crate::host::{INPUT_DEVICE_CLASS, device, utils};

/// One input device known to the host.
pub struct InputDevice {
    id: i32,
    device: DurableRef,
}

impl InputDevice {
    /// Look up device `id` on the host.
    pub fn create(id: i32) -> Result<Self> {
        let env = env::current()?;
        let (name, sig) = utils::GET_DEVICE;
        let device: ScopedRef = env.call_static(&config().utils_class, name, sig, &[Arg::Int(id)])?;
        if !device.is_valid() {
            return Err(BridgeError::OperationFailed(format!("no device with id {id}")));
        }

        tracing::debug!(device_id = id, "input device bound");
        Ok(Self {
            id,
            device: device.promote(&env),
        })
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    // -- Queries on the device object --

    pub fn name(&self) -> String {
        self.device_query(device::GET_NAME, String::new())
    }

    /// Stable identifier that survives reconnection.
    pub fn descriptor(&self) -> String {
        self.device_query(device::GET_DESCRIPTOR, String::new())
    }

    pub fn vendor_id(&self) -> i32 {
        self.device_query(device::GET_VENDOR_ID, 0)
    }

    pub fn product_id(&self) -> i32 {
        self.device_query(device::GET_PRODUCT_ID, 0)
    }

    pub fn sources(&self) -> InputSource {
        InputSource::from_raw(self.device_query(device::GET_SOURCES, 0))
    }

    // -- Queries through the host utility class --

    /// Whether the device reports a battery. Models on the configured
    /// blocklist always report `false`.
    pub fn has_battery(&self) -> bool {
        self.has_battery_for(self.vendor_id(), self.product_id())
    }

    fn has_battery_for(&self, vendor_id: i32, product_id: i32) -> bool {
        if config().battery_blocked(vendor_id, product_id) {
            tracing::debug!(device_id = self.id, vendor_id, product_id, "battery report ignored for blocklisted model");
            return false;
        }
        self.utils_query(utils::DEVICE_HAS_BATTERY, false)
    }

    /// Charge level in `0.0..=1.0`.
    pub fn battery_capacity(&self) -> f32 {
        self.utils_query(utils::GET_BATTERY_CAPACITY, 0.0)
    }

    pub fn battery_status(&self) -> BatteryStatus {
        BatteryStatus::from_raw(self.utils_query(utils::GET_BATTERY_STATUS, BatteryStatus::Unknown as i32))
    }

    pub fn light_count(&self) -> i32 {
        self.utils_query(utils::GET_LIGHTS_COUNT, 0)
    }

    pub fn light_type(&self) -> ControllerLightType {
        ControllerLightType::from_raw(self.utils_query(utils::GET_LIGHT_TYPE, 0))
    }

    pub fn motor_count(&self) -> i32 {
        self.utils_query(utils::GET_HAPTICS_COUNT, 0)
    }

    // -- Commands --

    /// Set the lights of `kind` to `color` (`0xAARRGGBB`; player-number
    /// lights take the player index instead).
    pub fn set_lights(&self, kind: ControllerLightType, color: u32) -> Result<()> {
        let (name, sig) = utils::SET_LIGHT_COLOR;
        // The host takes the colour as a signed int; the bits are what count.
        let args = [Arg::Int(self.id), Arg::Int(color as i32), Arg::Int(kind.raw())];
        let applied: bool = static_call(&config().utils_class, name, sig, &args)?;
        if !applied {
            return Err(BridgeError::OperationFailed(format!(
                "device {}: could not set {kind} lights",
                self.id
            )));
        }
        Ok(())
    }

    /// Rumble for `duration_ms` at `intensity` (1..=255). `motor` selects a
    /// single motor; `None` drives all of them.
    pub fn vibrate(&self, duration_ms: i64, intensity: i32, motor: Option<i32>) -> Result<()> {
        if let Some(index) = motor.filter(|index| *index < 0) {
            return Err(BridgeError::InvalidArgument(format!("motor index {index} is negative")));
        }

        let (name, sig) = utils::VIBRATE_DEVICE;
        let args = [
            Arg::Int(self.id),
            Arg::Long(duration_ms),
            Arg::Int(intensity),
            Arg::Int(motor.unwrap_or(-1)),
        ];
        let started: bool = static_call(&config().utils_class, name, sig, &args)?;
        if !started {
            return Err(BridgeError::OperationFailed(format!(
                "device {}: vibration rejected",
                self.id
            )));
        }
        Ok(())
    }

    /// Run every query once and collect the results.
    pub fn info(&self) -> DeviceInfo {
        let vendor_id = self.vendor_id();
        let product_id = self.product_id();
        let battery = self.has_battery_for(vendor_id, product_id).then(|| BatteryInfo {
            status: self.battery_status(),
            capacity: self.battery_capacity(),
        });

        DeviceInfo {
            id: self.id,
            name: self.name(),
            descriptor: self.descriptor(),
            vendor_id,
            product_id,
            battery,
            sources: self.sources().split(),
            light_count: self.light_count(),
            light_type: self.light_type(),
            motor_count: self.motor_count(),
        }
    }

    fn device_query<R: CallReturn>(&self, (name, sig): (&str, &str), default: R) -> R {
        let result = method_call(INPUT_DEVICE_CLASS, name, sig, &self.device, &[]);
        self.or_default(name, result, default)
    }

    fn utils_query<R: CallReturn>(&self, (name, sig): (&str, &str), default: R) -> R {
        let result = static_call(&config().utils_class, name, sig, &[Arg::Int(self.id)]);
        self.or_default(name, result, default)
    }

    fn or_default<R>(&self, query: &str, result: Result<R>, default: R) -> R {
        result.unwrap_or_else(|e| {
            tracing::debug!(device_id = self.id, query, error = %e, "device query failed; using default");
            default
        })
    }
}

impl fmt::Debug for InputDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputDevice")
            .field("id", &self.id)
            .field("device", &self.device)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryInfo {
    pub status: BatteryStatus,
    /// `0.0..=1.0`
    pub capacity: f32,
}

/// Snapshot of everything the facade can report about a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: i32,
    pub name: String,
    pub descriptor: String,
    pub vendor_id: i32,
    pub product_id: i32,
    /// `None` when the device has no battery, or its report is ignored.
    pub battery: Option<BatteryInfo>,
    pub sources: Vec<InputSource>,
    pub light_count: i32,
    pub light_type: ControllerLightType,
    pub motor_count: i32,
}

impl DeviceInfo {
    pub fn is_controller(&self) -> bool {
        self.sources.iter().any(|source| source.is_controller())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Device Info (#{})", self.id)?;
        writeln!(f, "name={}", self.name)?;
        writeln!(f, "descriptor={}", self.descriptor)?;
        writeln!(f, "product={:#x}, vendor={:#x}", self.product_id, self.vendor_id)?;
        match self.battery {
            Some(battery) => writeln!(f, "battery={}-{}%", battery.status, battery.capacity * 100.0)?,
            None => writeln!(f, "battery=none")?,
        }
        let sources: Vec<&str> = self.sources.iter().map(|source| source.name()).collect();
        writeln!(f, "sources=[{}]", sources.join(", "))?;
        write!(
            f,
            "lights={} ({}) motors={}",
            self.light_count, self.light_type, self.motor_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launcher_utils_bridge::mock::{MockEnv, MockReturn, RecordedArg};
    use launcher_utils_core::config::DEFAULT_UTILS_CLASS;

    const GAMEPAD_ID: i64 = 4;

    /// A host with one gamepad (id 4) with the given vendor/product ids.
    fn host(vendor_id: i32, product_id: i32) -> MockEnv {
        let mock = MockEnv::new();
        mock.define_static(
            DEFAULT_UTILS_CLASS,
            "getDevice",
            "(I)Landroid/view/InputDevice;",
            |frame| {
                let id = i64::from(frame.arg_int(0));
                if id == GAMEPAD_ID {
                    MockReturn::Instance {
                        class: INPUT_DEVICE_CLASS.into(),
                        tag: id,
                    }
                } else {
                    MockReturn::Null
                }
            },
        );
        mock.define_method(INPUT_DEVICE_CLASS, "getName", "()Ljava/lang/String;", |_| {
            MockReturn::Str("Wireless Controller".into())
        });
        mock.define_method(INPUT_DEVICE_CLASS, "getDescriptor", "()Ljava/lang/String;", |_| {
            MockReturn::Str("a1b2c3".into())
        });
        mock.define_method(INPUT_DEVICE_CLASS, "getVendorId", "()I", move |_| {
            MockReturn::Int(vendor_id)
        });
        mock.define_method(INPUT_DEVICE_CLASS, "getProductId", "()I", move |_| {
            MockReturn::Int(product_id)
        });
        mock.define_method(INPUT_DEVICE_CLASS, "getSources", "()I", |_| {
            MockReturn::Int((InputSource::JOYSTICK | InputSource::GAMEPAD).bits() as i32)
        });
        mock.define_static(DEFAULT_UTILS_CLASS, "deviceHasBattery", "(I)Z", |_| {
            MockReturn::Bool(true)
        });
        mock.define_static(DEFAULT_UTILS_CLASS, "getDeviceBatteryCapacity", "(I)F", |_| {
            MockReturn::Float(0.5)
        });
        mock.define_static(DEFAULT_UTILS_CLASS, "getDeviceBatteryStatus", "(I)I", |_| {
            MockReturn::Int(3)
        });
        mock.define_static(DEFAULT_UTILS_CLASS, "getDeviceLightsCount", "(I)I", |_| {
            MockReturn::Int(2)
        });
        mock.define_static(DEFAULT_UTILS_CLASS, "getLightType", "(I)I", |_| MockReturn::Int(3));
        mock.define_static(DEFAULT_UTILS_CLASS, "getDeviceHapticsCount", "(I)I", |_| {
            MockReturn::Int(2)
        });
        mock.define_static(DEFAULT_UTILS_CLASS, "setDeviceLightColor", "(III)Z", |frame| {
            // Player-number lights only go up to four.
            let kind = frame.arg_int(2);
            MockReturn::Bool(kind != ControllerLightType::PLAYER_NUMBER.raw() || frame.arg_int(1) <= 4)
        });
        mock.define_static(DEFAULT_UTILS_CLASS, "vibrateDevice", "(IJII)Z", |frame| {
            MockReturn::Bool(frame.arg_int(3) < 2)
        });
        mock
    }

    #[test]
    fn queries_read_the_device() {
        let mock = host(0x054c, 0x0ce6);
        let _guard = mock.attach();
        let device = InputDevice::create(4).expect("create failed");

        assert_eq!(device.id(), 4);
        assert_eq!(device.name(), "Wireless Controller");
        assert_eq!(device.descriptor(), "a1b2c3");
        assert_eq!(device.vendor_id(), 0x054c);
        assert_eq!(device.product_id(), 0x0ce6);
        assert!(device.sources().is_controller());
        assert!(device.has_battery());
        assert_eq!(device.battery_status(), BatteryStatus::Discharging);
        assert!((device.battery_capacity() - 0.5).abs() < f32::EPSILON);
        assert_eq!(device.light_count(), 2);
        assert_eq!(device.light_type(), ControllerLightType::ALL);
        assert_eq!(device.motor_count(), 2);

        // Instance queries went to the device object itself.
        let calls = mock.calls_to("getName");
        assert_eq!(calls.len(), 1);
        assert!(calls[0].receiver.is_some());
    }

    #[test]
    fn unknown_device_is_an_error() {
        let mock = host(1, 1);
        let _guard = mock.attach();

        let err = InputDevice::create(99).unwrap_err();
        assert!(matches!(err, BridgeError::OperationFailed(ref m) if m.contains("99")));
    }

    #[test]
    fn blocklisted_model_has_no_battery() {
        let mock = host(11720, 24833);
        let _guard = mock.attach();
        let device = InputDevice::create(4).expect("create failed");

        assert!(!device.has_battery());
        assert!(device.info().battery.is_none());
        assert!(mock.calls_to("deviceHasBattery").is_empty());
    }

    #[test]
    fn failing_query_yields_default() {
        let mock = host(1, 1);
        mock.define_method(INPUT_DEVICE_CLASS, "getName", "()Ljava/lang/String;", |frame| {
            frame.throw(Some("device disconnected"));
            MockReturn::Null
        });
        let _guard = mock.attach();
        let device = InputDevice::create(4).expect("create failed");

        assert_eq!(device.name(), "");
        assert!(!mock.exception_pending());
        // The thread is still usable.
        assert_eq!(device.descriptor(), "a1b2c3");
    }

    #[test]
    fn missing_host_method_yields_default() {
        let mock = MockEnv::new();
        mock.define_static(
            DEFAULT_UTILS_CLASS,
            "getDevice",
            "(I)Landroid/view/InputDevice;",
            |frame| MockReturn::Instance {
                class: INPUT_DEVICE_CLASS.into(),
                tag: frame.arg_int(0).into(),
            },
        );
        mock.define_class(INPUT_DEVICE_CLASS);
        let _guard = mock.attach();
        let device = InputDevice::create(1).expect("create failed");

        assert_eq!(device.motor_count(), 0);
        assert_eq!(device.battery_status(), BatteryStatus::Unknown);
        assert_eq!(device.light_type(), ControllerLightType::NONE);
        assert_eq!(device.sources(), InputSource::UNKNOWN);
        assert!(!device.has_battery());
    }

    #[test]
    fn set_lights_passes_color_bits() {
        let mock = host(1, 1);
        let _guard = mock.attach();
        let device = InputDevice::create(4).expect("create failed");

        device
            .set_lights(ControllerLightType::COLOR, 0xFF00_80FF)
            .expect("set_lights failed");

        let calls = mock.calls_to("setDeviceLightColor");
        assert_eq!(
            calls[0].args,
            vec![
                RecordedArg::Int(4),
                RecordedArg::Int(0xFF00_80FF_u32 as i32),
                RecordedArg::Int(2),
            ]
        );
    }

    #[test]
    fn rejected_command_is_an_error() {
        let mock = host(1, 1);
        let _guard = mock.attach();
        let device = InputDevice::create(4).expect("create failed");

        let err = device.set_lights(ControllerLightType::PLAYER_NUMBER, 7).unwrap_err();
        assert!(matches!(err, BridgeError::OperationFailed(_)));

        let err = device.vibrate(200, 128, Some(5)).unwrap_err();
        assert!(matches!(err, BridgeError::OperationFailed(_)));
    }

    #[test]
    fn vibrate_all_motors_sends_minus_one() {
        let mock = host(1, 1);
        let _guard = mock.attach();
        let device = InputDevice::create(4).expect("create failed");

        device.vibrate(300, 255, None).expect("vibrate failed");
        device.vibrate(300, 255, Some(1)).expect("vibrate failed");
        assert!(matches!(
            device.vibrate(300, 255, Some(-3)),
            Err(BridgeError::InvalidArgument(_))
        ));

        let calls = mock.calls_to("vibrateDevice");
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0].args,
            vec![
                RecordedArg::Int(4),
                RecordedArg::Long(300),
                RecordedArg::Int(255),
                RecordedArg::Int(-1),
            ]
        );
        assert_eq!(calls[1].args[3], RecordedArg::Int(1));
    }

    #[test]
    fn dropping_device_releases_global_ref() {
        let mock = host(1, 1);
        let _guard = mock.attach();

        let device = InputDevice::create(4).expect("create failed");
        // Cached class references stay; only the device's own goes.
        let held = mock.live_global_refs();
        drop(device);
        assert_eq!(mock.live_global_refs(), held - 1);
        assert_eq!(mock.live_local_refs(), 0);
    }

    #[test]
    fn info_snapshot() {
        let mock = host(0x054c, 0x0ce6);
        let _guard = mock.attach();
        let device = InputDevice::create(4).expect("create failed");

        let info = device.info();
        assert!(info.is_controller());
        assert_eq!(
            info.sources,
            vec![InputSource::GAMEPAD, InputSource::JOYSTICK]
        );
        assert_eq!(
            info.to_string(),
            "Device Info (#4)\n\
             name=Wireless Controller\n\
             descriptor=a1b2c3\n\
             product=0xce6, vendor=0x54c\n\
             battery=Discharging-50%\n\
             sources=[Gamepad, Joystick]\n\
             lights=2 (All) motors=2"
        );

        let json: serde_json::Value =
            serde_json::from_str(&info.to_json().expect("serialize failed")).expect("parse failed");
        assert_eq!(json["vendor_id"], 0x054c);
        assert_eq!(json["battery"]["status"], "Discharging");
    }

    #[test]
    fn info_without_battery() {
        let info = DeviceInfo {
            id: 9,
            name: "Keyboard".into(),
            descriptor: String::new(),
            vendor_id: 0,
            product_id: 0,
            battery: None,
            sources: InputSource::KEYBOARD.split(),
            light_count: 0,
            light_type: ControllerLightType::NONE,
            motor_count: 0,
        };
        assert!(!info.is_controller());
        assert!(info.to_string().contains("\nbattery=none\n"));
        assert!(info.to_string().ends_with("sources=[Keyboard]\nlights=0 (None) motors=0"));
    }
}
