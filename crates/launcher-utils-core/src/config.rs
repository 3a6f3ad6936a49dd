// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

/// Host utility class exported by the launcher.
pub const DEFAULT_UTILS_CLASS: &str = "com/geode/launcher/utils/GeodeUtils";

/// A vendor/product pair identifying one hardware model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceModel {
    pub vendor_id: i32,
    pub product_id: i32,
}

/// Settings for the bridge and the device facade built on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Slash-separated path of the host utility class (`com/example/Utils`).
    pub utils_class: String,
    /// Fallback `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Models whose battery reports are known to be bogus; they always
    /// report "no battery".
    pub battery_blocklist: Vec<DeviceModel>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            utils_class: DEFAULT_UTILS_CLASS.into(),
            log_filter: "info".into(),
            // This controller reports a battery it does not have.
            battery_blocklist: vec![DeviceModel {
                vendor_id: 11720,
                product_id: 24833,
            }],
        }
    }
}

impl BridgeConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        tracing::debug!(
            path = %path.display(),
            utils_class = %config.utils_class,
            blocklisted = config.battery_blocklist.len(),
            "bridge config loaded"
        );
        Ok(config)
    }

    /// Whether the given model's battery report must be ignored.
    pub fn battery_blocked(&self, vendor_id: i32, product_id: i32) -> bool {
        self.battery_blocklist
            .iter()
            .any(|m| m.vendor_id == vendor_id && m.product_id == product_id)
    }

    fn validate(&self) -> Result<()> {
        if self.utils_class.is_empty() {
            return Err(BridgeError::Config("utils_class must not be empty".into()));
        }
        if self.utils_class.contains('.') {
            return Err(BridgeError::Config(format!(
                "utils_class must be slash-separated, got {}",
                self.utils_class
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_block_known_faulty_controller() {
        let config = BridgeConfig::default();
        assert!(config.battery_blocked(11720, 24833));
        assert!(!config.battery_blocked(1356, 3302));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = BridgeConfig::from_json(r#"{ "log_filter": "debug" }"#).expect("parse failed");
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.utils_class, DEFAULT_UTILS_CLASS);
        assert_eq!(config.battery_blocklist.len(), 1);
    }

    #[test]
    fn dotted_class_name_is_rejected() {
        let err = BridgeConfig::from_json(r#"{ "utils_class": "com.example.Utils" }"#).unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = BridgeConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, BridgeError::Serialization(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(
            file,
            r#"{{ "utils_class": "org/example/Host", "battery_blocklist": [] }}"#
        )
        .expect("write");

        let config = BridgeConfig::load(file.path()).expect("load failed");
        assert_eq!(config.utils_class, "org/example/Host");
        assert!(!config.battery_blocked(11720, 24833));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = BridgeConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, BridgeError::Io(_)));
    }
}
