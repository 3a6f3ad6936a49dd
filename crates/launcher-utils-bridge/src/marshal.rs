// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data marshaling between native values and runtime arrays/strings.
//
// Runtime strings are UTF-16; native strings are UTF-8. Null handles are
// errors, never empty values, so "no value" and "empty value" stay distinct.

use launcher_utils_core::error::{BridgeError, Result};

use crate::env::Env;
use crate::refs::{AsObject, ScopedRef};

/// Copy `values` into a new `long[]`.
pub fn to_long_array(env: &Env, values: &[i64]) -> Result<ScopedRef> {
    let array = ScopedRef::new(env.raw().new_long_array(values));
    if !array.is_valid() {
        return Err(BridgeError::OperationFailed(format!(
            "could not allocate long[{}]",
            values.len()
        )));
    }
    Ok(array)
}

/// Copy `values` into a new `int[]`.
pub fn to_int_array(env: &Env, values: &[i32]) -> Result<ScopedRef> {
    let array = ScopedRef::new(env.raw().new_int_array(values));
    if !array.is_valid() {
        return Err(BridgeError::OperationFailed(format!(
            "could not allocate int[{}]",
            values.len()
        )));
    }
    Ok(array)
}

/// Read an `int[]` into a vector.
pub fn extract_int_array(env: &Env, array: &impl AsObject) -> Result<Vec<i32>> {
    let handle = array.as_handle();
    if handle.is_null() {
        return Err(BridgeError::InvalidArgument("extract_int_array: null array".into()));
    }

    let raw = env.raw();
    let len = usize::try_from(raw.array_length(handle)).unwrap_or(0);
    let mut values = vec![0; len];
    raw.int_array_region(handle, &mut values);
    Ok(values)
}

/// Read a `long[]` into a vector.
pub fn extract_long_array(env: &Env, array: &impl AsObject) -> Result<Vec<i64>> {
    let handle = array.as_handle();
    if handle.is_null() {
        return Err(BridgeError::InvalidArgument("extract_long_array: null array".into()));
    }

    let raw = env.raw();
    let len = usize::try_from(raw.array_length(handle)).unwrap_or(0);
    let mut values = vec![0; len];
    raw.long_array_region(handle, &mut values);
    Ok(values)
}

/// Decode a `java.lang.String`, surrogate pairs included.
pub fn convert_string(env: &Env, string: &impl AsObject) -> Result<String> {
    let handle = string.as_handle();
    if handle.is_null() {
        return Err(BridgeError::InvalidArgument("convert_string: null string".into()));
    }

    let units = env
        .raw()
        .string_chars(handle)
        .ok_or_else(|| BridgeError::OperationFailed("convert_string: GetStringChars failed".into()))?;

    String::from_utf16(&units)
        .map_err(|e| BridgeError::InvalidArgument(format!("convert_string: {e}")))
}

/// Encode `value` as a new `java.lang.String`.
pub fn to_runtime_string(env: &Env, value: &str) -> Result<ScopedRef> {
    let units: Vec<u16> = value.encode_utf16().collect();
    let string = ScopedRef::new(env.raw().new_string(&units));
    if !string.is_valid() {
        return Err(BridgeError::OperationFailed(
            "to_runtime_string: NewString returned null".into(),
        ));
    }
    Ok(string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockEnv;
    use crate::raw::ObjectHandle;

    #[test]
    fn int_arrays_round_trip() {
        let mock = MockEnv::new();
        let guard = mock.attach();
        let env = guard.env();

        for values in [vec![], vec![7], vec![i32::MIN, -1, 0, 1, i32::MAX]] {
            let array = to_int_array(env, &values).expect("allocate failed");
            assert_eq!(extract_int_array(env, &array).expect("extract failed"), values);
        }
        assert_eq!(mock.live_local_refs(), 0);
    }

    #[test]
    fn long_arrays_round_trip() {
        let mock = MockEnv::new();
        let guard = mock.attach();
        let env = guard.env();

        let values: Vec<i64> = (0..1000).map(|i| i * 1_000_000_007).collect();
        let array = to_long_array(env, &values).expect("allocate failed");
        assert_eq!(extract_long_array(env, &array).expect("extract failed"), values);

        let empty = to_long_array(env, &[]).expect("allocate failed");
        assert!(empty.is_valid());
        assert!(extract_long_array(env, &empty).expect("extract failed").is_empty());
    }

    #[test]
    fn null_array_is_invalid_argument() {
        let mock = MockEnv::new();
        let guard = mock.attach();

        let err = extract_int_array(guard.env(), &ObjectHandle::NULL).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument(_)));
        let err = extract_long_array(guard.env(), &ScopedRef::null()).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument(_)));
    }

    #[test]
    fn strings_round_trip() {
        let mock = MockEnv::new();
        let guard = mock.attach();
        let env = guard.env();

        for text in ["", "DualSense Wireless Controller", "Manette sans fil ü", "手柄 🎮𝄞"] {
            let string = to_runtime_string(env, text).expect("encode failed");
            assert_eq!(convert_string(env, &string).expect("decode failed"), text);
        }
    }

    #[test]
    fn surrogate_pair_is_two_units() {
        let mock = MockEnv::new();
        let guard = mock.attach();

        let string = to_runtime_string(guard.env(), "🎮").expect("encode failed");
        assert_eq!(mock.string_units(string.handle()), Some(vec![0xD83C, 0xDFAE]));
    }

    #[test]
    fn unpaired_surrogate_is_rejected() {
        let mock = MockEnv::new();
        let guard = mock.attach();

        let lone = ScopedRef::new(mock.new_raw_string(&[0x0041, 0xD800]));
        let err = convert_string(guard.env(), &lone).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument(_)));
    }

    #[test]
    fn null_string_is_not_empty_string() {
        let mock = MockEnv::new();
        let guard = mock.attach();

        let err = convert_string(guard.env(), &ObjectHandle::NULL).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument(_)));
    }
}
