// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Device-independent haptics, using the phone's own vibrator.

use launcher_utils_bridge::dispatch::static_call;
use launcher_utils_bridge::raw::Arg;
use launcher_utils_bridge::{env, marshal};
use launcher_utils_core::error::{BridgeError, Result};

use crate::config;
use crate::host::utils;

/// Whether the device has a vibrator the host can drive.
pub fn vibrate_supported() -> Result<bool> {
    let (name, sig) = utils::VIBRATE_SUPPORTED;
    static_call(&config().utils_class, name, sig, &[])
}

/// Vibrate once for `ms` milliseconds.
pub fn vibrate(ms: i64) -> Result<()> {
    let (name, sig) = utils::VIBRATE;
    static_call(&config().utils_class, name, sig, &[Arg::Long(ms)])
}

/// Play an off/on timing pattern in milliseconds, starting with a delay.
///
/// `repeat` is the index to loop back to, or `-1` to play once. Any other
/// value is rejected here with `InvalidArgument` and never reaches the host,
/// which would otherwise throw on an out-of-range index.
pub fn vibrate_pattern(pattern: &[i64], repeat: i32) -> Result<()> {
    let in_range = usize::try_from(repeat).map_or(repeat == -1, |index| index < pattern.len());
    if !in_range {
        return Err(BridgeError::InvalidArgument(format!(
            "repeat index {repeat} outside pattern of length {}",
            pattern.len()
        )));
    }

    let env = env::current()?;
    let timings = marshal::to_long_array(&env, pattern)?;
    let (name, sig) = utils::VIBRATE_PATTERN;
    env.call_static(
        &config().utils_class,
        name,
        sig,
        &[Arg::Object(timings.handle()), Arg::Int(repeat)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use launcher_utils_bridge::mock::{MockEnv, MockObject, MockReturn, RecordedArg};
    use launcher_utils_core::config::DEFAULT_UTILS_CLASS;

    fn host() -> MockEnv {
        let mock = MockEnv::new();
        mock.define_static(DEFAULT_UTILS_CLASS, "vibrateSupported", "()Z", |_| {
            MockReturn::Bool(true)
        });
        mock.define_static(DEFAULT_UTILS_CLASS, "vibrate", "(J)V", |_| MockReturn::Void);
        mock.define_static(DEFAULT_UTILS_CLASS, "vibratePattern", "([JI)V", |_| {
            MockReturn::Void
        });
        mock
    }

    #[test]
    fn pattern_is_sent_verbatim() {
        let mock = host();
        let _guard = mock.attach();

        vibrate_pattern(&[100, 200, 100], -1).expect("vibrate_pattern failed");

        let calls = mock.calls_to("vibratePattern");
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].args,
            vec![
                RecordedArg::Object(MockObject::LongArray(vec![100, 200, 100])),
                RecordedArg::Int(-1),
            ]
        );
        // The temporary array is released once the call returns.
        assert_eq!(mock.live_local_refs(), 0);
    }

    #[test]
    fn repeat_index_must_be_in_pattern() {
        let mock = host();
        let _guard = mock.attach();

        for repeat in [-2, 3, i32::MAX] {
            let err = vibrate_pattern(&[100, 200, 100], repeat).unwrap_err();
            assert!(matches!(err, BridgeError::InvalidArgument(_)), "repeat {repeat}");
        }
        vibrate_pattern(&[100, 200, 100], 2).expect("last index is valid");

        assert_eq!(mock.calls_to("vibratePattern").len(), 1);
    }

    #[test]
    fn empty_pattern_only_plays_once() {
        let mock = host();
        let _guard = mock.attach();

        assert!(vibrate_pattern(&[], 0).is_err());
        vibrate_pattern(&[], -1).expect("empty one-shot pattern");
    }

    #[test]
    fn single_vibration() {
        let mock = host();
        let _guard = mock.attach();

        assert!(vibrate_supported().expect("query failed"));
        vibrate(40).expect("vibrate failed");

        let calls = mock.calls_to("vibrate");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args, vec![RecordedArg::Long(40)]);
    }

    #[test]
    fn host_exception_surfaces() {
        let mock = host();
        mock.define_static(DEFAULT_UTILS_CLASS, "vibrate", "(J)V", |frame| {
            frame.throw(Some("negative duration"));
            MockReturn::Void
        });
        let _guard = mock.attach();

        let err = vibrate(-5).unwrap_err();
        assert!(matches!(err, BridgeError::RuntimeException(ref m) if m == "negative duration"));
        assert!(!mock.exception_pending());
    }

    #[test]
    fn detached_thread_fails_cleanly() {
        let err = std::thread::spawn(|| vibrate(10))
            .join()
            .expect("thread panicked")
            .unwrap_err();
        assert!(err.is_detached());
    }
}
