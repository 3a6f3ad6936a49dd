// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Exception bridge.
//
// Turns the runtime's pending-exception flag into a `RuntimeException`
// error. The flag is always cleared before returning: a thread left with a
// pending exception fails every later call.

use launcher_utils_core::error::{BridgeError, Result};

use crate::env::Env;
use crate::marshal;
use crate::raw::{RawValue, ReturnKind};
use crate::refs::ScopedRef;

const THROWABLE_CLASS: &str = "java/lang/Throwable";
const GET_MESSAGE: &str = "getMessage";
const GET_MESSAGE_SIG: &str = "()Ljava/lang/String;";

/// Message used when the throwable has none, or it could not be read.
pub const NO_MESSAGE: &str = "<no message>";

/// Fail with the pending exception's message, if there is one.
pub fn check_for_exceptions(env: &Env) -> Result<()> {
    let raw = env.raw();
    if !raw.exception_check() {
        return Ok(());
    }

    let throwable = ScopedRef::new(raw.exception_occurred());
    raw.exception_clear();

    let message = if throwable.is_valid() {
        exception_message(env, &throwable)
    } else {
        NO_MESSAGE.to_owned()
    };
    tracing::warn!(%message, "managed runtime raised an exception");
    Err(BridgeError::RuntimeException(message))
}

/// `Throwable.getMessage()` without going back through the exception check.
fn exception_message(env: &Env, throwable: &ScopedRef) -> String {
    let raw = env.raw();
    let method = match env.symbols().resolve_instance_method(
        env,
        THROWABLE_CLASS,
        GET_MESSAGE,
        GET_MESSAGE_SIG,
    ) {
        Ok(method) => method,
        Err(e) => {
            tracing::debug!(error = %e, "cannot read exception message");
            return NO_MESSAGE.to_owned();
        }
    };

    let result = raw.call_instance(throwable.handle(), method.handle(), ReturnKind::Object, &[]);
    let message = match result {
        RawValue::Object(obj) => ScopedRef::new(obj),
        _ => ScopedRef::null(),
    };

    // getMessage() itself threw; drop that one too.
    if raw.exception_check() {
        raw.exception_clear();
        return NO_MESSAGE.to_owned();
    }
    if !message.is_valid() {
        return NO_MESSAGE.to_owned();
    }
    marshal::convert_string(env, &message).unwrap_or_else(|_| NO_MESSAGE.to_owned())
}
