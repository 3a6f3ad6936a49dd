// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Typed dispatcher.
//
// The requested return type picks the primitive call variant at compile
// time. Every path resolves the symbol, makes exactly one raw call, runs the
// exception check, and only then interprets the result. Object results are
// owned by a `ScopedRef` before the check so they are released even when the
// call failed.

use launcher_utils_core::error::{BridgeError, Result};

use crate::env::{self, Env};
use crate::exception::check_for_exceptions;
use crate::marshal;
use crate::raw::{Arg, ObjectHandle, RawValue, ReturnKind};
use crate::refs::{AsObject, ScopedRef};
use crate::symbols::MethodIdentity;

mod sealed {
    pub trait Sealed {}

    impl Sealed for () {}
    impl Sealed for bool {}
    impl Sealed for i32 {}
    impl Sealed for f32 {}
    impl Sealed for String {}
    impl Sealed for Vec<i32> {}
    impl Sealed for crate::refs::ScopedRef {}
}

/// A raw call result after ownership of any object has been taken.
pub enum Returned {
    Void,
    Bool(bool),
    Int(i32),
    Float(f32),
    Object(ScopedRef),
}

impl Returned {
    fn from_raw(raw: RawValue) -> Self {
        match raw {
            RawValue::Void => Returned::Void,
            RawValue::Bool(b) => Returned::Bool(b),
            RawValue::Int(i) => Returned::Int(i),
            RawValue::Float(f) => Returned::Float(f),
            RawValue::Object(obj) => Returned::Object(ScopedRef::new(obj)),
        }
    }

    fn kind(&self) -> ReturnKind {
        match self {
            Returned::Void => ReturnKind::Void,
            Returned::Bool(_) => ReturnKind::Boolean,
            Returned::Int(_) => ReturnKind::Int,
            Returned::Float(_) => ReturnKind::Float,
            Returned::Object(_) => ReturnKind::Object,
        }
    }
}

fn mismatch(expected: ReturnKind, got: &Returned) -> BridgeError {
    BridgeError::OperationFailed(format!(
        "expected {expected} return, backend produced {}",
        got.kind()
    ))
}

/// The closed set of types a call can return.
pub trait CallReturn: Sized + sealed::Sealed {
    const KIND: ReturnKind;

    fn from_returned(env: &Env, value: Returned) -> Result<Self>;
}

impl CallReturn for () {
    const KIND: ReturnKind = ReturnKind::Void;

    fn from_returned(_env: &Env, value: Returned) -> Result<Self> {
        match value {
            Returned::Void => Ok(()),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

impl CallReturn for bool {
    const KIND: ReturnKind = ReturnKind::Boolean;

    fn from_returned(_env: &Env, value: Returned) -> Result<Self> {
        match value {
            Returned::Bool(b) => Ok(b),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

impl CallReturn for i32 {
    const KIND: ReturnKind = ReturnKind::Int;

    fn from_returned(_env: &Env, value: Returned) -> Result<Self> {
        match value {
            Returned::Int(i) => Ok(i),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

impl CallReturn for f32 {
    const KIND: ReturnKind = ReturnKind::Float;

    fn from_returned(_env: &Env, value: Returned) -> Result<Self> {
        match value {
            Returned::Float(f) => Ok(f),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

impl CallReturn for String {
    const KIND: ReturnKind = ReturnKind::Object;

    fn from_returned(env: &Env, value: Returned) -> Result<Self> {
        match value {
            Returned::Object(string) => marshal::convert_string(env, &string),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

impl CallReturn for Vec<i32> {
    const KIND: ReturnKind = ReturnKind::Object;

    fn from_returned(env: &Env, value: Returned) -> Result<Self> {
        match value {
            Returned::Object(array) => marshal::extract_int_array(env, &array),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

/// Generic object result. May be null; check `is_valid()`.
impl CallReturn for ScopedRef {
    const KIND: ReturnKind = ReturnKind::Object;

    fn from_returned(_env: &Env, value: Returned) -> Result<Self> {
        match value {
            Returned::Object(obj) => Ok(obj),
            other => Err(mismatch(Self::KIND, &other)),
        }
    }
}

/// Invoke an already-resolved static method.
pub fn invoke_static<R: CallReturn>(env: &Env, method: &MethodIdentity, args: &[Arg]) -> Result<R> {
    let raw = env
        .raw()
        .call_static(method.class().handle(), method.handle(), R::KIND, args);
    finish(env, raw)
}

/// Invoke an already-resolved instance method on `receiver`.
pub fn invoke_method<R: CallReturn>(
    env: &Env,
    method: &MethodIdentity,
    receiver: ObjectHandle,
    args: &[Arg],
) -> Result<R> {
    if receiver.is_null() {
        return Err(BridgeError::InvalidArgument(format!(
            "{}: null receiver",
            method.key()
        )));
    }
    let raw = env.raw().call_instance(receiver, method.handle(), R::KIND, args);
    finish(env, raw)
}

fn finish<R: CallReturn>(env: &Env, raw: RawValue) -> Result<R> {
    let returned = Returned::from_raw(raw);
    check_for_exceptions(env)?;
    R::from_returned(env, returned)
}

impl Env {
    /// Call a static method on an environment the caller already holds.
    pub fn call_static<R: CallReturn>(
        &self,
        class: &str,
        name: &str,
        signature: &str,
        args: &[Arg],
    ) -> Result<R> {
        let method = self.symbols().resolve_static_method(self, class, name, signature)?;
        invoke_static(self, &method, args)
    }

    /// Call an instance method on an environment the caller already holds.
    pub fn call_method<R: CallReturn>(
        &self,
        class: &str,
        name: &str,
        signature: &str,
        receiver: &impl AsObject,
        args: &[Arg],
    ) -> Result<R> {
        let method = self.symbols().resolve_instance_method(self, class, name, signature)?;
        invoke_method(self, &method, receiver.as_handle(), args)
    }
}

/// Call a static method using the current thread's environment.
pub fn static_call<R: CallReturn>(
    class: &str,
    name: &str,
    signature: &str,
    args: &[Arg],
) -> Result<R> {
    env::current()?.call_static(class, name, signature, args)
}

/// Call an instance method using the current thread's environment.
pub fn method_call<R: CallReturn>(
    class: &str,
    name: &str,
    signature: &str,
    receiver: &impl AsObject,
    args: &[Arg],
) -> Result<R> {
    env::current()?.call_method(class, name, signature, receiver, args)
}
