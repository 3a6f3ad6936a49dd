// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android backend via JNI.
//
// `JNI_OnLoad` captures the `JavaVM` when the launcher loads this library.
// Threads that the host attached get an `AndroidEnv`, a `RawEnv` over the
// `jni` crate's `JNIEnv`. This module never attaches a thread itself.

#![cfg(target_os = "android")]

use std::collections::HashMap;
use std::ffi::c_void;
use std::ptr;
use std::rc::Rc;
use std::sync::{Arc, LazyLock, OnceLock};

use jni::errors::{Error as JniCallError, JniError};
use jni::objects::{
    GlobalRef, JClass, JIntArray, JLongArray, JMethodID, JObject, JStaticMethodID, JValueOwned,
};
use jni::signature::{Primitive, ReturnType};
use jni::sys::{self, JNI_FALSE, JNI_TRUE, JNI_VERSION_1_6, jint, jobject, jsize, jvalue};
use jni::{JNIEnv, JavaVM};
use parking_lot::Mutex;

use launcher_utils_core::error::{BridgeError, Result};

use crate::env::Env;
use crate::raw::{Arg, MethodHandle, ObjectHandle, RawEnv, RawValue, ReturnKind};
use crate::symbols::SymbolCache;

static VM: OnceLock<JavaVM> = OnceLock::new();

/// One symbol cache for the one runtime a process can host.
static SYMBOLS: LazyLock<Arc<SymbolCache>> = LazyLock::new(|| Arc::new(SymbolCache::new()));

/// Global references handed out as `ObjectHandle`s, keyed by handle address.
/// Removing an entry drops the `GlobalRef`, which deletes the reference.
static GLOBALS: LazyLock<Mutex<HashMap<usize, GlobalRef>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Called by the runtime when the launcher loads this library.
#[unsafe(no_mangle)]
#[allow(non_snake_case)]
pub extern "system" fn JNI_OnLoad(vm: *mut sys::JavaVM, _reserved: *mut c_void) -> jint {
    // SAFETY: the runtime passes its own, process-lifetime `JavaVM*`.
    match unsafe { JavaVM::from_raw(vm) } {
        Ok(vm) => {
            if VM.set(vm).is_err() {
                tracing::debug!("JNI_OnLoad called twice; keeping the first JavaVM");
            }
        }
        Err(e) => tracing::error!(error = %e, "JNI_OnLoad received an unusable JavaVM"),
    }
    JNI_VERSION_1_6
}

/// Map any `jni::errors::Error` into `BridgeError::Environment`.
fn jni_err(context: &str, e: JniCallError) -> BridgeError {
    BridgeError::Environment(format!("{context}: {e}"))
}

fn java_vm() -> Result<&'static JavaVM> {
    if let Some(vm) = VM.get() {
        return Ok(vm);
    }

    // Loaded without JNI_OnLoad (NativeActivity glue): take the VM from the
    // NDK context instead.
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` is the `JavaVM*` set by the NDK glue code, valid for
    // the lifetime of the process.
    let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| jni_err("failed to obtain JavaVM", e))?;
    let _ = VM.set(vm);
    VM.get().ok_or(BridgeError::EnvironmentUnavailable)
}

/// The environment of the calling thread, if the host attached it.
pub(crate) fn attached_env() -> Result<Env> {
    let vm = java_vm()?;
    let env = vm.get_env().map_err(|e| match e {
        JniCallError::JniCall(JniError::ThreadDetached) => BridgeError::EnvironmentUnavailable,
        other => jni_err("GetEnv failed", other),
    })?;
    let raw = AndroidEnv {
        raw: env.get_raw(),
    };
    Ok(Env::new(Rc::new(raw), Arc::clone(&SYMBOLS)))
}

/// `RawEnv` over a live `JNIEnv*`. Valid only on the thread it came from,
/// which `Env` being `!Send` enforces.
///
/// Each operation takes its own `JNIEnv` view, so a host callback that
/// re-enters the bridge mid-call never contends for a shared borrow.
struct AndroidEnv {
    raw: *mut sys::JNIEnv,
}

/// Borrow `handle` as a `JObject`. A `JObject` does not own its reference;
/// dropping the view releases nothing.
fn object<'local>(handle: ObjectHandle) -> JObject<'local> {
    // SAFETY: handles reach `RawEnv` only as live references this runtime
    // issued (or null, which `JObject` represents).
    unsafe { JObject::from_raw(handle.addr() as jobject) }
}

fn handle(obj: &JObject<'_>) -> ObjectHandle {
    ObjectHandle::from_addr(obj.as_raw() as usize)
}

fn jvalues(args: &[Arg]) -> Vec<jvalue> {
    args.iter()
        .map(|arg| match *arg {
            Arg::Bool(v) => jvalue {
                z: if v { JNI_TRUE } else { JNI_FALSE },
            },
            Arg::Int(v) => jvalue { i: v },
            Arg::Long(v) => jvalue { j: v },
            Arg::Float(v) => jvalue { f: v },
            Arg::Object(h) => jvalue {
                l: h.addr() as jobject,
            },
        })
        .collect()
}

fn return_type(kind: ReturnKind) -> ReturnType {
    match kind {
        ReturnKind::Void => ReturnType::Primitive(Primitive::Void),
        ReturnKind::Boolean => ReturnType::Primitive(Primitive::Boolean),
        ReturnKind::Int => ReturnType::Primitive(Primitive::Int),
        ReturnKind::Float => ReturnType::Primitive(Primitive::Float),
        ReturnKind::Object => ReturnType::Object,
    }
}

/// Unpack a call result. A failed call (usually a pending exception) yields
/// the zero value; the exception bridge reports the cause.
fn raw_value(kind: ReturnKind, result: jni::errors::Result<JValueOwned<'_>>) -> RawValue {
    let Ok(value) = result else {
        return RawValue::zero(kind);
    };
    let unpacked = match kind {
        ReturnKind::Void => Ok(RawValue::Void),
        ReturnKind::Boolean => value.z().map(RawValue::Bool),
        ReturnKind::Int => value.i().map(RawValue::Int),
        ReturnKind::Float => value.f().map(RawValue::Float),
        ReturnKind::Object => value.l().map(|obj| RawValue::Object(handle(&obj))),
    };
    unpacked.unwrap_or(RawValue::zero(kind))
}

impl AndroidEnv {
    fn jni(&self) -> Option<JNIEnv<'_>> {
        // SAFETY: `raw` is the live `JNIEnv*` of the thread this value is
        // confined to.
        unsafe { JNIEnv::from_raw(self.raw) }.ok()
    }
}

impl RawEnv for AndroidEnv {
    fn find_class(&self, name: &str) -> ObjectHandle {
        let Some(mut env) = self.jni() else {
            return ObjectHandle::NULL;
        };
        env.find_class(name)
            .map_or(ObjectHandle::NULL, |class| handle(&class))
    }

    fn static_method_id(
        &self,
        class: ObjectHandle,
        name: &str,
        signature: &str,
    ) -> Option<MethodHandle> {
        let mut env = self.jni()?;
        let class = JClass::from(object(class));
        let id = env.get_static_method_id(&class, name, signature).ok()?;
        Some(MethodHandle::from_addr(id.into_raw() as usize))
    }

    fn method_id(&self, class: ObjectHandle, name: &str, signature: &str) -> Option<MethodHandle> {
        let mut env = self.jni()?;
        let class = JClass::from(object(class));
        let id = env.get_method_id(&class, name, signature).ok()?;
        Some(MethodHandle::from_addr(id.into_raw() as usize))
    }

    fn new_global_ref(&self, target: ObjectHandle) -> ObjectHandle {
        let Some(env) = self.jni() else {
            return ObjectHandle::NULL;
        };
        match env.new_global_ref(object(target)) {
            Ok(global) => {
                let promoted = handle(global.as_obj());
                GLOBALS.lock().insert(promoted.addr(), global);
                promoted
            }
            Err(e) => {
                tracing::warn!(error = %e, "NewGlobalRef failed");
                ObjectHandle::NULL
            }
        }
    }

    fn delete_global_ref(&self, target: ObjectHandle) {
        let released = GLOBALS.lock().remove(&target.addr());
        if released.is_none() {
            tracing::warn!(handle = ?target, "release of unknown global reference");
        }
        // Dropped after the lock: deleting the reference calls into the VM.
        drop(released);
    }

    fn delete_local_ref(&self, target: ObjectHandle) {
        if let Some(env) = self.jni() {
            if let Err(e) = env.delete_local_ref(object(target)) {
                tracing::debug!(error = %e, "DeleteLocalRef failed");
            }
        }
    }

    fn exception_check(&self) -> bool {
        self.jni()
            .and_then(|env| env.exception_check().ok())
            .unwrap_or(false)
    }

    fn exception_occurred(&self) -> ObjectHandle {
        let Some(mut env) = self.jni() else {
            return ObjectHandle::NULL;
        };
        env.exception_occurred()
            .map_or(ObjectHandle::NULL, |throwable| handle(&throwable))
    }

    fn exception_clear(&self) {
        if let Some(env) = self.jni() {
            let _ = env.exception_clear();
        }
    }

    fn call_static(
        &self,
        class: ObjectHandle,
        method: MethodHandle,
        kind: ReturnKind,
        args: &[Arg],
    ) -> RawValue {
        let Some(mut env) = self.jni() else {
            return RawValue::zero(kind);
        };
        let class = JClass::from(object(class));
        // SAFETY: `method` was resolved against `class` as a static method
        // whose signature the caller matched with `kind` and `args`.
        let result = unsafe {
            let id = JStaticMethodID::from_raw(method.addr() as sys::jmethodID);
            env.call_static_method_unchecked(&class, id, return_type(kind), &jvalues(args))
        };
        raw_value(kind, result)
    }

    fn call_instance(
        &self,
        receiver: ObjectHandle,
        method: MethodHandle,
        kind: ReturnKind,
        args: &[Arg],
    ) -> RawValue {
        let Some(mut env) = self.jni() else {
            return RawValue::zero(kind);
        };
        let receiver = object(receiver);
        // SAFETY: as for `call_static`, with `receiver` a live, non-null
        // instance of the class `method` was resolved against.
        let result = unsafe {
            let id = JMethodID::from_raw(method.addr() as sys::jmethodID);
            env.call_method_unchecked(&receiver, id, return_type(kind), &jvalues(args))
        };
        raw_value(kind, result)
    }

    fn new_long_array(&self, values: &[i64]) -> ObjectHandle {
        let (Some(env), Ok(len)) = (self.jni(), jsize::try_from(values.len())) else {
            return ObjectHandle::NULL;
        };
        let Ok(array) = env.new_long_array(len) else {
            return ObjectHandle::NULL;
        };
        if env.set_long_array_region(&array, 0, values).is_err() {
            let _ = env.delete_local_ref(array);
            return ObjectHandle::NULL;
        }
        handle(&array)
    }

    fn new_int_array(&self, values: &[i32]) -> ObjectHandle {
        let (Some(env), Ok(len)) = (self.jni(), jsize::try_from(values.len())) else {
            return ObjectHandle::NULL;
        };
        let Ok(array) = env.new_int_array(len) else {
            return ObjectHandle::NULL;
        };
        if env.set_int_array_region(&array, 0, values).is_err() {
            let _ = env.delete_local_ref(array);
            return ObjectHandle::NULL;
        }
        handle(&array)
    }

    fn array_length(&self, array: ObjectHandle) -> i32 {
        // GetArrayLength ignores the element type.
        let array = JIntArray::from(object(array));
        self.jni()
            .and_then(|env| env.get_array_length(&array).ok())
            .unwrap_or(0)
    }

    fn int_array_region(&self, array: ObjectHandle, buf: &mut [i32]) {
        let array = JIntArray::from(object(array));
        if let Some(env) = self.jni() {
            if let Err(e) = env.get_int_array_region(&array, 0, buf) {
                tracing::debug!(error = %e, "GetIntArrayRegion failed");
            }
        }
    }

    fn long_array_region(&self, array: ObjectHandle, buf: &mut [i64]) {
        let array = JLongArray::from(object(array));
        if let Some(env) = self.jni() {
            if let Err(e) = env.get_long_array_region(&array, 0, buf) {
                tracing::debug!(error = %e, "GetLongArrayRegion failed");
            }
        }
    }

    // The `jni` crate only reads strings as modified UTF-8, so the UTF-16
    // units come straight from the function table.
    fn string_chars(&self, string: ObjectHandle) -> Option<Vec<u16>> {
        let raw = self.raw;
        let string = string.addr() as jobject;
        // SAFETY: `raw` is this thread's live `JNIEnv*` and `string` a live,
        // non-null `java.lang.String`. The pinned buffer holds `len` UTF-16
        // units and is released before returning.
        unsafe {
            let table = &**raw;
            let (length, get, release) =
                (table.GetStringLength?, table.GetStringChars?, table.ReleaseStringChars?);
            let len = usize::try_from(length(raw, string)).ok()?;
            let chars = get(raw, string, ptr::null_mut());
            if chars.is_null() {
                return None;
            }
            let units = std::slice::from_raw_parts(chars, len).to_vec();
            release(raw, string, chars);
            Some(units)
        }
    }

    fn new_string(&self, units: &[u16]) -> ObjectHandle {
        // Unpaired surrogates cannot round-trip through modified UTF-8.
        let (Some(env), Ok(text)) = (self.jni(), String::from_utf16(units)) else {
            return ObjectHandle::NULL;
        };
        env.new_string(text)
            .map_or(ObjectHandle::NULL, |string| handle(&string))
    }
}
