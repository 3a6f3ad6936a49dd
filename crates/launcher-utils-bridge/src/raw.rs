// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw environment surface.
//
// `RawEnv` is the narrow set of primitive operations the bridge needs from a
// managed runtime. Nothing here manages lifetimes or checks exceptions; the
// typed layers above (`refs`, `symbols`, `exception`, `dispatch`) do that.
// The Android backend implements it over the JNI function table, the mock
// backend over an in-memory object heap.

use std::fmt;

/// Opaque handle to a managed-runtime object (a JNI `jobject`).
///
/// The zero value is the null reference. Handles are plain values; ownership
/// lives in `ScopedRef` and `DurableRef`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ObjectHandle(usize);

impl ObjectHandle {
    pub const NULL: Self = Self(0);

    pub const fn from_addr(addr: usize) -> Self {
        Self(addr)
    }

    pub const fn addr(self) -> usize {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("ObjectHandle(null)")
        } else {
            write!(f, "ObjectHandle({:#x})", self.0)
        }
    }
}

/// Opaque callable handle (a JNI `jmethodID`). Never null once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodHandle(usize);

impl MethodHandle {
    pub const fn from_addr(addr: usize) -> Self {
        Self(addr)
    }

    pub const fn addr(self) -> usize {
        self.0
    }
}

/// Which primitive call variant to use (`Call<Kind>MethodA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    Void,
    Boolean,
    Int,
    Float,
    Object,
}

impl fmt::Display for ReturnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReturnKind::Void => "void",
            ReturnKind::Boolean => "boolean",
            ReturnKind::Int => "int",
            ReturnKind::Float => "float",
            ReturnKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// One marshaled call argument (a JNI `jvalue`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arg {
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Object(ObjectHandle),
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Bool(value)
    }
}

impl From<i32> for Arg {
    fn from(value: i32) -> Self {
        Arg::Int(value)
    }
}

impl From<i64> for Arg {
    fn from(value: i64) -> Self {
        Arg::Long(value)
    }
}

impl From<f32> for Arg {
    fn from(value: f32) -> Self {
        Arg::Float(value)
    }
}

impl From<ObjectHandle> for Arg {
    fn from(value: ObjectHandle) -> Self {
        Arg::Object(value)
    }
}

/// Untyped result of a primitive call. Object results are local references
/// the caller must release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue {
    Void,
    Bool(bool),
    Int(i32),
    Float(f32),
    Object(ObjectHandle),
}

impl RawValue {
    /// The zero value of a call variant, as returned alongside a pending
    /// exception.
    pub fn zero(kind: ReturnKind) -> Self {
        match kind {
            ReturnKind::Void => RawValue::Void,
            ReturnKind::Boolean => RawValue::Bool(false),
            ReturnKind::Int => RawValue::Int(0),
            ReturnKind::Float => RawValue::Float(0.0),
            ReturnKind::Object => RawValue::Object(ObjectHandle::NULL),
        }
    }
}

/// Primitive operations of an attached managed-runtime environment.
///
/// Implementations are bound to the thread they were obtained on. Failures
/// are reported the way JNI reports them: a null handle or `None`, usually
/// with an exception left pending.
pub trait RawEnv {
    // -- Symbols --
    /// Look up a class by slash-separated path. Returns a local reference.
    fn find_class(&self, name: &str) -> ObjectHandle;

    fn static_method_id(&self, class: ObjectHandle, name: &str, signature: &str)
    -> Option<MethodHandle>;

    fn method_id(&self, class: ObjectHandle, name: &str, signature: &str) -> Option<MethodHandle>;

    // -- References --
    fn new_global_ref(&self, obj: ObjectHandle) -> ObjectHandle;

    fn delete_global_ref(&self, obj: ObjectHandle);

    fn delete_local_ref(&self, obj: ObjectHandle);

    // -- Exceptions --
    fn exception_check(&self) -> bool;

    /// The pending throwable as a local reference, or null.
    fn exception_occurred(&self) -> ObjectHandle;

    fn exception_clear(&self);

    // -- Calls --
    fn call_static(
        &self,
        class: ObjectHandle,
        method: MethodHandle,
        kind: ReturnKind,
        args: &[Arg],
    ) -> RawValue;

    fn call_instance(
        &self,
        receiver: ObjectHandle,
        method: MethodHandle,
        kind: ReturnKind,
        args: &[Arg],
    ) -> RawValue;

    // -- Arrays --
    /// Allocate a `long[]` and fill it. Returns a local reference or null.
    fn new_long_array(&self, values: &[i64]) -> ObjectHandle;

    /// Allocate an `int[]` and fill it. Returns a local reference or null.
    fn new_int_array(&self, values: &[i32]) -> ObjectHandle;

    fn array_length(&self, array: ObjectHandle) -> i32;

    fn int_array_region(&self, array: ObjectHandle, buf: &mut [i32]);

    fn long_array_region(&self, array: ObjectHandle, buf: &mut [i64]);

    // -- Strings --
    /// The UTF-16 code units of a `java.lang.String`, or `None` if they could
    /// not be pinned.
    fn string_chars(&self, string: ObjectHandle) -> Option<Vec<u16>>;

    /// Build a `java.lang.String` from UTF-16 code units. Returns a local
    /// reference or null.
    fn new_string(&self, units: &[u16]) -> ObjectHandle;
}
