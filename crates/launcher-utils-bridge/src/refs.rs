// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ownership wrappers for managed-runtime references.
//
// `ScopedRef` owns a local reference: valid for the current native frame
// only, move-only, and `!Send`. `DurableRef` owns a global reference: it may
// be stored and shared across threads, and every clone is an independent
// promotion. Both release through whichever environment is attached to the
// dropping thread; with none attached the release is skipped.

use std::fmt;
use std::marker::PhantomData;

use crate::env::{self, Env};
use crate::raw::ObjectHandle;

/// Anything that can be passed where a runtime object is expected.
pub trait AsObject {
    fn as_handle(&self) -> ObjectHandle;
}

impl AsObject for ObjectHandle {
    fn as_handle(&self) -> ObjectHandle {
        *self
    }
}

/// Owned local reference. Do not keep one past the call that produced it;
/// promote it to a [`DurableRef`] instead.
pub struct ScopedRef {
    obj: ObjectHandle,
    // Local references are only meaningful on the thread that created them.
    _not_send: PhantomData<*const ()>,
}

impl ScopedRef {
    /// Take ownership of a local reference. `obj` may be null, which models a
    /// failed allocation upstream.
    pub fn new(obj: ObjectHandle) -> Self {
        Self {
            obj,
            _not_send: PhantomData,
        }
    }

    pub fn null() -> Self {
        Self::new(ObjectHandle::NULL)
    }

    pub fn is_valid(&self) -> bool {
        !self.obj.is_null()
    }

    pub fn handle(&self) -> ObjectHandle {
        self.obj
    }

    /// Give up ownership without releasing.
    pub fn into_raw(mut self) -> ObjectHandle {
        std::mem::take(&mut self.obj)
    }

    /// Promote to a global reference. This reference is still released when
    /// it goes out of scope.
    pub fn promote(&self, env: &Env) -> DurableRef {
        DurableRef::promote(env, self.obj)
    }
}

impl AsObject for ScopedRef {
    fn as_handle(&self) -> ObjectHandle {
        self.obj
    }
}

impl Drop for ScopedRef {
    fn drop(&mut self) {
        if self.obj.is_null() {
            return;
        }
        match env::current() {
            Ok(env) => env.raw().delete_local_ref(self.obj),
            Err(_) => tracing::warn!(obj = ?self.obj, "no environment attached; local reference not released"),
        }
    }
}

impl fmt::Debug for ScopedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScopedRef").field(&self.obj).finish()
    }
}

/// Owned global reference.
///
/// `Clone` promotes again; moving does not. Each instance releases its own
/// promotion on drop.
pub struct DurableRef {
    obj: ObjectHandle,
}

impl DurableRef {
    /// Create an independent global reference to `obj`. Promoting null yields
    /// an invalid reference without touching the runtime.
    pub fn promote(env: &Env, obj: ObjectHandle) -> Self {
        if obj.is_null() {
            return Self::null();
        }
        Self {
            obj: env.raw().new_global_ref(obj),
        }
    }

    pub fn null() -> Self {
        Self {
            obj: ObjectHandle::NULL,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.obj.is_null()
    }

    pub fn handle(&self) -> ObjectHandle {
        self.obj
    }
}

impl AsObject for DurableRef {
    fn as_handle(&self) -> ObjectHandle {
        self.obj
    }
}

impl Clone for DurableRef {
    fn clone(&self) -> Self {
        if self.obj.is_null() {
            return Self::null();
        }
        match env::current() {
            Ok(env) => Self::promote(&env, self.obj),
            Err(_) => {
                tracing::warn!(obj = ?self.obj, "no environment attached; clone is a null reference");
                Self::null()
            }
        }
    }
}

impl Drop for DurableRef {
    fn drop(&mut self) {
        if self.obj.is_null() {
            return;
        }
        match env::current() {
            Ok(env) => env.raw().delete_global_ref(self.obj),
            Err(_) => tracing::warn!(obj = ?self.obj, "no environment attached; global reference leaked"),
        }
    }
}

impl fmt::Debug for DurableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DurableRef").field(&self.obj).finish()
    }
}
