// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Launcher Utils: bridge into the managed runtime hosting the launcher.
//!
//! The layers, bottom up:
//!
//! - [`raw`]: the primitive environment operations, one trait per backend.
//! - [`env`]: the per-thread environment accessor.
//! - [`refs`]: owned local and global references.
//! - [`symbols`]: the class and method cache.
//! - [`exception`]: pending exceptions as `BridgeError::RuntimeException`.
//! - [`marshal`]: arrays and strings across the boundary.
//! - [`dispatch`]: typed static and instance calls.
//!
//! On Android the backend talks JNI; elsewhere only [`env::attach`] can
//! provide an environment (the `mock` feature ships an in-memory one).

pub mod dispatch;
pub mod env;
pub mod exception;
pub mod marshal;
pub mod raw;
pub mod refs;
pub mod symbols;

#[cfg(target_os = "android")]
mod android;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use dispatch::{CallReturn, method_call, static_call};
pub use env::{AttachGuard, Env, attach, current};
pub use exception::check_for_exceptions;
pub use raw::{Arg, ObjectHandle, RawEnv};
pub use refs::{AsObject, DurableRef, ScopedRef};
pub use symbols::SymbolCache;
