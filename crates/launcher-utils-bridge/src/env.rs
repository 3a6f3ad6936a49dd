// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Environment accessor.
//
// An `Env` is the per-thread capability needed for every cross-boundary
// operation. It is `!Send`: using one on another thread does not compile.
// The accessor never attaches a thread to the runtime; that is the host's
// job, and an unattached thread gets `EnvironmentUnavailable`.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use launcher_utils_core::error::{BridgeError, Result};

use crate::raw::RawEnv;
use crate::symbols::SymbolCache;

thread_local! {
    /// Environments installed by `attach`, innermost last. Each entry is
    /// tagged with the id of the guard that owns it.
    static ATTACHED: RefCell<Vec<(u64, Env)>> = const { RefCell::new(Vec::new()) };
    /// The backend's environment, cached by the first successful lookup.
    static DISCOVERED: RefCell<Option<Env>> = const { RefCell::new(None) };
    static NEXT_GUARD: Cell<u64> = const { Cell::new(0) };
}

/// A thread-bound environment plus the symbol cache of the runtime it
/// belongs to.
#[derive(Clone)]
pub struct Env {
    raw: Rc<dyn RawEnv>,
    symbols: Arc<SymbolCache>,
}

impl Env {
    pub(crate) fn new(raw: Rc<dyn RawEnv>, symbols: Arc<SymbolCache>) -> Self {
        Self { raw, symbols }
    }

    pub fn raw(&self) -> &dyn RawEnv {
        self.raw.as_ref()
    }

    pub fn symbols(&self) -> &SymbolCache {
        &self.symbols
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("classes", &self.symbols.class_count())
            .field("methods", &self.symbols.method_count())
            .finish()
    }
}

/// The environment attached to the calling thread.
///
/// The innermost live [`attach`] wins. Otherwise the backend is asked, and
/// its first successful answer on a thread is cached for later calls.
pub fn current() -> Result<Env> {
    let attached = ATTACHED
        .try_with(|stack| stack.borrow().last().map(|(_, env)| env.clone()))
        .map_err(|_| BridgeError::EnvironmentUnavailable)?;
    if let Some(env) = attached {
        return Ok(env);
    }

    let cached = DISCOVERED
        .try_with(|slot| slot.borrow().clone())
        .map_err(|_| BridgeError::EnvironmentUnavailable)?;
    if let Some(env) = cached {
        return Ok(env);
    }

    let env = platform_env()?;
    // Ignore a torn-down slot: the env is still usable for this call.
    let _ = DISCOVERED.try_with(|slot| *slot.borrow_mut() = Some(env.clone()));
    Ok(env)
}

#[cfg(target_os = "android")]
fn platform_env() -> Result<Env> {
    crate::android::attached_env()
}

#[cfg(not(target_os = "android"))]
fn platform_env() -> Result<Env> {
    Err(BridgeError::EnvironmentUnavailable)
}

/// Install `raw` as the current thread's environment until the returned
/// guard is dropped.
///
/// Hosts embedding their own backend use this; so do tests.
pub fn attach(raw: Rc<dyn RawEnv>, symbols: Arc<SymbolCache>) -> AttachGuard {
    let env = Env::new(raw, symbols);
    let id = NEXT_GUARD.with(|next| {
        let id = next.get();
        next.set(id + 1);
        id
    });
    ATTACHED.with(|stack| stack.borrow_mut().push((id, env.clone())));
    tracing::debug!(guard = id, "environment attached to current thread");
    AttachGuard { env, id }
}

/// Detaches its environment on drop.
///
/// Guards may drop in any order: each removes only its own entry, and the
/// innermost remaining environment becomes current again.
pub struct AttachGuard {
    env: Env,
    id: u64,
}

impl AttachGuard {
    pub fn env(&self) -> &Env {
        &self.env
    }
}

impl Drop for AttachGuard {
    fn drop(&mut self) {
        let removed = ATTACHED.try_with(|stack| {
            let mut stack = stack.borrow_mut();
            let index = stack.iter().position(|(id, _)| *id == self.id)?;
            Some(stack.remove(index))
        });
        // Dropped outside the borrow: releasing its cache re-enters `current()`.
        drop(removed);
        tracing::debug!(guard = self.id, "environment detached from current thread");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockEnv;

    #[test]
    fn unattached_thread_is_distinct_error() {
        let handle = std::thread::spawn(|| current().map(|_| ()));
        let err = handle.join().expect("thread panicked").unwrap_err();
        assert!(err.is_detached());
    }

    #[test]
    fn attach_and_detach() {
        let mock = MockEnv::new();
        {
            let _guard = mock.attach();
            assert!(current().is_ok());
        }
        assert!(current().unwrap_err().is_detached());
    }

    #[test]
    fn nested_attach_restores_outer() {
        let outer = MockEnv::new();
        let inner = MockEnv::new();
        let _outer_guard = outer.attach();
        {
            let _inner_guard = inner.attach();
            let env = current().expect("inner env");
            env.raw().find_class("java/lang/Throwable");
        }
        let env = current().expect("outer env");
        env.raw().find_class("java/lang/Throwable");

        assert_eq!(inner.counters().find_class, 1);
        assert_eq!(outer.counters().find_class, 1);
    }

    #[test]
    fn guards_dropped_out_of_order_leave_thread_detached() {
        let first = MockEnv::new();
        let second = MockEnv::new();
        let first_guard = first.attach();
        let second_guard = second.attach();

        drop(first_guard);
        current().expect("second env still attached").raw().find_class("java/lang/Throwable");
        assert_eq!(second.counters().find_class, 1);
        assert_eq!(first.counters().find_class, 0);

        drop(second_guard);
        assert!(current().unwrap_err().is_detached());
    }

    #[test]
    fn dropping_middle_guard_keeps_innermost_current() {
        let outer = MockEnv::new();
        let middle = MockEnv::new();
        let inner = MockEnv::new();
        let outer_guard = outer.attach();
        let middle_guard = middle.attach();
        let inner_guard = inner.attach();

        drop(middle_guard);
        current().expect("inner env").raw().find_class("java/lang/Throwable");
        assert_eq!(inner.counters().find_class, 1);

        drop(inner_guard);
        current().expect("outer env").raw().find_class("java/lang/Throwable");
        assert_eq!(outer.counters().find_class, 1);
        assert_eq!(middle.counters().find_class, 0);

        drop(outer_guard);
        assert!(current().unwrap_err().is_detached());
    }
}
