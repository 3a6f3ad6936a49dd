// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Symbol cache.
//
// Memoizes class and method lookups by exact string key. Tables are
// append-only and live as long as the runtime they belong to. Each table's
// lock covers the whole lookup-or-resolve-and-insert sequence, so threads
// racing on the same symbol end up sharing one entry (and one global
// reference). Entries are handed out as `Arc`s and never move.
//
// Lock order: method tables before the class table.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use launcher_utils_core::error::{BridgeError, Result, SymbolKind};

use crate::env::Env;
use crate::raw::{MethodHandle, ObjectHandle};
use crate::refs::{DurableRef, ScopedRef};

/// A resolved class, held by a global reference for the cache's lifetime.
pub struct ClassIdentity {
    name: String,
    class: DurableRef,
}

impl ClassIdentity {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> ObjectHandle {
        self.class.handle()
    }
}

impl fmt::Debug for ClassIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassIdentity")
            .field("name", &self.name)
            .field("class", &self.class)
            .finish()
    }
}

/// A resolved method and the class it was resolved against.
#[derive(Debug)]
pub struct MethodIdentity {
    class: Arc<ClassIdentity>,
    method: MethodHandle,
    key: String,
}

impl MethodIdentity {
    pub fn class(&self) -> &ClassIdentity {
        &self.class
    }

    pub fn handle(&self) -> MethodHandle {
        self.method
    }

    /// `class.name(signature)`, the cache key.
    pub fn key(&self) -> &str {
        &self.key
    }
}

#[derive(Clone, Copy)]
enum MethodScope {
    Static,
    Instance,
}

/// Process-wide symbol tables for one runtime.
#[derive(Default)]
pub struct SymbolCache {
    classes: Mutex<HashMap<String, Arc<ClassIdentity>>>,
    static_methods: Mutex<HashMap<String, Arc<MethodIdentity>>>,
    methods: Mutex<HashMap<String, Arc<MethodIdentity>>>,
}

impl SymbolCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a class by slash-separated path (`java/lang/String`).
    pub fn resolve_class(&self, env: &Env, name: &str) -> Result<Arc<ClassIdentity>> {
        let mut classes = self.classes.lock();
        if let Some(class) = classes.get(name) {
            return Ok(Arc::clone(class));
        }

        let raw = env.raw();
        let local = ScopedRef::new(raw.find_class(name));
        if !local.is_valid() {
            raw.exception_clear();
            tracing::warn!(class = name, "class lookup failed");
            return Err(BridgeError::SymbolNotFound {
                kind: SymbolKind::Class,
                name: name.to_owned(),
            });
        }

        let class = Arc::new(ClassIdentity {
            name: name.to_owned(),
            class: local.promote(env),
        });
        classes.insert(name.to_owned(), Arc::clone(&class));
        tracing::debug!(class = name, "class resolved");
        Ok(class)
    }

    pub fn resolve_static_method(
        &self,
        env: &Env,
        class: &str,
        name: &str,
        signature: &str,
    ) -> Result<Arc<MethodIdentity>> {
        self.resolve_method(env, MethodScope::Static, class, name, signature)
    }

    pub fn resolve_instance_method(
        &self,
        env: &Env,
        class: &str,
        name: &str,
        signature: &str,
    ) -> Result<Arc<MethodIdentity>> {
        self.resolve_method(env, MethodScope::Instance, class, name, signature)
    }

    fn resolve_method(
        &self,
        env: &Env,
        scope: MethodScope,
        class_name: &str,
        name: &str,
        signature: &str,
    ) -> Result<Arc<MethodIdentity>> {
        let table = match scope {
            MethodScope::Static => &self.static_methods,
            MethodScope::Instance => &self.methods,
        };

        let key = format!("{class_name}.{name}{signature}");
        let mut methods = table.lock();
        if let Some(method) = methods.get(&key) {
            return Ok(Arc::clone(method));
        }

        let class = self.resolve_class(env, class_name)?;

        let raw = env.raw();
        let found = match scope {
            MethodScope::Static => raw.static_method_id(class.handle(), name, signature),
            MethodScope::Instance => raw.method_id(class.handle(), name, signature),
        };
        let Some(method) = found else {
            raw.exception_clear();
            let kind = match scope {
                MethodScope::Static => SymbolKind::StaticMethod,
                MethodScope::Instance => SymbolKind::Method,
            };
            tracing::warn!(method = %key, "{kind} lookup failed");
            return Err(BridgeError::SymbolNotFound { kind, name: key });
        };

        let identity = Arc::new(MethodIdentity {
            class,
            method,
            key: key.clone(),
        });
        methods.insert(key, Arc::clone(&identity));
        tracing::debug!(method = identity.key(), "method resolved");
        Ok(identity)
    }

    pub fn class_count(&self) -> usize {
        self.classes.lock().len()
    }

    /// Static and instance methods together.
    pub fn method_count(&self) -> usize {
        self.static_methods.lock().len() + self.methods.lock().len()
    }
}
