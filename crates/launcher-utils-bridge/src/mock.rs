// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recording in-memory runtime.
//
// Implements `RawEnv` over a small object heap with JNI-like reference
// semantics: every returned reference is a fresh handle, lookups that fail
// leave an exception pending, and calls are recorded for later inspection.
// An object's heap slot is reused once no reference or pending exception
// points at it. The call log still grows with every call.
// Method bodies are plain closures. Clones share state, so a `MockEnv` can be
// handed to other threads and attached there.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::env::{self, AttachGuard};
use crate::raw::{Arg, MethodHandle, ObjectHandle, RawEnv, RawValue, ReturnKind};
use crate::symbols::SymbolCache;

const THROWABLE_CLASS: &str = "java/lang/Throwable";

/// An object on the mock heap.
#[derive(Debug, Clone, PartialEq)]
pub enum MockObject {
    Class(String),
    Instance { class: String, tag: i64 },
    Str(Vec<u16>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    Throwable { message: Option<String> },
}

/// A call argument as the runtime saw it.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedArg {
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Null,
    Object(MockObject),
}

/// What a mock method body hands back.
#[derive(Debug, Clone, PartialEq)]
pub enum MockReturn {
    Void,
    Bool(bool),
    Int(i32),
    Float(f32),
    Null,
    Str(String),
    IntArray(Vec<i32>),
    Instance { class: String, tag: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub class: String,
    pub name: String,
    pub signature: String,
    /// `None` for static calls.
    pub receiver: Option<MockObject>,
    pub args: Vec<RecordedArg>,
}

/// Snapshot of the runtime's operation counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counters {
    pub find_class: usize,
    pub method_lookups: usize,
    pub global_refs_created: usize,
    pub global_refs_deleted: usize,
    pub local_refs_deleted: usize,
    /// Calls made while an exception was still pending. Always a bug.
    pub calls_with_pending_exception: usize,
}

/// The view a method body gets of its invocation.
pub struct MockFrame {
    receiver: Option<MockObject>,
    args: Vec<RecordedArg>,
    thrown: Option<Option<String>>,
}

impl MockFrame {
    pub fn arg_int(&self, index: usize) -> i32 {
        match self.args.get(index) {
            Some(RecordedArg::Int(v)) => *v,
            other => panic!("argument {index} is not an int: {other:?}"),
        }
    }

    pub fn arg_long(&self, index: usize) -> i64 {
        match self.args.get(index) {
            Some(RecordedArg::Long(v)) => *v,
            other => panic!("argument {index} is not a long: {other:?}"),
        }
    }

    pub fn arg_bool(&self, index: usize) -> bool {
        match self.args.get(index) {
            Some(RecordedArg::Bool(v)) => *v,
            other => panic!("argument {index} is not a boolean: {other:?}"),
        }
    }

    pub fn arg_float(&self, index: usize) -> f32 {
        match self.args.get(index) {
            Some(RecordedArg::Float(v)) => *v,
            other => panic!("argument {index} is not a float: {other:?}"),
        }
    }

    pub fn arg_long_array(&self, index: usize) -> Vec<i64> {
        match self.args.get(index) {
            Some(RecordedArg::Object(MockObject::LongArray(v))) => v.clone(),
            other => panic!("argument {index} is not a long[]: {other:?}"),
        }
    }

    pub fn receiver(&self) -> Option<&MockObject> {
        self.receiver.as_ref()
    }

    /// Tag of the receiving instance, for instance calls.
    pub fn receiver_tag(&self) -> Option<i64> {
        match self.receiver {
            Some(MockObject::Instance { tag, .. }) => Some(tag),
            _ => None,
        }
    }

    /// Leave an exception pending when the body returns.
    pub fn throw(&mut self, message: Option<&str>) {
        self.thrown = Some(message.map(str::to_owned));
    }
}

type Body = Arc<dyn Fn(&mut MockFrame) -> MockReturn + Send + Sync>;

struct MockMethod {
    class: String,
    name: String,
    signature: String,
    is_static: bool,
    body: Body,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RefKind {
    Local,
    Global,
}

#[derive(Default)]
struct State {
    classes: HashSet<String>,
    class_objects: HashMap<String, usize>,
    methods: Vec<MockMethod>,
    heap: Vec<Option<MockObject>>,
    free: Vec<usize>,
    refs: HashMap<usize, (usize, RefKind)>,
    next_handle: usize,
    pending: Option<usize>,
    calls: Vec<RecordedCall>,
    counters: Counters,
}

impl State {
    fn alloc(&mut self, obj: MockObject) -> usize {
        match self.free.pop() {
            Some(slot) => {
                self.heap[slot] = Some(obj);
                slot
            }
            None => {
                self.heap.push(Some(obj));
                self.heap.len() - 1
            }
        }
    }

    /// Drop reference `handle` if it is of `kind`. Returns whether it was.
    fn release(&mut self, handle: ObjectHandle, kind: RefKind) -> bool {
        match self.refs.get(&handle.addr()) {
            Some(&(object, k)) if k == kind => {
                self.refs.remove(&handle.addr());
                self.reclaim(object);
                true
            }
            _ => false,
        }
    }

    /// Free `object`'s slot if nothing can reach it any more.
    fn reclaim(&mut self, object: usize) {
        let reachable = self.pending == Some(object)
            || self.refs.values().any(|(o, _)| *o == object)
            || self.class_objects.values().any(|o| *o == object);
        if !reachable {
            self.heap[object] = None;
            self.free.push(object);
        }
    }

    fn add_ref(&mut self, object: usize, kind: RefKind) -> ObjectHandle {
        self.next_handle += 1;
        self.refs.insert(self.next_handle, (object, kind));
        ObjectHandle::from_addr(self.next_handle)
    }

    fn new_local(&mut self, obj: MockObject) -> ObjectHandle {
        let object = self.alloc(obj);
        self.add_ref(object, RefKind::Local)
    }

    fn object_id(&self, handle: ObjectHandle) -> Option<usize> {
        self.refs.get(&handle.addr()).map(|(object, _)| *object)
    }

    fn object(&self, handle: ObjectHandle) -> Option<&MockObject> {
        self.object_id(handle)
            .and_then(|id| self.heap.get(id))
            .and_then(Option::as_ref)
    }

    fn raise(&mut self, message: Option<String>) {
        let throwable = self.alloc(MockObject::Throwable { message });
        if let Some(previous) = self.pending.replace(throwable) {
            self.reclaim(previous);
        }
    }

    fn record_arg(&self, arg: &Arg) -> RecordedArg {
        match *arg {
            Arg::Bool(v) => RecordedArg::Bool(v),
            Arg::Int(v) => RecordedArg::Int(v),
            Arg::Long(v) => RecordedArg::Long(v),
            Arg::Float(v) => RecordedArg::Float(v),
            Arg::Object(h) => self
                .object(h)
                .cloned()
                .map_or(RecordedArg::Null, RecordedArg::Object),
        }
    }

    fn find_method(
        &self,
        class: &str,
        name: &str,
        signature: &str,
        is_static: bool,
    ) -> Option<usize> {
        self.methods.iter().position(|m| {
            m.class == class && m.name == name && m.signature == signature && m.is_static == is_static
        })
    }

    fn lookup(
        &mut self,
        class: ObjectHandle,
        name: &str,
        signature: &str,
        is_static: bool,
    ) -> Option<MethodHandle> {
        self.counters.method_lookups += 1;
        let found = match self.object(class) {
            Some(MockObject::Class(class_name)) => {
                self.find_method(class_name, name, signature, is_static)
            }
            _ => None,
        };
        match found {
            Some(index) => Some(MethodHandle::from_addr(index + 1)),
            None => {
                self.raise(Some(format!("java.lang.NoSuchMethodError: {name}{signature}")));
                None
            }
        }
    }

    fn deliver(&mut self, kind: ReturnKind, ret: MockReturn) -> RawValue {
        match (kind, ret) {
            (ReturnKind::Void, MockReturn::Void) => RawValue::Void,
            (ReturnKind::Boolean, MockReturn::Bool(v)) => RawValue::Bool(v),
            (ReturnKind::Int, MockReturn::Int(v)) => RawValue::Int(v),
            (ReturnKind::Float, MockReturn::Float(v)) => RawValue::Float(v),
            (ReturnKind::Object, MockReturn::Null) => RawValue::Object(ObjectHandle::NULL),
            (ReturnKind::Object, MockReturn::Str(s)) => {
                RawValue::Object(self.new_local(MockObject::Str(s.encode_utf16().collect())))
            }
            (ReturnKind::Object, MockReturn::IntArray(v)) => {
                RawValue::Object(self.new_local(MockObject::IntArray(v)))
            }
            (ReturnKind::Object, MockReturn::Instance { class, tag }) => {
                RawValue::Object(self.new_local(MockObject::Instance { class, tag }))
            }
            (kind, other) => {
                tracing::warn!(%kind, returned = ?other, "mock body returned the wrong kind");
                RawValue::zero(kind)
            }
        }
    }
}

/// Shared handle to a mock runtime.
#[derive(Clone)]
pub struct MockEnv {
    state: Arc<Mutex<State>>,
}

impl Default for MockEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MockEnv")
            .field("classes", &state.classes.len())
            .field("methods", &state.methods.len())
            .field("live_refs", &state.refs.len())
            .finish()
    }
}

impl MockEnv {
    /// A runtime that knows `java/lang/Throwable` and its `getMessage()`.
    pub fn new() -> Self {
        let mock = Self {
            state: Arc::new(Mutex::new(State::default())),
        };
        mock.define_method(THROWABLE_CLASS, "getMessage", "()Ljava/lang/String;", |frame| {
            match frame.receiver() {
                Some(MockObject::Throwable {
                    message: Some(message),
                }) => MockReturn::Str(message.clone()),
                _ => MockReturn::Null,
            }
        });
        mock
    }

    /// Attach to the current thread with a fresh symbol cache.
    pub fn attach(&self) -> AttachGuard {
        self.attach_with(Arc::new(SymbolCache::new()))
    }

    /// Attach to the current thread sharing `symbols` with other threads.
    pub fn attach_with(&self, symbols: Arc<SymbolCache>) -> AttachGuard {
        env::attach(Rc::new(self.clone()), symbols)
    }

    pub fn define_class(&self, class: &str) {
        self.state.lock().classes.insert(class.to_owned());
    }

    /// Define (or replace) a static method.
    pub fn define_static<F>(&self, class: &str, name: &str, signature: &str, body: F)
    where
        F: Fn(&mut MockFrame) -> MockReturn + Send + Sync + 'static,
    {
        self.define(class, name, signature, true, Arc::new(body));
    }

    /// Define (or replace) an instance method.
    pub fn define_method<F>(&self, class: &str, name: &str, signature: &str, body: F)
    where
        F: Fn(&mut MockFrame) -> MockReturn + Send + Sync + 'static,
    {
        self.define(class, name, signature, false, Arc::new(body));
    }

    fn define(&self, class: &str, name: &str, signature: &str, is_static: bool, body: Body) {
        let mut state = self.state.lock();
        state.classes.insert(class.to_owned());
        let method = MockMethod {
            class: class.to_owned(),
            name: name.to_owned(),
            signature: signature.to_owned(),
            is_static,
            body,
        };
        match state.find_method(class, name, signature, is_static) {
            Some(index) => state.methods[index] = method,
            None => state.methods.push(method),
        }
    }

    /// A new instance of `class`, returned as a local reference.
    pub fn new_instance(&self, class: &str, tag: i64) -> ObjectHandle {
        self.state.lock().new_local(MockObject::Instance {
            class: class.to_owned(),
            tag,
        })
    }

    pub fn instance_tag(&self, handle: ObjectHandle) -> Option<i64> {
        match self.state.lock().object(handle) {
            Some(MockObject::Instance { tag, .. }) => Some(*tag),
            _ => None,
        }
    }

    /// A string from raw code units, which need not be valid UTF-16.
    pub fn new_raw_string(&self, units: &[u16]) -> ObjectHandle {
        self.state.lock().new_local(MockObject::Str(units.to_vec()))
    }

    pub fn string_units(&self, handle: ObjectHandle) -> Option<Vec<u16>> {
        match self.state.lock().object(handle) {
            Some(MockObject::Str(units)) => Some(units.clone()),
            _ => None,
        }
    }

    /// Leave an exception pending, as if the last call had thrown.
    pub fn throw(&self, message: Option<&str>) {
        self.state.lock().raise(message.map(str::to_owned));
    }

    pub fn exception_pending(&self) -> bool {
        self.state.lock().pending.is_some()
    }

    pub fn counters(&self) -> Counters {
        self.state.lock().counters.clone()
    }

    pub fn live_local_refs(&self) -> usize {
        self.live_refs(RefKind::Local)
    }

    pub fn live_global_refs(&self) -> usize {
        self.live_refs(RefKind::Global)
    }

    /// Objects still occupying a heap slot.
    pub fn live_objects(&self) -> usize {
        self.state.lock().heap.iter().filter(|slot| slot.is_some()).count()
    }

    fn live_refs(&self, kind: RefKind) -> usize {
        self.state
            .lock()
            .refs
            .values()
            .filter(|(_, k)| *k == kind)
            .count()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().calls.clone()
    }

    pub fn calls_to(&self, name: &str) -> Vec<RecordedCall> {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.name == name)
            .cloned()
            .collect()
    }

    fn invoke(
        &self,
        receiver: Option<ObjectHandle>,
        method: MethodHandle,
        kind: ReturnKind,
        args: &[Arg],
    ) -> RawValue {
        let (body, mut frame) = {
            let mut state = self.state.lock();
            if state.pending.is_some() {
                state.counters.calls_with_pending_exception += 1;
            }

            let Some(index) = method.addr().checked_sub(1) else {
                return RawValue::zero(kind);
            };
            let Some(target) = state.methods.get(index) else {
                return RawValue::zero(kind);
            };
            if target.is_static != receiver.is_none() {
                tracing::warn!(method = %target.name, "called with the wrong static/instance variant");
                return RawValue::zero(kind);
            }
            let (class, name, signature) =
                (target.class.clone(), target.name.clone(), target.signature.clone());
            let body = Arc::clone(&target.body);

            let receiver_obj = match receiver {
                Some(handle) => {
                    let found = state.object(handle).cloned();
                    if found.is_none() {
                        state.raise(Some("java.lang.NullPointerException".into()));
                        return RawValue::zero(kind);
                    }
                    found
                }
                None => None,
            };
            let recorded: Vec<RecordedArg> = args.iter().map(|a| state.record_arg(a)).collect();
            state.calls.push(RecordedCall {
                class,
                name,
                signature,
                receiver: receiver_obj.clone(),
                args: recorded.clone(),
            });

            let frame = MockFrame {
                receiver: receiver_obj,
                args: recorded,
                thrown: None,
            };
            (body, frame)
        };

        // Run the body unlocked; it may take a while or touch other mocks.
        let ret = body(&mut frame);

        let mut state = self.state.lock();
        if let Some(message) = frame.thrown {
            state.raise(message);
        }
        state.deliver(kind, ret)
    }
}

impl RawEnv for MockEnv {
    fn find_class(&self, name: &str) -> ObjectHandle {
        let mut state = self.state.lock();
        state.counters.find_class += 1;
        if !state.classes.contains(name) {
            state.raise(Some(format!("java.lang.NoClassDefFoundError: {name}")));
            return ObjectHandle::NULL;
        }
        let existing = state.class_objects.get(name).copied();
        let object = match existing {
            Some(object) => object,
            None => {
                let object = state.alloc(MockObject::Class(name.to_owned()));
                state.class_objects.insert(name.to_owned(), object);
                object
            }
        };
        state.add_ref(object, RefKind::Local)
    }

    fn static_method_id(
        &self,
        class: ObjectHandle,
        name: &str,
        signature: &str,
    ) -> Option<MethodHandle> {
        self.state.lock().lookup(class, name, signature, true)
    }

    fn method_id(&self, class: ObjectHandle, name: &str, signature: &str) -> Option<MethodHandle> {
        self.state.lock().lookup(class, name, signature, false)
    }

    fn new_global_ref(&self, obj: ObjectHandle) -> ObjectHandle {
        let mut state = self.state.lock();
        let Some(object) = state.object_id(obj) else {
            return ObjectHandle::NULL;
        };
        state.counters.global_refs_created += 1;
        state.add_ref(object, RefKind::Global)
    }

    fn delete_global_ref(&self, obj: ObjectHandle) {
        let mut state = self.state.lock();
        if state.release(obj, RefKind::Global) {
            state.counters.global_refs_deleted += 1;
        }
    }

    fn delete_local_ref(&self, obj: ObjectHandle) {
        let mut state = self.state.lock();
        if state.release(obj, RefKind::Local) {
            state.counters.local_refs_deleted += 1;
        }
    }

    fn exception_check(&self) -> bool {
        self.state.lock().pending.is_some()
    }

    fn exception_occurred(&self) -> ObjectHandle {
        let mut state = self.state.lock();
        match state.pending {
            Some(throwable) => state.add_ref(throwable, RefKind::Local),
            None => ObjectHandle::NULL,
        }
    }

    fn exception_clear(&self) {
        let mut state = self.state.lock();
        if let Some(throwable) = state.pending.take() {
            state.reclaim(throwable);
        }
    }

    fn call_static(
        &self,
        _class: ObjectHandle,
        method: MethodHandle,
        kind: ReturnKind,
        args: &[Arg],
    ) -> RawValue {
        self.invoke(None, method, kind, args)
    }

    fn call_instance(
        &self,
        receiver: ObjectHandle,
        method: MethodHandle,
        kind: ReturnKind,
        args: &[Arg],
    ) -> RawValue {
        self.invoke(Some(receiver), method, kind, args)
    }

    fn new_long_array(&self, values: &[i64]) -> ObjectHandle {
        self.state.lock().new_local(MockObject::LongArray(values.to_vec()))
    }

    fn new_int_array(&self, values: &[i32]) -> ObjectHandle {
        self.state.lock().new_local(MockObject::IntArray(values.to_vec()))
    }

    fn array_length(&self, array: ObjectHandle) -> i32 {
        let len = match self.state.lock().object(array) {
            Some(MockObject::IntArray(v)) => v.len(),
            Some(MockObject::LongArray(v)) => v.len(),
            _ => 0,
        };
        i32::try_from(len).unwrap_or(i32::MAX)
    }

    fn int_array_region(&self, array: ObjectHandle, buf: &mut [i32]) {
        if let Some(MockObject::IntArray(v)) = self.state.lock().object(array) {
            let n = buf.len().min(v.len());
            buf[..n].copy_from_slice(&v[..n]);
        }
    }

    fn long_array_region(&self, array: ObjectHandle, buf: &mut [i64]) {
        if let Some(MockObject::LongArray(v)) = self.state.lock().object(array) {
            let n = buf.len().min(v.len());
            buf[..n].copy_from_slice(&v[..n]);
        }
    }

    fn string_chars(&self, string: ObjectHandle) -> Option<Vec<u16>> {
        match self.state.lock().object(string) {
            Some(MockObject::Str(units)) => Some(units.clone()),
            _ => None,
        }
    }

    fn new_string(&self, units: &[u16]) -> ObjectHandle {
        self.state.lock().new_local(MockObject::Str(units.to_vec()))
    }
}
