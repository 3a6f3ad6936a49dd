// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the cached symbol path and typed dispatch, run
// against the in-memory runtime.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use launcher_utils_bridge::marshal;
use launcher_utils_bridge::mock::{MockEnv, MockReturn};

const UTILS: &str = "com/geode/launcher/utils/GeodeUtils";

fn runtime() -> MockEnv {
    let mock = MockEnv::new();
    mock.define_static(UTILS, "controllersConnected", "()I", |_| MockReturn::Int(2));
    mock.define_static(UTILS, "getConnectedDevices", "()[I", |_| {
        MockReturn::IntArray((0..16).collect())
    });
    mock
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// A warm cache lookup: one string key, one lock, one `Arc` clone.
fn bench_cached_resolve(c: &mut Criterion) {
    let mock = runtime();
    let guard = mock.attach();
    let env = guard.env();

    c.bench_function("resolve_static_method (cached)", |b| {
        b.iter(|| {
            let method = env
                .symbols()
                .resolve_static_method(env, UTILS, black_box("controllersConnected"), "()I")
                .expect("resolve failed");
            black_box(method);
        });
    });
}

/// Full dispatch: resolve, call, exception check, conversion.
fn bench_dispatch(c: &mut Criterion) {
    let mock = runtime();
    let guard = mock.attach();
    let env = guard.env();

    let mut group = c.benchmark_group("call_static");
    group.bench_function("int", |b| {
        b.iter(|| {
            let count: i32 = env
                .call_static(UTILS, "controllersConnected", "()I", &[])
                .expect("call failed");
            black_box(count);
        });
    });
    group.bench_function("int[16]", |b| {
        b.iter(|| {
            let ids: Vec<i32> = env
                .call_static(UTILS, "getConnectedDevices", "()[I", &[])
                .expect("call failed");
            black_box(ids);
        });
    });
    group.finish();
}

/// UTF-8 to UTF-16 and back for a typical device name.
fn bench_string_round_trip(c: &mut Criterion) {
    let mock = runtime();
    let guard = mock.attach();
    let env = guard.env();

    c.bench_function("string round trip", |b| {
        b.iter(|| {
            let string = marshal::to_runtime_string(env, black_box("Xbox Wireless Controller"))
                .expect("encode failed");
            black_box(marshal::convert_string(env, &string).expect("decode failed"));
        });
    });
}

criterion_group!(
    benches,
    bench_cached_resolve,
    bench_dispatch,
    bench_string_round_trip
);
criterion_main!(benches);
