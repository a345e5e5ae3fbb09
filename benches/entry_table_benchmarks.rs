//! Benchmarks for building method tables and module descriptors.
//!
//! ```bash
//! cargo bench --bench entry_table_benchmarks
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use pyembed::ffi;
use pyembed::{ForeignArena, MethodDef, ModuleDef, ModuleDescriptor, build_entry_table};
use std::hint::black_box;
use std::ptr;

unsafe extern "C" fn noop(
    _slf: *mut ffi::PyObject,
    _args: *mut ffi::PyObject,
) -> *mut ffi::PyObject {
    ptr::null_mut()
}

fn methods(count: usize) -> Vec<MethodDef> {
    (0..count)
        .map(|i| MethodDef::varargs(format!("method_{}", i), noop).with_doc("Benchmark entry."))
        .collect()
}

fn bench_entry_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("entry_table");
    for count in [0usize, 8, 64, 512] {
        let input = methods(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &input, |b, input| {
            b.iter(|| {
                let arena = ForeignArena::new();
                black_box(build_entry_table(&arena, black_box(input)).unwrap());
            })
        });
    }
    group.finish();
}

fn bench_descriptor(c: &mut Criterion) {
    let def = ModuleDef::new("bench")
        .with_doc("Benchmark module")
        .with_state_size(32)
        .with_methods(methods(32));

    c.bench_function("module_descriptor_32", |b| {
        b.iter(|| black_box(ModuleDescriptor::build(black_box(&def)).unwrap()))
    });
}

criterion_group!(benches, bench_entry_table, bench_descriptor);
criterion_main!(benches);
