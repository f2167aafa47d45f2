use criterion::{criterion_group, criterion_main, Criterion};
use lattix_tensor::{CpuAllocator, Tensor};
use std::hint::black_box;

fn benchmark_tensor_clone(c: &mut Criterion) {
    let tensor =
        Tensor::<f32, 2, _>::from_shape_vec([100, 100], vec![1.0; 10000], CpuAllocator).unwrap();

    c.bench_function("tensor clone", |b| {
        b.iter(|| {
            let _clone = black_box(&tensor).clone();
        })
    });
}

fn benchmark_element_wise_op(c: &mut Criterion) {
    let tensor1 =
        Tensor::<f32, 2, _>::from_shape_vec([100, 100], vec![1.0; 10000], CpuAllocator).unwrap();
    let tensor2 =
        Tensor::<f32, 2, _>::from_shape_vec([100, 100], vec![2.0; 10000], CpuAllocator).unwrap();

    c.bench_function("element_wise_op", |b| {
        b.iter(|| {
            let _result = black_box(&tensor1)
                .element_wise_op(black_box(&tensor2), |a, b| *a + *b)
                .unwrap();
        })
    });
}

fn benchmark_to_standard_layout(c: &mut Criterion) {
    let tensor =
        Tensor::<f32, 2, _>::from_shape_vec([100, 100], vec![1.0; 10000], CpuAllocator).unwrap();

    c.bench_function("permuted as_contiguous", |b| {
        b.iter(|| {
            let _result = black_box(&tensor)
                .permute_axes([1, 0])
                .as_contiguous()
                .unwrap();
        })
    });
}

criterion_group!(
    benches,
    benchmark_tensor_clone,
    benchmark_element_wise_op,
    benchmark_to_standard_layout
);
criterion_main!(benches);
