use std::hint::black_box;
use std::time::Instant;

use terrascene_noise::PermutationTable;

fn bench_noise3(samples: usize, iterations: usize) {
    let table = PermutationTable::new();
    let start = Instant::now();
    let mut acc = 0.0;
    for it in 0..iterations {
        for i in 0..samples {
            let t = (i + it) as f64 * 0.173;
            acc += table.noise3(black_box(t), black_box(t * 0.5), black_box(t * 0.25));
        }
    }
    black_box(acc);
    let elapsed = start.elapsed();
    let per_sample = elapsed / (samples * iterations) as u32;
    println!(
        "  noise3 ({samples} samples, {iterations} iters): {per_sample:?}/sample, total {elapsed:?}"
    );
}

fn bench_noise2_grid(side: usize, iterations: usize) {
    let table = PermutationTable::new();
    let start = Instant::now();
    for _ in 0..iterations {
        let mut acc = 0.0;
        for zi in 0..side {
            for xi in 0..side {
                acc += table.noise2(black_box(xi as f64 * 0.2), black_box(zi as f64 * 0.2));
            }
        }
        black_box(acc);
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  noise2 grid ({side}x{side}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn main() {
    println!("=== Noise Benchmarks ===\n");

    println!("Raw 3-D samples:");
    bench_noise3(10_000, 10);
    bench_noise3(100_000, 5);

    println!("\nHeightfield-style 2-D grid:");
    bench_noise2_grid(101, 100);
    bench_noise2_grid(257, 20);

    println!("\n=== Done ===");
}
