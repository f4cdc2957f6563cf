// Entry point listing the benchmark targets

fn main() {
    println!("streamlearn benchmark suite");
    println!();
    println!("Usage:");
    println!("  cargo bench --package benchmarks");
    println!("  cargo bench --package benchmarks --bench <benchmark_name>");
    println!("  cargo run --package benchmarks --bin conformance_report [config.json]");
    println!();
    println!("Available benchmarks:");
    println!("  - estimators: update and predict throughput of single estimators");
    println!("  - composition: overhead of pipelines, unions and the batch adapter");
    println!();
    println!("Set RUST_LOG=debug for per-estimator checker logs.");
}
