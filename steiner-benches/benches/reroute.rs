//! Rerouting benchmarks.
//!
//! Compares the three rerouting variants on the same seeded graph. Each
//! measurement includes the traversal that produces the initial tree.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use steiner_benches::{
    error::BenchSetupError,
    params::SteinerBenchParams,
    source::{RandomGraphConfig, SyntheticGraph},
};
use steiner_core::{Orientation, ReroutingStrategy, SteinerTreeBuilder};

/// Seed used for all graph generation in this benchmark.
const SEED: u64 = 42;

/// Graph sizes to benchmark.
const NODE_COUNTS: &[usize] = &[1_000, 10_000];

/// Outgoing edges per node.
const AVERAGE_DEGREE: usize = 6;

/// Terminals per graph.
const TERMINAL_COUNT: usize = 64;

const STRATEGIES: &[(&str, ReroutingStrategy)] = &[
    ("forward_scan", ReroutingStrategy::ForwardScan),
    ("inverse_indexed", ReroutingStrategy::InverseIndexed),
    ("extended", ReroutingStrategy::Extended),
];

fn reroute_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("reroute");
    group.sample_size(10);

    for &node_count in NODE_COUNTS {
        let generated = SyntheticGraph::generate(&RandomGraphConfig {
            node_count,
            average_degree: AVERAGE_DEGREE,
            max_weight: 10.0,
            terminal_count: TERMINAL_COUNT,
            orientation: Orientation::Natural,
            inverse_index: true,
            seed: SEED,
        })?;
        let bench_params = SteinerBenchParams {
            node_count,
            terminal_count: TERMINAL_COUNT,
        };

        for &(label, strategy) in STRATEGIES {
            let steiner = SteinerTreeBuilder::new(0)
                .with_terminals(generated.terminals.iter().copied())
                .with_rerouting(true)
                .with_rerouting_strategy(strategy)
                .build()?;

            group.bench_with_input(
                BenchmarkId::new(label, &bench_params),
                &(&steiner, &generated.graph),
                |b, &(algorithm, graph)| {
                    b.iter(|| {
                        if let Err(err) = algorithm.run(graph) {
                            panic!("rerouting failed: {err}");
                        }
                    });
                },
            );
        }
    }

    group.finish();
    Ok(())
}

fn reroute(c: &mut Criterion) {
    if let Err(err) = reroute_impl(c) {
        panic!("reroute benchmark setup failed: {err}");
    }
}

criterion_group!(benches, reroute);
criterion_main!(benches);
