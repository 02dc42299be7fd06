//! Tests for the rerouting variants.

use bitvec::{bitvec, vec::BitVec};
use proptest::prelude::*;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use rstest::rstest;

use crate::{
    builder::ReroutingStrategy,
    delta::{EngineConfig, SteinerPaths},
    error::SteinerErrorCode,
    graph::{CsrGraph, Graph, GraphBuilder, Orientation},
    initial_tree::{InitialTree, build_initial_tree},
    progress::{CancellationToken, NullProgressTracker, RunningForever, TerminationFlag},
    test_utils::{assert_valid_tree, indexed_graph, live_children, live_cost, suite_proptest_config},
    tree::{PRUNED, ROOT_NODE, TreeState, TreeTotals},
};

use super::{RerouteContext, RerouteStats, Rerouter};

fn terminal_bits(node_count: usize, terminals: &[usize]) -> BitVec {
    let mut bits = bitvec![0; node_count];
    for &terminal in terminals {
        bits.set(terminal, true);
    }
    bits
}

fn initial_tree(graph: &CsrGraph, terminals: &[usize]) -> InitialTree {
    let config = EngineConfig {
        source: 0,
        delta: 2.0,
        concurrency: 1,
        bin_size_threshold: 1000,
    };
    let paths = SteinerPaths::new(graph, terminals.to_vec(), config, &RunningForever)
        .expect("pool must build");
    build_initial_tree(
        0,
        graph.node_count(),
        paths,
        &terminal_bits(graph.node_count(), terminals),
        &NullProgressTracker,
        &RunningForever,
    )
    .expect("run is not cancelled")
}

fn reroute_with<T: TerminationFlag>(
    rerouter: Rerouter,
    graph: &CsrGraph,
    terminals: &[usize],
    initial: &mut InitialTree,
    termination: &T,
) -> crate::Result<RerouteStats> {
    let bits = terminal_bits(initial.tree.node_count(), terminals);
    let ctx = RerouteContext {
        graph,
        terminals: &bits,
        discovery: &initial.discovery,
        progress: &NullProgressTracker,
        termination,
    };
    rerouter.execute(&ctx, &mut initial.tree, &initial.totals)
}

fn reroute(rerouter: Rerouter, graph: &CsrGraph, terminals: &[usize]) -> InitialTree {
    let mut initial = initial_tree(graph, terminals);
    reroute_with(rerouter, graph, terminals, &mut initial, &RunningForever)
        .expect("run is not cancelled");
    initial
}

fn shortcut_graph() -> CsrGraph {
    indexed_graph(
        6,
        &[(0, 1, 1.0), (0, 4, 4.0), (1, 2, 1.0), (2, 3, 1.0), (4, 3, 0.0)],
    )
}

fn two_reroutes_graph() -> CsrGraph {
    indexed_graph(
        8,
        &[
            (0, 1, 1.0),
            (0, 4, 10.0),
            (0, 7, 10.0),
            (1, 2, 1.0),
            (2, 3, 1.0),
            (4, 3, 1.0),
            (3, 5, 1.0),
            (5, 6, 1.0),
            (4, 6, 1.0),
        ],
    )
}

#[rstest]
#[case::auto_directed_indexed(ReroutingStrategy::Auto, Orientation::Natural, true, Some(Rerouter::InverseIndexed))]
#[case::auto_directed_plain(ReroutingStrategy::Auto, Orientation::Natural, false, Some(Rerouter::ForwardScan))]
#[case::auto_undirected(ReroutingStrategy::Auto, Orientation::Undirected, true, Some(Rerouter::ForwardScan))]
#[case::forward_always(ReroutingStrategy::ForwardScan, Orientation::Natural, false, Some(Rerouter::ForwardScan))]
#[case::inverse_indexed(ReroutingStrategy::InverseIndexed, Orientation::Natural, true, Some(Rerouter::InverseIndexed))]
#[case::inverse_missing_index(ReroutingStrategy::InverseIndexed, Orientation::Undirected, false, None)]
#[case::extended_undirected(ReroutingStrategy::Extended, Orientation::Undirected, false, Some(Rerouter::Extended))]
#[case::extended_indexed(ReroutingStrategy::Extended, Orientation::Natural, true, Some(Rerouter::Extended))]
#[case::extended_plain(ReroutingStrategy::Extended, Orientation::Natural, false, None)]
fn selects_a_variant_from_graph_capabilities(
    #[case] strategy: ReroutingStrategy,
    #[case] orientation: Orientation,
    #[case] inverse: bool,
    #[case] expected: Option<Rerouter>,
) {
    let graph = GraphBuilder::new(2)
        .with_orientation(orientation)
        .with_inverse_index(inverse)
        .with_edge(0, 1, None)
        .build()
        .expect("edge is valid");
    match (Rerouter::select(strategy, &graph), expected) {
        (Ok(selected), Some(variant)) => assert_eq!(selected, variant),
        (Err(err), None) => assert_eq!(err.code(), SteinerErrorCode::StrategyUnavailable),
        (outcome, _) => panic!("unexpected selection {outcome:?} for {strategy:?}"),
    }
}

#[rstest]
#[case::forward(Rerouter::ForwardScan)]
#[case::inverse(Rerouter::InverseIndexed)]
#[case::extended(Rerouter::Extended)]
fn replaces_a_chain_with_a_zero_cost_edge(#[case] rerouter: Rerouter) {
    let graph = shortcut_graph();
    let before = initial_tree(&graph, &[3, 4]);
    assert_eq!(before.totals.total_cost(), 7.0);
    assert_eq!(before.totals.effective_nodes(), 5);

    let after = reroute(rerouter, &graph, &[3, 4]);
    assert_eq!(after.tree.parent[3], 4);
    assert_eq!(after.tree.parent[1], PRUNED);
    assert_eq!(after.tree.parent[2], PRUNED);
    assert_eq!(after.totals.total_cost(), 4.0);
    assert_eq!(after.totals.effective_nodes(), 3);
    assert_valid_tree(&after.tree);
}

#[rstest]
#[case::forward(Rerouter::ForwardScan)]
#[case::inverse(Rerouter::InverseIndexed)]
#[case::extended(Rerouter::Extended)]
fn refuses_reroutes_that_close_a_cycle(#[case] rerouter: Rerouter) {
    let graph = indexed_graph(4, &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 1, 0.5)]);
    let after = reroute(rerouter, &graph, &[3]);

    assert_eq!(after.tree.parent, vec![ROOT_NODE, 0, 1, 2]);
    assert_eq!(after.totals.total_cost(), 3.0);
}

#[test]
fn forward_scan_only_takes_strict_improvements() {
    let graph = two_reroutes_graph();
    let after = reroute(Rerouter::ForwardScan, &graph, &[3, 4, 6, 7]);

    assert_eq!(after.totals.total_cost(), 25.0);
    assert_eq!(after.totals.effective_nodes(), 8);
}

#[test]
fn gain_ordering_prunes_whole_chains() {
    let graph = two_reroutes_graph();
    let after = reroute(Rerouter::InverseIndexed, &graph, &[3, 4, 6, 7]);

    assert_eq!(after.totals.total_cost(), 22.0);
    assert_eq!(after.totals.effective_nodes(), 5);
    assert_eq!(after.tree.parent[3], 4);
    assert_eq!(after.tree.parent[6], 4);
    assert!(!after.tree.is_live(5));
    assert_valid_tree(&after.tree);
}

#[test]
fn terminals_on_a_chain_are_never_pruned() {
    // 0 -> 1 -> 2 -> 3 with 3 reachable through the costly 6.
    let graph = indexed_graph(
        7,
        &[
            (0, 1, 10.0),
            (0, 6, 100.0),
            (1, 2, 10.0),
            (1, 4, 20.0),
            (2, 3, 10.0),
            (4, 5, 20.0),
            (6, 3, 1.0),
        ],
    );
    let before = initial_tree(&graph, &[3, 5, 6]);
    assert_eq!(before.totals.total_cost(), 170.0);

    let after = reroute(Rerouter::InverseIndexed, &graph, &[3, 5, 6]);
    assert_eq!(after.totals.total_cost(), 151.0);
    assert_eq!(after.totals.effective_nodes(), 6);
    assert!(after.tree.is_live(1), "node 1 still carries terminal 5");
    assert!(!after.tree.is_live(2));
    assert_eq!(after.tree.parent[3], 6);
}

#[test]
fn recomputed_gain_sees_new_single_parents() {
    let graph = indexed_graph(
        6,
        &[
            (0, 5, 10.0),
            (0, 1, 1.0),
            (0, 4, 7.0),
            (1, 2, 1.0),
            (2, 3, 4.0),
            (2, 4, 6.0),
            (5, 3, 3.0),
        ],
    );
    let before = initial_tree(&graph, &[3, 4, 5]);
    assert_eq!(before.totals.total_cost(), 22.0);

    let after = reroute(Rerouter::InverseIndexed, &graph, &[3, 4, 5]);
    assert_eq!(after.totals.total_cost(), 20.0);
    assert_eq!(after.totals.effective_nodes(), 4);
    assert_valid_tree(&after.tree);
}

#[test]
fn extended_variant_uses_forward_edges_of_undirected_graphs() {
    let graph = GraphBuilder::new(6)
        .with_orientation(Orientation::Undirected)
        .with_edges([
            (0, 1, Some(1.0)),
            (0, 4, Some(4.0)),
            (1, 2, Some(1.0)),
            (2, 3, Some(1.0)),
            (4, 3, Some(0.0)),
        ])
        .build()
        .expect("edges are valid");
    let after = reroute(Rerouter::Extended, &graph, &[3, 4]);

    assert_eq!(after.tree.parent[4], 3);
    assert_eq!(after.totals.total_cost(), 3.0);
    assert_valid_tree(&after.tree);
}

#[test]
fn priority_scan_walks_each_segment_bottom_up() {
    // A hand-built tree: the discovery queue holds two paths.
    let graph = indexed_graph(5, &[(0, 1, 3.0), (1, 2, 3.0), (0, 3, 1.0), (3, 2, 1.0), (0, 4, 9.0)]);
    let mut tree = TreeState::rooted_at(0, 5);
    tree.set_parent(1, 0, 3.0);
    tree.set_parent(2, 1, 3.0);
    tree.set_parent(3, 0, 1.0);
    let totals = TreeTotals::with_source();
    totals.add_cost(7.0);
    for _ in 0..3 {
        totals.node_attached();
    }
    let discovery = vec![1, 2, PRUNED, 3, PRUNED];
    let bits = terminal_bits(5, &[2, 3]);
    let ctx = RerouteContext {
        graph: &graph,
        terminals: &bits,
        discovery: &discovery,
        progress: &NullProgressTracker,
        termination: &RunningForever,
    };

    let stats = Rerouter::InverseIndexed
        .execute(&ctx, &mut tree, &totals)
        .expect("run is not cancelled");
    assert_eq!(stats.applied, 1);
    assert_eq!(stats.pruned, 1);
    assert_eq!(tree.parent[2], 3);
    assert!(!tree.is_live(1));
    assert_eq!(totals.total_cost(), 2.0);
    assert_eq!(totals.effective_nodes(), 3);
}

#[rstest]
#[case::forward(Rerouter::ForwardScan)]
#[case::inverse(Rerouter::InverseIndexed)]
fn cancellation_stops_the_pass(#[case] rerouter: Rerouter) {
    let graph = shortcut_graph();
    let mut initial = initial_tree(&graph, &[3, 4]);
    let token = CancellationToken::new();
    token.cancel();

    let err = reroute_with(rerouter, &graph, &[3, 4], &mut initial, &token)
        .expect_err("cancelled pass must fail");
    assert_eq!(err.code(), SteinerErrorCode::Cancelled);
    assert_valid_tree(&initial.tree);
}

fn random_instance(seed: u64, node_count: usize) -> (CsrGraph, Vec<usize>) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let edges: Vec<_> = (0..node_count * 3)
        .map(|_| {
            let source = rng.gen_range(0..node_count);
            let target = rng.gen_range(0..node_count);
            (source, target, f64::from(rng.gen_range(0_u32..10)))
        })
        .collect();
    let mut terminals: Vec<usize> = (1..node_count).filter(|_| rng.gen_bool(0.4)).collect();
    if terminals.is_empty() {
        terminals.push(node_count - 1);
    }
    (indexed_graph(node_count, &edges), terminals)
}

fn check_rerouting_invariants(
    seed: u64,
    node_count: usize,
    rerouter: Rerouter,
) -> core::result::Result<(), TestCaseError> {
    let (graph, terminals) = random_instance(seed, node_count);
    let before = initial_tree(&graph, &terminals);
    let cost_before = before.totals.total_cost();
    let connected: Vec<usize> = terminals
        .iter()
        .copied()
        .filter(|&terminal| before.tree.is_live(terminal))
        .collect();

    let after = reroute(rerouter, &graph, &terminals);
    assert_valid_tree(&after.tree);
    let cost_after = after.totals.total_cost();
    prop_assert!(cost_after <= cost_before + 1e-9, "{} > {}", cost_after, cost_before);
    prop_assert!((live_cost(&after.tree) - cost_after).abs() < 1e-9);
    prop_assert_eq!(
        after.totals.effective_nodes(),
        live_children(&after.tree).count() + 1
    );
    for terminal in connected {
        prop_assert!(after.tree.is_live(terminal), "terminal {} was dropped", terminal);
    }
    Ok(())
}

#[rstest]
#[case(7, 12)]
#[case(42, 30)]
#[case(1337, 64)]
fn seeded_reroutes_keep_a_valid_tree(#[case] seed: u64, #[case] node_count: usize) {
    for rerouter in [Rerouter::ForwardScan, Rerouter::InverseIndexed, Rerouter::Extended] {
        check_rerouting_invariants(seed, node_count, rerouter).expect("invariants hold");
    }
}

proptest! {
    #![proptest_config(suite_proptest_config(48))]

    #[test]
    fn reroutes_never_break_the_tree(
        seed in any::<u64>(),
        node_count in 2_usize..40,
        rerouter in prop_oneof![
            Just(Rerouter::ForwardScan),
            Just(Rerouter::InverseIndexed),
            Just(Rerouter::Extended),
        ],
    ) {
        check_rerouting_invariants(seed, node_count, rerouter)?;
    }
}
