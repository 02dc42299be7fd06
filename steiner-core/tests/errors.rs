//! Error reporting and stable error codes.

use rstest::rstest;
use steiner_core::{
    GraphBuilder, GraphError, GraphErrorCode, Orientation, ReroutingStrategy, SteinerError,
    SteinerErrorCode, SteinerTreeBuilder,
};

#[rstest]
#[case(SteinerError::InvalidConcurrency { got: 0 }, "STEINER_INVALID_CONCURRENCY")]
#[case(SteinerError::InvalidDelta { got: -1.0 }, "STEINER_INVALID_DELTA")]
#[case(SteinerError::NoTerminals, "STEINER_NO_TERMINALS")]
#[case(SteinerError::EmptyGraph, "STEINER_EMPTY_GRAPH")]
#[case(
    SteinerError::TerminalOutOfBounds { terminal: 7, node_count: 3 },
    "STEINER_TERMINAL_OUT_OF_BOUNDS",
)]
#[case(
    SteinerError::StrategyUnavailable {
        requested: ReroutingStrategy::InverseIndexed,
        requirement: "an inverse-indexed graph",
    },
    "STEINER_STRATEGY_UNAVAILABLE",
)]
#[case(SteinerError::Cancelled, "STEINER_CANCELLED")]
fn steiner_codes_are_stable(#[case] error: SteinerError, #[case] code: &str) {
    assert_eq!(error.code().as_str(), code);
    assert_eq!(error.code().to_string(), code);
}

#[rstest]
#[case::empty_graph(0, 0, &[1], SteinerErrorCode::EmptyGraph)]
#[case::source(3, 5, &[1], SteinerErrorCode::SourceOutOfBounds)]
#[case::terminal(3, 0, &[1, 3], SteinerErrorCode::TerminalOutOfBounds)]
fn run_validates_ids_against_the_graph(
    #[case] node_count: usize,
    #[case] source: usize,
    #[case] terminals: &[usize],
    #[case] expected: SteinerErrorCode,
) {
    let graph = GraphBuilder::new(node_count)
        .build()
        .expect("an edgeless graph is valid");
    let err = SteinerTreeBuilder::new(source)
        .with_terminals(terminals.iter().copied())
        .build()
        .expect("configuration is valid")
        .run(&graph)
        .expect_err("ids outside the graph must be rejected");
    assert_eq!(err.code(), expected);
}

#[test]
fn terminal_error_names_the_offender() {
    let graph = GraphBuilder::new(3).build().expect("graph is valid");
    let err = SteinerTreeBuilder::new(0)
        .with_terminals([1, 8])
        .build()
        .expect("configuration is valid")
        .run(&graph)
        .expect_err("terminal 8 is out of range");
    assert_eq!(
        err,
        SteinerError::TerminalOutOfBounds {
            terminal: 8,
            node_count: 3,
        }
    );
    assert_eq!(err.to_string(), "terminal node 8 is out of range for 3 nodes");
}

#[rstest]
#[case::inverse_without_index(ReroutingStrategy::InverseIndexed, Orientation::Natural)]
#[case::inverse_on_undirected(ReroutingStrategy::InverseIndexed, Orientation::Undirected)]
#[case::extended_without_index(ReroutingStrategy::Extended, Orientation::Natural)]
fn unavailable_strategies_fail_before_traversal(
    #[case] strategy: ReroutingStrategy,
    #[case] orientation: Orientation,
) {
    let graph = GraphBuilder::new(2)
        .with_orientation(orientation)
        .with_edge(0, 1, Some(1.0))
        .build()
        .expect("edge is valid");
    let err = SteinerTreeBuilder::new(0)
        .with_terminals([1])
        .with_rerouting(true)
        .with_rerouting_strategy(strategy)
        .build()
        .expect("configuration is valid")
        .run(&graph)
        .expect_err("strategy needs adjacency the graph lacks");
    assert_eq!(err.code(), SteinerErrorCode::StrategyUnavailable);
    assert!(matches!(
        err,
        SteinerError::StrategyUnavailable { requested, .. } if requested == strategy
    ));
}

#[test]
fn disabled_rerouting_ignores_the_strategy() {
    let graph = GraphBuilder::new(2)
        .with_edge(0, 1, Some(1.0))
        .build()
        .expect("edge is valid");
    let result = SteinerTreeBuilder::new(0)
        .with_terminals([1])
        .with_rerouting_strategy(ReroutingStrategy::InverseIndexed)
        .build()
        .expect("configuration is valid")
        .run(&graph)
        .expect("rerouting is off");
    assert_eq!(result.rerouting_strategy(), None);
    assert_eq!(result.total_cost(), 1.0);
}

#[rstest]
#[case::node_out_of_range(GraphBuilder::new(2).with_edge(0, 2, None), GraphErrorCode::NodeOutOfBounds)]
#[case::infinite(GraphBuilder::new(2).with_edge(0, 1, Some(f64::INFINITY)), GraphErrorCode::NonFiniteWeight)]
#[case::negative(GraphBuilder::new(2).with_edge(1, 0, Some(-0.5)), GraphErrorCode::NegativeWeight)]
fn graph_builder_rejects_invalid_edges(
    #[case] builder: GraphBuilder,
    #[case] expected: GraphErrorCode,
) {
    let err: GraphError = builder.build().expect_err("edge must be rejected");
    assert_eq!(err.code(), expected);
}
