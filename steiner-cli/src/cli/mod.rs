//! Command-line interface for computing Steiner trees over edge-list files.
//!
//! The `run` command loads a whitespace-separated edge list, runs the
//! shortest-path heuristic with optional rerouting and prints the tree.

mod commands;

pub use commands::{
    Cli, CliError, Command, EdgeList, ExecutionSummary, OutputFormat, RunCommand, StrategyArg,
    load_edge_list, render_summary, run_cli,
};
