//! Command implementations and argument parsing for the steiner CLI.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use steiner_core::{
    CsrGraph, Graph, GraphBuilder, GraphError, LoggingProgressTracker, Orientation,
    ReroutingStrategy, RunningForever, SteinerError, SteinerTreeBuilder, SteinerTreeResult,
};
use thiserror::Error;
use tracing::{Span, debug, field, info, instrument};

const DEFAULT_DELTA: f64 = 2.0;
const DEFAULT_BIN_SIZE_THRESHOLD: usize = 1000;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "steiner", about = "Approximate Steiner trees over weighted graphs.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Compute a Steiner tree for an edge-list file.
    Run(RunCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Edge list with one `source target [weight]` triple per line.
    pub edges: PathBuf,

    /// Root of the tree.
    #[arg(long)]
    pub source: usize,

    /// Comma-separated nodes the tree must reach.
    #[arg(long, value_delimiter = ',', required = true, num_args = 1..)]
    pub terminals: Vec<usize>,

    /// Bucket width of the shortest-path search.
    #[arg(long, default_value_t = DEFAULT_DELTA)]
    pub delta: f64,

    /// Number of shortest-path workers (defaults to the available cores).
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Improve the initial tree with a rerouting pass.
    #[arg(long)]
    pub reroute: bool,

    /// Rerouting variant, used together with `--reroute`.
    #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
    pub strategy: StrategyArg,

    /// Store every edge in both directions.
    #[arg(long)]
    pub undirected: bool,

    /// Build an index of incoming relationships.
    #[arg(long = "index-inverse")]
    pub index_inverse: bool,

    /// Minimum node count, for graphs whose highest ids have no edges.
    #[arg(long)]
    pub nodes: Option<usize>,

    /// Local bucket size above which workers defer to the shared frontier.
    #[arg(long = "bin-size-threshold", default_value_t = DEFAULT_BIN_SIZE_THRESHOLD)]
    pub bin_size_threshold: usize,

    /// Output format of the summary.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Rerouting variants selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Choose from the graph's capabilities.
    Auto,
    /// Scan every outgoing relationship.
    ForwardScan,
    /// Replay discovered paths over incoming relationships.
    InverseIndexed,
    /// Replay the whole discovery queue.
    Extended,
}

impl From<StrategyArg> for ReroutingStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Auto => Self::Auto,
            StrategyArg::ForwardScan => Self::ForwardScan,
            StrategyArg::InverseIndexed => Self::InverseIndexed,
            StrategyArg::Extended => Self::Extended,
        }
    }
}

/// Summary output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Header lines followed by tab-separated tree edges.
    Text,
    /// A single JSON document.
    Json,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while reading the edge list.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// A line of the edge list could not be parsed.
    #[error("{path}:{line}: {message}")]
    Parse {
        /// Edge-list path.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },
    /// The parsed edges do not form a valid graph.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// Configuring or running the computation failed.
    #[error(transparent)]
    Core(#[from] SteinerError),
}

/// Edges read from an edge-list file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeList {
    /// One more than the largest node id mentioned.
    pub node_count: usize,
    /// Edges in file order; `None` weights use the default weight.
    pub edges: Vec<(usize, usize, Option<f64>)>,
}

impl EdgeList {
    /// Builds a graph with at least `min_nodes` nodes.
    ///
    /// # Errors
    /// Returns [`GraphError`] when an edge weight is rejected.
    pub fn into_graph(
        self,
        min_nodes: usize,
        orientation: Orientation,
        inverse_index: bool,
    ) -> Result<CsrGraph, GraphError> {
        GraphBuilder::new(self.node_count.max(min_nodes))
            .with_orientation(orientation)
            .with_inverse_index(inverse_index)
            .with_edges(self.edges)
            .build()
    }
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Name derived from the edge-list file.
    pub graph: String,
    /// Number of nodes in the loaded graph.
    pub node_count: usize,
    /// Number of stored relationships.
    pub relationship_count: usize,
    /// Requested output format.
    pub format: OutputFormat,
    /// The computed tree.
    pub result: SteinerTreeResult,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading or computation fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use clap::Parser;
/// # use steiner_cli::cli::{Cli, run_cli};
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "0 1 2.0\n1 2 3.0\n")?;
/// let path = file.path().to_string_lossy().into_owned();
/// let cli = Cli::try_parse_from([
///     "steiner",
///     "run",
///     path.as_str(),
///     "--source",
///     "0",
///     "--terminals",
///     "2",
/// ])?;
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.result.total_cost(), 5.0);
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(run)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(
        edges = %command.edges.display(),
        source = command.source,
        terminals = command.terminals.len(),
        reroute = command.reroute,
        nodes = field::Empty,
    ),
)]
pub(super) fn run_command(command: RunCommand) -> Result<ExecutionSummary, CliError> {
    let steiner = SteinerTreeBuilder::new(command.source)
        .with_terminals(command.terminals.iter().copied())
        .with_delta(command.delta)
        .with_rerouting(command.reroute)
        .with_rerouting_strategy(command.strategy.into())
        .with_bin_size_threshold(command.bin_size_threshold);
    let steiner = match command.concurrency {
        Some(concurrency) => steiner.with_concurrency(concurrency),
        None => steiner,
    }
    .build()?;

    let orientation = if command.undirected {
        Orientation::Undirected
    } else {
        Orientation::Natural
    };
    let reader = open_edge_list(&command.edges)?;
    let graph = load_edge_list(reader, &command.edges)?.into_graph(
        command.nodes.unwrap_or_default(),
        orientation,
        command.index_inverse,
    )?;
    Span::current().record("nodes", graph.node_count());

    let result = steiner.run_with(&graph, &LoggingProgressTracker::new(), &RunningForever)?;
    info!(
        total_cost = result.total_cost(),
        effective_nodes = result.effective_node_count(),
        effective_targets = result.effective_target_count(),
        "command completed"
    );
    Ok(ExecutionSummary {
        graph: derive_graph_name(&command.edges),
        node_count: graph.node_count(),
        relationship_count: graph.relationship_count(),
        format: command.format,
        result,
    })
}

#[instrument(name = "cli.open_edge_list", err, fields(path = %path.display()))]
pub(super) fn open_edge_list(path: &Path) -> Result<BufReader<File>, CliError> {
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Parses `source target [weight]` lines. Blank lines and text after `#`
/// are ignored; `path` only labels errors.
///
/// # Errors
/// Returns [`CliError::Io`] when reading fails and [`CliError::Parse`] for a
/// malformed line.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use steiner_cli::cli::load_edge_list;
///
/// let input = "# demo\n0 1 2.5\n1 3\n";
/// let list = load_edge_list(input.as_bytes(), Path::new("demo.txt")).expect("input parses");
/// assert_eq!(list.node_count, 4);
/// assert_eq!(list.edges, vec![(0, 1, Some(2.5)), (1, 3, None)]);
/// ```
pub fn load_edge_list(reader: impl BufRead, path: &Path) -> Result<EdgeList, CliError> {
    let mut list = EdgeList::default();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let content = line.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        let edge = parse_edge(content).map_err(|message| CliError::Parse {
            path: path.to_path_buf(),
            line: index + 1,
            message,
        })?;
        list.node_count = list.node_count.max(edge.0 + 1).max(edge.1 + 1);
        list.edges.push(edge);
    }
    debug!(
        path = %path.display(),
        edges = list.edges.len(),
        nodes = list.node_count,
        "edge list loaded"
    );
    Ok(list)
}

fn parse_edge(content: &str) -> Result<(usize, usize, Option<f64>), String> {
    let mut fields = content.split_whitespace();
    let mut node = |label: &str| -> Result<usize, String> {
        let raw = fields.next().ok_or_else(|| format!("missing {label} node"))?;
        raw.parse()
            .map_err(|err| format!("invalid {label} node `{raw}`: {err}"))
    };
    let source = node("source")?;
    let target = node("target")?;
    let weight = fields
        .next()
        .map(|raw| {
            raw.parse::<f64>()
                .map_err(|err| format!("invalid weight `{raw}`: {err}"))
        })
        .transpose()?;
    if let Some(extra) = fields.next() {
        return Err(format!("unexpected trailing field `{extra}`"));
    }
    Ok((source, target, weight))
}

pub(super) fn derive_graph_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|value| value.to_str())
        .map_or_else(|| "graph".to_owned(), ToOwned::to_owned)
}

fn strategy_label(strategy: Option<ReroutingStrategy>) -> &'static str {
    match strategy {
        None => "off",
        Some(ReroutingStrategy::Auto) => "auto",
        Some(ReroutingStrategy::ForwardScan) => "forward-scan",
        Some(ReroutingStrategy::InverseIndexed) => "inverse-indexed",
        Some(ReroutingStrategy::Extended) => "extended",
    }
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    graph: &'a str,
    node_count: usize,
    relationship_count: usize,
    source: usize,
    total_cost: f64,
    effective_node_count: usize,
    effective_target_count: usize,
    rerouting: &'static str,
    edges: Vec<JsonEdge>,
}

#[derive(Serialize)]
struct JsonEdge {
    parent: usize,
    child: usize,
    cost: f64,
}

/// Renders `summary` to `writer` in the format it requests.
///
/// Text output lists `parent`, `child` and `cost` of every tree edge, one
/// edge per tab-separated line, after a short header.
///
/// # Errors
/// Returns [`io::Error`] if writing or serialising fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let result = &summary.result;
    match summary.format {
        OutputFormat::Text => {
            writeln!(
                writer,
                "graph: {} ({} nodes, {} relationships)",
                summary.graph, summary.node_count, summary.relationship_count
            )?;
            writeln!(writer, "source: {}", result.source())?;
            writeln!(writer, "total cost: {}", result.total_cost())?;
            writeln!(writer, "nodes: {}", result.effective_node_count())?;
            writeln!(writer, "terminals reached: {}", result.effective_target_count())?;
            writeln!(writer, "rerouting: {}", strategy_label(result.rerouting_strategy()))?;
            for (parent, child, cost) in result.live_edges() {
                writeln!(writer, "{parent}\t{child}\t{cost}")?;
            }
        }
        OutputFormat::Json => {
            let document = JsonSummary {
                graph: &summary.graph,
                node_count: summary.node_count,
                relationship_count: summary.relationship_count,
                source: result.source(),
                total_cost: result.total_cost(),
                effective_node_count: result.effective_node_count(),
                effective_target_count: result.effective_target_count(),
                rerouting: strategy_label(result.rerouting_strategy()),
                edges: result
                    .live_edges()
                    .map(|(parent, child, cost)| JsonEdge {
                        parent,
                        child,
                        cost,
                    })
                    .collect(),
            };
            serde_json::to_writer(&mut writer, &document)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
