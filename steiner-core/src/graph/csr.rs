//! Compressed-sparse-row graph storage.

use crate::{error::GraphError, graph::Graph};

/// Controls how [`GraphBuilder`] stores each input edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Store `source -> target` exactly as supplied.
    #[default]
    Natural,
    /// Store both `source -> target` and `target -> source`.
    Undirected,
}

#[derive(Debug, Clone, Default)]
struct Adjacency {
    offsets: Vec<usize>,
    neighbours: Vec<usize>,
    // NaN marks a relationship stored without a weight.
    weights: Vec<f64>,
}

impl Adjacency {
    fn from_pairs(node_count: usize, pairs: &[(usize, usize, f64)]) -> Self {
        let mut offsets = vec![0_usize; node_count + 1];
        for &(from, _, _) in pairs {
            offsets[from + 1] += 1;
        }
        for idx in 1..offsets.len() {
            offsets[idx] += offsets[idx - 1];
        }

        let mut cursor = offsets.clone();
        let mut neighbours = vec![0_usize; pairs.len()];
        let mut weights = vec![f64::NAN; pairs.len()];
        for &(from, to, weight) in pairs {
            let slot = cursor[from];
            neighbours[slot] = to;
            weights[slot] = weight;
            cursor[from] += 1;
        }

        Self {
            offsets,
            neighbours,
            weights,
        }
    }

    fn visit<F>(&self, node: usize, default_weight: f64, mut visitor: F)
    where
        F: FnMut(usize, usize, f64) -> bool,
    {
        let (Some(&start), Some(&end)) = (self.offsets.get(node), self.offsets.get(node + 1))
        else {
            return;
        };
        for slot in start..end {
            let weight = self.weights[slot];
            let weight = if weight.is_nan() { default_weight } else { weight };
            if !visitor(node, self.neighbours[slot], weight) {
                break;
            }
        }
    }
}

/// In-memory weighted graph with an optional inverse index.
///
/// Relationships of a node are visited in insertion order.
#[derive(Debug, Clone)]
pub struct CsrGraph {
    node_count: usize,
    orientation: Orientation,
    forward: Adjacency,
    inverse: Option<Adjacency>,
}

impl CsrGraph {
    /// Returns the orientation the graph was built with.
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }
}

impl Graph for CsrGraph {
    #[rustfmt::skip]
    fn node_count(&self) -> usize { self.node_count }

    #[rustfmt::skip]
    fn relationship_count(&self) -> usize { self.forward.neighbours.len() }

    fn for_each_relationship<F>(&self, node: usize, default_weight: f64, visitor: F)
    where
        F: FnMut(usize, usize, f64) -> bool,
    {
        self.forward.visit(node, default_weight, visitor);
    }

    fn for_each_inverse_relationship<F>(&self, node: usize, default_weight: f64, visitor: F)
    where
        F: FnMut(usize, usize, f64) -> bool,
    {
        if let Some(inverse) = &self.inverse {
            inverse.visit(node, default_weight, visitor);
        }
    }

    #[rustfmt::skip]
    fn is_inverse_indexed(&self) -> bool { self.inverse.is_some() }

    #[rustfmt::skip]
    fn is_undirected(&self) -> bool { self.orientation == Orientation::Undirected }
}

/// Collects edges and validates them into a [`CsrGraph`].
///
/// # Examples
/// ```
/// use steiner_core::{Graph, GraphBuilder, Orientation};
///
/// let graph = GraphBuilder::new(2)
///     .with_orientation(Orientation::Undirected)
///     .with_edge(0, 1, Some(3.0))
///     .build()
///     .expect("edge is valid");
/// assert_eq!(graph.relationship_count(), 2);
/// assert!(graph.is_undirected());
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    node_count: usize,
    orientation: Orientation,
    inverse_index: bool,
    edges: Vec<(usize, usize, Option<f64>)>,
}

impl GraphBuilder {
    /// Creates a builder for a graph with `node_count` nodes and no edges.
    #[must_use]
    pub fn new(node_count: usize) -> Self {
        Self {
            node_count,
            ..Self::default()
        }
    }

    /// Selects how edges are stored.
    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Requests an inverse index so incoming relationships can be iterated.
    #[must_use]
    pub fn with_inverse_index(mut self, enabled: bool) -> Self {
        self.inverse_index = enabled;
        self
    }

    /// Adds an edge; `None` defers the weight to iteration time.
    #[must_use]
    pub fn with_edge(mut self, source: usize, target: usize, weight: Option<f64>) -> Self {
        self.push_edge(source, target, weight);
        self
    }

    /// Adds every edge yielded by `edges`.
    #[must_use]
    pub fn with_edges<I>(mut self, edges: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize, Option<f64>)>,
    {
        self.edges.extend(edges);
        self
    }

    /// Adds an edge in place.
    pub fn push_edge(&mut self, source: usize, target: usize, weight: Option<f64>) {
        self.edges.push((source, target, weight));
    }

    /// Returns the number of edges collected so far.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Validates the collected edges and builds the graph.
    ///
    /// # Errors
    /// Returns [`GraphError::NodeOutOfBounds`] when an endpoint is not below
    /// the node count, [`GraphError::NonFiniteWeight`] for NaN or infinite
    /// weights and [`GraphError::NegativeWeight`] for negative weights.
    pub fn build(self) -> Result<CsrGraph, GraphError> {
        let node_count = self.node_count;
        let mut pairs = Vec::with_capacity(match self.orientation {
            Orientation::Natural => self.edges.len(),
            Orientation::Undirected => self.edges.len() * 2,
        });

        for (source, target, weight) in self.edges {
            for node in [source, target] {
                if node >= node_count {
                    return Err(GraphError::NodeOutOfBounds { node, node_count });
                }
            }
            let stored = match weight {
                None => f64::NAN,
                Some(w) if !w.is_finite() => {
                    return Err(GraphError::NonFiniteWeight {
                        source_node: source,
                        target_node: target,
                    });
                }
                Some(w) if w < 0.0 => {
                    return Err(GraphError::NegativeWeight {
                        source_node: source,
                        target_node: target,
                        weight: w,
                    });
                }
                Some(w) => w,
            };
            pairs.push((source, target, stored));
            if self.orientation == Orientation::Undirected {
                pairs.push((target, source, stored));
            }
        }

        let forward = Adjacency::from_pairs(node_count, &pairs);
        let inverse = self.inverse_index.then(|| {
            let flipped: Vec<_> = pairs.iter().map(|&(s, t, w)| (t, s, w)).collect();
            Adjacency::from_pairs(node_count, &flipped)
        });

        Ok(CsrGraph {
            node_count,
            orientation: self.orientation,
            forward,
            inverse,
        })
    }
}
