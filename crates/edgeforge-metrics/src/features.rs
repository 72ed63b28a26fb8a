//! Per-user feature derivation from a completed activity graph.

use crate::error::MetricsError;
use crate::similarity;
use edgeforge_model::{
    CombinationIndex, EdgeList, EventKind, Universe, UserId, INTERACTION_WEIGHT,
};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::time::Instant;

/// Damping factor of the PageRank fixed point.
const DAMPING: f64 = 0.85;
/// Convergence threshold on the L1 movement of the score vector.
const TOLERANCE: f64 = 1e-8;
const MAX_ITERATIONS: usize = 100;

/// Controls for feature derivation.
#[derive(Debug, Clone, Copy)]
pub struct FeatureOptions {
    /// Weight PageRank by edge weight (similarity on follows, the fixed
    /// sentinel on interactions) instead of treating edges uniformly
    pub weighted: bool,
    /// Min-max scale each feature column to [0, 1]
    pub scale: bool,
}

impl Default for FeatureOptions {
    fn default() -> Self {
        Self {
            weighted: false,
            scale: true,
        }
    }
}

/// One per-user feature row: centrality, connectivity, and the activity
/// signature code (as a float so the column can be scaled).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRow {
    /// PageRank centrality
    pub pagerank: f64,
    /// Total degree, in plus out
    pub degree: f64,
    /// Activity-signature code
    pub signature: f64,
}

/// Per-user feature matrix, one row per universe user in id order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    rows: Vec<(UserId, FeatureRow)>,
}

impl FeatureTable {
    /// Build a table from explicit rows.
    #[inline]
    #[must_use]
    pub fn from_rows(rows: Vec<(UserId, FeatureRow)>) -> Self {
        Self { rows }
    }

    /// All rows, keyed by user id.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[(UserId, FeatureRow)] {
        &self.rows
    }

    /// Number of users in the table.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The rows as points in the feature cube.
    pub fn points(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        self.rows
            .iter()
            .map(|(_, row)| [row.pagerank, row.degree, row.signature])
    }

    /// Min-max scale each column independently to [0, 1]. A constant column
    /// scales to all zeros rather than dividing by zero.
    fn scale(&mut self) {
        for pick in [0usize, 1, 2] {
            let column = |row: &FeatureRow| match pick {
                0 => row.pagerank,
                1 => row.degree,
                _ => row.signature,
            };
            let min = self
                .rows
                .iter()
                .map(|(_, r)| column(r))
                .fold(f64::INFINITY, f64::min);
            let max = self
                .rows
                .iter()
                .map(|(_, r)| column(r))
                .fold(f64::NEG_INFINITY, f64::max);
            let span = max - min;

            for (_, row) in &mut self.rows {
                let slot = match pick {
                    0 => &mut row.pagerank,
                    1 => &mut row.degree,
                    _ => &mut row.signature,
                };
                *slot = if span > 0.0 { (*slot - min) / span } else { 0.0 };
            }
        }
    }
}

/// Derive the per-user feature table for a candidate edge list.
///
/// Completes the Follow relation, builds the directed multigraph over users
/// and repositories, computes PageRank and total degree per node, joins the
/// activity-signature code per user, drops repository rows, and optionally
/// scales each column to [0, 1].
///
/// # Errors
/// [`MetricsError::MissingSignature`] when a user has no observed
/// interactions; the mutation invariants make this unreachable inside a
/// search, so hitting it means a logic defect upstream.
pub fn evaluate(
    edges: &EdgeList,
    universe: &Universe,
    index: &CombinationIndex,
    options: FeatureOptions,
) -> Result<FeatureTable, MetricsError> {
    let started = Instant::now();
    let completed = similarity::complete(edges, universe);

    let user_count = universe.user_count();
    let mut graph = DiGraph::<(), f64>::new();
    // users take node indices 0..user_count, repos follow in universe order
    for _ in 0..universe.node_count() {
        graph.add_node(());
    }
    for interaction in completed.interactions() {
        graph.add_edge(
            NodeIndex::new(interaction.user.0 as usize),
            NodeIndex::new(user_count + interaction.repo.0 as usize),
            INTERACTION_WEIGHT,
        );
    }
    for follow in completed.follows() {
        graph.add_edge(
            NodeIndex::new(follow.source.0 as usize),
            NodeIndex::new(follow.target.0 as usize),
            follow.weight,
        );
    }

    let ranks = page_rank(&graph, options.weighted);

    let mut kinds_per_user: Vec<Vec<EventKind>> = vec![Vec::new(); user_count];
    for interaction in completed.interactions() {
        kinds_per_user[interaction.user.0 as usize].push(interaction.kind);
    }

    let mut rows = Vec::with_capacity(user_count);
    for user in universe.users() {
        let node = NodeIndex::new(user.0 as usize);
        let degree = graph.edges_directed(node, Direction::Outgoing).count()
            + graph.edges_directed(node, Direction::Incoming).count();
        let signature = index
            .signature_of(kinds_per_user[user.0 as usize].iter().copied())
            .ok_or(MetricsError::MissingSignature { user })?;
        rows.push((
            user,
            FeatureRow {
                pagerank: ranks[node.index()],
                degree: degree as f64,
                signature: f64::from(signature),
            },
        ));
    }

    let mut table = FeatureTable::from_rows(rows);
    if options.scale {
        table.scale();
    }
    tracing::debug!(
        op = "evaluate",
        elapsed_us = started.elapsed().as_micros() as u64,
        users = table.len(),
        "derived feature table"
    );
    Ok(table)
}

/// Standard damping-factor PageRank by power iteration, with dangling mass
/// redistributed uniformly. Rank ordering is stable across repeated runs on
/// identical input; exact parity with any reference library is not a goal.
fn page_rank(graph: &DiGraph<(), f64>, weighted: bool) -> Vec<f64> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }
    let nf = n as f64;
    let edge_weight = |w: &f64| if weighted { *w } else { 1.0 };

    let out_totals: Vec<f64> = graph
        .node_indices()
        .map(|node| {
            graph
                .edges_directed(node, Direction::Outgoing)
                .map(|e| edge_weight(e.weight()))
                .sum()
        })
        .collect();

    let mut scores = vec![1.0 / nf; n];
    let mut next = vec![0.0; n];
    for _ in 0..MAX_ITERATIONS {
        next.iter_mut().for_each(|x| *x = 0.0);
        let mut dangling = 0.0;
        for node in graph.node_indices() {
            let total = out_totals[node.index()];
            if total > 0.0 {
                let share = scores[node.index()] / total;
                for edge in graph.edges_directed(node, Direction::Outgoing) {
                    next[edge.target().index()] += share * edge_weight(edge.weight());
                }
            } else {
                dangling += scores[node.index()];
            }
        }
        for value in &mut next {
            *value = (1.0 - DAMPING) / nf + DAMPING * (*value + dangling / nf);
        }

        let movement: f64 = scores
            .iter()
            .zip(&next)
            .map(|(old, new)| (old - new).abs())
            .sum();
        std::mem::swap(&mut scores, &mut next);
        if movement < TOLERANCE {
            break;
        }
    }
    scores
}
