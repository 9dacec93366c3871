//! Strand assignment for the contigs of one component.
//!
//! Each edge only constrains whether its endpoints share a sign. Signs are
//! propagated breadth-first from node 0; a node is fixed when it leaves the
//! queue by majority vote over its edges into the resolved prefix, ties going
//! to the earliest such edge in canonical order. An optional refinement then
//! flips single nodes while that strictly lowers the number of violated edges.
//! Neither step promises the maximum-agreement labelling.

use std::collections::VecDeque;

use log::debug;

use crate::config::ScaffoldConfig;
use crate::graph::{Component, LinkEdge};
use crate::links::Strand;

/// Resolved sign per node together with the edges those signs contradict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignAssignment {
    pub signs: Vec<Strand>,
    /// Indices into `Component::edges` whose sign relation is violated.
    pub violated: Vec<usize>,
}

impl SignAssignment {
    pub fn sign(&self, node: usize) -> Strand {
        self.signs[node]
    }

    /// Signs as +1/-1 values.
    pub fn values(&self) -> Vec<i8> {
        self.signs.iter().map(|s| s.value()).collect()
    }
}

#[inline]
fn implied_sign(edge: &LinkEdge, from: Strand) -> Strand {
    if edge.orientation.is_same() {
        from
    } else {
        from.flip()
    }
}

#[inline]
fn is_satisfied(edge: &LinkEdge, signs: &[Strand]) -> bool {
    (signs[edge.a] == signs[edge.b]) == edge.orientation.is_same()
}

fn vote(
    node: usize,
    incident: &[usize],
    edges: &[LinkEdge],
    signs: &[Option<Strand>],
) -> Strand {
    let mut forward = 0usize;
    let mut reverse = 0usize;
    let mut first: Option<Strand> = None;
    for &edge_idx in incident {
        let edge = &edges[edge_idx];
        let Some(other) = signs[edge.other(node)] else {
            continue;
        };
        let implied = implied_sign(edge, other);
        first.get_or_insert(implied);
        match implied {
            Strand::Forward => forward += 1,
            Strand::Reverse => reverse += 1,
        }
    }
    if forward > reverse {
        Strand::Forward
    } else if reverse > forward {
        Strand::Reverse
    } else {
        first.unwrap_or(Strand::Forward)
    }
}

fn propagate(component: &Component, incidence: &[Vec<usize>]) -> Vec<Strand> {
    let n = component.len();
    let mut signs: Vec<Option<Strand>> = vec![None; n];
    let mut queued = vec![false; n];

    // A connected component is covered by the first root; the loop keeps the
    // labelling total for callers that hand in an arbitrary edge set.
    for root in 0..n {
        if queued[root] {
            continue;
        }
        queued[root] = true;
        let mut queue = VecDeque::from([root]);
        while let Some(node) = queue.pop_front() {
            if signs[node].is_none() {
                let resolved = if node == root {
                    Strand::Forward
                } else {
                    vote(node, &incidence[node], &component.edges, &signs)
                };
                signs[node] = Some(resolved);
            }
            let mut neighbours: Vec<usize> = incidence[node]
                .iter()
                .map(|&e| component.edges[e].other(node))
                .filter(|&v| !queued[v])
                .collect();
            neighbours.sort_unstable();
            neighbours.dedup();
            for next in neighbours {
                queued[next] = true;
                queue.push_back(next);
            }
        }
    }

    signs
        .into_iter()
        .map(|s| s.unwrap_or(Strand::Forward))
        .collect()
}

fn refine(
    signs: &mut [Strand],
    incidence: &[Vec<usize>],
    edges: &[LinkEdge],
    max_rounds: usize,
) -> usize {
    let mut flips = 0usize;
    for _ in 0..max_rounds {
        let mut changed = false;
        for node in 0..signs.len() {
            let (agree, disagree) = incidence[node].iter().fold((0usize, 0usize), |acc, &e| {
                if is_satisfied(&edges[e], signs) {
                    (acc.0 + 1, acc.1)
                } else {
                    (acc.0, acc.1 + 1)
                }
            });
            if disagree > agree {
                signs[node] = signs[node].flip();
                flips += 1;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    flips
}

/// Assign a strand to every node of `component`.
///
/// The returned labelling always has node 0 forward; flipping every sign
/// gives the mirrored, equally valid answer.
pub fn resolve_signs(component: &Component, config: &ScaffoldConfig) -> SignAssignment {
    let incidence = component.incidence();
    let mut signs = propagate(component, &incidence);

    if config.refine_signs {
        let flips = refine(
            &mut signs,
            &incidence,
            &component.edges,
            config.max_refine_rounds,
        );
        if flips > 0 {
            debug!("Sign refinement flipped {flips} nodes");
        }
        if signs.first() == Some(&Strand::Reverse) {
            signs.iter_mut().for_each(|s| *s = s.flip());
        }
    }

    let violated: Vec<usize> = component
        .edges
        .iter()
        .enumerate()
        .filter(|(_, edge)| !is_satisfied(edge, &signs))
        .map(|(idx, _)| idx)
        .collect();

    SignAssignment { signs, violated }
}
