//! Relative placement of the contigs of one component.
//!
//! A node's position is the coordinate of its first base: the left end of a
//! forward contig, the right end of a reverse one. Every edge that agrees with
//! the resolved signs (directly or read on the opposite strand) becomes a
//! difference constraint `x[b] - x[a] = offset`, and the least-squares
//! solution is taken through the normal equations `L x = r`, where `L` is the
//! constraint graph Laplacian. One node per constraint-connected piece is
//! pinned at zero and the reduced SPD system is solved by Jacobi
//! preconditioned conjugate gradient.

use std::collections::HashMap;

use log::{debug, warn};
use petgraph::unionfind::UnionFind;
use sprs::{CsMat, TriMat};

use crate::config::ScaffoldConfig;
use crate::error::{Result, ScaffoldError};
use crate::graph::{Component, LinkEdge};
use crate::links::{Orientation, Strand};
use crate::orientation::SignAssignment;

/// Signed difference constraint between two nodes of a component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceConstraint {
    pub a: usize,
    pub b: usize,
    /// Target value of `x[b] - x[a]`.
    pub offset: f64,
}

/// Position per node plus the edges left out of the solve.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionAssignment {
    pub positions: Vec<f64>,
    /// Indices into `Component::edges` inconsistent with the resolved signs.
    pub discarded: Vec<usize>,
    /// Number of constraint-connected pieces that were solved separately.
    pub pieces: usize,
}

// Distance from a node's position to its left end.
#[inline]
fn lead(strand: Strand, length: u64) -> f64 {
    match strand {
        Strand::Forward => 0.0,
        Strand::Reverse => length as f64,
    }
}

fn constraint_for(
    edge: &LinkEdge,
    signs: &SignAssignment,
    lengths: &[u64],
) -> Option<DistanceConstraint> {
    let (sa, sb) = (signs.sign(edge.a), signs.sign(edge.b));
    let resolved = Orientation::new(sa, sb);
    let (la, lb) = (lengths[edge.a], lengths[edge.b]);
    let gap = edge.distance as f64;
    let anchor_shift = lead(sb, lb) - lead(sa, la);

    let offset = if edge.orientation == resolved {
        // a then b: left(b) - right(a) = gap
        gap + la as f64 + anchor_shift
    } else if edge.orientation.flipped() == resolved {
        // b then a: left(a) - right(b) = gap
        -(gap + lb as f64) + anchor_shift
    } else {
        return None;
    };
    Some(DistanceConstraint {
        a: edge.a,
        b: edge.b,
        offset,
    })
}

/// Translate edges into difference constraints, returning the indices of the
/// edges that match neither the direct nor the flipped arrangement.
pub fn distance_constraints(
    component: &Component,
    signs: &SignAssignment,
    lengths: &[u64],
) -> (Vec<DistanceConstraint>, Vec<usize>) {
    let mut constraints = Vec::with_capacity(component.edges.len());
    let mut discarded = Vec::new();
    for (idx, edge) in component.edges.iter().enumerate() {
        match constraint_for(edge, signs, lengths) {
            Some(constraint) => constraints.push(constraint),
            None => discarded.push(idx),
        }
    }
    (constraints, discarded)
}

/// Place every node of `component` given its resolved signs.
///
/// Fails with [`ScaffoldError::UnresolvableComponent`] when a multi-node
/// component keeps no distance evidence at all.
pub fn resolve_positions(
    component: &Component,
    signs: &SignAssignment,
    lengths: &[u64],
    config: &ScaffoldConfig,
) -> Result<PositionAssignment> {
    let n = component.len();
    let (constraints, discarded) = distance_constraints(component, signs, lengths);

    if n > 1 && constraints.is_empty() {
        return Err(ScaffoldError::UnresolvableComponent {
            contigs: component.contigs.clone(),
        });
    }

    let pieces = constraint_pieces(n, &constraints);
    let mut positions = vec![0.0f64; n];
    for piece in &pieces {
        let solved = solve_piece(piece, &constraints, config.solver_tolerance);
        for (&node, value) in piece.iter().zip(solved) {
            positions[node] = value;
        }
    }

    if pieces.len() > 1 {
        warn!(
            "Distance evidence splits component [{}] into {} pieces; placing them end to end",
            component.contigs.join(", "),
            pieces.len()
        );
        place_pieces(&pieces, &mut positions, signs, lengths, config.min_distance);
    }
    if !discarded.is_empty() {
        debug!(
            "Discarded {} of {} edges inconsistent with resolved signs",
            discarded.len(),
            component.edges.len()
        );
    }

    Ok(PositionAssignment {
        positions,
        discarded,
        pieces: pieces.len(),
    })
}

/// Group nodes that are connected through surviving constraints. Pieces are
/// ordered by their smallest node and list nodes in ascending order.
fn constraint_pieces(n: usize, constraints: &[DistanceConstraint]) -> Vec<Vec<usize>> {
    let mut union_find = UnionFind::<usize>::new(n);
    for c in constraints {
        union_find.union(c.a, c.b);
    }
    let mut order: Vec<usize> = Vec::new();
    let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();
    for node in 0..n {
        let root = union_find.find(node);
        let group = groups.entry(root).or_insert_with(|| {
            order.push(root);
            Vec::new()
        });
        group.push(node);
    }
    order
        .into_iter()
        .filter_map(|root| groups.remove(&root))
        .collect()
}

/// Least-squares positions for one piece, its first node pinned at zero.
fn solve_piece(piece: &[usize], constraints: &[DistanceConstraint], tolerance: f64) -> Vec<f64> {
    let m = piece.len();
    if m == 1 {
        return vec![0.0];
    }
    let local: HashMap<usize, usize> = piece.iter().enumerate().map(|(i, &g)| (g, i)).collect();

    // Reduced Laplacian: local node 0 is the anchor and drops out.
    let dim = m - 1;
    let mut laplacian = TriMat::new((dim, dim));
    let mut rhs = vec![0.0f64; dim];
    for c in constraints {
        let (Some(&a), Some(&b)) = (local.get(&c.a), local.get(&c.b)) else {
            continue;
        };
        let reduced = |i: usize| i.checked_sub(1);
        if let Some(ra) = reduced(a) {
            laplacian.add_triplet(ra, ra, 1.0);
            rhs[ra] -= c.offset;
        }
        if let Some(rb) = reduced(b) {
            laplacian.add_triplet(rb, rb, 1.0);
            rhs[rb] += c.offset;
        }
        if let (Some(ra), Some(rb)) = (reduced(a), reduced(b)) {
            laplacian.add_triplet(ra, rb, -1.0);
            laplacian.add_triplet(rb, ra, -1.0);
        }
    }

    let matrix: CsMat<f64> = laplacian.to_csr();
    let max_iterations = 10 * dim + 50;
    let cg = conjugate_gradient(&matrix, &rhs, tolerance, max_iterations);
    if cg.converged {
        debug!(
            "Position solve over {m} nodes converged in {} iterations",
            cg.iterations
        );
    } else {
        warn!(
            "Position solve over {m} nodes stopped after {} iterations at relative residual {:.3e} (tolerance {tolerance:.1e})",
            cg.iterations, cg.relative_residual
        );
    }

    let mut solution = Vec::with_capacity(m);
    solution.push(0.0);
    solution.extend(cg.x);
    solution
}

fn sparse_mul(matrix: &CsMat<f64>, vector: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0f64; matrix.rows()];
    for (row_idx, row_vec) in matrix.outer_iterator().enumerate() {
        out[row_idx] = row_vec
            .iter()
            .map(|(col_idx, &value)| value * vector[col_idx])
            .sum();
    }
    out
}

#[inline]
fn dot(x: &[f64], y: &[f64]) -> f64 {
    x.iter().zip(y).map(|(a, b)| a * b).sum()
}

/// Result of a conjugate gradient solve.
#[derive(Debug, Clone, PartialEq)]
pub struct CgSolution {
    pub x: Vec<f64>,
    pub iterations: usize,
    /// `||r|| / ||b||` at exit.
    pub relative_residual: f64,
    pub converged: bool,
}

/// Jacobi-preconditioned conjugate gradient for a symmetric positive
/// definite CSR matrix.
pub fn conjugate_gradient(
    matrix: &CsMat<f64>,
    rhs: &[f64],
    tolerance: f64,
    max_iterations: usize,
) -> CgSolution {
    let n = rhs.len();
    let mut x = vec![0.0f64; n];
    let rhs_norm = dot(rhs, rhs).sqrt();
    if rhs_norm == 0.0 {
        return CgSolution {
            x,
            iterations: 0,
            relative_residual: 0.0,
            converged: true,
        };
    }

    let mut inv_diag = vec![1.0f64; n];
    for (row_idx, row_vec) in matrix.outer_iterator().enumerate() {
        for (col_idx, &value) in row_vec.iter() {
            if col_idx == row_idx && value > 0.0 {
                inv_diag[row_idx] = 1.0 / value;
            }
        }
    }

    let mut residual = rhs.to_vec();
    let mut z: Vec<f64> = residual.iter().zip(&inv_diag).map(|(r, d)| r * d).collect();
    let mut direction = z.clone();
    let mut rz = dot(&residual, &z);
    let mut relative_residual = 1.0;
    let mut iterations = 0usize;

    while iterations < max_iterations {
        let ap = sparse_mul(matrix, &direction);
        let curvature = dot(&direction, &ap);
        // Step length rz / curvature would blow up: the search has broken down.
        if curvature <= f64::EPSILON * rz.abs() {
            break;
        }
        iterations += 1;
        let alpha = rz / curvature;
        for i in 0..n {
            x[i] += alpha * direction[i];
            residual[i] -= alpha * ap[i];
        }
        relative_residual = dot(&residual, &residual).sqrt() / rhs_norm;
        if relative_residual <= tolerance {
            return CgSolution {
                x,
                iterations,
                relative_residual,
                converged: true,
            };
        }
        for i in 0..n {
            z[i] = residual[i] * inv_diag[i];
        }
        let rz_next = dot(&residual, &z);
        let beta = rz_next / rz;
        for i in 0..n {
            direction[i] = z[i] + beta * direction[i];
        }
        rz = rz_next;
    }
    CgSolution {
        x,
        iterations,
        relative_residual,
        converged: false,
    }
}

/// Shift pieces so they follow one another left to right, `spacing` apart.
fn place_pieces(
    pieces: &[Vec<usize>],
    positions: &mut [f64],
    signs: &SignAssignment,
    lengths: &[u64],
    spacing: i64,
) {
    let extent = |node: usize, positions: &[f64]| {
        let left = positions[node] - lead(signs.sign(node), lengths[node]);
        (left, left + lengths[node] as f64)
    };

    let mut cursor: Option<f64> = None;
    for piece in pieces {
        let (min_left, max_right) = piece.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), &node| {
                let (left, right) = extent(node, positions);
                (lo.min(left), hi.max(right))
            },
        );
        let shift = match cursor {
            Some(end) => end + spacing as f64 - min_left,
            None => 0.0,
        };
        for &node in piece {
            positions[node] += shift;
        }
        cursor = Some(max_right + shift);
    }
}
