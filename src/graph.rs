//! Link multigraph construction and component partitioning.

use std::collections::HashMap;

use log::{debug, warn};
use petgraph::unionfind::UnionFind;

use crate::error::{Result, ScaffoldError};
use crate::links::{LinkRecord, Orientation};
use crate::sizes::ContigSizes;

/// An edge of the link multigraph, endpoints given as node indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkEdge {
    pub a: usize,
    pub b: usize,
    /// Orientation of `a` followed by `b`.
    pub orientation: Orientation,
    /// Gap estimate after the distance floor was applied.
    pub distance: i64,
}

impl LinkEdge {
    /// Endpoint opposite to `node`.
    #[inline]
    pub fn other(&self, node: usize) -> usize {
        if self.a == node {
            self.b
        } else {
            self.a
        }
    }
}

/// Multigraph over interned contig identifiers. Every edge is retained,
/// including repeated and contradictory evidence for the same pair.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    names: Vec<String>,
    index: HashMap<String, usize>,
    edges: Vec<LinkEdge>,
}

impl LinkGraph {
    /// Build the graph, flooring each distance at `min_distance`.
    pub fn from_records(records: &[LinkRecord], min_distance: i64) -> Self {
        let mut graph = LinkGraph::default();
        for record in records {
            if record.contig_a == record.contig_b {
                warn!("Ignoring self link on {}", record.contig_a);
                continue;
            }
            let a = graph.intern(&record.contig_a);
            let b = graph.intern(&record.contig_b);
            graph.edges.push(LinkEdge {
                a,
                b,
                orientation: record.orientation,
                distance: record.distance.max(min_distance),
            });
        }
        debug!(
            "Link graph built with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }

    fn intern(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }

    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn name(&self, idx: usize) -> &str {
        &self.names[idx]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn edges(&self) -> &[LinkEdge] {
        &self.edges
    }

    /// Fail on the first linked contig that the size table does not know.
    pub fn check_sizes(&self, sizes: &ContigSizes) -> Result<()> {
        match self.names.iter().find(|name| sizes.get(name).is_none()) {
            Some(name) => Err(ScaffoldError::UnknownContig(name.clone())),
            None => Ok(()),
        }
    }

    /// Split the graph into connected components.
    ///
    /// Components are ordered by their smallest contig identifier. Within a
    /// component nodes are sorted by identifier and edges are canonicalised so
    /// that `a < b`, keeping input order among edges of the same pair.
    pub fn components(&self) -> Vec<Component> {
        let n = self.node_count();
        let mut union_find = UnionFind::<usize>::new(n);
        for edge in &self.edges {
            union_find.union(edge.a, edge.b);
        }
        let labels = union_find.into_labeling();

        let mut members: HashMap<usize, Vec<usize>> = HashMap::new();
        for (node, &label) in labels.iter().enumerate() {
            members.entry(label).or_default().push(node);
        }
        let mut edges_by_label: HashMap<usize, Vec<&LinkEdge>> = HashMap::new();
        for edge in &self.edges {
            edges_by_label.entry(labels[edge.a]).or_default().push(edge);
        }

        let mut components: Vec<Component> = members
            .into_iter()
            .map(|(label, mut nodes)| {
                nodes.sort_by(|&x, &y| self.names[x].cmp(&self.names[y]));
                let local: HashMap<usize, usize> = nodes
                    .iter()
                    .enumerate()
                    .map(|(local_idx, &global)| (global, local_idx))
                    .collect();
                let contigs = nodes.iter().map(|&g| self.names[g].clone()).collect();
                let edges = edges_by_label
                    .remove(&label)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|edge| canonical_edge(local[&edge.a], local[&edge.b], edge))
                    .collect();
                Component::new(contigs, edges)
            })
            .collect();
        components.sort_by(|x, y| x.contigs.first().cmp(&y.contigs.first()));
        components
    }
}

fn canonical_edge(a: usize, b: usize, edge: &LinkEdge) -> LinkEdge {
    if a <= b {
        LinkEdge {
            a,
            b,
            orientation: edge.orientation,
            distance: edge.distance,
        }
    } else {
        LinkEdge {
            a: b,
            b: a,
            orientation: edge.orientation.swapped(),
            distance: edge.distance,
        }
    }
}

/// A connected piece of the link graph, resolved independently of all others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Contig identifiers, sorted; positions in this vector are node indices.
    pub contigs: Vec<String>,
    /// Canonical edges (`a < b`) sorted by `(a, b)`.
    pub edges: Vec<LinkEdge>,
}

impl Component {
    /// Build a component from local nodes and edges, sorting edges into
    /// canonical order. Edge endpoints must already satisfy `a < b`.
    pub fn new(contigs: Vec<String>, mut edges: Vec<LinkEdge>) -> Self {
        edges.sort_by_key(|edge| (edge.a, edge.b));
        Self { contigs, edges }
    }

    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }

    /// Edge indices incident to each node, in canonical edge order.
    pub fn incidence(&self) -> Vec<Vec<usize>> {
        let mut incident = vec![Vec::new(); self.len()];
        for (idx, edge) in self.edges.iter().enumerate() {
            incident[edge.a].push(idx);
            incident[edge.b].push(idx);
        }
        incident
    }

    /// Contig lengths in node order.
    pub fn lengths(&self, sizes: &ContigSizes) -> Result<Vec<u64>> {
        self.contigs
            .iter()
            .map(|name| {
                sizes
                    .get(name)
                    .ok_or_else(|| ScaffoldError::UnknownContig(name.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(a: &str, b: &str, code: &str, distance: i64) -> LinkRecord {
        LinkRecord::new(a, b, Orientation::parse(code).unwrap(), distance)
    }

    #[test]
    fn floors_distances_and_keeps_duplicates() {
        let records = vec![
            record("A", "B", "++", 10),
            record("A", "B", "++", 400),
            record("B", "A", "+-", -30),
        ];
        let graph = LinkGraph::from_records(&records, 50);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 3);
        let distances: Vec<i64> = graph.edges().iter().map(|e| e.distance).collect();
        assert_eq!(distances, vec![50, 400, 50]);
    }

    #[test]
    fn partitions_into_sorted_components() {
        let records = vec![
            record("z1", "z2", "++", 100),
            record("c", "a", "+-", 100),
            record("b", "c", "--", 100),
        ];
        let graph = LinkGraph::from_records(&records, 50);
        let components = graph.components();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].contigs, vec!["a", "b", "c"]);
        assert_eq!(components[1].contigs, vec!["z1", "z2"]);

        let first = &components[0];
        assert_eq!(first.edges.len(), 2);
        assert!(first.edges.iter().all(|e| e.a < e.b));
        // (c, a, +-) becomes (a, c) read from a's side.
        assert_eq!((first.edges[0].a, first.edges[0].b), (0, 2));
        assert_eq!(first.edges[0].orientation.to_string(), "+-");
        // (b, c, --) is already canonical.
        assert_eq!((first.edges[1].a, first.edges[1].b), (1, 2));
    }

    #[test]
    fn canonicalisation_rewrites_orientation() {
        let graph = LinkGraph::from_records(&[record("B", "A", "++", 200)], 50);
        let components = graph.components();
        let edge = components[0].edges[0];
        assert_eq!((edge.a, edge.b), (0, 1));
        assert_eq!(edge.orientation.to_string(), "--");
    }

    #[test]
    fn incidence_lists_follow_edge_order() {
        let records = vec![
            record("a", "b", "++", 100),
            record("b", "c", "++", 100),
            record("a", "b", "+-", 100),
        ];
        let component = LinkGraph::from_records(&records, 50).components().remove(0);
        let incidence = component.incidence();
        assert_eq!(incidence[0], vec![0, 1]);
        assert_eq!(incidence[1], vec![0, 1, 2]);
        assert_eq!(incidence[2], vec![2]);
    }

    #[test]
    fn reports_unknown_contigs() {
        let graph = LinkGraph::from_records(&[record("a", "b", "++", 100)], 50);
        let mut sizes = ContigSizes::new();
        sizes.insert("a", 100);
        assert!(matches!(
            graph.check_sizes(&sizes),
            Err(ScaffoldError::UnknownContig(name)) if name == "b"
        ));
        sizes.insert("b", 100);
        assert!(graph.check_sizes(&sizes).is_ok());
    }
}
