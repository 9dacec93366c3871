//! Normalised linear layouts built from resolved signs and positions.

use serde::{Deserialize, Serialize};

use crate::graph::Component;
use crate::links::Strand;
use crate::orientation::SignAssignment;
use crate::position::PositionAssignment;

/// One contig placed on a scaffold, half-open `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub contig: String,
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
}

/// Ordered contigs of one scaffold, left to right with the leftmost start at 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaffoldLayout {
    pub entries: Vec<LayoutEntry>,
}

impl ScaffoldLayout {
    /// Turn per-node signs and positions into a normalised layout.
    pub fn from_resolution(
        component: &Component,
        signs: &SignAssignment,
        positions: &PositionAssignment,
        lengths: &[u64],
    ) -> Self {
        let mut entries: Vec<LayoutEntry> = component
            .contigs
            .iter()
            .enumerate()
            .map(|(node, contig)| {
                let length = lengths[node] as i64;
                let position = positions.positions[node];
                let strand = signs.sign(node);
                let start = match strand {
                    Strand::Forward => position.round() as i64,
                    Strand::Reverse => position.round() as i64 - length,
                };
                LayoutEntry {
                    contig: contig.clone(),
                    start,
                    end: start + length,
                    strand,
                }
            })
            .collect();

        // Midpoints keep the evidence order when a long contig swallows a
        // short neighbour; without overlaps this is the same as start order.
        entries.sort_by(|x, y| {
            (x.start + x.end)
                .cmp(&(y.start + y.end))
                .then_with(|| x.start.cmp(&y.start))
                .then_with(|| x.contig.cmp(&y.contig))
        });
        let mut layout = Self { entries };
        layout.normalise();
        layout
    }

    fn normalise(&mut self) {
        let offset = self.entries.iter().map(|e| e.start).min().unwrap_or(0);
        for entry in self.entries.iter_mut() {
            entry.start -= offset;
            entry.end -= offset;
        }
    }

    /// Push every entry that overlaps its predecessor to `spacing` past the
    /// predecessor's end, keeping entry order. Returns the number of entries
    /// moved; afterwards [`ScaffoldLayout::overlaps`] is empty.
    pub fn separate(&mut self, spacing: i64) -> usize {
        let spacing = spacing.max(0);
        let mut moved = 0usize;
        let mut previous_end: Option<i64> = None;
        for entry in self.entries.iter_mut() {
            if let Some(end) = previous_end {
                if entry.start < end {
                    let shift = end + spacing - entry.start;
                    entry.start += shift;
                    entry.end += shift;
                    moved += 1;
                }
            }
            previous_end = Some(entry.end);
        }
        if moved > 0 {
            self.normalise();
        }
        moved
    }

    /// A one-contig forward layout.
    pub fn singleton(contig: impl Into<String>, length: u64) -> Self {
        Self {
            entries: vec![LayoutEntry {
                contig: contig.into(),
                start: 0,
                end: length as i64,
                strand: Strand::Forward,
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first_contig(&self) -> Option<&str> {
        self.entries.first().map(|e| e.contig.as_str())
    }

    /// Rightmost end coordinate.
    pub fn span(&self) -> i64 {
        self.entries.iter().map(|e| e.end).max().unwrap_or(0)
    }

    /// Pairs of entries whose intervals intersect.
    pub fn overlaps(&self) -> Vec<(usize, usize)> {
        let mut found = Vec::new();
        for (i, x) in self.entries.iter().enumerate() {
            for (j, y) in self.entries.iter().enumerate().skip(i + 1) {
                if y.start < x.end && x.start < y.end {
                    found.push((i, j));
                }
            }
        }
        found
    }

    pub fn order(&self) -> impl Iterator<Item = (&str, Strand)> {
        self.entries.iter().map(|e| (e.contig.as_str(), e.strand))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(names: &[&str]) -> Component {
        Component::new(names.iter().map(|s| s.to_string()).collect(), Vec::new())
    }

    #[test]
    fn normalises_and_sorts_entries() {
        let comp = component(&["A", "B", "C"]);
        let signs = SignAssignment {
            signs: vec![Strand::Forward, Strand::Reverse, Strand::Forward],
            violated: Vec::new(),
        };
        let positions = PositionAssignment {
            positions: vec![0.0, -100.2, 400.0],
            discarded: Vec::new(),
            pieces: 1,
        };
        let layout = ScaffoldLayout::from_resolution(&comp, &signs, &positions, &[300, 200, 50]);

        let starts: Vec<(&str, i64, i64, Strand)> = layout
            .entries
            .iter()
            .map(|e| (e.contig.as_str(), e.start, e.end, e.strand))
            .collect();
        assert_eq!(
            starts,
            vec![
                ("B", 0, 200, Strand::Reverse),
                ("A", 300, 600, Strand::Forward),
                ("C", 700, 750, Strand::Forward),
            ]
        );
        assert_eq!(layout.first_contig(), Some("B"));
        assert_eq!(layout.span(), 750);
        assert!(layout.overlaps().is_empty());
    }

    #[test]
    fn detects_overlapping_entries() {
        let comp = component(&["A", "B"]);
        let signs = SignAssignment {
            signs: vec![Strand::Forward; 2],
            violated: Vec::new(),
        };
        let positions = PositionAssignment {
            positions: vec![0.0, 100.0],
            discarded: Vec::new(),
            pieces: 1,
        };
        let layout = ScaffoldLayout::from_resolution(&comp, &signs, &positions, &[300, 300]);
        assert_eq!(layout.overlaps(), vec![(0, 1)]);
    }

    #[test]
    fn separates_swallowed_neighbours_in_midpoint_order() {
        // Least-squares placement of A(100) B(1000) C(100) from three "++" links
        // of 50: B covers both short contigs.
        let comp = component(&["A", "B", "C"]);
        let signs = SignAssignment {
            signs: vec![Strand::Forward; 3],
            violated: Vec::new(),
        };
        let positions = PositionAssignment {
            positions: vec![0.0, -200.0, 500.0],
            discarded: Vec::new(),
            pieces: 1,
        };
        let mut layout =
            ScaffoldLayout::from_resolution(&comp, &signs, &positions, &[100, 1000, 100]);
        assert_eq!(layout.order().map(|(c, _)| c).collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(layout.overlaps(), vec![(0, 1), (1, 2)]);

        assert_eq!(layout.separate(50), 2);
        assert!(layout.overlaps().is_empty());
        let spans: Vec<(&str, i64, i64)> = layout
            .entries
            .iter()
            .map(|e| (e.contig.as_str(), e.start, e.end))
            .collect();
        assert_eq!(
            spans,
            vec![("A", 0, 100), ("B", 150, 1150), ("C", 1200, 1300)]
        );
    }

    #[test]
    fn separate_leaves_clean_layout_alone() {
        let comp = component(&["A", "B"]);
        let signs = SignAssignment {
            signs: vec![Strand::Forward; 2],
            violated: Vec::new(),
        };
        let positions = PositionAssignment {
            positions: vec![0.0, 320.0],
            discarded: Vec::new(),
            pieces: 1,
        };
        let mut layout = ScaffoldLayout::from_resolution(&comp, &signs, &positions, &[300, 300]);
        let before = layout.clone();
        assert_eq!(layout.separate(50), 0);
        assert_eq!(layout, before);
    }

    #[test]
    fn singleton_layout_is_forward() {
        let layout = ScaffoldLayout::singleton("ctg", 42);
        assert_eq!(layout.len(), 1);
        assert_eq!(layout.entries[0].strand, Strand::Forward);
        assert_eq!(layout.span(), 42);
    }
}
