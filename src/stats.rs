//! Run statistics reported after emission.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::agp::AgpRow;
use crate::bucket::Bucket;
use crate::resolver::ComponentOutcome;

/// N50 of `lengths`: the largest length L such that items of length >= L
/// cover at least half the total.
pub fn n50(lengths: &[u64]) -> u64 {
    let mut sorted = lengths.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    let total: u64 = sorted.iter().sum();
    let mut running = 0u64;
    for length in sorted {
        running += length;
        if running * 2 >= total {
            return length;
        }
    }
    0
}

/// Per-object lengths from an AGP row stream.
pub fn object_lengths(rows: &[AgpRow]) -> BTreeMap<String, u64> {
    let mut lengths = BTreeMap::new();
    for row in rows {
        let end = lengths.entry(row.object().to_string()).or_insert(0u64);
        *end = (*end).max(row.object_end());
    }
    lengths
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub buckets: usize,
    pub scaffolds: usize,
    pub singletons: usize,
    pub demoted_components: usize,
    pub sign_conflicts: usize,
    pub discarded_edges: usize,
    /// Contig pairs that overlapped after solving and were moved apart.
    pub overlaps: usize,
    pub total_length: u64,
    pub n50: u64,
}

impl RunSummary {
    pub fn collect(outcomes: &[ComponentOutcome], buckets: &[Bucket], rows: &[AgpRow]) -> Self {
        let mut summary = RunSummary {
            buckets: buckets.len(),
            scaffolds: buckets.iter().map(|b| b.scaffolds.len()).sum(),
            singletons: buckets.iter().map(|b| b.singletons.len()).sum(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                ComponentOutcome::Resolved(resolved) => {
                    summary.sign_conflicts += resolved.signs.violated.len();
                    summary.discarded_edges += resolved.positions.discarded.len();
                    summary.overlaps += resolved.overlaps.len();
                }
                ComponentOutcome::Demoted { .. } => summary.demoted_components += 1,
            }
        }
        let lengths: Vec<u64> = object_lengths(rows).into_values().collect();
        summary.total_length = lengths.iter().sum();
        summary.n50 = n50(&lengths);
        summary
    }
}
