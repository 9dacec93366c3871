//! Grouping of scaffolds and leftover contigs into named buckets.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScaffoldError};
use crate::layout::ScaffoldLayout;
use crate::links::Strand;
use crate::sizes::ContigSizes;

/// Bucket name used when contigs are not grouped by prefix.
pub const DEFAULT_BUCKET: &str = "chr0";

/// Policy mapping a contig identifier to its bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketNaming {
    /// Every contig lands in the same named bucket.
    Fixed(String),
    /// Drop the trailing `_token` (`chr1_ctg7` -> `chr1`); ids without an
    /// underscore are their own bucket.
    StripSuffix,
}

impl Default for BucketNaming {
    fn default() -> Self {
        Self::Fixed(DEFAULT_BUCKET.to_string())
    }
}

impl BucketNaming {
    pub fn bucket_for(&self, contig: &str) -> String {
        match self {
            Self::Fixed(name) => name.clone(),
            Self::StripSuffix => contig
                .rsplit_once('_')
                .map(|(prefix, _)| prefix)
                .unwrap_or(contig)
                .to_string(),
        }
    }
}

/// Completeness of a bucket once scaffolds and singletons are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// A mixture of scaffolds and/or singletons.
    Partial = 1,
    /// Exactly one scaffold and nothing left over.
    Merged = 2,
    /// Exactly one contig that never needed scaffolding.
    Single = 3,
}

impl Phase {
    pub fn classify(scaffolds: usize, singletons: usize) -> Self {
        match (scaffolds, singletons) {
            (0, 1) => Self::Single,
            (1, 0) => Self::Merged,
            _ => Self::Partial,
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// A named group of scaffolds plus the contigs none of them covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    pub scaffolds: Vec<ScaffoldLayout>,
    pub singletons: Vec<String>,
    pub phase: Phase,
}

impl Bucket {
    /// Scaffold contigs in layout order, then singletons forward.
    pub fn ordered_contigs(&self) -> Vec<(&str, Strand)> {
        self.scaffolds
            .iter()
            .flat_map(|scaffold| scaffold.order())
            .chain(self.singletons.iter().map(|s| (s.as_str(), Strand::Forward)))
            .collect()
    }

    /// Scaffolds followed by one-element layouts for the singletons.
    pub fn layouts(&self, sizes: &ContigSizes) -> Result<Vec<ScaffoldLayout>> {
        let mut layouts = self.scaffolds.clone();
        for id in &self.singletons {
            let length = sizes
                .get(id)
                .ok_or_else(|| ScaffoldError::UnknownContig(id.clone()))?;
            layouts.push(ScaffoldLayout::singleton(id.as_str(), length));
        }
        Ok(layouts)
    }

    pub fn contig_count(&self) -> usize {
        self.scaffolds.iter().map(|s| s.len()).sum::<usize>() + self.singletons.len()
    }
}

/// Distribute resolved scaffolds and the remaining contigs into buckets.
///
/// A scaffold joins the bucket of its first contig. Every id in `sizes` ends
/// up in exactly one bucket; buckets come back sorted by name.
pub fn assemble_buckets(
    scaffolds: Vec<ScaffoldLayout>,
    sizes: &ContigSizes,
    naming: &BucketNaming,
) -> Vec<Bucket> {
    let mut scaffold_buckets: BTreeMap<String, Vec<ScaffoldLayout>> = BTreeMap::new();
    let mut scaffolded: HashSet<String> = HashSet::new();
    for scaffold in scaffolds {
        let Some(first) = scaffold.first_contig() else {
            continue;
        };
        let name = naming.bucket_for(first);
        scaffolded.extend(scaffold.entries.iter().map(|e| e.contig.clone()));
        scaffold_buckets.entry(name).or_default().push(scaffold);
    }

    let mut members: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for id in sizes.ids() {
        members.entry(naming.bucket_for(id)).or_default().push(id.to_string());
    }
    for name in scaffold_buckets.keys() {
        members.entry(name.clone()).or_default();
    }

    members
        .into_iter()
        .map(|(name, ids)| {
            let scaffolds = scaffold_buckets.remove(&name).unwrap_or_default();
            let mut singletons: Vec<String> = ids
                .into_iter()
                .filter(|id| !scaffolded.contains(id))
                .collect();
            singletons.sort();
            let phase = Phase::classify(scaffolds.len(), singletons.len());
            info!(
                "{}: Scaffolds={} Singletons={} Phase={}",
                name,
                scaffolds.len(),
                singletons.len(),
                phase
            );
            debug!("{name}: singletons [{}]", singletons.join(", "));
            Bucket {
                name,
                scaffolds,
                singletons,
                phase,
            }
        })
        .collect()
}
