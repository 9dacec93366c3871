//! Contig size tables, loaded from `.sizes` text or measured from FASTA.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use bio::io::fasta;
use flate2::read::MultiGzDecoder;
use log::info;

use crate::error::{Result, ScaffoldError};

/// Mapping from contig identifier to length in bases, iterated in id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContigSizes {
    sizes: BTreeMap<String, u64>,
}

impl ContigSizes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, length: u64) {
        self.sizes.insert(id.into(), length);
    }

    pub fn get(&self, id: &str) -> Option<u64> {
        self.sizes.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Contig identifiers in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sizes.keys().map(String::as_str)
    }

    pub fn total_length(&self) -> u64 {
        self.sizes.values().sum()
    }

    /// Parse a two-column `id length` table.
    pub fn from_table<R: BufRead>(reader: R) -> Result<Self> {
        let mut sizes = Self::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let mut fields = trimmed.split_whitespace();
            let (Some(id), Some(length)) = (fields.next(), fields.next()) else {
                return Err(ScaffoldError::malformed_sizes(
                    idx + 1,
                    "expected `id length`",
                ));
            };
            let length = length.parse::<u64>().map_err(|_| {
                ScaffoldError::malformed_sizes(idx + 1, format!("invalid length `{length}`"))
            })?;
            sizes.insert(id, length);
        }
        Ok(sizes)
    }

    /// Measure record lengths from FASTA input.
    pub fn from_fasta<R: BufRead>(reader: R) -> Result<Self> {
        let mut sizes = Self::new();
        for record in fasta::Reader::from_bufread(reader).records() {
            let record = record?;
            sizes.insert(record.id(), record.seq().len() as u64);
        }
        Ok(sizes)
    }

    /// Load sizes from `path`, picking the parser from the file extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = open_reader(path)?;
        let sizes = if is_fasta(path) {
            Self::from_fasta(reader)?
        } else {
            Self::from_table(reader)?
        };
        info!(
            "Loaded {} contig sizes ({} bp) from {}",
            sizes.len(),
            sizes.total_length(),
            path.display()
        );
        Ok(sizes)
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for ContigSizes {
    fn from_iter<T: IntoIterator<Item = (S, u64)>>(iter: T) -> Self {
        Self {
            sizes: iter.into_iter().map(|(id, len)| (id.into(), len)).collect(),
        }
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz") || ext.eq_ignore_ascii_case("bgz"))
        .unwrap_or(false)
}

fn is_fasta(path: &Path) -> bool {
    let mut ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();

    if is_gzip(path) {
        ext = path
            .file_stem()
            .map(Path::new)
            .and_then(|stem| stem.extension())
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_default();
    }

    matches!(ext.as_str(), "fasta" | "fa" | "fna" | "fas")
}

fn open_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if is_gzip(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}
