//! Link evidence records and their text format.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScaffoldError};

/// Relative strand of a contig; doubles as the sign assigned by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
}

impl Strand {
    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }

    /// +1 for forward, -1 for reverse.
    #[inline]
    pub fn value(self) -> i8 {
        match self {
            Self::Forward => 1,
            Self::Reverse => -1,
        }
    }

    #[inline]
    pub fn symbol(self) -> char {
        match self {
            Self::Forward => '+',
            Self::Reverse => '-',
        }
    }

    fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '+' => Some(Self::Forward),
            '-' => Some(Self::Reverse),
            _ => None,
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Two-strand orientation code read as "first contig in strand `first`,
/// followed by the second contig in strand `second`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Orientation {
    pub first: Strand,
    pub second: Strand,
}

impl Orientation {
    pub const fn new(first: Strand, second: Strand) -> Self {
        Self { first, second }
    }

    /// Parse one of `++`, `+-`, `-+`, `--`.
    pub fn parse(code: &str) -> Option<Self> {
        let mut chars = code.chars();
        let first = Strand::from_symbol(chars.next()?)?;
        let second = Strand::from_symbol(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Self::new(first, second))
    }

    /// Whether the evidence asks both contigs to carry the same sign.
    #[inline]
    pub fn is_same(self) -> bool {
        self.first == self.second
    }

    /// The same arrangement read on the opposite strand, pair order kept.
    #[inline]
    pub fn flipped(self) -> Self {
        Self::new(self.first.flip(), self.second.flip())
    }

    /// The same arrangement described from the second contig's point of view.
    #[inline]
    pub fn swapped(self) -> Self {
        Self::new(self.second.flip(), self.first.flip())
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.first, self.second)
    }
}

/// One piece of pairwise linkage evidence, as read from the links file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub contig_a: String,
    pub contig_b: String,
    pub orientation: Orientation,
    /// Estimated gap between the facing contig ends (not yet floored).
    pub distance: i64,
}

impl LinkRecord {
    pub fn new(
        contig_a: impl Into<String>,
        contig_b: impl Into<String>,
        orientation: Orientation,
        distance: i64,
    ) -> Self {
        Self {
            contig_a: contig_a.into(),
            contig_b: contig_b.into(),
            orientation,
            distance,
        }
    }

    /// Parse `contigA contigB orientation distance [ignored...]`.
    pub fn parse_line(line: &str, line_number: usize) -> Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(ScaffoldError::malformed_link(
                line_number,
                format!("expected at least 4 fields, found {}", fields.len()),
            ));
        }
        let orientation = Orientation::parse(fields[2]).ok_or_else(|| {
            ScaffoldError::malformed_link(
                line_number,
                format!("unknown orientation code `{}`", fields[2]),
            )
        })?;
        let distance = parse_distance(fields[3]).ok_or_else(|| {
            ScaffoldError::malformed_link(line_number, format!("invalid distance `{}`", fields[3]))
        })?;
        if fields[0] == fields[1] {
            return Err(ScaffoldError::malformed_link(
                line_number,
                format!("contig {} is linked to itself", fields[0]),
            ));
        }
        Ok(Self::new(fields[0], fields[1], orientation, distance))
    }
}

// Distance estimates are sometimes written as decimals.
fn parse_distance(field: &str) -> Option<i64> {
    if let Ok(value) = field.parse::<i64>() {
        return Some(value);
    }
    field
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| value.round() as i64)
}

/// Read link records from a buffered reader.
///
/// Blank lines and `#` comments are ignored. With `skip_malformed` unset the
/// first bad record aborts the read; otherwise bad records are logged and
/// dropped.
pub fn read_links<R: BufRead>(reader: R, skip_malformed: bool) -> Result<Vec<LinkRecord>> {
    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match LinkRecord::parse_line(trimmed, idx + 1) {
            Ok(record) => records.push(record),
            Err(error) if skip_malformed => {
                warn!("Skipping link record: {error}");
                skipped += 1;
            }
            Err(error) => return Err(error),
        }
    }
    if skipped > 0 {
        warn!("Skipped {skipped} malformed link records");
    }
    Ok(records)
}

/// Open and parse a links file.
pub fn load_links<P: AsRef<Path>>(path: P, skip_malformed: bool) -> Result<Vec<LinkRecord>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let records = read_links(BufReader::new(file), skip_malformed)?;
    info!("Read {} link records from {}", records.len(), path.display());
    Ok(records)
}
