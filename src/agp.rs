//! AGP rows describing how contigs and gaps tile each bucket object.

use std::fmt;
use std::io::{self, Write};

use crate::error::{Result, ScaffoldError};
use crate::links::Strand;
use crate::sizes::ContigSizes;

/// One AGP line; coordinates are 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgpRow {
    Gap {
        object: String,
        object_beg: u64,
        object_end: u64,
        part_number: u32,
        gap_length: u64,
    },
    Component {
        object: String,
        object_beg: u64,
        object_end: u64,
        part_number: u32,
        component_id: String,
        component_end: u64,
        strand: Strand,
    },
}

impl AgpRow {
    pub fn object(&self) -> &str {
        match self {
            Self::Gap { object, .. } | Self::Component { object, .. } => object,
        }
    }

    pub fn object_end(&self) -> u64 {
        match self {
            Self::Gap { object_end, .. } | Self::Component { object_end, .. } => *object_end,
        }
    }

    /// Number of object bases covered by this row.
    pub fn span(&self) -> u64 {
        match self {
            Self::Gap {
                object_beg,
                object_end,
                ..
            }
            | Self::Component {
                object_beg,
                object_end,
                ..
            } => object_end + 1 - object_beg,
        }
    }

    pub fn is_gap(&self) -> bool {
        matches!(self, Self::Gap { .. })
    }
}

impl fmt::Display for AgpRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gap {
                object,
                object_beg,
                object_end,
                part_number,
                gap_length,
            } => write!(
                f,
                "{object}\t{object_beg}\t{object_end}\t{part_number}\tU\t{gap_length}\tfragment\tyes\tpaired-ends"
            ),
            Self::Component {
                object,
                object_beg,
                object_end,
                part_number,
                component_id,
                component_end,
                strand,
            } => write!(
                f,
                "{object}\t{object_beg}\t{object_end}\t{part_number}\tW\t{component_id}\t1\t{component_end}\t{strand}"
            ),
        }
    }
}

/// Lay out `order` as one AGP object, a gap of `gap_length` between
/// consecutive contigs. Rows are appended to `rows`.
pub fn build_agp(
    object: &str,
    order: &[(&str, Strand)],
    sizes: &ContigSizes,
    gap_length: u64,
    rows: &mut Vec<AgpRow>,
) -> Result<()> {
    let mut object_beg = 1u64;
    let mut part_number = 1u32;
    for (i, &(component_id, strand)) in order.iter().enumerate() {
        if i > 0 && gap_length > 0 {
            let object_end = object_beg + gap_length - 1;
            rows.push(AgpRow::Gap {
                object: object.to_string(),
                object_beg,
                object_end,
                part_number,
                gap_length,
            });
            object_beg = object_end + 1;
            part_number += 1;
        }

        let size = sizes
            .get(component_id)
            .ok_or_else(|| ScaffoldError::UnknownContig(component_id.to_string()))?;
        let object_end = object_beg + size - 1;
        rows.push(AgpRow::Component {
            object: object.to_string(),
            object_beg,
            object_end,
            part_number,
            component_id: component_id.to_string(),
            component_end: size,
            strand,
        });
        object_beg = object_end + 1;
        part_number += 1;
    }
    Ok(())
}

pub fn write_agp<W: Write>(rows: &[AgpRow], writer: &mut W) -> io::Result<()> {
    for row in rows {
        writeln!(writer, "{row}")?;
    }
    Ok(())
}
