#![doc = include_str!("../README.md")]

pub mod agp;
pub mod bucket;
pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod links;
pub mod orientation;
pub mod pipeline;
pub mod position;
pub mod resolver;
pub mod sizes;
pub mod stats;

pub use agp::{build_agp, write_agp, AgpRow};
pub use bucket::{assemble_buckets, Bucket, BucketNaming, Phase, DEFAULT_BUCKET};
pub use config::{ScaffoldConfig, DEFAULT_GAP_LENGTH, DEFAULT_MIN_DISTANCE};
pub use error::{Result, ScaffoldError};
pub use graph::{Component, LinkEdge, LinkGraph};
pub use layout::{LayoutEntry, ScaffoldLayout};
pub use links::{load_links, read_links, LinkRecord, Orientation, Strand};
pub use orientation::{resolve_signs, SignAssignment};
pub use pipeline::{scaffold, write_outputs, OutputPaths, ScaffoldRun};
pub use position::{
    conjugate_gradient, resolve_positions, CgSolution, DistanceConstraint, PositionAssignment,
};
pub use resolver::{resolve_component, resolve_components, ComponentOutcome, ResolvedComponent};
pub use sizes::ContigSizes;
pub use stats::{n50, RunSummary};
