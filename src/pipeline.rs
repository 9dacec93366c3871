//! End-to-end driver: links and sizes in, buckets, AGP rows and reports out.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use serde_json::json;

use crate::agp::{build_agp, write_agp, AgpRow};
use crate::bucket::{assemble_buckets, Bucket};
use crate::config::ScaffoldConfig;
use crate::error::Result;
use crate::graph::LinkGraph;
use crate::links::LinkRecord;
use crate::resolver::{resolve_components, ComponentOutcome};
use crate::sizes::ContigSizes;
use crate::stats::RunSummary;

/// Everything produced by one scaffolding run.
#[derive(Debug)]
pub struct ScaffoldRun {
    pub outcomes: Vec<ComponentOutcome>,
    pub buckets: Vec<Bucket>,
    pub agp: Vec<AgpRow>,
    pub summary: RunSummary,
}

/// Resolve every component of the link graph and emit bucket AGP rows.
///
/// Components are resolved independently; one that has no usable distance
/// evidence is demoted to singletons without affecting the others.
pub fn scaffold(
    records: &[LinkRecord],
    sizes: &ContigSizes,
    config: &ScaffoldConfig,
) -> Result<ScaffoldRun> {
    let graph = LinkGraph::from_records(records, config.min_distance);
    graph.check_sizes(sizes)?;

    let components = graph.components();
    info!(
        "Resolving {} components over {} linked contigs ({} edges)",
        components.len(),
        graph.node_count(),
        graph.edge_count()
    );
    let outcomes = resolve_components(components, sizes, config)?;

    let layouts = outcomes
        .iter()
        .filter_map(|outcome| outcome.layout().cloned())
        .collect();
    let buckets = assemble_buckets(layouts, sizes, &config.bucket_naming);

    let mut agp = Vec::new();
    for bucket in &buckets {
        build_agp(
            &bucket.name,
            &bucket.ordered_contigs(),
            sizes,
            config.gap_length,
            &mut agp,
        )?;
    }

    let summary = RunSummary::collect(&outcomes, &buckets, &agp);
    info!(
        "Emitted {} buckets: {} scaffolds, {} singletons, {} demoted components, {} overlaps separated, total {} bp, N50 {}",
        summary.buckets,
        summary.scaffolds,
        summary.singletons,
        summary.demoted_components,
        summary.overlaps,
        summary.total_length,
        summary.n50
    );

    Ok(ScaffoldRun {
        outcomes,
        buckets,
        agp,
        summary,
    })
}

/// Write `bucket<TAB>phase`, one row per bucket.
pub fn write_phases<W: Write>(buckets: &[Bucket], writer: &mut W) -> Result<()> {
    for bucket in buckets {
        writeln!(writer, "{}\t{}", bucket.name, bucket.phase)?;
    }
    Ok(())
}

/// Write the per-component diagnostic log.
pub fn write_diagnostics<W: Write>(outcomes: &[ComponentOutcome], writer: &mut W) -> Result<()> {
    for (idx, outcome) in outcomes.iter().enumerate() {
        let component = outcome.component();
        writeln!(
            writer,
            "# component {} ({} contigs): {}",
            idx + 1,
            component.len(),
            component.contigs.join(", ")
        )?;
        match outcome {
            ComponentOutcome::Resolved(resolved) => {
                writeln!(writer, "signs\t{:?}", resolved.signs.values())?;
                writeln!(writer, "positions\t{:?}", resolved.positions.positions)?;
                for &edge_idx in &resolved.positions.discarded {
                    let edge = &component.edges[edge_idx];
                    writeln!(
                        writer,
                        "discarded\t{}\t{}\t{}\t{}",
                        component.contigs[edge.a],
                        component.contigs[edge.b],
                        edge.orientation,
                        edge.distance
                    )?;
                }
                for (x, y) in &resolved.overlaps {
                    writeln!(writer, "overlap\t{x}\t{y}")?;
                }
                for entry in &resolved.layout.entries {
                    writeln!(
                        writer,
                        "{}\t{}\t{}\t{}",
                        entry.contig, entry.start, entry.end, entry.strand
                    )?;
                }
            }
            ComponentOutcome::Demoted { signs, reason, .. } => {
                writeln!(writer, "signs\t{:?}", signs.values())?;
                writeln!(writer, "demoted\t{reason}")?;
            }
        }
    }
    Ok(())
}

/// Write buckets, layouts and the run summary as pretty JSON.
pub fn write_summary_json<W: Write>(
    run: &ScaffoldRun,
    sizes: &ContigSizes,
    writer: &mut W,
) -> Result<()> {
    let buckets = run
        .buckets
        .iter()
        .map(|bucket| {
            let layouts = bucket.layouts(sizes)?;
            Ok(json!({
                "name": bucket.name,
                "phase": bucket.phase.value(),
                "layouts": layouts,
                "singletons": bucket.singletons,
            }))
        })
        .collect::<Result<Vec<_>>>()?;
    let output = json!({
        "summary": run.summary,
        "buckets": buckets,
    });
    writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}

/// Destination files for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub agp: PathBuf,
    pub phases: PathBuf,
    pub log: PathBuf,
    pub json: Option<PathBuf>,
}

impl OutputPaths {
    /// `<prefix>.agp` and `<prefix>.phases`, log next to them as `scaffold.log`.
    pub fn from_prefix<P: AsRef<Path>>(prefix: P) -> Self {
        let prefix = prefix.as_ref();
        let with_suffix = |suffix: &str| {
            let mut name = prefix.as_os_str().to_os_string();
            name.push(suffix);
            PathBuf::from(name)
        };
        let log = prefix
            .parent()
            .map(|parent| parent.join("scaffold.log"))
            .unwrap_or_else(|| PathBuf::from("scaffold.log"));
        Self {
            agp: with_suffix(".agp"),
            phases: with_suffix(".phases"),
            log,
            json: None,
        }
    }
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(BufWriter::new(File::create(path)?))
}

/// Write AGP, phase table, diagnostic log and optional JSON for `run`.
pub fn write_outputs(run: &ScaffoldRun, sizes: &ContigSizes, paths: &OutputPaths) -> Result<()> {
    let mut agp = create(&paths.agp)?;
    write_agp(&run.agp, &mut agp)?;
    agp.flush()?;
    info!("AGP written to {}", paths.agp.display());

    let mut phases = create(&paths.phases)?;
    write_phases(&run.buckets, &mut phases)?;
    phases.flush()?;
    info!("Phases written to {}", paths.phases.display());

    let mut log = create(&paths.log)?;
    write_diagnostics(&run.outcomes, &mut log)?;
    log.flush()?;

    if let Some(json_path) = &paths.json {
        let mut json = create(json_path)?;
        write_summary_json(run, sizes, &mut json)?;
        json.flush()?;
        info!("Summary written to {}", json_path.display());
    }
    Ok(())
}
