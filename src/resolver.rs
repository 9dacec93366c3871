//! Per-component resolution: signs, then positions, then a normalised layout.

use log::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::ScaffoldConfig;
use crate::error::{Result, ScaffoldError};
use crate::graph::Component;
use crate::layout::ScaffoldLayout;
use crate::orientation::{resolve_signs, SignAssignment};
use crate::position::{resolve_positions, PositionAssignment};
use crate::sizes::ContigSizes;

/// Everything computed for one component that resolved to a linear layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedComponent {
    pub component: Component,
    pub signs: SignAssignment,
    pub positions: PositionAssignment,
    pub layout: ScaffoldLayout,
    /// Contig pairs whose solved intervals overlapped before the layout was
    /// separated.
    pub overlaps: Vec<(String, String)>,
}

/// Result of resolving one component.
#[derive(Debug)]
pub enum ComponentOutcome {
    Resolved(ResolvedComponent),
    /// The component had no usable distance evidence; its contigs fall back to
    /// singletons.
    Demoted {
        component: Component,
        signs: SignAssignment,
        reason: ScaffoldError,
    },
}

impl ComponentOutcome {
    pub fn component(&self) -> &Component {
        match self {
            Self::Resolved(resolved) => &resolved.component,
            Self::Demoted { component, .. } => component,
        }
    }

    pub fn layout(&self) -> Option<&ScaffoldLayout> {
        match self {
            Self::Resolved(resolved) => Some(&resolved.layout),
            Self::Demoted { .. } => None,
        }
    }
}

/// Resolve one component. This is a pure function of its inputs.
///
/// A component without usable distance evidence comes back as
/// [`ScaffoldError::UnresolvableComponent`].
pub fn resolve_component(
    component: Component,
    sizes: &ContigSizes,
    config: &ScaffoldConfig,
) -> Result<ResolvedComponent> {
    match resolve_outcome(component, sizes, config)? {
        ComponentOutcome::Resolved(resolved) => Ok(resolved),
        ComponentOutcome::Demoted { reason, .. } => Err(reason),
    }
}

fn resolve_outcome(
    component: Component,
    sizes: &ContigSizes,
    config: &ScaffoldConfig,
) -> Result<ComponentOutcome> {
    let lengths = component.lengths(sizes)?;
    let signs = resolve_signs(&component, config);
    let positions = resolve_positions(&component, &signs, &lengths, config);
    settle(component, signs, positions, &lengths, config.min_distance)
}

// Unresolvable components are demoted; any other failure propagates.
fn settle(
    component: Component,
    signs: SignAssignment,
    positions: Result<PositionAssignment>,
    lengths: &[u64],
    spacing: i64,
) -> Result<ComponentOutcome> {
    match positions {
        Ok(positions) => {
            let mut layout =
                ScaffoldLayout::from_resolution(&component, &signs, &positions, lengths);
            let overlaps: Vec<(String, String)> = layout
                .overlaps()
                .into_iter()
                .map(|(i, j)| {
                    (
                        layout.entries[i].contig.clone(),
                        layout.entries[j].contig.clone(),
                    )
                })
                .collect();
            if !overlaps.is_empty() {
                let moved = layout.separate(spacing);
                warn!(
                    "Component [{}] placed {} overlapping contig pairs; moved {} contigs apart",
                    component.contigs.join(", "),
                    overlaps.len(),
                    moved
                );
            }
            debug!(
                "Resolved component of {} contigs ({} sign conflicts, {} edges discarded)",
                component.len(),
                signs.violated.len(),
                positions.discarded.len()
            );
            Ok(ComponentOutcome::Resolved(ResolvedComponent {
                component,
                signs,
                positions,
                layout,
                overlaps,
            }))
        }
        Err(reason @ ScaffoldError::UnresolvableComponent { .. }) => {
            warn!("{reason}; demoting its contigs to singletons");
            Ok(ComponentOutcome::Demoted {
                component,
                signs,
                reason,
            })
        }
        Err(other) => Err(other),
    }
}

/// Resolve all components, in parallel when the `parallel` feature is enabled
/// and `config.max_workers > 1`. Outcomes keep the input order either way.
pub fn resolve_components(
    components: Vec<Component>,
    sizes: &ContigSizes,
    config: &ScaffoldConfig,
) -> Result<Vec<ComponentOutcome>> {
    #[cfg(feature = "parallel")]
    if config.max_workers > 1 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.max_workers)
            .build()
        {
            Ok(pool) => {
                return pool.install(|| {
                    components
                        .into_par_iter()
                        .map(|component| resolve_outcome(component, sizes, config))
                        .collect()
                });
            }
            Err(error) => warn!("Could not build worker pool ({error}); resolving sequentially"),
        }
    }

    #[cfg(not(feature = "parallel"))]
    if config.max_workers > 1 {
        warn!(
            "Parallel resolution requested, but the 'parallel' feature is not enabled; falling back to sequential mode"
        );
    }

    components
        .into_iter()
        .map(|component| resolve_outcome(component, sizes, config))
        .collect()
}
