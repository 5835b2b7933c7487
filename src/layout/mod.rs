mod error;
mod proportional;
mod reference;
mod routing;
pub(crate) mod types;

pub use error::LayoutError;
pub use proportional::ProportionalFlowLayout;
pub use reference::{FixedReferenceLayout, reference_rect};
pub use routing::route;
pub use types::*;

use std::collections::BTreeMap;

use crate::config::LayoutConfig;
use crate::model::{FlowGraph, Rect, StageId};

/// Node geometry produced by a layout pass plus the pixels-per-kilotonne
/// value scale it derived.
#[derive(Debug, Clone)]
pub struct Placement {
    pub rects: BTreeMap<StageId, Rect>,
    pub scale: f32,
}

/// Seam between the generic flow layout and the hand-tuned reference
/// arrangement. Both implementations are pure functions of their inputs.
pub trait LayoutStrategy {
    fn place(
        &self,
        graph: &FlowGraph,
        config: &LayoutConfig,
        canvas: (f32, f32),
    ) -> Result<Placement, LayoutError>;
}

/// Position a graph with the default strategy (reference arrangement over
/// the proportional value scale). Links come back unrouted; run [`route`]
/// after overrides are applied. Idempotent for identical inputs.
pub fn compute_layout(
    graph: &FlowGraph,
    config: &LayoutConfig,
    canvas: (f32, f32),
) -> Result<DiagramLayout, LayoutError> {
    compute_layout_with(&FixedReferenceLayout::default(), graph, config, canvas)
}

pub fn compute_layout_with(
    strategy: &dyn LayoutStrategy,
    graph: &FlowGraph,
    config: &LayoutConfig,
    canvas: (f32, f32),
) -> Result<DiagramLayout, LayoutError> {
    let placement = strategy.place(graph, config, canvas)?;

    let mut nodes = BTreeMap::new();
    for node in &graph.nodes {
        let Some(&rect) = placement.rects.get(&node.id) else {
            continue;
        };
        nodes.insert(
            node.id,
            NodeLayout {
                id: node.id,
                name: node.name.clone(),
                category: node.category,
                rect,
                rotated: false,
            },
        );
    }

    let links = graph
        .links
        .iter()
        .map(|link| LinkLayout {
            source: link.source,
            target: link.target,
            kind: link.kind,
            value: link.value,
            real_value: link.real_value,
            thickness: link.value as f32 * placement.scale,
            source_end: LinkEndpoint::default(),
            target_end: LinkEndpoint::default(),
        })
        .collect();

    log::debug!(
        "layout: {} nodes, {} links, scale {:.3} px/kt",
        nodes.len(),
        graph.links.len(),
        placement.scale
    );
    Ok(DiagramLayout {
        width: canvas.0,
        height: canvas.1,
        scale: placement.scale,
        nodes,
        links,
    })
}
