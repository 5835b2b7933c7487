use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::config::LayoutConfig;
use crate::model::{FlowGraph, Rect, StageId};

use super::{LayoutStrategy, Placement, ProportionalFlowLayout};

/// Canvas the reference coordinates were authored against.
const REFERENCE_CANVAS: (f32, f32) = (960.0, 600.0);

/// Fraction of a reference edge a node's incident flow may occupy.
const EDGE_FILL_LIMIT: f32 = 0.9;

/// Hand-tuned default arrangement matching the reference figure: the
/// process chain runs left to right, export is a thin bar along the top,
/// loss a thin bar along the bottom, end-of-life offset to the right.
static REFERENCE_RECTS: Lazy<BTreeMap<StageId, Rect>> = Lazy::new(|| {
    let mut rects = BTreeMap::new();
    rects.insert(StageId::Export, Rect::new(80.0, 24.0, 840.0, 52.0));
    rects.insert(StageId::Ore, Rect::new(40.0, 250.0, 66.0, 360.0));
    rects.insert(StageId::Concentrate, Rect::new(170.0, 250.0, 196.0, 360.0));
    rects.insert(StageId::Metal, Rect::new(300.0, 240.0, 326.0, 370.0));
    rects.insert(StageId::Magnet, Rect::new(430.0, 230.0, 456.0, 340.0));
    rects.insert(StageId::OtherSemi, Rect::new(430.0, 390.0, 456.0, 470.0));
    rects.insert(StageId::WindTurbine, Rect::new(560.0, 220.0, 586.0, 330.0));
    rects.insert(StageId::OtherFinal, Rect::new(560.0, 370.0, 586.0, 470.0));
    rects.insert(StageId::Eol, Rect::new(720.0, 260.0, 746.0, 430.0));
    rects.insert(StageId::Loss, Rect::new(80.0, 548.0, 840.0, 576.0));
    rects
});

pub fn reference_rect(id: StageId, canvas: (f32, f32)) -> Rect {
    let rect = REFERENCE_RECTS[&id];
    rect.scaled(canvas.0 / REFERENCE_CANVAS.0, canvas.1 / REFERENCE_CANVAS.1)
}

/// Default layout strategy: runs the generic flow layout, keeps its value
/// scale, and replaces the generic node geometry with the reference
/// arrangement. Saved overrides are applied on top afterwards, so the
/// generic result survives only as the value-to-thickness reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedReferenceLayout {
    generic: ProportionalFlowLayout,
}

impl LayoutStrategy for FixedReferenceLayout {
    fn place(
        &self,
        graph: &FlowGraph,
        config: &LayoutConfig,
        canvas: (f32, f32),
    ) -> Result<Placement, super::LayoutError> {
        let mut placement = self.generic.place(graph, config, canvas)?;
        for node in &graph.nodes {
            placement
                .rects
                .insert(node.id, reference_rect(node.id, canvas));
        }

        // The generic pass sizes flows against the full canvas; the
        // reference rectangles are much smaller. Cap the value scale so
        // each node's incident flow fits the edge it attaches on.
        let mut in_total: BTreeMap<StageId, f32> = BTreeMap::new();
        let mut out_total: BTreeMap<StageId, f32> = BTreeMap::new();
        for link in &graph.links {
            *out_total.entry(link.source).or_default() += link.value.max(0.0) as f32;
            *in_total.entry(link.target).or_default() += link.value.max(0.0) as f32;
        }
        let mut cap = f32::INFINITY;
        for node in &graph.nodes {
            let total = in_total
                .get(&node.id)
                .copied()
                .unwrap_or(0.0)
                .max(out_total.get(&node.id).copied().unwrap_or(0.0));
            if total <= 0.0 {
                continue;
            }
            let rect = placement.rects[&node.id];
            let capacity = rect.width().max(rect.height());
            cap = cap.min(EDGE_FILL_LIMIT * capacity / total);
        }
        if cap.is_finite() {
            placement.scale = placement.scale.min(cap);
        }
        Ok(placement)
    }
}
